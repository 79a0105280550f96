//! The in-memory workflow environment service.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use cmdshim::dispatch::{async_trait, ClientError, Request, ServiceClient};
use serde_json::{json, Value};

use crate::error::ServiceError;

/// Environments keyed by name. Starts empty.
#[derive(Debug, Default)]
pub struct WorkflowService {
    environments: Mutex<BTreeMap<String, Value>>,
}

impl WorkflowService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, operation: &str, body: &Value) -> Result<Value, ServiceError> {
        tracing::debug!(operation, "workflow service request");
        match operation {
            "CreateEnvironment" => self.create(body),
            "GetEnvironment" => self.get(body),
            "DeleteEnvironment" => self.delete(body),
            "ListEnvironments" => Ok(self.list()),
            other => Err(ServiceError::UnknownOperation {
                service: "workflow".into(),
                operation: other.into(),
            }),
        }
    }

    fn create(&self, body: &Value) -> Result<Value, ServiceError> {
        let name = name(body)?;
        if body.get("ExecutionRoleArn").is_none() {
            return Err(ServiceError::missing("ExecutionRoleArn"));
        }

        let mut environments = self.environments.lock().unwrap_or_else(PoisonError::into_inner);
        if environments.contains_key(name) {
            return Err(ServiceError::Conflict(format!(
                "environment {} already exists",
                name
            )));
        }

        let arn = format!("arn:workflow:environment/{}", name);
        let mut environment = body.clone();
        environment["Arn"] = json!(arn);
        environment["Status"] = json!("AVAILABLE");
        if environment.get("MaxWorkers").is_none() {
            environment["MaxWorkers"] = json!(10);
        }

        environments.insert(name.to_string(), environment);
        Ok(json!({"Arn": arn}))
    }

    fn get(&self, body: &Value) -> Result<Value, ServiceError> {
        let name = name(body)?;
        let environments = self.environments.lock().unwrap_or_else(PoisonError::into_inner);
        environments
            .get(name)
            .map(|environment| json!({"Environment": environment}))
            .ok_or_else(|| not_found(name))
    }

    fn delete(&self, body: &Value) -> Result<Value, ServiceError> {
        let name = name(body)?;
        let mut environments = self.environments.lock().unwrap_or_else(PoisonError::into_inner);
        environments
            .remove(name)
            .map(|_| json!({}))
            .ok_or_else(|| not_found(name))
    }

    fn list(&self) -> Value {
        let environments = self.environments.lock().unwrap_or_else(PoisonError::into_inner);
        json!({"Environments": environments.keys().collect::<Vec<_>>()})
    }
}

#[async_trait]
impl ServiceClient for WorkflowService {
    async fn call(&self, request: &Request) -> Result<Value, ClientError> {
        Ok(self.handle(&request.operation, &request.body)?)
    }
}

fn name(body: &Value) -> Result<&str, ServiceError> {
    body.get("Name")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::missing("Name"))
}

fn not_found(name: &str) -> ServiceError {
    ServiceError::NotFound(format!("environment {} not found", name))
}
