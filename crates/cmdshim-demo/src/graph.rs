//! The in-memory graph API catalog.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use cmdshim::dispatch::{async_trait, ClientError, Request, ServiceClient};
use serde_json::{json, Map, Value};

use crate::error::ServiceError;

#[derive(Debug)]
struct Catalog {
    apis: BTreeMap<String, Value>,
    next_id: u32,
}

/// APIs keyed by id. Starts with one API, `api-0001` named `petstore`.
#[derive(Debug)]
pub struct GraphService {
    catalog: Mutex<Catalog>,
}

impl Default for GraphService {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphService {
    pub fn new() -> Self {
        let service = Self::empty();
        // Seeding an empty catalog cannot fail.
        let _ = service.create(&json!({"Name": "petstore", "Tags": {"team": "demo"}}));
        service
    }

    /// A catalog with no APIs.
    pub fn empty() -> Self {
        Self {
            catalog: Mutex::new(Catalog {
                apis: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Runs one operation against the catalog.
    pub fn handle(&self, operation: &str, body: &Value) -> Result<Value, ServiceError> {
        tracing::debug!(operation, "graph service request");
        match operation {
            "CreateApi" => self.create(body),
            "GetApi" => self.get(body),
            "UpdateApi" => self.update(body),
            "DeleteApi" => self.delete(body),
            "ListApis" => self.list(body),
            other => Err(ServiceError::UnknownOperation {
                service: "graph".into(),
                operation: other.into(),
            }),
        }
    }

    fn create(&self, body: &Value) -> Result<Value, ServiceError> {
        let name = string(body, "Name").ok_or_else(|| ServiceError::missing("Name"))?;

        let mut catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        if catalog.apis.values().any(|api| api["Name"] == name) {
            return Err(ServiceError::Conflict(format!("an API named {} exists", name)));
        }

        let id = format!("api-{:04}", catalog.next_id);
        catalog.next_id += 1;

        let mut api = Map::new();
        api.insert("ApiId".into(), json!(id));
        api.insert("Name".into(), json!(name));
        for key in ["Description", "Tags"] {
            if let Some(value) = body.get(key) {
                api.insert(key.into(), value.clone());
            }
        }

        let api = Value::Object(api);
        catalog.apis.insert(id, api.clone());
        Ok(api)
    }

    fn get(&self, body: &Value) -> Result<Value, ServiceError> {
        let id = string(body, "ApiId").ok_or_else(|| ServiceError::missing("ApiId"))?;
        let catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        catalog.apis.get(id).cloned().ok_or_else(|| not_found(id))
    }

    fn update(&self, body: &Value) -> Result<Value, ServiceError> {
        let id = string(body, "ApiId").ok_or_else(|| ServiceError::missing("ApiId"))?;
        let mut catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        let api = catalog.apis.get_mut(id).ok_or_else(|| not_found(id))?;

        for key in ["Name", "Description"] {
            if let Some(value) = body.get(key) {
                api[key] = value.clone();
            }
        }
        Ok(api.clone())
    }

    fn delete(&self, body: &Value) -> Result<Value, ServiceError> {
        let id = string(body, "ApiId").ok_or_else(|| ServiceError::missing("ApiId"))?;
        let mut catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        catalog
            .apis
            .remove(id)
            .map(|_| json!({}))
            .ok_or_else(|| not_found(id))
    }

    fn list(&self, body: &Value) -> Result<Value, ServiceError> {
        let start = match string(body, "NextToken") {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ServiceError::BadRequest(format!("invalid NextToken '{}'", token)))?,
            None => 0,
        };
        let limit = match body.get("MaxResults").and_then(Value::as_i64) {
            Some(n) if n < 1 => {
                return Err(ServiceError::BadRequest("MaxResults must be positive".into()))
            }
            Some(n) => n as usize,
            None => usize::MAX,
        };

        let catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        let items: Vec<Value> = catalog.apis.values().skip(start).take(limit).cloned().collect();
        let end = start + items.len();

        let mut response = json!({"Items": items});
        if end < catalog.apis.len() {
            response["NextToken"] = json!(end.to_string());
        }
        Ok(response)
    }
}

#[async_trait]
impl ServiceClient for GraphService {
    async fn call(&self, request: &Request) -> Result<Value, ClientError> {
        Ok(self.handle(&request.operation, &request.body)?)
    }
}

fn string<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("API {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog() {
        let service = GraphService::new();
        let api = service.handle("GetApi", &json!({"ApiId": "api-0001"})).unwrap();
        assert_eq!(api["Name"], "petstore");
    }

    #[test]
    fn test_create_assigns_ids_and_rejects_duplicates() {
        let service = GraphService::empty();
        let api = service
            .handle("CreateApi", &json!({"Name": "demo", "Tags": {"env": "test"}}))
            .unwrap();
        assert_eq!(api, json!({"ApiId": "api-0001", "Name": "demo", "Tags": {"env": "test"}}));

        let err = service.handle("CreateApi", &json!({"Name": "demo"})).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_missing_required_is_a_service_error() {
        let err = GraphService::empty().handle("CreateApi", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "BadRequestException: Name is required");
    }

    #[test]
    fn test_update_and_delete() {
        let service = GraphService::new();
        let api = service
            .handle("UpdateApi", &json!({"ApiId": "api-0001", "Name": "renamed"}))
            .unwrap();
        assert_eq!(api["Name"], "renamed");
        assert_eq!(api["Tags"], json!({"team": "demo"}));

        service.handle("DeleteApi", &json!({"ApiId": "api-0001"})).unwrap();
        let err = service.handle("GetApi", &json!({"ApiId": "api-0001"})).unwrap_err();
        assert_eq!(err.to_string(), "NotFoundException: API api-0001 not found");
    }

    #[test]
    fn test_list_pages() {
        let service = GraphService::new();
        service.handle("CreateApi", &json!({"Name": "second"})).unwrap();

        let page = service.handle("ListApis", &json!({"MaxResults": 1})).unwrap();
        assert_eq!(page["Items"].as_array().unwrap().len(), 1);
        assert_eq!(page["NextToken"], "1");

        let rest = service
            .handle("ListApis", &json!({"MaxResults": 1, "NextToken": "1"}))
            .unwrap();
        assert_eq!(rest["Items"][0]["Name"], "second");
        assert!(rest.get("NextToken").is_none());
    }
}
