//! Request mapping.
//!
//! [`RequestMapper::map`] turns an [`ExecutionContext`] into the request body
//! the client receives. Every field lands at its target path. Composites
//! (nested objects such as `NetworkConfiguration`) are emitted only when at
//! least one value under them was supplied.
//!
//! ```text
//! fields:  LoggingConfiguration.DagProcessingLogs.Enabled   (bound: true)
//!          LoggingConfiguration.TaskLogs.LogLevel            (unbound)
//!
//! body:    {"LoggingConfiguration": {"DagProcessingLogs": {"Enabled": true}}}
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::ExecutionContext;

/// The operation name plus a body mirroring the service's input shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub operation: String,
    pub body: Value,
}

impl Request {
    /// Value at a dotted path in the body, if present.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.body, |node, segment| node.get(segment))
    }
}

/// A speculative composite. Starts null and becomes non-null when a leaf is
/// assigned to it or a child finalizes as non-null.
#[derive(Debug)]
struct CompositeNode {
    is_null: bool,
    leaves: Map<String, Value>,
    children: BTreeMap<String, CompositeNode>,
}

impl CompositeNode {
    fn new() -> Self {
        Self {
            is_null: true,
            leaves: Map::new(),
            children: BTreeMap::new(),
        }
    }

    fn descend(&mut self, path: &[String]) -> &mut CompositeNode {
        path.iter().fold(self, |node, segment| {
            node.children
                .entry(segment.clone())
                .or_insert_with(CompositeNode::new)
        })
    }

    fn assign(&mut self, key: &str, value: Value) {
        self.leaves.insert(key.to_string(), value);
        self.is_null = false;
    }

    /// Collapses the subtree. A child that comes out non-null marks only its
    /// immediate parent, which then reports upward the same way.
    fn finalize(self) -> Option<Value> {
        let mut is_null = self.is_null;
        let mut map = self.leaves;
        for (key, child) in self.children {
            if let Some(value) = child.finalize() {
                map.insert(key, value);
                is_null = false;
            }
        }
        (!is_null).then_some(Value::Object(map))
    }
}

/// Maps execution contexts to requests.
pub struct RequestMapper;

impl RequestMapper {
    /// Builds the request for `ctx`. Pure: the same context always maps to an
    /// equal request.
    pub fn map(ctx: &ExecutionContext) -> Request {
        let mut root = CompositeNode::new();

        for slot in ctx.layout() {
            let Some((leaf, parents)) = slot.target.split_last() else {
                continue;
            };
            let node = root.descend(parents);
            if let Some(value) = ctx.get(&slot.name) {
                node.assign(leaf, value.clone());
            }
        }

        let body = root
            .finalize()
            .unwrap_or_else(|| Value::Object(Map::new()));

        Request {
            operation: ctx.operation().to_string(),
            body,
        }
    }
}
