use std::sync::Arc;

use sentinel_crm::CrmAdapter;
use sentinel_llm::ToolDefinition;
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::builtins;
use crate::tool::Tool;

/// Tenant-scoped mapping from tool name to handler, built fresh per request
/// from the tenant's bound `CrmAdapter`.
pub struct ToolRegistry {
    adapter: Arc<dyn CrmAdapter>,
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(adapter: Arc<dyn CrmAdapter>) -> Self {
        Self { adapter, tools: builtins::all() }
    }

    /// Schema export for the LLM client's tool catalogue.
    pub fn catalogue(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// `{result}` on success, `{error: string}` on failure. Unknown tool
    /// names and adapter exceptions both resolve this way — neither ever
    /// propagates as a fault into the orchestration loop.
    #[instrument(skip(self, args), fields(tool = %name))]
    pub async fn execute(&self, name: &str, args: Map<String, Value>) -> Value {
        match self.tools.iter().find(|t| t.name() == name) {
            Some(tool) => match tool.call(self.adapter.as_ref(), &args).await {
                Ok(result) => json!({ "result": result }),
                Err(error) => json!({ "error": error }),
            },
            None => json!({ "error": "unknown tool" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_crm::MockCrmAdapter;

    #[tokio::test]
    async fn unknown_tool_yields_error() {
        let registry = ToolRegistry::new(Arc::new(MockCrmAdapter::default()));
        let result = registry.execute("does_not_exist", Map::new()).await;
        assert_eq!(result["error"], "unknown tool");
    }

    #[tokio::test]
    async fn get_services_returns_seeded_mock_catalogue() {
        let registry = ToolRegistry::new(Arc::new(MockCrmAdapter::default()));
        let result = registry.execute("get_services", Map::new()).await;
        assert!(result["result"].as_array().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn create_appointment_rejects_malformed_date() {
        let registry = ToolRegistry::new(Arc::new(MockCrmAdapter::default()));
        let mut args = Map::new();
        args.insert("client_id".into(), json!("c1"));
        args.insert("service_id".into(), json!("svc-haircut"));
        args.insert("appointment_date".into(), json!("not-a-date"));
        args.insert("appointment_time".into(), json!("10:00"));
        let result = registry.execute("create_appointment", args).await;
        assert!(result["error"].as_str().unwrap().contains("appointment_date"));
    }

    #[test]
    fn catalogue_exposes_all_nine_builtin_tools() {
        let registry = ToolRegistry::new(Arc::new(MockCrmAdapter::default()));
        assert_eq!(registry.catalogue().len(), 9);
    }
}
