use async_trait::async_trait;
use sentinel_crm::CrmAdapter;
use serde_json::{Map, Value};

/// A single tenant-scoped capability the LLM may invoke. Argument validation
/// is the tool's own responsibility; adapter failures and bad arguments are
/// both returned as `Err(String)` and never panic or propagate as faults.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters_schema(&self) -> Value;

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String>;
}
