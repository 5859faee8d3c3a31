use std::sync::Arc;

use sentinel_core::config::N_HIST;
use sentinel_core::types::{MessageKind, SessionId, TenantId};
use sentinel_crm::CrmCredentials;
use sentinel_history::{HistoryStore, MessageRecord, SessionSnapshot};
use sentinel_llm::{ChatMessage, ChatRequest, ChatRole, GenerationConfig, LlmProvider};
use sentinel_sessions::{HistoryEntry, HistoryRole, Session, SessionStore};
use sentinel_tenants::TenantRegistry;
use sentinel_tools::ToolRegistry;
use sentinel_vault::SecretVault;
use tracing::instrument;

use crate::deadlines::{deadline, CRM_DEADLINE, DB_DEADLINE, LLM_DEADLINE, REDIS_DEADLINE};
use crate::error::{OrchestratorError, Result};
use crate::locks::SessionLockTable;
use crate::message::{InboundMessage, OrchestratorReply};
use crate::prompt::build_system_instruction;
use crate::transitions::{apply_transition, fail};

/// Fresh sessions start with this TTL; every subsequent `save_session`/
/// `append_history` call resets it.
const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Owns one request's lifecycle end to end: tenant resolution, policy load,
/// session acquisition, the LLM tool-call dispatch, the state-transition
/// table, and persistence. See `crate` docs for the full step list.
pub struct Orchestrator {
    tenant_registry: Arc<TenantRegistry>,
    vault: Arc<SecretVault>,
    session_store: SessionStore,
    history_store: HistoryStore,
    llm: Arc<dyn LlmProvider>,
    locks: SessionLockTable,
}

impl Orchestrator {
    pub fn new(
        tenant_registry: Arc<TenantRegistry>,
        vault: Arc<SecretVault>,
        session_store: SessionStore,
        history_store: HistoryStore,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            tenant_registry,
            vault,
            session_store,
            history_store,
            llm,
            locks: SessionLockTable::new(),
        }
    }

    /// Entry point. Never panics and never propagates an error to the
    /// caller — every failure is caught at this boundary and rendered as a
    /// deterministic, user-safe fallback reply.
    pub async fn handle_message(&self, msg: InboundMessage) -> OrchestratorReply {
        let Some(tenant_id) = msg.tenant_id.clone() else {
            tracing::warn!(error_class = "missing_tenant", "inbound message has no tenant");
            return OrchestratorReply::text_only(OrchestratorError::MissingTenant.fallback_text());
        };

        let session_id = SessionId::for_channel(msg.channel_kind, &msg.external_user_id);
        let lock = self.locks.lock_for(&session_id);
        let _guard = lock.lock().await;

        match self.run(&tenant_id, &session_id, &msg).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(
                    tenant = %tenant_id,
                    session = %session_id,
                    error_class = err.code(),
                    error = %err,
                    "orchestrator pass failed"
                );
                if let Ok(Some(mut session)) = self.session_store.get_session(&session_id).await {
                    fail(&mut session);
                    let _ = self.session_store.save_session(&session).await;
                    let _ = self.history_store.upsert_session(&to_snapshot(&session)).await;
                }
                OrchestratorReply::text_only(err.fallback_text())
            }
        }
    }

    #[instrument(skip(self, msg), fields(tenant = %tenant_id, session = %session_id))]
    async fn run(
        &self,
        tenant_id: &TenantId,
        session_id: &SessionId,
        msg: &InboundMessage,
    ) -> Result<OrchestratorReply> {
        // 2. Policy load.
        let binding = deadline(DB_DEADLINE, self.tenant_registry.load_crm_binding(tenant_id))
            .await?
            .ok_or_else(|| OrchestratorError::CrmNotConfigured { tenant: tenant_id.as_str().to_string() })?;
        let prompt_ctx =
            deadline(DB_DEADLINE, self.tenant_registry.load_company_prompt_context(tenant_id)).await?;
        let policy = deadline(DB_DEADLINE, self.tenant_registry.load_agent_policy(tenant_id)).await?;

        let api_key = self.vault.decrypt(&binding.encrypted_credentials)?;
        let creds = CrmCredentials { base_url: binding.base_url.clone(), api_key };
        let adapter = sentinel_crm::build(binding.crm_kind, Some(&creds));

        // 3. Session acquisition. A hot-store miss always creates a fresh
        // INITIATED session — it never repopulates from the durable store.
        let mut session = match deadline(REDIS_DEADLINE, self.session_store.get_session(session_id)).await? {
            Some(s) => s,
            None => Session::fresh(
                tenant_id.clone(),
                msg.channel_kind,
                msg.external_user_id.clone(),
                DEFAULT_SESSION_TTL_SECS,
            ),
        };
        session.touch();

        // Persist the inbound record up front so it survives any later failure.
        let inbound_record = MessageRecord::new(
            tenant_id.clone(),
            session_id.as_str(),
            msg.channel_kind,
            msg.kind,
            msg.text.clone(),
            false,
            Some(msg.external_user_id.clone()),
        );
        deadline(DB_DEADLINE, self.history_store.insert_message(&inbound_record)).await?;

        // 4. History assembly: H ∪ {M}.
        let user_text = msg.text.clone().unwrap_or_default();
        deadline(
            REDIS_DEADLINE,
            self.session_store.append_history(
                session_id,
                &HistoryEntry { role: HistoryRole::User, text: user_text },
                N_HIST,
                session.ttl_secs,
            ),
        )
        .await?;
        let history = deadline(REDIS_DEADLINE, self.session_store.get_history(session_id, N_HIST)).await?;
        let messages: Vec<ChatMessage> = history
            .iter()
            .map(|h| ChatMessage {
                role: match h.role {
                    HistoryRole::User => ChatRole::User,
                    HistoryRole::Model => ChatRole::Model,
                },
                text: h.text.clone(),
            })
            .collect();

        // 5. System instruction.
        let system = build_system_instruction(&prompt_ctx, &session);

        // 6. Tool catalogue, tenant-scoped.
        let tool_registry = ToolRegistry::new(adapter);
        let tools = tool_registry.catalogue();

        // 7. LLM call.
        let request = ChatRequest {
            model: policy.model_name.clone().unwrap_or_default(),
            system,
            messages,
            tools,
            config: GenerationConfig::clamped(policy.clamped_temperature(), policy.clamped_max_tokens()),
        };
        let response = deadline(LLM_DEADLINE, self.llm.generate(&request)).await?;

        // 8. Dispatch on response. At most one tool call per inbound request.
        let reply = match (response.text, response.tool_call) {
            (Some(text), _) => {
                deadline(
                    REDIS_DEADLINE,
                    self.session_store.append_history(
                        session_id,
                        &HistoryEntry { role: HistoryRole::Model, text: text.clone() },
                        N_HIST,
                        session.ttl_secs,
                    ),
                )
                .await?;
                let bot_record = MessageRecord::new(
                    tenant_id.clone(),
                    session_id.as_str(),
                    msg.channel_kind,
                    MessageKind::Text,
                    Some(text.clone()),
                    true,
                    None,
                );
                deadline(DB_DEADLINE, self.history_store.insert_message(&bot_record)).await?;
                OrchestratorReply::text_only(text)
            }
            (None, Some(call)) => {
                let result = match tokio::time::timeout(CRM_DEADLINE, tool_registry.execute(&call.name, call.args.clone())).await {
                    Ok(value) => value,
                    Err(_) => serde_json::json!({ "error": "tool call timed out" }),
                };
                session.context.function_results.insert(
                    call.name.clone(),
                    serde_json::json!({ "tool": call.name, "args": call.args, "result": result }),
                );
                OrchestratorReply::tool_call(call.name, result)
            }
            (None, None) => return Err(OrchestratorError::EmptyResponse),
        };

        // 9. State transition.
        apply_transition(&mut session);

        // 10. Persist.
        deadline(REDIS_DEADLINE, self.session_store.save_session(&session)).await?;
        deadline(DB_DEADLINE, self.history_store.upsert_session(&to_snapshot(&session))).await?;

        Ok(reply)
    }
}

fn to_snapshot(session: &Session) -> SessionSnapshot {
    SessionSnapshot {
        id: session.id.as_str().to_string(),
        tenant_id: session.tenant_id.clone(),
        external_user_id: session.external_user_id.clone(),
        channel_kind: session.channel_kind,
        state: session.state,
        context: serde_json::to_value(&session.context).unwrap_or_else(|_| serde_json::json!({})),
        crm_client_ref: session.crm_client_ref.clone(),
        crm_appointment_ref: session.crm_appointment_ref.clone(),
        created_at: session.created_at,
        last_activity: session.last_activity,
    }
}
