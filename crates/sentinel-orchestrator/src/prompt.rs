use sentinel_core::types::SessionState;
use sentinel_sessions::Session;
use sentinel_tenants::types::PromptContext;

/// Builds the system instruction handed to the LLM: tenant prompt context,
/// current session context, and a base template keyed by `session.state`.
pub fn build_system_instruction(prompt_ctx: &PromptContext, session: &Session) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "You are the booking assistant for {}.\n",
        prompt_ctx.tenant_name
    ));
    if let Some(desc) = &prompt_ctx.business_description {
        out.push_str(desc);
        out.push('\n');
    }
    if let Some(hours) = &prompt_ctx.working_hours {
        out.push_str(&format!("Working hours: {hours}\n"));
    }
    if let Some(address) = &prompt_ctx.address {
        out.push_str(&format!("Address: {address}\n"));
    }
    if let Some(phone) = &prompt_ctx.display_phone {
        out.push_str(&format!("Phone: {phone}\n"));
    }
    if !prompt_ctx.service_catalogue.is_empty() {
        out.push_str("Services offered:\n");
        for item in &prompt_ctx.service_catalogue {
            out.push_str(&format!("- {}\n", item.name));
        }
    }
    if !prompt_ctx.product_catalogue.is_empty() {
        out.push_str("Products offered:\n");
        for item in &prompt_ctx.product_catalogue {
            out.push_str(&format!("- {}\n", item.name));
        }
    }
    if let Some(custom) = &prompt_ctx.custom_instructions {
        out.push_str(custom);
        out.push('\n');
    }

    out.push_str(state_template(session.state));

    let ctx = &session.context;
    if ctx.name.is_some() || ctx.phone.is_some() || ctx.desired_service.is_some() {
        out.push_str("\nKnown so far:\n");
        if let Some(name) = &ctx.name {
            out.push_str(&format!("- name: {name}\n"));
        }
        if let Some(phone) = &ctx.phone {
            out.push_str(&format!("- phone: {phone}\n"));
        }
        if let Some(service) = &ctx.desired_service {
            out.push_str(&format!("- desired service: {service}\n"));
        }
        if let Some(slot) = &ctx.selected_slot {
            out.push_str(&format!("- selected slot: {slot}\n"));
        }
    }

    out
}

fn state_template(state: SessionState) -> &'static str {
    match state {
        SessionState::Initiated | SessionState::Greeting => {
            "Greet the customer warmly and ask how you can help."
        }
        SessionState::CollectingInfo => {
            "Collect the customer's name, phone number, and desired service before proceeding."
        }
        SessionState::Consulting => {
            "Answer questions about services, pricing, and availability using the tools provided."
        }
        SessionState::Booking => {
            "Help the customer pick an available slot for their desired service."
        }
        SessionState::Confirming => {
            "Confirm the chosen slot and create the appointment once the customer agrees."
        }
        SessionState::Completed => {
            "The booking is complete. Answer any follow-up questions politely."
        }
        SessionState::Failed => {
            "Apologize for the earlier issue and offer to start over."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::types::{ChannelKind, TenantId};
    use sentinel_tenants::types::AgentPolicy;

    #[test]
    fn instruction_mentions_tenant_name_and_state_template() {
        let policy = AgentPolicy::empty(TenantId::from("t1"));
        let ctx = PromptContext::from_policy("Ann's Salon".into(), &policy);
        let session = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        let instruction = build_system_instruction(&ctx, &session);
        assert!(instruction.contains("Ann's Salon"));
        assert!(instruction.contains("Greet the customer"));
    }
}
