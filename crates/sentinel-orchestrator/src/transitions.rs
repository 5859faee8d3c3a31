use sentinel_core::types::SessionState;
use sentinel_sessions::Session;

/// Deterministic transition table. Applied once per orchestrator pass, after
/// the LLM dispatch branch, regardless of whether it produced text or a tool
/// call. Transitions are monotone along the happy path:
/// `INITIATED -> GREETING -> COLLECTING_INFO -> BOOKING -> CONFIRMING -> COMPLETED`.
/// `CONSULTING`, `COMPLETED`, and `FAILED` are never entered by this table —
/// they're either LLM-chosen or reserved for the error path.
pub fn apply_transition(session: &mut Session) {
    session.state = match session.state {
        SessionState::Initiated => SessionState::Greeting,
        SessionState::Greeting if session.context.has_any_lead() => SessionState::CollectingInfo,
        SessionState::CollectingInfo if session.context.has_booking_essentials() => SessionState::Booking,
        SessionState::Booking if session.context.selected_slot.is_some() => SessionState::Confirming,
        SessionState::Confirming if session.context.appointment_id.is_some() => SessionState::Completed,
        other => other,
    };
}

/// The terminal transition taken whenever an exception escapes everything
/// past the LLM call.
pub fn fail(session: &mut Session) {
    session.state = SessionState::Failed;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::types::{ChannelKind, TenantId};

    #[test]
    fn initiated_always_advances_to_greeting() {
        let mut s = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::Greeting);
    }

    #[test]
    fn greeting_holds_until_a_lead_field_is_present() {
        let mut s = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        s.state = SessionState::Greeting;
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::Greeting);

        s.context.phone = Some("+1".into());
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::CollectingInfo);
    }

    #[test]
    fn booking_essentials_gate_collecting_info_to_booking() {
        let mut s = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        s.state = SessionState::CollectingInfo;
        s.context.name = Some("Ann".into());
        s.context.phone = Some("+1".into());
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::CollectingInfo);

        s.context.desired_service = Some("haircut".into());
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::Booking);
    }

    #[test]
    fn confirming_completes_once_appointment_id_is_set() {
        let mut s = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        s.state = SessionState::Confirming;
        s.context.appointment_id = Some("a9".into());
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::Completed);
    }

    #[test]
    fn failed_and_completed_are_sticky() {
        let mut s = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        s.state = SessionState::Completed;
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::Completed);

        fail(&mut s);
        apply_transition(&mut s);
        assert_eq!(s.state, SessionState::Failed);
    }
}
