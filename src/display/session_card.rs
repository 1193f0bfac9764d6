use crate::api::client::NextSession;

pub fn format_session_card(session: &NextSession) -> String {
    [
        format!("{}  [{}]", session.title, session.date),
        session.time.clone(),
        format!("Join Session: {}", session.link),
    ]
    .join("\n")
}
