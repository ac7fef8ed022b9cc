//! Plain-text rendering for sessions, selections and notifications.
use crate::notify::{Notification, NotificationKind};
use crate::selection::{SelectionKind, SelectionSet};
use crate::session::Session;

pub fn render_session_summary(session: &Session) -> String {
    let mut out = String::new();
    push_line(&mut out, &format!("File: {}", session.filename));
    push_line(&mut out, &format!("Session: {}", session.session_id));
    push_line(&mut out, &format!("Templates: {}", session.total_templates));
    push_line(&mut out, &format!("Areas: {}", session.total_areas));
    out
}

/// Numbered listing of a session's names, marking selected ones.
pub fn render_names(session: &Session, kind: SelectionKind, selected: &SelectionSet) -> String {
    let names = session.names(kind);
    let mut out = String::new();
    if names.is_empty() {
        push_line(&mut out, &format!("No {kind} in this session."));
        return out;
    }
    for (index, name) in names.iter().enumerate() {
        let mark = if selected.contains(name) { "x" } else { " " };
        push_line(&mut out, &format!("[{mark}] {:>3}. {name}", index + 1));
    }
    out
}

pub fn render_selection(kind: SelectionKind, selected: &SelectionSet) -> String {
    if selected.is_empty() {
        return format!("0 {kind} selected");
    }
    format!(
        "{} {kind} selected: {}",
        selected.len(),
        selected.names().join(", ")
    )
}

pub fn render_notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Success => notification.text.clone(),
        NotificationKind::Error => format!("error: {}", notification.text),
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
