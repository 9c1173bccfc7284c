//! Inbound chat command dispatch (§4.4): `ping`, `status`, `help`, and a
//! friendly fallback for anything else.

use vpnsentinel_registry::ClientRegistry;

/// Render the reply text for one inbound command line. Matching is
/// case-insensitive and ignores a leading `/` (the common bot-command
/// convention).
pub fn dispatch(text: &str, registry: &ClientRegistry) -> String {
    let normalized = text.trim().trim_start_matches('/').to_ascii_lowercase();
    match normalized.split_whitespace().next().unwrap_or("") {
        "ping" => "pong".to_string(),
        "status" => status_reply(registry),
        "help" => help_reply(),
        _ => help_reply(),
    }
}

fn status_reply(registry: &ClientRegistry) -> String {
    let snapshot = registry.snapshot();
    if snapshot.is_empty() {
        return "No clients have connected yet.".to_string();
    }
    let mut lines = vec![format!("{} client(s) known:", snapshot.len())];
    for record in snapshot {
        lines.push(format!(
            "- {} [{}] last seen {}",
            record.client_id,
            record.state.label(),
            record.humanized_last_seen(chrono::Utc::now())
        ));
    }
    lines.join("\n")
}

fn help_reply() -> String {
    "Available commands:\nping - check the bot is alive\nstatus - list known clients\nhelp - show this message"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_replies_pong() {
        let registry = ClientRegistry::new();
        assert_eq!(dispatch("/ping", &registry), "pong");
        assert_eq!(dispatch("PING", &registry), "pong");
    }

    #[test]
    fn unrecognized_command_gets_help() {
        let registry = ClientRegistry::new();
        assert!(dispatch("gibberish", &registry).contains("Available commands"));
    }

    #[test]
    fn status_reports_no_clients_when_empty() {
        let registry = ClientRegistry::new();
        assert_eq!(dispatch("status", &registry), "No clients have connected yet.");
    }
}
