//! Render a [`Notification`] into the fixed-field HTML message bodies
//! the chat transport sends (§6). Plain `format!` composition rather
//! than a template engine: these messages are short, fixed-shape, and
//! every field is already sanitized before it reaches here.

use crate::kind::{
    BypassFields, ConnectionFields, Notification, NoClientsAliveFields, OfflineFields,
    ServerStartedFields,
};

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn field_line(label: &str, value: &str) -> String {
    format!("<b>{}:</b> {}\n", escape(label), escape(value))
}

fn connection_body(title: &str, emoji: &str, fields: &ConnectionFields) -> String {
    let mut out = format!("<b>{emoji} {title}</b>\n\n");
    if let Some(prev) = &fields.previous_ip {
        out.push_str(&field_line("Previous IP", prev));
    }
    out.push_str(&field_line("Client", &fields.client_id));
    out.push_str(&field_line("Version", &fields.client_version));
    out.push_str(&field_line("Public IP", &fields.public_ip));
    out.push_str(&field_line(
        "Location",
        &format!("{}, {}, {}", fields.city, fields.region, fields.country),
    ));
    out.push_str(&field_line("Provider", &fields.provider));
    out.push_str(&field_line(
        "DNS resolver",
        &format!("{} ({})", fields.dns_location, fields.dns_colo),
    ));
    out.push_str(&field_line("Classification", &fields.classification));
    out
}

fn bypass_body(fields: &BypassFields) -> String {
    let mut out = "<b>\u{26a0}\u{fe0f} VPN Bypass Detected</b>\n\n".to_string();
    out.push_str(&field_line("Client", &fields.client_id));
    out.push_str(&field_line("Client IP", &fields.client_ip));
    out.push_str(&field_line("Server IP", &fields.server_ip));
    out.push_str(&field_line(
        "Location",
        &format!("{}, {}", fields.city, fields.country),
    ));
    out.push_str("\nThe client's public IP matches the server's own public IP: traffic is not traversing the VPN.\n");
    out
}

fn offline_body(fields: &OfflineFields) -> String {
    let mut out = "<b>\u{1f534} Client Offline</b>\n\n".to_string();
    out.push_str(&field_line("Client", &fields.client_id));
    out.push_str(&field_line(
        "Last seen",
        &format!(
            "{} ({})",
            fields.last_seen_absolute.to_rfc3339(),
            fields.last_seen_humanized
        ),
    ));
    out
}

fn server_started_body(fields: &ServerStartedFields) -> String {
    let mut out = "<b>\u{1f7e2} VPNSentinel Server Started</b>\n\n".to_string();
    out.push_str(&field_line("Version", &fields.version));
    if let Some(commit) = &fields.commit {
        out.push_str(&field_line("Commit", commit));
    }
    out.push_str(&field_line(
        "Offline threshold",
        &format!("{}s", fields.offline_threshold_secs),
    ));
    out.push_str(&field_line(
        "Sweep interval",
        &format!("{}s", fields.sweep_interval_secs),
    ));
    out
}

fn no_clients_alive_body(fields: &NoClientsAliveFields) -> String {
    let mut out = "<b>\u{26a0}\u{fe0f} No Clients Alive</b>\n\n".to_string();
    out.push_str(&field_line("Since", &fields.timestamp.to_rfc3339()));
    out
}

/// Render `notification` as the HTML body sent to the configured chat.
pub fn render(notification: &Notification) -> String {
    match notification {
        Notification::Connected(f) => connection_body("Client Connected", "\u{2705}", f),
        Notification::IpChanged(f) => connection_body("Client IP Changed", "\u{1f504}", f),
        Notification::DnsLeak(f) => connection_body("DNS Leak Detected", "\u{274c}", f),
        Notification::DnsUnknown(f) => connection_body("DNS Location Unknown", "\u{2753}", f),
        Notification::Bypass(f) => bypass_body(f),
        Notification::Offline(f) => offline_body(f),
        Notification::ServerStarted(f) => server_started_body(f),
        Notification::NoClientsAlive(f) => no_clients_alive_body(f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_body_contains_all_required_fields() {
        let fields = ConnectionFields {
            client_id: "agent-1".into(),
            client_version: "1.2.3".into(),
            public_ip: "203.0.113.5".into(),
            previous_ip: None,
            city: "Bucharest".into(),
            region: "Bucharest".into(),
            country: "Romania".into(),
            provider: "RCS&RDS".into(),
            dns_location: "RO".into(),
            dns_colo: "OTP".into(),
            classification: "SECURE".into(),
        };
        let html = render(&Notification::Connected(fields));
        assert!(html.contains("agent-1"));
        assert!(html.contains("203.0.113.5"));
        assert!(html.contains("SECURE"));
        assert!(!html.contains("Previous IP"));
    }

    #[test]
    fn escapes_html_metacharacters() {
        let html = field_line("Client", "<script>&");
        assert!(html.contains("&lt;script&gt;&amp;"));
    }

    #[test]
    fn ip_changed_body_includes_previous_ip() {
        let fields = ConnectionFields {
            client_id: "agent-1".into(),
            client_version: "1.2.3".into(),
            public_ip: "5.6.7.8".into(),
            previous_ip: Some("1.2.3.4".into()),
            city: "".into(),
            region: "".into(),
            country: "".into(),
            provider: "".into(),
            dns_location: "".into(),
            dns_colo: "".into(),
            classification: "SECURE".into(),
        };
        let html = render(&Notification::IpChanged(fields));
        assert!(html.contains("Previous IP"));
        assert!(html.contains("1.2.3.4"));
    }
}
