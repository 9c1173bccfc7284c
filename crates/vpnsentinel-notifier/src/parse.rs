//! Parse a rendered notification body back into its labeled fields, for
//! round-trip tests (§8): `parse(render(n))` must recover every field
//! `render` wrote, ignoring markup.

use std::collections::HashMap;

fn unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Extract `{label: value}` pairs from a rendered HTML body. Lines that
/// aren't `<b>label:</b> value` (the title line, free text) are ignored.
pub fn parse_fields(html: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in html.lines() {
        let Some(rest) = line.strip_prefix("<b>") else {
            continue;
        };
        let Some((label, value)) = rest.split_once(":</b> ") else {
            continue;
        };
        let label = unescape(label);
        let value = unescape(value.trim());
        fields.insert(label, value);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{ConnectionFields, Notification};
    use crate::render::render;

    #[test]
    fn round_trips_connected_fields() {
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
        let parsed = parse_fields(&html);
        assert_eq!(parsed.get("Client"), Some(&"agent-1".to_string()));
        assert_eq!(parsed.get("Public IP"), Some(&"203.0.113.5".to_string()));
        assert_eq!(parsed.get("Provider"), Some(&"RCS&RDS".to_string()));
        assert_eq!(parsed.get("Classification"), Some(&"SECURE".to_string()));
    }

    #[test]
    fn round_trips_escaped_values() {
        let fields = ConnectionFields {
            client_id: "agent-1".into(),
            client_version: "1.2.3".into(),
            public_ip: "203.0.113.5".into(),
            previous_ip: None,
            city: "".into(),
            region: "".into(),
            country: "".into(),
            provider: "A & B <ltd>".into(),
            dns_location: "RO".into(),
            dns_colo: "OTP".into(),
            classification: "SECURE".into(),
        };
        let html = render(&Notification::Connected(fields));
        let parsed = parse_fields(&html);
        assert_eq!(parsed.get("Provider"), Some(&"A & B <ltd>".to_string()));
    }
}
