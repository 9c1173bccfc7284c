//! Field sanitization shared by the server (on ingest) and the client
//! (before it ever leaves the machine, per §4.5's provider contract).

/// Maximum length, in characters, retained for any sanitized string
/// field (`location.*`, `dns_test.colo`, etc.).
pub const MAX_FIELD_LEN: usize = 100;

/// Strip ASCII control characters and cap the result at
/// [`MAX_FIELD_LEN`] characters.
pub fn sanitize_field(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| !c.is_ascii_control()).collect();
    stripped.chars().take(MAX_FIELD_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_field("Bucharest\r\n\t"), "Bucharest");
        assert_eq!(sanitize_field("A\u{0007}B"), "AB");
    }

    #[test]
    fn caps_at_max_len() {
        let long = "x".repeat(150);
        assert_eq!(sanitize_field(&long).chars().count(), MAX_FIELD_LEN);
    }

    #[test]
    fn leaves_clean_input_untouched() {
        assert_eq!(sanitize_field("Bucharest"), "Bucharest");
    }
}
