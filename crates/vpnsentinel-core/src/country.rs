//! Country-code normalization
//!
//! Geolocation providers disagree on how they encode a country: some
//! return a full English name, some a 2-letter ISO code, with arbitrary
//! case and whitespace. The DNS-trace endpoint always returns a 2-letter
//! code. Comparing these representations directly produces false
//! DNS-leak positives, so every comparison in the transition engine goes
//! through [`normalize`] first.

/// Sentinel returned for empty, non-string-equivalent, or unmatched input.
pub const UNKNOWN: &str = "UNKNOWN";

/// Normalize a country name or code into a canonical 2-letter uppercase
/// ISO code, or [`UNKNOWN`] if the input cannot be matched.
///
/// Case-insensitive and whitespace-trimmed. A 2-letter input is
/// uppercased and accepted as-is (not validated against the ISO list,
/// since DNS-trace codes are authoritative by construction). A full
/// name is looked up in [`lookup_full_name`].
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return UNKNOWN.to_string();
    }

    if trimmed.chars().count() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return trimmed.to_ascii_uppercase();
    }

    match lookup_full_name(trimmed) {
        Some(code) => code.to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// True iff `normalize(a) == normalize(b)` and neither side is
/// [`UNKNOWN`]. Two unmatched inputs never compare equal, since the
/// transition engine must not assert a leak (or its absence) without a
/// concrete country on both sides.
pub fn equal(a: &str, b: &str) -> bool {
    let na = normalize(a);
    let nb = normalize(b);
    na != UNKNOWN && na == nb
}

/// Look up a full English country name (case-insensitive) and return its
/// 2-letter ISO code. Covers Europe, the Americas, Asia-Pacific, the
/// Middle East, and Africa.
fn lookup_full_name(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        // Europe
        "germany" => "DE",
        "france" => "FR",
        "united kingdom" | "uk" | "great britain" => "GB",
        "spain" => "ES",
        "italy" => "IT",
        "netherlands" | "the netherlands" | "holland" => "NL",
        "belgium" => "BE",
        "switzerland" => "CH",
        "austria" => "AT",
        "sweden" => "SE",
        "norway" => "NO",
        "denmark" => "DK",
        "finland" => "FI",
        "poland" => "PL",
        "portugal" => "PT",
        "ireland" => "IE",
        "romania" => "RO",
        "greece" => "GR",
        "czech republic" | "czechia" => "CZ",
        "hungary" => "HU",
        "ukraine" => "UA",
        "russia" | "russian federation" => "RU",
        "iceland" => "IS",
        "bulgaria" => "BG",
        "croatia" => "HR",
        "slovakia" => "SK",
        "slovenia" => "SI",
        "serbia" => "RS",
        "luxembourg" => "LU",
        "lithuania" => "LT",
        "latvia" => "LV",
        "estonia" => "EE",
        "moldova" => "MD",
        "malta" => "MT",
        "cyprus" => "CY",
        // Americas
        "united states" | "united states of america" | "usa" | "us" => "US",
        "canada" => "CA",
        "mexico" => "MX",
        "brazil" => "BR",
        "argentina" => "AR",
        "chile" => "CL",
        "colombia" => "CO",
        "peru" => "PE",
        "venezuela" => "VE",
        "ecuador" => "EC",
        "uruguay" => "UY",
        "paraguay" => "PY",
        "bolivia" => "BO",
        "costa rica" => "CR",
        "panama" => "PA",
        // Asia-Pacific
        "japan" => "JP",
        "china" => "CN",
        "south korea" | "republic of korea" | "korea" => "KR",
        "north korea" => "KP",
        "india" => "IN",
        "australia" => "AU",
        "new zealand" => "NZ",
        "singapore" => "SG",
        "malaysia" => "MY",
        "indonesia" => "ID",
        "thailand" => "TH",
        "vietnam" | "viet nam" => "VN",
        "philippines" => "PH",
        "taiwan" => "TW",
        "hong kong" => "HK",
        "pakistan" => "PK",
        "bangladesh" => "BD",
        // Middle East
        "israel" => "IL",
        "turkey" | "turkiye" | "türkiye" => "TR",
        "saudi arabia" => "SA",
        "united arab emirates" | "uae" => "AE",
        "qatar" => "QA",
        "iran" => "IR",
        "iraq" => "IQ",
        "jordan" => "JO",
        "lebanon" => "LB",
        "kuwait" => "KW",
        // Africa
        "south africa" => "ZA",
        "egypt" => "EG",
        "nigeria" => "NG",
        "kenya" => "KE",
        "morocco" => "MA",
        "algeria" => "DZ",
        "tunisia" => "TN",
        "ghana" => "GH",
        "ethiopia" => "ET",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_letter_code_uppercased() {
        assert_eq!(normalize("ro"), "RO");
        assert_eq!(normalize(" De "), "DE");
    }

    #[test]
    fn full_name_case_insensitive() {
        assert_eq!(normalize("Romania"), "RO");
        assert_eq!(normalize("ROMANIA"), "RO");
        assert_eq!(normalize("  romania  "), "RO");
    }

    #[test]
    fn empty_and_unmatched_are_unknown() {
        assert_eq!(normalize(""), UNKNOWN);
        assert_eq!(normalize("   "), UNKNOWN);
        assert_eq!(normalize("Narnia"), UNKNOWN);
    }

    #[test]
    fn equal_matches_code_and_name() {
        assert!(equal("Romania", "RO"));
        assert!(equal("RO", "ro"));
        assert!(!equal("Romania", "Germany"));
    }

    #[test]
    fn unknown_never_equal() {
        assert!(!equal("", ""));
        assert!(!equal("Narnia", "Narnia"));
        assert!(!equal("", "RO"));
    }

    #[test]
    fn full_name_vs_code_no_false_leak() {
        // Different providers, same country: must compare equal.
        assert!(equal("Romania", "RO"));
        assert!(equal("United States", "US"));
        assert!(equal("usa", "US"));
    }
}
