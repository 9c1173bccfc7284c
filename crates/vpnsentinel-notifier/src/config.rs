//! Notifier enable/disable tri-state (§4.4, §6.1):
//! `{explicit-on, explicit-off, auto}`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierConfigError {
    #[error("NOTIFIER_ENABLED=true but NOTIFIER_TOKEN and/or NOTIFIER_CHAT_ID is unset")]
    MissingCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnabledSetting {
    ExplicitOn,
    ExplicitOff,
    Auto,
}

impl EnabledSetting {
    pub fn from_env_str(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("true") => EnabledSetting::ExplicitOn,
            Some(v) if v.eq_ignore_ascii_case("false") => EnabledSetting::ExplicitOff,
            _ => EnabledSetting::Auto,
        }
    }
}

/// Resolve whether the notifier should start, given the tri-state
/// setting and whether both credentials are present. Returns `Err` only
/// for the fatal explicit-on-without-credentials case (§4.9).
pub fn resolve(
    setting: EnabledSetting,
    token: Option<&str>,
    chat_id: Option<&str>,
) -> Result<bool, NotifierConfigError> {
    let has_credentials = token.is_some_and(|t| !t.is_empty()) && chat_id.is_some_and(|c| !c.is_empty());
    match setting {
        EnabledSetting::ExplicitOn if !has_credentials => Err(NotifierConfigError::MissingCredentials),
        EnabledSetting::ExplicitOn => Ok(true),
        EnabledSetting::ExplicitOff => Ok(false),
        EnabledSetting::Auto => Ok(has_credentials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_on_without_credentials_is_fatal() {
        let result = resolve(EnabledSetting::ExplicitOn, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_off_disables_even_with_credentials() {
        let result = resolve(EnabledSetting::ExplicitOff, Some("t"), Some("c"));
        assert_eq!(result.unwrap(), false);
    }

    #[test]
    fn auto_enables_only_with_both_credentials() {
        assert_eq!(resolve(EnabledSetting::Auto, Some("t"), None).unwrap(), false);
        assert_eq!(resolve(EnabledSetting::Auto, Some("t"), Some("c")).unwrap(), true);
        assert_eq!(resolve(EnabledSetting::Auto, None, None).unwrap(), false);
    }

    #[test]
    fn unset_env_value_defaults_to_auto() {
        assert_eq!(EnabledSetting::from_env_str(None), EnabledSetting::Auto);
        assert_eq!(EnabledSetting::from_env_str(Some("")), EnabledSetting::Auto);
    }
}
