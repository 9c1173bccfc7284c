//! Environment-variable configuration (§6.1), loaded once at startup
//! into a typed [`Config`]. No CLI framework, per the teacher's direct
//! `const BIND_ADDRESS: &str` style, generalized into env-var reads with
//! documented defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ipnetwork::IpNetwork;
use thiserror::Error;
use vpnsentinel_notifier::EnabledSetting;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
    #[error("invalid CIDR entry in VPNSENTINEL_IP_ALLOWLIST: {0}")]
    InvalidCidr(String),
    #[error(transparent)]
    Notifier(#[from] vpnsentinel_notifier::NotifierConfigError),
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub enabled: bool,
    pub token: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_bind: SocketAddr,
    pub health_bind: SocketAddr,
    pub dashboard_bind: SocketAddr,
    pub api_path: String,
    pub api_key: Option<String>,
    pub rate_limit_per_minute: u32,
    pub offline_threshold: Duration,
    pub sweep_interval: Duration,
    pub notifier: NotifierConfig,
    pub ip_allowlist: Vec<IpNetwork>,
    pub dashboard_enabled: bool,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env_var(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: name,
            reason: format!("could not parse {raw:?}"),
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_bind = parse_or("VPNSENTINEL_API_BIND", "0.0.0.0:8080".parse().unwrap())?;
        let health_bind = parse_or("VPNSENTINEL_HEALTH_BIND", "0.0.0.0:8081".parse().unwrap())?;
        let dashboard_bind = parse_or(
            "VPNSENTINEL_DASHBOARD_BIND",
            "0.0.0.0:8082".parse().unwrap(),
        )?;
        let api_path = env_var("VPNSENTINEL_API_PATH").unwrap_or_else(|| "/api/v1".to_string());
        let api_key = env_var("VPNSENTINEL_API_KEY");
        let rate_limit_per_minute = parse_or("VPNSENTINEL_RATE_LIMIT", 30u32)?;
        let offline_threshold_secs = parse_or("VPNSENTINEL_OFFLINE_THRESHOLD_SECONDS", 600u64)?;
        let sweep_interval_secs = parse_or("VPNSENTINEL_SWEEP_INTERVAL_SECONDS", 60u64)?;

        let token = env_var("VPNSENTINEL_NOTIFIER_TOKEN");
        let chat_id = env_var("VPNSENTINEL_NOTIFIER_CHAT_ID");
        let setting = EnabledSetting::from_env_str(
            std::env::var("VPNSENTINEL_NOTIFIER_ENABLED").ok().as_deref(),
        );
        let enabled = vpnsentinel_notifier::resolve_enabled(
            setting,
            token.as_deref(),
            chat_id.as_deref(),
        )?;

        let ip_allowlist = match env_var("VPNSENTINEL_IP_ALLOWLIST") {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<IpNetwork>()
                        .map_err(|_| ConfigError::InvalidCidr(s.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let dashboard_enabled = parse_or("VPNSENTINEL_DASHBOARD_ENABLED", true)?;

        if api_key.is_none() {
            tracing::warn!(target: "security", "VPNSENTINEL_API_KEY is unset: API authentication is disabled");
        }

        Ok(Config {
            api_bind,
            health_bind,
            dashboard_bind,
            api_path,
            api_key,
            rate_limit_per_minute,
            offline_threshold: Duration::from_secs(offline_threshold_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            notifier: NotifierConfig {
                enabled,
                token,
                chat_id,
            },
            ip_allowlist,
            dashboard_enabled,
        })
    }

    /// True when `net` is empty (any IP allowed) or `ip` matches an
    /// allowlist entry (§6 "0.0.0.0/0 or empty means any").
    pub fn ip_allowed(&self, ip: std::net::IpAddr) -> bool {
        self.ip_allowlist.is_empty() || self.ip_allowlist.iter().any(|net| net.contains(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allowlist_allows_any_ip() {
        let cfg = Config {
            api_bind: "0.0.0.0:8080".parse().unwrap(),
            health_bind: "0.0.0.0:8081".parse().unwrap(),
            dashboard_bind: "0.0.0.0:8082".parse().unwrap(),
            api_path: "/api/v1".into(),
            api_key: None,
            rate_limit_per_minute: 30,
            offline_threshold: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
            notifier: NotifierConfig {
                enabled: false,
                token: None,
                chat_id: None,
            },
            ip_allowlist: Vec::new(),
            dashboard_enabled: true,
        };
        assert!(cfg.ip_allowed("203.0.113.5".parse().unwrap()));
    }

    #[test]
    fn allowlist_rejects_ip_outside_cidr() {
        let mut cfg_builder = |allowlist: Vec<IpNetwork>| Config {
            api_bind: "0.0.0.0:8080".parse().unwrap(),
            health_bind: "0.0.0.0:8081".parse().unwrap(),
            dashboard_bind: "0.0.0.0:8082".parse().unwrap(),
            api_path: "/api/v1".into(),
            api_key: None,
            rate_limit_per_minute: 30,
            offline_threshold: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
            notifier: NotifierConfig {
                enabled: false,
                token: None,
                chat_id: None,
            },
            ip_allowlist: allowlist,
            dashboard_enabled: true,
        };
        let cfg = cfg_builder(vec!["10.0.0.0/8".parse().unwrap()]);
        assert!(cfg.ip_allowed("10.1.2.3".parse().unwrap()));
        assert!(!cfg.ip_allowed("203.0.113.5".parse().unwrap()));
    }
}
