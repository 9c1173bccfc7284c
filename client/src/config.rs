//! Environment-variable configuration (§6.1) for the client agent.

use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("VPNSENTINEL_SERVER_URL is required")]
    MissingServerUrl,
    #[error("VPNSENTINEL_SERVER_URL is not a valid URL: {0}")]
    InvalidServerUrl(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
    #[error("VPNSENTINEL_TLS_CA_PATH {path} could not be read: {source}")]
    UnreadableTlsCa {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Url,
    pub api_path: String,
    pub api_key: Option<String>,
    pub client_id: String,
    pub check_interval: Duration,
    pub geo_provider: String,
    pub tls_ca_bundle: Option<Vec<u8>>,
    pub insecure_tls: bool,
    pub health_bind: Option<std::net::SocketAddr>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Generate a kebab-case client id like `agent-3f9a1c` when none is
/// configured (§6.1).
pub fn generate_client_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("agent-{}", &suffix[..6])
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("VPNSENTINEL_SERVER_URL")
            .map_err(|_| ConfigError::MissingServerUrl)?;
        let server_url =
            Url::parse(&raw_url).map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))?;

        let api_path = env_var("VPNSENTINEL_API_PATH").unwrap_or_else(|| "/api/v1".to_string());
        let api_key = env_var("VPNSENTINEL_API_KEY");
        let client_id = env_var("VPNSENTINEL_CLIENT_ID").unwrap_or_else(generate_client_id);

        let check_interval_secs: u64 = match env_var("VPNSENTINEL_CHECK_INTERVAL_SECONDS") {
            None => 300,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "VPNSENTINEL_CHECK_INTERVAL_SECONDS",
                reason: format!("could not parse {raw:?} as seconds"),
            })?,
        };

        let geo_provider = env_var("VPNSENTINEL_GEO_PROVIDER").unwrap_or_else(|| "auto".to_string());

        let tls_ca_bundle = match env_var("VPNSENTINEL_TLS_CA_PATH") {
            None => None,
            Some(path) => Some(std::fs::read(&path).map_err(|source| ConfigError::UnreadableTlsCa {
                path,
                source,
            })?),
        };

        let insecure_tls = env_var("VPNSENTINEL_INSECURE_TLS")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if insecure_tls {
            tracing::warn!(target: "client", "VPNSENTINEL_INSECURE_TLS is set: TLS certificate validation is disabled");
        }

        let health_bind = match env_var("VPNSENTINEL_HEALTH_BIND") {
            None => None,
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "VPNSENTINEL_HEALTH_BIND",
                reason: format!("could not parse {raw:?} as a socket address"),
            })?),
        };

        Ok(ClientConfig {
            server_url,
            api_path,
            api_key,
            client_id,
            check_interval: Duration::from_secs(check_interval_secs),
            geo_provider,
            tls_ca_bundle,
            insecure_tls,
            health_bind,
        })
    }

    /// Full keepalive endpoint URL.
    pub fn keepalive_url(&self) -> String {
        format!(
            "{}{}/keepalive",
            self.server_url.as_str().trim_end_matches('/'),
            self.api_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_client_id_is_kebab_case_and_bounded() {
        let id = generate_client_id();
        assert!(id.starts_with("agent-"));
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn keepalive_url_joins_server_and_path() {
        let config = ClientConfig {
            server_url: Url::parse("https://sentinel.example.com").unwrap(),
            api_path: "/api/v1".to_string(),
            api_key: None,
            client_id: "agent-1".to_string(),
            check_interval: Duration::from_secs(300),
            geo_provider: "auto".to_string(),
            tls_ca_bundle: None,
            insecure_tls: false,
            health_bind: None,
        };
        assert_eq!(
            config.keepalive_url(),
            "https://sentinel.example.com/api/v1/keepalive"
        );
    }
}
