//! Node configuration from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

use crate::pool::DEFAULT_BATCH_THRESHOLD;

pub const ENV_ADDR: &str = "LEDGER_ADDR";
pub const ENV_BATCH_THRESHOLD: &str = "LEDGER_BATCH_THRESHOLD";
pub const ENV_DEFAULT_SUBMITTER: &str = "LEDGER_DEFAULT_SUBMITTER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: invalid socket address {value:?}")]
    Addr { key: &'static str, value: String },
    #[error("{key}: expected a positive integer, got {value:?}")]
    Threshold { key: &'static str, value: String },
    #[error("{key}: must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub addr: SocketAddr,
    /// Pool size at which a block is sealed.
    pub batch_threshold: usize,
    /// Submitter recorded when a request carries no `x-submitter` header.
    pub default_submitter: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            default_submitter: "user1".to_string(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ADDR) {
            config.addr = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Addr { key: ENV_ADDR, value })?;
        }

        if let Some(value) = lookup(ENV_BATCH_THRESHOLD) {
            let parsed = value.trim().parse::<usize>();
            config.batch_threshold = match parsed {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Threshold {
                        key: ENV_BATCH_THRESHOLD,
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_DEFAULT_SUBMITTER) {
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::Empty {
                    key: ENV_DEFAULT_SUBMITTER,
                });
            }
            config.default_submitter = value.to_string();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let c = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c.addr.to_string(), "127.0.0.1:3000");
        assert_eq!(c.batch_threshold, 2);
        assert_eq!(c.default_submitter, "user1");
    }

    #[test]
    fn overrides() {
        let c = NodeConfig::from_lookup(lookup(&[
            (ENV_ADDR, "0.0.0.0:8080"),
            (ENV_BATCH_THRESHOLD, "10"),
            (ENV_DEFAULT_SUBMITTER, "kiosk-7"),
        ]))
        .unwrap();
        assert_eq!(c.addr.port(), 8080);
        assert_eq!(c.batch_threshold, 10);
        assert_eq!(c.default_submitter, "kiosk-7");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            NodeConfig::from_lookup(lookup(&[(ENV_BATCH_THRESHOLD, "0")])),
            Err(ConfigError::Threshold { .. })
        ));
        assert!(matches!(
            NodeConfig::from_lookup(lookup(&[(ENV_BATCH_THRESHOLD, "two")])),
            Err(ConfigError::Threshold { .. })
        ));
        assert!(matches!(
            NodeConfig::from_lookup(lookup(&[(ENV_ADDR, "nowhere")])),
            Err(ConfigError::Addr { .. })
        ));
        assert!(matches!(
            NodeConfig::from_lookup(lookup(&[(ENV_DEFAULT_SUBMITTER, "  ")])),
            Err(ConfigError::Empty { .. })
        ));
    }
}
