use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::orchestrator::OrchestratorConfig;
use crate::workflow::ValidationScore;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub steps: StepsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// External step configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepsConfig {
    /// Which quality scorer to use
    #[serde(default)]
    pub scorer: ScorerBackend,
    /// Score returned by the fixed scorer
    #[serde(default = "default_fixed_score")]
    pub fixed_score: ValidationScore,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerBackend::default(),
            fixed_score: default_fixed_score(),
        }
    }
}

fn default_fixed_score() -> ValidationScore {
    ValidationScore::High
}

/// Available quality scorers
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScorerBackend {
    /// Uniform random placeholder
    #[default]
    Random,
    /// Always `fixed_score`
    Fixed,
    // Future: real QA service
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.steps.scorer, ScorerBackend::Random);
        assert_eq!(config.orchestrator.settle_delay_ms, 500);
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_fixed_scorer() {
        let toml = r#"
[steps]
scorer = "fixed"
fixed_score = "medium"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.steps.scorer, ScorerBackend::Fixed);
        assert_eq!(config.steps.fixed_score, ValidationScore::Medium);
    }

    #[test]
    fn test_deserialize_unknown_scorer_fails() {
        let toml = r#"
[steps]
scorer = "llm"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(
            parsed.orchestrator.step_timeout_ms,
            config.orchestrator.step_timeout_ms
        );
    }
}
