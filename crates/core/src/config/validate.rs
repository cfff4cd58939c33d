use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Event buffer can hold at least one event
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.event_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, StepsConfig};
    use crate::orchestrator::OrchestratorConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            orchestrator: OrchestratorConfig::default(),
            steps: StepsConfig::default(),
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_event_buffer_fails() {
        let config = Config {
            orchestrator: OrchestratorConfig {
                event_buffer: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_timeout_independent_of_delay() {
        // The timeout bounds the step call only; the settle delay runs before it.
        for step_timeout_ms in [0, 200, 5000] {
            let config = Config {
                orchestrator: OrchestratorConfig {
                    settle_delay_ms: 1000,
                    step_timeout_ms,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(validate_config(&config).is_ok());
        }
    }
}
