//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};
use crate::params::ParamValue;

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.transport.base_url.is_none());
        assert!(config.request.method.is_none());
        assert!(config.request.query.is_empty());
        assert!(config.retry.max_attempts.is_none());
    }

    #[test]
    fn parse_transport_section() {
        let toml = r#"
            [transport]
            base_url = "https://api.example.com"
            timeout = 5000
            user_agent = "my-agent"

            [transport.headers]
            Authorization = "Bearer token"
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(
            config.transport.base_url.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(config.transport.timeout, Some(5000));
        assert_eq!(config.transport.user_agent.as_deref(), Some("my-agent"));
        assert_eq!(
            config.transport.headers.get("Authorization").map(String::as_str),
            Some("Bearer token")
        );
    }

    #[test]
    fn parse_request_section() {
        let toml = r#"
            [request]
            method = "POST"

            [request.headers]
            Accept = "application/json"

            [request.query]
            page = 2
            q = "rust"
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.request.method.as_deref(), Some("POST"));
        assert_eq!(config.request.headers.len(), 1);
        assert_eq!(config.request.query.get("page"), Some(&ParamValue::from(2)));
        assert_eq!(config.request.query.get("q"), Some(&ParamValue::from("rust")));
    }

    #[test]
    fn parse_retry_section() {
        let toml = r"
            [retry]
            max_attempts = 5
            initial_delay = 100
            max_delay = 2000
            multiplier = 1.5
        ";

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.retry.max_attempts, Some(5));
        assert_eq!(config.retry.initial_delay, Some(100));
        assert_eq!(config.retry.max_delay, Some(2000));
        assert_eq!(config.retry.multiplier, Some(1.5));
    }
}

mod errors {
    use super::*;

    #[test]
    fn unknown_section_is_rejected() {
        assert!(TomlConfig::parse("[server]\nhost = \"x\"").is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(TomlConfig::parse("[transport]\nretries = 3").is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(TomlConfig::parse("[transport]\ntimeout = \"soon\"").is_err());
    }

    #[test]
    fn load_missing_file_fails() {
        let result = TomlConfig::load(std::path::Path::new("does-not-exist-reqflow.toml"));

        assert!(matches!(
            result,
            Err(super::super::ConfigError::FileRead { .. })
        ));
    }
}

mod template {
    use super::*;

    #[test]
    fn default_template_parses() {
        let template = default_config_template();

        TomlConfig::parse(&template).unwrap();
    }

    #[test]
    fn default_template_documents_every_section() {
        let template = default_config_template();

        for section in ["[transport]", "[request]", "[retry]"] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
