//! Tests for required fields, config file loading and template writing.

use std::fs;
use std::io::Write;

use tempfile::{NamedTempFile, tempdir};

use super::*;
use crate::client::RequestMethod;
use crate::config::field;

mod required_fields {
    use super::*;

    #[test]
    fn missing_url_returns_error() {
        let result = ValidatedConfig::from_raw(&cli(&[]), None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { field: field::URL, .. })
        ));
    }

    #[test]
    fn method_without_url_returns_error() {
        let result = ValidatedConfig::from_raw(&cli(&["POST"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { field: field::URL, .. })
        ));
    }

    #[test]
    fn relative_url_without_base_returns_error() {
        let result = ValidatedConfig::from_raw(&cli(&["GET", "/users"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: field::BASE_URL,
                ..
            })
        ));
    }

    #[test]
    fn absolute_url_needs_no_base() {
        let config = ValidatedConfig::from_raw(&cli(&["GET", "https://example.com/users"]), None)
            .unwrap();

        assert_eq!(config.method, RequestMethod::Get);
        assert_eq!(config.url, "https://example.com/users");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn url_alone_uses_default_method() {
        let config = ValidatedConfig::from_raw(&cli(&["https://example.com/users"]), None).unwrap();

        assert_eq!(config.method, RequestMethod::Get);
        assert_eq!(config.url, "https://example.com/users");
    }

    #[test]
    fn invalid_method_returns_error() {
        let result = ValidatedConfig::from_raw(&cli(&["FETCH", "https://example.com"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidMethod(m)) if m == "FETCH"));
    }

    #[test]
    fn invalid_base_url_returns_error() {
        let result =
            ValidatedConfig::from_raw(&cli(&["GET", "/x", "--base-url", "not a url"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }
}

mod config_load {
    use super::*;

    #[test]
    fn load_from_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [transport]
            base_url = "https://api.example.com"

            [request]
            method = "DELETE"
        "#
        )
        .unwrap();

        let cli = cli(&["--config", file.path().to_str().unwrap(), "/users/1"]);
        let config = ValidatedConfig::load(&cli).unwrap();

        assert_eq!(config.method, RequestMethod::Delete);
        assert_eq!(
            config.base_url.as_ref().map(url::Url::as_str),
            Some("https://api.example.com/")
        );
    }

    #[test]
    fn load_without_config_file() {
        let config = ValidatedConfig::load(&cli(&["PUT", "https://example.com/x"])).unwrap();

        assert_eq!(config.method, RequestMethod::Put);
    }

    #[test]
    fn load_nonexistent_config_file_returns_error() {
        let cli = cli(&["--config", "nonexistent_file_12345.toml", "GET", "/x"]);
        let result = ValidatedConfig::load(&cli);

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[transport\nbase_url = ").unwrap();

        let cli = cli(&["--config", file.path().to_str().unwrap(), "GET", "/x"]);
        let result = ValidatedConfig::load(&cli);

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}

mod write_config {
    use super::*;
    use crate::config::write_default_config;

    #[test]
    fn write_default_config_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reqflow.toml");

        write_default_config(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[transport]"));
        TomlConfig::parse(&content).unwrap();
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("reqflow.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
