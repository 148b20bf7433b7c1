/// JSON settings for a single update run
///
/// Example settings file:
/// ```json
/// {
///   "registrar": "strato",
///   "user": "home.example.com",
///   "password": "secret",
///   "host": "home.example.com",
///   "options": {},
///   "unifiSiteManagerApiKey": "key",
///   "unifiSiteManagerHostId": "host-id",
///   "updateIpv4": true,
///   "updateIpv6": false
/// }
/// ```
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_DISCOVERY_TIMEOUT: u64 = 10;
const DEFAULT_UPDATE_TIMEOUT: u64 = 15;

/// What the stored record tracks after a registrar call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistPolicy {
    /// Store the desired addresses whatever the registrar answered.
    #[default]
    Attempted,
    /// Only advance a family once the registrar answered `good` or `nochg`.
    Confirmed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub registrar: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub host: String,
    /// Registrar-specific parameters
    #[serde(default)]
    pub options: HashMap<String, String>,
    #[serde(default)]
    pub unifi_site_manager_api_key: String,
    #[serde(default)]
    pub unifi_site_manager_host_id: String,
    #[serde(default)]
    pub update_ipv4: bool,
    #[serde(default)]
    pub update_ipv6: bool,
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout: u64,
    #[serde(default = "default_update_timeout")]
    pub update_timeout: u64,
    #[serde(default)]
    pub persist_policy: PersistPolicy,
}

fn default_discovery_timeout() -> u64 {
    DEFAULT_DISCOVERY_TIMEOUT
}

fn default_update_timeout() -> u64 {
    DEFAULT_UPDATE_TIMEOUT
}

impl Settings {
    /// Read, parse and validate a settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks required fields in a fixed order so the first missing one is named.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registrar.trim().is_empty() {
            return Err(ConfigError::MissingRegistrar);
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::MissingUser);
        }
        if self.password.trim().is_empty() {
            return Err(ConfigError::MissingPassword);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if !self.update_ipv4 && !self.update_ipv6 {
            return Err(ConfigError::NoAddressFamily);
        }
        if self.discovery_timeout == 0 {
            return Err(ConfigError::InvalidTimeout("discoveryTimeout"));
        }
        if self.update_timeout == 0 {
            return Err(ConfigError::InvalidTimeout("updateTimeout"));
        }
        Ok(())
    }

    /// Look up a registrar option; empty values count as unset.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout)
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        registrar: "strato".to_string(),
        user: "user".to_string(),
        password: "pass".to_string(),
        host: "home.example.com".to_string(),
        options: HashMap::new(),
        unifi_site_manager_api_key: "api-key".to_string(),
        unifi_site_manager_host_id: "host-id".to_string(),
        update_ipv4: true,
        update_ipv6: true,
        discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        update_timeout: DEFAULT_UPDATE_TIMEOUT,
        persist_policy: PersistPolicy::Attempted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"{
        "registrar": "strato",
        "user": "home.example.com",
        "password": "secret",
        "host": "home.example.com",
        "options": {"server": "https://example.net/nic/update"},
        "unifiSiteManagerApiKey": "key",
        "unifiSiteManagerHostId": "abc",
        "updateIpv4": true,
        "updateIpv6": false
    }"#;

    fn with_field(field: &str, value: serde_json::Value) -> String {
        let mut json: serde_json::Value = serde_json::from_str(FULL).unwrap();
        json[field] = value;
        json.to_string()
    }

    #[test]
    fn test_parse_full_settings() {
        let settings = Settings::from_json(FULL).unwrap();
        assert_eq!(settings.registrar, "strato");
        assert_eq!(settings.user, "home.example.com");
        assert_eq!(settings.host, "home.example.com");
        assert_eq!(settings.unifi_site_manager_host_id, "abc");
        assert!(settings.update_ipv4);
        assert!(!settings.update_ipv6);
        assert_eq!(settings.option("server"), Some("https://example.net/nic/update"));
        assert_eq!(settings.discovery_timeout(), Duration::from_secs(10));
        assert_eq!(settings.update_timeout(), Duration::from_secs(15));
        assert_eq!(settings.persist_policy, PersistPolicy::Attempted);
    }

    #[test]
    fn test_each_missing_field_is_named() {
        let cases = [
            ("registrar", "registrar is not set"),
            ("user", "user is not set"),
            ("password", "password is not set"),
            ("host", "host is not set"),
        ];
        for (field, message) in cases {
            let err = Settings::from_json(&with_field(field, "".into())).unwrap_err();
            assert_eq!(err.to_string(), message, "field {}", field);
        }
    }

    #[test]
    fn test_absent_field_same_as_empty() {
        let mut json: serde_json::Value = serde_json::from_str(FULL).unwrap();
        json.as_object_mut().unwrap().remove("password");
        let err = Settings::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPassword));
    }

    #[test]
    fn test_both_families_disabled() {
        let json = with_field("updateIpv4", false.into());
        let err = Settings::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::NoAddressFamily));
    }

    #[test]
    fn test_whitespace_host_rejected() {
        let err = Settings::from_json(&with_field("host", "   ".into())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingHost));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Settings::from_json(&with_field("updateTimeout", 0.into())).unwrap_err();
        assert!(err.to_string().contains("updateTimeout"));
    }

    #[test]
    fn test_confirmed_policy() {
        let settings = Settings::from_json(&with_field("persistPolicy", "confirmed".into())).unwrap();
        assert_eq!(settings.persist_policy, PersistPolicy::Confirmed);
    }

    #[test]
    fn test_malformed_json() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.password, "secret");
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_empty_option_is_unset() {
        let mut settings = test_settings();
        settings.options.insert("server".to_string(), " ".to_string());
        assert_eq!(settings.option("server"), None);
    }
}
