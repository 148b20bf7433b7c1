use crate::config::Settings;
use crate::error::{ConfigError, DiscoveryError};
use crate::state::AddressPair;
use serde::Deserialize;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

const UNIFI_SITE_MANAGER_URL: &str = "https://api.ui.com/v1/hosts/";

/// Public addresses reported for this run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discovered {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl Discovered {
    /// Keep only the families enabled in `settings`, in canonical text form.
    pub fn desired(&self, settings: &Settings) -> AddressPair {
        let ipv4 = match self.ipv4 {
            Some(ip) if settings.update_ipv4 => ip.to_string(),
            _ => String::new(),
        };
        let ipv6 = match self.ipv6 {
            Some(ip) if settings.update_ipv6 => ip.to_string(),
            _ => String::new(),
        };
        AddressPair { ipv4, ipv6 }
    }
}

/// Where the current public addresses come from
pub trait AddressSource {
    fn discover(&self) -> Result<Discovered, DiscoveryError>;
}

/// Addresses given on the command line instead of asking a service
#[derive(Debug, Clone)]
pub struct StaticSource {
    addresses: Discovered,
}

impl StaticSource {
    pub fn new(ipv4: Option<&str>, ipv6: Option<&str>) -> Result<Self, ConfigError> {
        let ipv4 = ipv4
            .map(|s| {
                s.parse::<Ipv4Addr>()
                    .map_err(|_| ConfigError::InvalidAddress(s.to_string(), "IPv4"))
            })
            .transpose()?;
        let ipv6 = ipv6
            .map(|s| {
                s.parse::<Ipv6Addr>()
                    .map_err(|_| ConfigError::InvalidAddress(s.to_string(), "IPv6"))
            })
            .transpose()?;
        Ok(Self {
            addresses: Discovered { ipv4, ipv6 },
        })
    }
}

impl AddressSource for StaticSource {
    fn discover(&self) -> Result<Discovered, DiscoveryError> {
        Ok(self.addresses)
    }
}

/// UniFi Site Manager host lookup
///
/// Reads the WAN addresses the gateway reports to the Site Manager API.
#[derive(Debug, Clone)]
pub struct UnifiSiteManager {
    url: String,
    api_key: String,
    timeout: Duration,
}

impl UnifiSiteManager {
    /// Build from settings; the option `discoveryUrl` replaces the API base URL.
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        if settings.unifi_site_manager_api_key.trim().is_empty() {
            return Err(ConfigError::MissingDiscoveryKey);
        }
        let host_id = settings.unifi_site_manager_host_id.trim();
        if host_id.is_empty() {
            return Err(ConfigError::MissingDiscoveryHost);
        }

        let base = settings
            .option("discoveryUrl")
            .unwrap_or(UNIFI_SITE_MANAGER_URL);
        let url = format!("{}{}", base, urlencoding::encode(host_id));

        Ok(Self {
            url,
            api_key: settings.unifi_site_manager_api_key.clone(),
            timeout: settings.discovery_timeout(),
        })
    }
}

impl AddressSource for UnifiSiteManager {
    fn discover(&self) -> Result<Discovered, DiscoveryError> {
        log::debug!("Discovering public addresses from {}", self.url);

        let response = minreq::get(&self.url)
            .with_header("User-Agent", crate::USER_AGENT)
            .with_header("Accept", "application/json")
            .with_header("X-API-KEY", self.api_key.as_str())
            .with_timeout(self.timeout.as_secs().max(1))
            .send()?;

        if !(200..300).contains(&response.status_code) {
            return Err(DiscoveryError::HttpStatus(response.status_code));
        }

        parse_wan_response(response.as_str()?)
    }
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    data: HostData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostData {
    #[serde(default)]
    reported_state: Option<ReportedState>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportedState {
    #[serde(default)]
    wans: Vec<WanInfo>,
}

#[derive(Debug, Deserialize)]
struct WanInfo {
    #[serde(default)]
    ipv4: Option<String>,
    #[serde(default)]
    ipv6: Option<String>,
}

/// Extract the first WAN entry's addresses from a Site Manager host response.
pub fn parse_wan_response(body: &str) -> Result<Discovered, DiscoveryError> {
    let response: HostResponse = serde_json::from_str(body)?;
    let wan = response
        .data
        .reported_state
        .unwrap_or_default()
        .wans
        .into_iter()
        .next()
        .ok_or(DiscoveryError::NoWanData)?;

    let ipv4 = match wan.ipv4.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Some(
            s.parse::<Ipv4Addr>()
                .map_err(|_| DiscoveryError::InvalidIpv4(s.to_string()))?,
        ),
        None => None,
    };
    let ipv6 = match wan.ipv6.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Some(
            s.parse::<Ipv6Addr>()
                .map_err(|_| DiscoveryError::InvalidIpv6(s.to_string()))?,
        ),
        None => None,
    };

    Ok(Discovered { ipv4, ipv6 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;

    const RESPONSE: &str = r#"{
        "data": {
            "id": "host-id",
            "reportedState": {
                "hostname": "gateway",
                "wans": [
                    {"ipv4": "198.51.100.7", "ipv6": "2001:db8::1", "type": "WAN"},
                    {"ipv4": "203.0.113.9", "ipv6": ""}
                ]
            }
        },
        "httpStatusCode": 200
    }"#;

    #[test]
    fn test_parse_first_wan() {
        let discovered = parse_wan_response(RESPONSE).unwrap();
        assert_eq!(discovered.ipv4, Some(Ipv4Addr::new(198, 51, 100, 7)));
        assert_eq!(discovered.ipv6, Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_parse_empty_ipv6() {
        let body = r#"{"data": {"reportedState": {"wans": [{"ipv4": "198.51.100.7", "ipv6": ""}]}}}"#;
        let discovered = parse_wan_response(body).unwrap();
        assert_eq!(discovered.ipv6, None);

        let body = r#"{"data": {"reportedState": {"wans": [{"ipv6": "2001:db8::1"}]}}}"#;
        let discovered = parse_wan_response(body).unwrap();
        assert_eq!(discovered.ipv4, None);
    }

    #[test]
    fn test_parse_no_wan() {
        let body = r#"{"data": {"reportedState": {"wans": []}}}"#;
        assert!(matches!(parse_wan_response(body), Err(DiscoveryError::NoWanData)));

        let body = r#"{"data": {}}"#;
        assert!(matches!(parse_wan_response(body), Err(DiscoveryError::NoWanData)));
    }

    #[test]
    fn test_parse_invalid_addresses() {
        let body = r#"{"data": {"reportedState": {"wans": [{"ipv4": "256.1.1.1"}]}}}"#;
        let err = parse_wan_response(body).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidIpv4(ref s) if s == "256.1.1.1"));

        let body = r#"{"data": {"reportedState": {"wans": [{"ipv6": "2001:db8::zz"}]}}}"#;
        assert!(matches!(parse_wan_response(body), Err(DiscoveryError::InvalidIpv6(_))));

        // an IPv6 address in the IPv4 slot is not accepted
        let body = r#"{"data": {"reportedState": {"wans": [{"ipv4": "2001:db8::1"}]}}}"#;
        assert!(matches!(parse_wan_response(body), Err(DiscoveryError::InvalidIpv4(_))));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(parse_wan_response("<html>"), Err(DiscoveryError::Json(_))));
    }

    #[test]
    fn test_desired_filters_disabled_families() {
        let discovered = Discovered {
            ipv4: Some(Ipv4Addr::new(198, 51, 100, 7)),
            ipv6: Some("2001:db8::1".parse().unwrap()),
        };
        let mut settings = test_settings();
        settings.update_ipv6 = false;

        assert_eq!(discovered.desired(&settings), AddressPair::new("198.51.100.7", ""));

        settings.update_ipv4 = false;
        settings.update_ipv6 = true;
        assert_eq!(discovered.desired(&settings), AddressPair::new("", "2001:db8::1"));
    }

    #[test]
    fn test_static_source() {
        let source = StaticSource::new(Some("198.51.100.7"), None).unwrap();
        let discovered = source.discover().unwrap();
        assert_eq!(discovered.ipv4, Some(Ipv4Addr::new(198, 51, 100, 7)));
        assert_eq!(discovered.ipv6, None);

        let err = StaticSource::new(None, Some("198.51.100.7")).unwrap_err();
        assert!(err.to_string().contains("invalid IPv6 address"));
    }

    #[test]
    fn test_site_manager_requires_credentials() {
        let mut settings = test_settings();
        settings.unifi_site_manager_api_key.clear();
        assert!(matches!(
            UnifiSiteManager::new(&settings),
            Err(ConfigError::MissingDiscoveryKey)
        ));

        let mut settings = test_settings();
        settings.unifi_site_manager_host_id = " ".to_string();
        assert!(matches!(
            UnifiSiteManager::new(&settings),
            Err(ConfigError::MissingDiscoveryHost)
        ));
    }

    #[test]
    fn test_site_manager_request() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/hosts/host-id")
            .match_header("x-api-key", "api-key")
            .match_header("accept", "application/json")
            .with_header("content-type", "application/json")
            .with_body(RESPONSE)
            .create();

        let mut settings = test_settings();
        settings
            .options
            .insert("discoveryUrl".to_string(), format!("{}/v1/hosts/", server.url()));

        let discovered = UnifiSiteManager::new(&settings).unwrap().discover().unwrap();

        mock.assert();
        assert_eq!(discovered.ipv4, Some(Ipv4Addr::new(198, 51, 100, 7)));
    }

    #[test]
    fn test_site_manager_http_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/hosts/host-id")
            .with_status(401)
            .with_body(r#"{"code": "unauthorized"}"#)
            .create();

        let mut settings = test_settings();
        settings
            .options
            .insert("discoveryUrl".to_string(), format!("{}/v1/hosts/", server.url()));

        let result = UnifiSiteManager::new(&settings).unwrap().discover();
        assert!(matches!(result, Err(DiscoveryError::HttpStatus(401))));
    }
}
