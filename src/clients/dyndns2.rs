use crate::clients::{AddressFamily, FamilyUpdate};
use crate::config::Settings;
use crate::error::ProtocolError;
use base64::{Engine as _, engine::general_purpose};
use std::fmt;
use std::time::Duration;

/// Status word from the first line of a dyndns2 response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Good,
    NoChange,
    BadAuth,
    NoHost,
    NotFqdn,
    NumHost,
    Abuse,
    BadAgent,
    ServerError,
    Unknown,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Good => "good",
            UpdateStatus::NoChange => "nochg",
            UpdateStatus::BadAuth => "badauth",
            UpdateStatus::NoHost => "nohost",
            UpdateStatus::NotFqdn => "notfqdn",
            UpdateStatus::NumHost => "numhost",
            UpdateStatus::Abuse => "abuse",
            UpdateStatus::BadAgent => "badagent",
            UpdateStatus::ServerError => "911",
            UpdateStatus::Unknown => "unknown",
        }
    }

    pub fn explainer(&self) -> &'static str {
        match self {
            UpdateStatus::Good => "Update successful.",
            UpdateStatus::NoChange => "No change needed; IP already set.",
            UpdateStatus::BadAuth => "Authentication failed.",
            UpdateStatus::NoHost => "Hostname does not exist.",
            UpdateStatus::NotFqdn => "Hostname is not a valid FQDN.",
            UpdateStatus::NumHost => "Too many hosts specified.",
            UpdateStatus::Abuse => "Update blocked due to abuse.",
            UpdateStatus::BadAgent => "Bad user agent.",
            UpdateStatus::ServerError => "Server error, try again later.",
            UpdateStatus::Unknown => "Unknown response.",
        }
    }

    /// `good` and `nochg` both mean the registrar holds the asserted address.
    pub fn is_success(&self) -> bool {
        matches!(self, UpdateStatus::Good | UpdateStatus::NoChange)
    }

    /// Registrar-side failure: retry on a later run, never immediately.
    pub fn should_back_off(&self) -> bool {
        matches!(self, UpdateStatus::ServerError)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed outcome of one update exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub status: UpdateStatus,
    /// Address echoed back with `good`/`nochg`, empty otherwise
    pub ip: String,
    /// Response line with the explainer appended
    pub raw: String,
}

/// Classify the first response line.
///
/// `good` and `nochg` are matched by prefix and carry the echoed address;
/// every other status must match the whole (trimmed) line.
pub fn parse_response(line: &str) -> UpdateOutcome {
    let line = line.trim();

    let (status, ip) = if let Some(ip) = line.strip_prefix("good ") {
        (UpdateStatus::Good, ip.trim())
    } else if let Some(ip) = line.strip_prefix("nochg ") {
        (UpdateStatus::NoChange, ip.trim())
    } else {
        let status = match line {
            "badauth" => UpdateStatus::BadAuth,
            "nohost" => UpdateStatus::NoHost,
            "notfqdn" => UpdateStatus::NotFqdn,
            "numhost" => UpdateStatus::NumHost,
            "abuse" => UpdateStatus::Abuse,
            "badagent" => UpdateStatus::BadAgent,
            "911" => UpdateStatus::ServerError,
            _ => UpdateStatus::Unknown,
        };
        (status, "")
    };

    UpdateOutcome {
        status,
        ip: ip.to_string(),
        raw: format!("{} | Explainer: {}", line, status.explainer()),
    }
}

/// DynDNS2 protocol client
///
/// Sends `GET <endpoint>?hostname=<host>[&myip=<ip>]` with Basic auth and
/// reads the status line from the body. The HTTP status code is logged but
/// does not decide the outcome; only the body text does.
#[derive(Debug, Clone)]
pub struct DynDns2Client {
    endpoint: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl DynDns2Client {
    pub fn new(endpoint: &str, username: &str, password: &str, timeout: Duration) -> Self {
        DynDns2Client {
            endpoint: endpoint.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            timeout,
        }
    }

    fn request_url(&self, hostname: &str, myip: Option<&str>) -> Result<String, ProtocolError> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ProtocolError::InvalidEndpoint(endpoint.to_string()));
        }

        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{}hostname={}",
            endpoint,
            separator,
            urlencoding::encode(hostname)
        );
        if let Some(ip) = myip.filter(|ip| !ip.is_empty()) {
            url.push_str("&myip=");
            url.push_str(&urlencoding::encode(ip));
        }
        Ok(url)
    }

    /// Send one update for `hostname`, asserting `myip` when given.
    pub fn update(&self, hostname: &str, myip: Option<&str>) -> Result<UpdateOutcome, ProtocolError> {
        if hostname.is_empty() {
            return Err(ProtocolError::MissingHostname);
        }

        let url = self.request_url(hostname, myip)?;
        log::debug!("GET {}", url);

        let credentials = general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));

        let response = minreq::get(&url)
            .with_header("User-Agent", crate::USER_AGENT)
            .with_header("Accept", "text/plain")
            .with_header("Authorization", format!("Basic {}", credentials))
            .with_timeout(self.timeout.as_secs().max(1))
            .send()
            .map_err(ProtocolError::Transport)?;

        let body = response.as_str().map_err(ProtocolError::InvalidBody)?;
        let line = body.lines().next().unwrap_or("");

        log::debug!("Response status: {}, first line: {}", response.status_code, line);

        Ok(parse_response(line))
    }
}

/// Update each enabled family that has a desired address, one request per family.
///
/// A failure on one family never skips the other.
pub fn update_families(
    client: &DynDns2Client,
    settings: &Settings,
    ipv4: &str,
    ipv6: &str,
) -> Vec<FamilyUpdate> {
    let mut updates = Vec::with_capacity(2);

    for (family, enabled, ip) in [
        (AddressFamily::Ipv4, settings.update_ipv4, ipv4),
        (AddressFamily::Ipv6, settings.update_ipv6, ipv6),
    ] {
        if !enabled || ip.is_empty() {
            continue;
        }

        log::info!("Updating {} {} to {}", settings.host, family, ip);
        let result = client.update(&settings.host, Some(ip));
        match &result {
            Ok(outcome) if outcome.status.is_success() => {
                log::info!("{} update: {} {}", family, outcome.status, outcome.ip)
            }
            Ok(outcome) => log::warn!("{} update: {}", family, outcome.raw),
            Err(e) => log::error!("{} update failed: {}", family, e),
        }
        updates.push(FamilyUpdate { family, result });
    }

    updates
}
