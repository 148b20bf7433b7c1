use crate::config::Settings;
use crate::error::{ConfigError, ProtocolError, RegistrarError};
use std::fmt;

pub mod dyndns;
pub mod dyndns2;
pub mod noip;
pub mod strato;

use dyndns2::{UpdateOutcome, UpdateStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("IPv4"),
            AddressFamily::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// Result of the update attempt for one address family
#[derive(Debug)]
pub struct FamilyUpdate {
    pub family: AddressFamily,
    pub result: Result<UpdateOutcome, ProtocolError>,
}

impl FamilyUpdate {
    /// Status reported by the registrar, `None` if the exchange itself failed.
    pub fn status(&self) -> Option<UpdateStatus> {
        self.result.as_ref().ok().map(|outcome| outcome.status)
    }

    pub fn succeeded(&self) -> bool {
        self.status().is_some_and(|status| status.is_success())
    }
}

/// Common trait that all registrar implementations must implement
pub trait Registrar {
    /// Push the desired addresses; empty strings mean "do not assert this family".
    ///
    /// Returns one entry per family actually attempted, or an error when the
    /// registrar could not attempt anything at all.
    fn update_dns(
        &self,
        settings: &Settings,
        ipv4: &str,
        ipv6: &str,
    ) -> Result<Vec<FamilyUpdate>, RegistrarError>;

    /// Whether this registrar can push addresses of `family`
    fn supports(&self, _family: AddressFamily) -> bool {
        true
    }

    /// Get the provider name for logging purposes
    fn provider_name(&self) -> &str;
}

/// Factory function to create the registrar named in the settings
pub fn create_registrar(settings: &Settings) -> Result<Box<dyn Registrar>, ConfigError> {
    let normalized = settings.registrar.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "strato" => Ok(Box::new(strato::StratoRegistrar::new(settings))),
        "dyndns" | "dyndns2" => Ok(Box::new(dyndns::DynDnsRegistrar::new(settings))),
        "noip" | "no-ip" => Ok(Box::new(noip::NoIpRegistrar::new(settings))),
        _ => Err(ConfigError::UnsupportedRegistrar(settings.registrar.clone())),
    }
}

/// Host and credentials must be present before any dyndns2 request.
pub(crate) fn require_host_and_credentials(settings: &Settings) -> Result<(), RegistrarError> {
    if settings.host.is_empty() {
        return Err(RegistrarError::MissingHost);
    }
    if settings.user.is_empty() || settings.password.is_empty() {
        return Err(RegistrarError::MissingCredentials);
    }
    Ok(())
}
