use crate::clients::dyndns2::{self, DynDns2Client};
use crate::clients::{require_host_and_credentials, FamilyUpdate, Registrar};
use crate::config::Settings;
use crate::error::RegistrarError;

const DEFAULT_ENDPOINT: &str = "https://dyndns.strato.com/nic/update";

/// Strato registrar: plain dyndns2 against Strato's update endpoint
///
/// Strato expects the domain as the user name and the dynamic DNS password
/// configured for it. The option `server` overrides the endpoint.
#[derive(Debug)]
pub struct StratoRegistrar {
    endpoint: String,
}

impl StratoRegistrar {
    pub fn new(settings: &Settings) -> Self {
        let endpoint = settings
            .option("server")
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();
        StratoRegistrar { endpoint }
    }
}

impl Registrar for StratoRegistrar {
    fn update_dns(
        &self,
        settings: &Settings,
        ipv4: &str,
        ipv6: &str,
    ) -> Result<Vec<FamilyUpdate>, RegistrarError> {
        require_host_and_credentials(settings)?;

        let client = DynDns2Client::new(
            &self.endpoint,
            &settings.user,
            &settings.password,
            settings.update_timeout(),
        );
        Ok(dyndns2::update_families(&client, settings, ipv4, ipv6))
    }

    fn provider_name(&self) -> &str {
        "Strato"
    }
}
