use crate::clients::dyndns2::{self, DynDns2Client};
use crate::clients::{require_host_and_credentials, FamilyUpdate, Registrar};
use crate::config::Settings;
use crate::error::RegistrarError;

/// DynDNS (Oracle Dyn) registrar, also usable for any dyndns2-compatible
/// service through the `server` option.
#[derive(Debug)]
pub struct DynDnsRegistrar {
    endpoint: String,
}

impl DynDnsRegistrar {
    pub fn new(settings: &Settings) -> Self {
        let endpoint = settings
            .option("server")
            .unwrap_or("https://members.dyndns.org/nic/update")
            .to_string();
        DynDnsRegistrar { endpoint }
    }
}

impl Registrar for DynDnsRegistrar {
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
        "DynDNS"
    }
}
