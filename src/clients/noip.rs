use crate::clients::dyndns2::{self, DynDns2Client};
use crate::clients::{require_host_and_credentials, AddressFamily, FamilyUpdate, Registrar};
use crate::config::Settings;
use crate::error::RegistrarError;

/// No-IP client - compatible with DynDNS2 but with No-IP specifics
///
/// Only IPv4 goes through `myip`; IPv6 addresses are not asserted.
#[derive(Debug)]
pub struct NoIpRegistrar {
    endpoint: String,
}

impl NoIpRegistrar {
    pub fn new(settings: &Settings) -> Self {
        let endpoint = settings
            .option("server")
            .unwrap_or("https://dynupdate.no-ip.com/nic/update")
            .to_string();
        NoIpRegistrar { endpoint }
    }
}

impl Registrar for NoIpRegistrar {
    fn update_dns(
        &self,
        settings: &Settings,
        ipv4: &str,
        _ipv6: &str,
    ) -> Result<Vec<FamilyUpdate>, RegistrarError> {
        require_host_and_credentials(settings)?;

        let client = DynDns2Client::new(
            &self.endpoint,
            &settings.user,
            &settings.password,
            settings.update_timeout(),
        );
        Ok(dyndns2::update_families(&client, settings, ipv4, ""))
    }

    fn supports(&self, family: AddressFamily) -> bool {
        family == AddressFamily::Ipv4
    }

    fn provider_name(&self) -> &str {
        "No-IP"
    }
}
