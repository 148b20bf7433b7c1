//! Update orchestration: discover, compare, update, persist.
//!
//! A run goes `Discovering -> Comparing -> Updating -> Persisting`, leaving
//! early when the stored record already matches. Discovery and store-load
//! failures abort before anything is written. Registrar failures do not stop
//! the persist step: with the default [`PersistPolicy::Attempted`] the record
//! tracks the last address we tried to push, so a persistently failing
//! registrar is only retried once the address changes again. Use
//! [`PersistPolicy::Confirmed`] to keep retrying until the registrar accepts.

use crate::clients::{AddressFamily, FamilyUpdate, Registrar};
use crate::config::{PersistPolicy, Settings};
use crate::error::{RegistrarError, RunError, StoreError};
use crate::ip::AddressSource;
use crate::state::{AddressPair, AddressStore};

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Stored record already matches; nothing was sent or written.
    Unchanged(AddressPair),
    /// Change detected in test mode; nothing was sent or written.
    DryRun {
        previous: AddressPair,
        desired: AddressPair,
    },
    Updated(UpdateReport),
}

#[derive(Debug)]
pub struct UpdateReport {
    pub previous: AddressPair,
    pub desired: AddressPair,
    pub updates: Vec<FamilyUpdate>,
    pub registrar_error: Option<RegistrarError>,
    /// Record handed to the store
    pub persisted: AddressPair,
    pub persist_error: Option<StoreError>,
}

impl UpdateReport {
    /// True when every attempted family came back `good` or `nochg`.
    pub fn all_succeeded(&self) -> bool {
        self.registrar_error.is_none() && self.updates.iter().all(FamilyUpdate::succeeded)
    }

    /// True when the registrar asked us to back off (`911`).
    pub fn should_back_off(&self) -> bool {
        self.updates
            .iter()
            .any(|u| u.status().is_some_and(|s| s.should_back_off()))
    }
}

pub struct Updater<'a> {
    settings: &'a Settings,
    registrar: &'a dyn Registrar,
    store: &'a dyn AddressStore,
    dry_run: bool,
}

impl<'a> Updater<'a> {
    pub fn new(
        settings: &'a Settings,
        registrar: &'a dyn Registrar,
        store: &'a dyn AddressStore,
    ) -> Self {
        Self {
            settings,
            registrar,
            store,
            dry_run: false,
        }
    }

    /// Decide and report only; never call the registrar or write the store.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run(&self, source: &dyn AddressSource) -> Result<RunOutcome, RunError> {
        let discovered = source.discover()?;
        let desired = discovered.desired(self.settings);
        log::info!(
            "Discovered IPv4: {:?} IPv6: {:?}",
            discovered.ipv4,
            discovered.ipv6
        );

        let previous = self.store.load()?.addresses();
        if previous == desired {
            log::info!("No IP change detected ({:?})", desired);
            return Ok(RunOutcome::Unchanged(desired));
        }
        log::info!("IP change detected: {:?} -> {:?}", previous, desired);

        if self.dry_run {
            log::info!(
                "TEST MODE: Would update {} via {}",
                self.settings.host,
                self.registrar.provider_name()
            );
            return Ok(RunOutcome::DryRun { previous, desired });
        }

        for (family, ip) in [
            (AddressFamily::Ipv4, &desired.ipv4),
            (AddressFamily::Ipv6, &desired.ipv6),
        ] {
            if !ip.is_empty() && !self.registrar.supports(family) {
                log::warn!(
                    "{} does not support {} updates, {} will not be pushed",
                    self.registrar.provider_name(),
                    family,
                    ip
                );
            }
        }

        let (updates, registrar_error) =
            match self
                .registrar
                .update_dns(self.settings, &desired.ipv4, &desired.ipv6)
            {
                Ok(updates) => (updates, None),
                Err(e) => {
                    log::error!("{} update failed: {}", self.registrar.provider_name(), e);
                    (Vec::new(), Some(e))
                }
            };

        let persisted = match self.settings.persist_policy {
            PersistPolicy::Attempted => desired.clone(),
            PersistPolicy::Confirmed => {
                confirmed_record(&previous, &desired, &updates, |family| {
                    self.registrar.supports(family)
                })
            }
        };

        let persist_error = if persisted == previous {
            None
        } else {
            match self.store.save(&persisted) {
                Ok(()) => None,
                Err(e) => {
                    log::error!("Failed to update storage file: {}", e);
                    Some(e)
                }
            }
        };

        Ok(RunOutcome::Updated(UpdateReport {
            previous,
            desired,
            updates,
            registrar_error,
            persisted,
            persist_error,
        }))
    }
}

/// Advance only the families the registrar confirmed; keep the rest as stored.
///
/// A family the registrar cannot push is never attempted, so it advances
/// unconfirmed; otherwise it would differ from the desired pair on every run.
fn confirmed_record(
    previous: &AddressPair,
    desired: &AddressPair,
    updates: &[FamilyUpdate],
    supports: impl Fn(AddressFamily) -> bool,
) -> AddressPair {
    let confirmed = |family: AddressFamily| {
        !supports(family)
            || updates
                .iter()
                .any(|u| u.family == family && u.succeeded())
    };

    // A family cleared from the desired pair needs no registrar call.
    let pick = |family: AddressFamily, previous: &String, desired: &String| {
        if desired.is_empty() || confirmed(family) {
            desired.clone()
        } else {
            previous.clone()
        }
    };

    AddressPair {
        ipv4: pick(AddressFamily::Ipv4, &previous.ipv4, &desired.ipv4),
        ipv6: pick(AddressFamily::Ipv6, &previous.ipv6, &desired.ipv6),
    }
}
