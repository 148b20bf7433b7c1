mod args;
mod clients;
mod config;
mod error;
mod ip;
mod state;
mod updater;

use clap::CommandFactory;
use ip::AddressSource;
use std::error::Error;
use updater::RunOutcome;

/// User-Agent header value for HTTP requests
pub const USER_AGENT: &str = concat!("rdyndns/", env!("CARGO_PKG_VERSION"));

fn init_logger(verbose: bool, test: bool, debug: bool, quiet: bool) {
    let log_level = if quiet {
        log::LevelFilter::Error
    } else if debug {
        log::LevelFilter::Debug
    } else if verbose || test {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    env_logger::builder()
        .filter(None, log_level)
        .init();
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Unchanged(_) => log::info!("Nothing to do"),
        RunOutcome::DryRun { previous, desired } => {
            log::info!("TEST MODE: {:?} -> {:?} not pushed", previous, desired);
        }
        RunOutcome::Updated(report) => {
            if report.should_back_off() {
                log::warn!("Registrar reported a server error; retry on a later run");
            } else if !report.all_succeeded() {
                log::warn!("Update not fully accepted; stored record is {:?}", report.persisted);
            } else {
                log::info!("Successfully updated {:?}", report.persisted);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = args::Args::new();

    init_logger(args.verbose, args.test, args.debug, args.quiet);

    let (Some(config_path), Some(storage_path)) = (args.config.as_deref(), args.storage.as_deref())
    else {
        if args.config.is_none() {
            println!("Error: --config is required.");
        } else {
            println!("Error: --storage is required.");
        }
        args::Args::command().print_help()?;
        return Ok(());
    };

    // Everything configuration-related fails here, before any network activity
    let settings = config::Settings::from_file(config_path)?;
    let registrar = clients::create_registrar(&settings)?;
    let source: Box<dyn AddressSource> = if args.manual_addresses() {
        Box::new(ip::StaticSource::new(args.ipv4.as_deref(), args.ipv6.as_deref())?)
    } else {
        Box::new(ip::UnifiSiteManager::new(&settings)?)
    };

    log::info!("Using registrar: {}", registrar.provider_name());

    let store = state::FileStore::new(storage_path);
    log::debug!("State file: {}", store.path().display());
    let outcome = updater::Updater::new(&settings, registrar.as_ref(), &store)
        .dry_run(args.test)
        .run(source.as_ref())?;

    report(&outcome);

    Ok(())
}
