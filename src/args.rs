use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(version, about = "Run-once dynamic DNS updater for dyndns2 registrars", long_about = None)]
pub struct Args {
    /// Path to the JSON settings file (required)
    #[arg(long)]
    pub config: Option<String>,

    /// Path to the JSON file holding the last pushed addresses (required)
    #[arg(long)]
    pub storage: Option<String>,

    /// Use this IPv4 address instead of asking the discovery service
    #[arg(long)]
    pub ipv4: Option<String>,

    /// Use this IPv6 address instead of asking the discovery service
    #[arg(long)]
    pub ipv6: Option<String>,

    /// Test mode - detect changes and show what would happen without updating
    #[arg(long, default_value = "false")]
    pub test: bool,

    /// Verbose output
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Debug output
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Quiet mode - suppress all output except errors
    #[arg(long, default_value = "false")]
    pub quiet: bool,
}

impl Args {
    pub fn new() -> Self {
        Self::parse()
    }

    /// True when addresses were given on the command line.
    pub fn manual_addresses(&self) -> bool {
        self.ipv4.is_some() || self.ipv6.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        let args = Args::parse_from(["rdyndns", "--config", "settings.json", "--storage", "state.json"]);
        assert_eq!(args.config.as_deref(), Some("settings.json"));
        assert_eq!(args.storage.as_deref(), Some("state.json"));
        assert!(!args.test);
        assert!(!args.manual_addresses());
    }

    #[test]
    fn test_manual_addresses() {
        let args = Args::parse_from(["rdyndns", "--ipv6", "2001:db8::1", "--test"]);
        assert!(args.manual_addresses());
        assert!(args.test);
        assert!(args.config.is_none());
    }
}
