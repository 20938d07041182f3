//! Command-line argument parsing
//!
//! Overrides for the compiled-in defaults of `config::server`, each also readable
//! from an environment variable so the server can be configured in containers.

use clap::Parser;
use std::path::PathBuf;

use crate::config::server::{DEFAULT_LISTEN, LOCAL_SERVING_ADDRESS, SERVING_PREFIX};

/// Command-line arguments for the card-table server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Listen address, "IP:PORT".
    #[arg(short, long, env = "CARD_TABLE_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// JSON deck catalog to load instead of the built-in one.
    #[arg(long, env = "CARD_TABLE_DECKS")]
    pub decks: Option<PathBuf>,

    /// Prefix published to clients for resolved image references.
    #[arg(long, env = "CARD_TABLE_SERVING_PREFIX", default_value = SERVING_PREFIX)]
    pub serving_prefix: String,

    /// Address of the static server for references starting with `/`.
    #[arg(long, env = "CARD_TABLE_LOCAL_ADDRESS", default_value = LOCAL_SERVING_ADDRESS)]
    pub local_address: String,

    /// Enable debug logging (ignored when RUST_LOG is set).
    #[arg(short, long)]
    pub debug: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            decks: None,
            serving_prefix: SERVING_PREFIX.to_string(),
            local_address: LOCAL_SERVING_ADDRESS.to_string(),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::default();
        assert_eq!(args.listen, "127.0.0.1:8080");
        assert!(args.decks.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::parse_from([
            "card-table",
            "--listen",
            "0.0.0.0:9000",
            "--decks",
            "decks/other.json",
            "--debug",
        ]);
        assert_eq!(args.listen, "0.0.0.0:9000");
        assert_eq!(args.decks, Some(PathBuf::from("decks/other.json")));
        assert!(args.debug);
        assert_eq!(args.local_address, LOCAL_SERVING_ADDRESS);
    }
}
