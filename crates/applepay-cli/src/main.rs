//! # applepay-preview
//!
//! Validate an Apple Pay session config and print the payment request the
//! native sheet would be given.
//!
//! ## Usage
//!
//! ```bash
//! # Explicit path
//! applepay-preview config/apple-pay.toml
//!
//! # Or via environment
//! export APPLE_PAY_CONFIG=config/apple-pay.toml
//! applepay-preview
//!
//! # Apply the merchant's enabled countries, currencies and networks
//! export RECURLY_PUBLIC_KEY=ewr1-...
//! applepay-preview --merchant
//! ```

mod preview;

use anyhow::Context;
use applepay_core::{ApplePayEvent, ContactField};
use applepay_session::{RecurlyClient, TokenProcessor};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "applepay-preview")]
#[command(about = "Print the Apple Pay payment request a session config produces", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML session config (default: config/apple-pay.toml)
    #[arg(env = "APPLE_PAY_CONFIG")]
    config: Option<PathBuf>,

    /// Fetch merchant info using RECURLY_PUBLIC_KEY and apply it
    #[arg(long)]
    merchant: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let path = preview::resolve_config_path(cli.config)
        .context("No config file given and none found at config/apple-pay.toml")?;
    let file = preview::load(&path)?;
    info!("Loaded Apple Pay config from {}", path.display());

    let merchant = if cli.merchant {
        let client = RecurlyClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize processor client: {}", e))?;
        let merchant = client.merchant_info().await?;
        info!(
            "Merchant info from {}: {} countries, {} networks",
            client.config().api_base_url,
            merchant.countries.len(),
            merchant.supported_networks.len()
        );
        Some(merchant)
    } else {
        None
    };

    if file.config.enforce_version && !file.config.required_shipping_contact_fields.is_empty() {
        warn!("Sessions will require Apple Pay version 3 on the customer's device");
    }

    let request = file
        .payment_request(merchant.as_ref())
        .with_context(|| format!("Invalid Apple Pay config in {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&request)?);
    info!(
        "Events: {}",
        ApplePayEvent::ALL.map(|e| e.as_str()).join(", ")
    );
    info!(
        "Contact fields: {}",
        ContactField::ALL.map(|f| f.as_str()).join(", ")
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_path_and_merchant() {
        let cli = Cli::try_parse_from(["applepay-preview", "--merchant", "store.toml"]).unwrap();
        assert!(cli.merchant);
        assert_eq!(cli.config, Some(PathBuf::from("store.toml")));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let err = Cli::try_parse_from(["applepay-preview", "--foo"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
