//! Example binary demonstrating the tidecloud library.
//!
//! Lists the account's filesystems and instances with their current
//! phases.
//!
//! ## Usage
//!
//! 1. Create a `.env` file with your configuration
//! 2. Run: `cargo run`

#![allow(clippy::print_stdout)] // Allow println! in the binary example

use tidecloud::{CloudClient, CloudClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment
    let cfg = CloudClientConfig::from_env()?;
    println!("Configuration loaded:");
    println!("  Host: {}", cfg.host);
    println!("  Cloud account: {}", cfg.cloudaccount);
    println!("  Region: {}", cfg.region);

    let client = CloudClient::new(cfg)?;

    println!("\nFilesystems:");
    for fs in client.list_filesystems().await? {
        println!(
            "  {} ({}) - {}",
            fs.metadata.name, fs.metadata.resource_id, fs.status.phase
        );
    }

    println!("\nInstances:");
    for instance in client.list_instances().await? {
        println!(
            "  {} ({}) - {}",
            instance.metadata.name, instance.metadata.resource_id, instance.status.phase
        );
    }

    Ok(())
}
