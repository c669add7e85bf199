//! Download users and attendance records
//!
//! ```text
//! DEVICE_IP=192.168.1.201 RUST_LOG=zkattend=debug cargo run --example fetch_records
//! ```

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use zkattend::Device;
use zkattend_core::constants::{DEFAULT_PORT, DEFAULT_TIMEOUT_MS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ip = std::env::var("DEVICE_IP").unwrap_or_else(|_| "192.168.1.201".to_string());
    let port = match std::env::var("DEVICE_PORT") {
        Ok(port) => port.parse().context("DEVICE_PORT is not a port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let timeout = match std::env::var("DEVICE_TIMEOUT_MS") {
        Ok(ms) => ms.parse().context("DEVICE_TIMEOUT_MS is not a number")?,
        Err(_) => DEFAULT_TIMEOUT_MS,
    };

    let device = Device::new(ip.clone(), port).with_timeout(Duration::from_millis(timeout));

    device
        .connect()
        .await
        .with_context(|| format!("connecting to {ip}:{port}"))?;
    device.open().await.context("opening session")?;

    device.clear_buffer().await?;

    let caps = device.capacities().await?;
    println!("Capacities: {caps}");
    println!("Firmware:   {}", device.firmware_version().await?);
    println!("Clock:      {}", device.get_time().await?);

    let users = device.get_users().await.context("fetching users")?;
    println!("\n{} users", users.len());
    for user in &users {
        println!(
            "  #{:<5} {:<9} {:<24} card={} admin={}",
            user.id,
            user.user_id,
            user.name,
            user.card_no,
            user.is_admin()
        );
    }

    let records = device.get_records().await.context("fetching records")?;
    println!("\n{} attendance records", records.len());
    for record in &records {
        println!(
            "  {:<9} {} {:?} {}",
            record.user_id, record.timestamp, record.verify_method, record.verify_state
        );
    }

    device.close().await?;
    device.disconnect().await?;

    Ok(())
}
