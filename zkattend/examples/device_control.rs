//! Device control example

use std::time::Duration;

use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use zkattend::Device;
use zkattend_core::constants::DEFAULT_PORT;

#[tokio::main]
async fn main() -> zkattend::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ip = std::env::var("DEVICE_IP").unwrap_or_else(|_| "192.168.1.201".to_string());

    let device = Device::new(ip, DEFAULT_PORT);
    device.connect().await?;
    device.open().await?;

    println!("Device connected!");

    // Disable device (show "Working...")
    println!("Disabling device...");
    device.disable_device().await?;
    sleep(Duration::from_secs(3)).await;

    // Enable device (resume normal operation)
    println!("Enabling device...");
    device.enable_device().await?;

    println!("Playing voice...");
    device.test_voice(0).await?;

    println!("Done!");

    device.close().await?;
    device.disconnect().await?;

    Ok(())
}
