//! Load Cell Monitor - Main Entry Point

use anyhow::Context;
use loadcell_driver::{LoadCellDriver, ReplayTransport, SerialTransport};
use monitor::{init_logging, run, MonitorConfig};
use std::path::PathBuf;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = MonitorConfig::load(path.as_deref()).context("Failed to load configuration")?;

    init_logging(&config.log_level, config.log_json)?;

    info!("=== Load Cell Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let mut stdout = std::io::stdout().lock();

    match &config.replay {
        Some(capture) => {
            info!("Replaying {}", capture.display());
            let transport = ReplayTransport::from_file(capture, config.driver.read_chunk)
                .with_context(|| format!("Failed to read {}", capture.display()))?;
            let mut driver = LoadCellDriver::new(transport, config.driver.clone())?;
            driver.open()?;
            run(&mut driver, &config, &mut stdout)?;
        }
        None => {
            let mut driver = LoadCellDriver::new(SerialTransport::new(), config.driver.clone())?;
            driver.open_with(config.serial.clone())?;
            run(&mut driver, &config, &mut stdout)?;
        }
    }

    Ok(())
}
