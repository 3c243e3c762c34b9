//! Load Cell Monitor
//!
//! Receive loop shared by the serial and replay sources, plus logging setup.

pub mod config;

pub use config::{MonitorConfig, OutputFormat};

use anyhow::Context;
use loadcell_driver::{DriverStats, LoadCellDriver, LoadCellStatus, Recv, Transport};
use std::io::Write;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr so that JSON output on stdout stays clean
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let level = Level::from_str(level).with_context(|| format!("invalid log level '{level}'"))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Receive until the source is exhausted, or forever for a live port.
///
/// Returns an error on the first rejected frame when `abort_on_fault` is set.
pub fn run<T: Transport, W: Write>(
    driver: &mut LoadCellDriver<T>,
    config: &MonitorConfig,
    out: &mut W,
) -> anyhow::Result<DriverStats> {
    loop {
        if config.poll {
            if let Err(err) = driver.send_poll() {
                warn!("Poll failed: {}", err);
            }
        }

        match driver.recv_once() {
            Ok(recv) => {
                handle(recv, config, out)?;
                drain(driver, config, out)?;
            }
            Err(err) if err.is_end_of_stream() => {
                drain(driver, config, out)?;
                info!("Replay finished");
                break;
            }
            Err(err) => {
                warn!(
                    "Receive failed ({}), reopening in {} ms",
                    err, config.reopen_delay_ms
                );
                driver.close();
                thread::sleep(Duration::from_millis(config.reopen_delay_ms));
                if let Err(err) = driver.open() {
                    error!("Reopen failed: {}", err);
                }
            }
        }
    }

    let stats = driver.stats();
    info!(
        "Received {} bytes: {} frames, {} faults, {} bytes discarded, {} bytes evicted",
        stats.bytes_received,
        stats.frames_decoded,
        stats.faults,
        stats.bytes_discarded,
        stats.bytes_evicted
    );
    Ok(stats)
}

/// Handle frames left in the buffer after a large read
fn drain<T: Transport, W: Write>(
    driver: &mut LoadCellDriver<T>,
    config: &MonitorConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    loop {
        match driver.next_buffered() {
            Recv::NoFrame => return Ok(()),
            recv => handle(recv, config, out)?,
        }
    }
}

fn handle<W: Write>(recv: Recv, config: &MonitorConfig, out: &mut W) -> anyhow::Result<()> {
    match recv {
        Recv::Status(status) => print_status(&status, config.output, out),
        Recv::NoFrame => Ok(()),
        Recv::Fault(fault) => {
            if config.abort_on_fault {
                return Err(fault.into());
            }
            warn!("Frame rejected {}", fault);
            Ok(())
        }
    }
}

fn print_status<W: Write>(
    status: &LoadCellStatus,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            info!(
                "gross={} right={} left={} battery={}%/{}% online={}/{} overload={}",
                status.gross_weight,
                status.right_weight,
                status.left_weight,
                status.right_battery_percent,
                status.left_battery_percent,
                status.right_online_status,
                status.left_online_status,
                status.overload_mark
            );
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, status)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadcell_driver::{DriverConfig, ReplayTransport, ResultCode};
    use loadcell_protocol::FrameBuilder;

    fn replay_driver(data: Vec<u8>, chunk: usize) -> LoadCellDriver<ReplayTransport> {
        let mut driver =
            LoadCellDriver::new(ReplayTransport::new(data, chunk), DriverConfig::default())
                .unwrap();
        driver.open().unwrap();
        driver
    }

    fn json_config() -> MonitorConfig {
        MonitorConfig {
            output: OutputFormat::Json,
            ..Default::default()
        }
    }

    #[test]
    fn test_json_lines() {
        let input = [
            vec![0x00, 0x13],
            FrameBuilder::new().weights(100, 60, 40).build(),
            FrameBuilder::new().weights(-5, -2, -3).right_battery(80).build(),
        ]
        .concat();
        let mut driver = replay_driver(input, 256);
        let mut out = Vec::new();

        let stats = run(&mut driver, &json_config(), &mut out).unwrap();
        assert_eq!(stats.frames_decoded, 2);
        assert_eq!(stats.bytes_discarded, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<LoadCellStatus> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].gross_weight, 100.0);
        assert_eq!(lines[1].left_weight, -3.0);
        assert_eq!(lines[1].right_battery_percent, 80);
    }

    #[test]
    fn test_fault_skipped_by_default() {
        let input = [
            FrameBuilder::new().right_battery(200).build(),
            FrameBuilder::new().weights(7, 0, 7).build(),
        ]
        .concat();
        let mut driver = replay_driver(input, 10);
        let mut out = Vec::new();

        let stats = run(&mut driver, &json_config(), &mut out).unwrap();
        assert_eq!(stats.faults, 1);
        assert_eq!(stats.frames_decoded, 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_abort_on_fault() {
        let input = FrameBuilder::new().left_battery(101).build();
        let mut driver = replay_driver(input, 256);
        let config = MonitorConfig {
            abort_on_fault: true,
            ..json_config()
        };

        let err = run(&mut driver, &config, &mut Vec::new()).unwrap_err();
        let fault = err.downcast_ref::<loadcell_driver::FrameFault>().unwrap();
        assert_eq!(fault.code, ResultCode::SanityFail);
    }

    #[test]
    fn test_poll_before_each_read() {
        let input = FrameBuilder::new().build();
        let mut driver = replay_driver(input, 25);
        let config = MonitorConfig {
            poll: true,
            ..json_config()
        };

        run(&mut driver, &config, &mut Vec::new()).unwrap();
        // One read delivers the frame, the next hits end of stream
        assert_eq!(driver.transport().written().len(), 2);
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(init_logging("loud", false).is_err());
    }
}
