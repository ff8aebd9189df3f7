//=========================================================================
// TestBed — Desktop Runner
//
// Runs the test-bed application core behind the bridge, with a Winit
// window playing the host activity.
//
// Usage:
//   testbed [config.toml]
//
// Without an argument `hearth.toml` in the working directory is used if
// present; otherwise defaults apply. `RUST_LOG` overrides the `info`
// default filter.
//
// Controls:
// - Left mouse: pointer 0 (down / move / up)
// - Escape: ends the render loop and closes the window
//
//=========================================================================

use std::env;

use anyhow::Context;
use env_logger::Env;
use log::info;

use hearth_bridge::{Bridge, BridgeConfig, DesktopHost, TestBed};

const DEFAULT_CONFIG_PATH: &str = "hearth.toml";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = BridgeConfig::load_or_default(&path)
        .with_context(|| format!("loading configuration from {path}"))?;

    let window = config.window.clone();
    let bridge = Bridge::on_create(config, Box::new(TestBed::new())).context("creating bridge")?;

    let report = DesktopHost::new(bridge, window).run().context("running desktop host")?;
    info!(
        target: "testbed",
        "Exited (discarded events: {}, core released: {}, context released: {})",
        report.discarded_events,
        report.core_released,
        report.context_released
    );

    if !report.all_released() {
        anyhow::bail!("graphics context still live after shutdown");
    }
    Ok(())
}
