//! Example: Dry-run a print against mock hardware.
//!
//! This example demonstrates how to:
//! - Load print configuration from TOML
//! - Build a volume (dense, or from a `.npy` file) and validate it into a plan
//! - Run the plan on a worker thread while watching its progress
//!
//! Run with: `cargo run --example dry_run [volume.npy] [calibration.csv]`

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use pointscan_print::{
    parse_config, CalibrationTable, FrameSequencer, MockOutput, MockStage, Nanometers,
    PrintOutcome, PrintPlan, PrintWorker, Result, SafetyInterlock, Shared, VoxelVolume,
};
use tracing::info;

const CONFIG: &str = r#"
[scan]
fov_x_um = 650.0
fov_y_um = 650.0
dwell_us = 5.0
flyback_us = 1094.0

[axial]
axis = "z"
step_um = 1.5
direction = "up"
settle_us = 2000

[limits.z]
min_nm = -5000000
max_nm = 5000000
"#;

/// Delay backed by the OS sleep.
struct SleepDelay;

impl DelayNs for SleepDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let volume = match args.next() {
        Some(path) => VoxelVolume::load_npy(path)?,
        None => VoxelVolume::dense(64, 64, 8, 0.6)?,
    };
    let calibration = match args.next() {
        Some(path) => CalibrationTable::load(path)?,
        None => CalibrationTable::linear(),
    };

    let config = parse_config(CONFIG)?;
    let plan = PrintPlan::new(volume, &config, calibration)?;
    info!(
        layers = plan.layer_count(),
        samples_per_layer = plan.geometry().samples_per_layer(),
        estimated_s = plan.estimated_streaming_time().as_secs_f64(),
        "plan ready"
    );

    let stage = Shared::new(MockStage::new(Nanometers(250_000)));
    let output = Shared::new(MockOutput::new());
    let sequencer = FrameSequencer::new(stage.clone(), output, SleepDelay, SafetyInterlock::new());

    let handle = PrintWorker::start(sequencer, plan)?;
    while !handle.is_finished() {
        let monitor = handle.monitor();
        info!(
            state = %monitor.state(),
            layer = ?monitor.layer(),
            z_nm = ?monitor.position().map(|p| p.value()),
            "progress"
        );
        thread::sleep(Duration::from_millis(5));
    }

    let (report, _) = handle.join()?;
    match &report.outcome {
        PrintOutcome::Completed { last_layer } => info!(last_layer, "print completed"),
        PrintOutcome::Aborted { last_completed } => info!(?last_completed, "print aborted"),
        PrintOutcome::Failed {
            last_completed,
            error,
        } => info!(?last_completed, %error, "print failed"),
    }
    info!(
        z_nm = ?stage.with(|s| s.position().value()),
        power_zeroed = report.recovery.power_zeroed,
        "stage parked"
    );

    Ok(())
}
