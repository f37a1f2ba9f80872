//! Integration tests for pointscan-print.
//!
//! These tests drive the complete pipeline, from configuration and volume
//! loading to layer sequencing, against the mock stage and output.

use std::sync::mpsc;

use embedded_hal_mock::eh1::delay::NoopDelay;
use ndarray::Array3;
use tempfile::TempDir;

use pointscan_print::error::{MotionError, OutputError, SafetyError, ValidationError};
use pointscan_print::{
    parse_config, CalibrationTable, Channel, Error, FrameSequencer, FrameState, ManualControl,
    MockOutput, MockStage, Nanometers, PrintConfig, PrintOutcome, PrintPlan, PrintWorker,
    SafetyInterlock, Shared, VoxelVolume,
};

// =============================================================================
// Test configuration data
// =============================================================================

const PRINT_CONFIG: &str = r#"
[scan]
fov_x_um = 600.0
fov_y_um = 600.0
dwell_us = 10.0
flyback_us = 40.0

[axial]
axis = "z"
step_um = 1.5
direction = "up"
settle_us = 100

[limits.z]
min_nm = -5000000
max_nm = 5000000
"#;

const CALIBRATION_CSV: &str = "power,voltage\n0.0,0.0\n0.25,0.4\n0.5,0.6\n1.0,1.0\n";

fn config() -> PrintConfig {
    parse_config(PRINT_CONFIG).expect("valid config")
}

fn calibration() -> CalibrationTable {
    CalibrationTable::from_reader(CALIBRATION_CSV.as_bytes()).expect("valid calibration")
}

fn plan(rows: usize, columns: usize, layers: usize, dose: f64) -> PrintPlan {
    let volume = VoxelVolume::dense(rows, columns, layers, dose).expect("valid volume");
    PrintPlan::new(volume, &config(), calibration()).expect("valid plan")
}

fn sequencer(
    stage: MockStage,
    output: MockOutput,
    interlock: &SafetyInterlock,
) -> FrameSequencer<MockStage, MockOutput, NoopDelay> {
    FrameSequencer::new(stage, output, NoopDelay::new(), interlock.clone())
}

// =============================================================================
// Full pipeline
// =============================================================================

#[test]
fn test_every_layer_cycles_once_with_full_buffers() {
    let (rows, columns, layers) = (3, 5, 4);
    let plan = plan(rows, columns, layers, 0.5);
    let blanking = plan.geometry().blanking();
    assert_eq!(blanking, 4);

    let interlock = SafetyInterlock::new();
    let mut seq = sequencer(MockStage::new(Nanometers(-20_000)), MockOutput::new(), &interlock);
    let report = seq.run(&plan).expect("print runs");

    assert_eq!(report.outcome, PrintOutcome::Completed { last_layer: 3 });
    assert_eq!(report.layers_cycled, layers);
    assert_eq!(report.restore_point, Some(Nanometers(-20_000)));

    let writes = seq.output().writes();
    assert_eq!(writes.len(), layers);
    for write in writes {
        assert_eq!(write.samples, rows * (columns + blanking));
        // Dose 0.5 is a table entry, so its level comes back exactly
        assert_eq!(write.peak_power, 0.6);
    }

    // Layer moves advance upward, then the axis returns
    let moves = seq.stage().moves();
    assert_eq!(moves.len(), layers + 1);
    assert_eq!(moves[0], Nanometers(-20_000));
    assert_eq!(moves[3], Nanometers(-15_500));
    assert_eq!(seq.stage().position(), Nanometers(-20_000));

    assert_eq!(seq.output().level(Channel::Power), 0.0);
    let rate = seq.output().sample_rate_hz().expect("output configured");
    assert!((rate - 100_000.0).abs() < 1e-6);
    assert!(!interlock.is_held());
    assert_eq!(seq.monitor().state(), FrameState::Complete);
}

#[test]
fn test_power_forced_off_before_first_layer() {
    let interlock = SafetyInterlock::new();
    let mut output = MockOutput::new();
    pointscan_print::SignalOutput::set_channel_level(&mut output, Channel::Power, 0.9)
        .expect("set level");

    let mut seq = sequencer(MockStage::new(Nanometers(0)), output, &interlock);
    seq.run(&plan(1, 1, 1, 0.1)).expect("print runs");

    let history = seq.output().level_history();
    assert_eq!(history[0], (Channel::Power, 0.9));
    assert_eq!(history[1], (Channel::Power, 0.0));
}

#[test]
fn test_all_zero_volume_emits_zero_power_everywhere() {
    for (rows, columns, layers) in [(1, 1, 1), (4, 7, 2), (9, 3, 3)] {
        let plan = plan(rows, columns, layers, 0.0);
        let interlock = SafetyInterlock::new();
        let mut seq = sequencer(MockStage::new(Nanometers(0)), MockOutput::new(), &interlock);
        let report = seq.run(&plan).expect("print runs");

        assert!(report.outcome.is_completed());
        let writes = seq.output().writes();
        assert_eq!(writes.len(), layers);
        assert!(writes.iter().all(|w| w.power_all_zero));
        assert!(writes
            .iter()
            .all(|w| w.samples == plan.geometry().samples_per_layer()));
    }
}

#[test]
fn test_dark_layers_skip_streaming_when_enabled() {
    let mut config = config();
    config.scan.skip_dark_rows = true;

    let mut doses = Array3::zeros((2, 2, 3));
    doses[[1, 1, 1]] = 0.8;
    let volume = VoxelVolume::from_array(doses).expect("valid volume");
    let plan = PrintPlan::new(volume, &config, calibration()).expect("valid plan");

    let interlock = SafetyInterlock::new();
    let mut seq = sequencer(MockStage::new(Nanometers(0)), MockOutput::new(), &interlock);
    let report = seq.run(&plan).expect("print runs");

    assert_eq!(report.layers_cycled, 3);
    assert_eq!(seq.output().writes().len(), 1);
    assert_eq!(seq.output().writes()[0].samples, plan.geometry().samples_per_row());
    assert_eq!(seq.stage().moves().len(), 4);
}

// =============================================================================
// Validation happens before anything moves
// =============================================================================

#[test]
fn test_unreachable_field_of_view_rejected_before_motion() {
    let mut config = config();
    config.scan.fov_y = pointscan_print::Micrometers(1600.0);

    let volume = VoxelVolume::dense(2, 2, 2, 0.5).expect("valid volume");
    let err = PrintPlan::new(volume, &config, calibration()).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(
        err,
        Error::Validation(ValidationError::FieldOfViewExceedsRange { axis: "slow_axis", .. })
    ));
}

#[test]
fn test_axial_targets_beyond_limits_fail_without_motion() {
    let plan = plan(1, 1, 3, 0.5);
    let interlock = SafetyInterlock::new();
    // Third layer would land at 5.000_001 mm
    let mut seq = sequencer(MockStage::new(Nanometers(4_997_001)), MockOutput::new(), &interlock);
    let report = seq.run(&plan).expect("print runs");

    assert!(matches!(
        report.outcome,
        PrintOutcome::Failed {
            last_completed: None,
            error: Error::Validation(ValidationError::AxialTargetOutOfRange { layer: 2, .. })
        }
    ));
    assert!(seq.stage().moves().is_empty());
    assert!(seq.output().writes().is_empty());
    assert!(report.recovery.power_zeroed);
}

#[test]
fn test_npy_volume_clamps_and_rejects() {
    let temp_dir = TempDir::new().expect("temp dir");

    let mut doses = Array3::from_elem((2, 3, 2), 0.25);
    doses[[0, 0, 0]] = 4.0;
    let clamped_path = temp_dir.path().join("clamped.npy");
    ndarray_npy::write_npy(&clamped_path, &doses).expect("write npy");
    let volume = VoxelVolume::load_npy(&clamped_path).expect("load npy");
    assert_eq!(volume.get(0, 0, 0), Some(1.0));
    assert_eq!(volume.shape().layers, 2);

    doses[[1, 2, 1]] = -0.5;
    let negative_path = temp_dir.path().join("negative.npy");
    ndarray_npy::write_npy(&negative_path, &doses).expect("write npy");
    assert!(matches!(
        VoxelVolume::load_npy(&negative_path),
        Err(Error::Validation(ValidationError::NegativeDose {
            index: (1, 2, 1),
            ..
        }))
    ));

    assert!(matches!(
        VoxelVolume::load_npy(temp_dir.path().join("missing.npy")),
        Err(Error::Validation(ValidationError::VolumeLoad(_)))
    ));
}

#[test]
fn test_calibration_file_round_trip() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("calibration.csv");
    std::fs::write(&path, CALIBRATION_CSV).expect("write csv");

    let table = CalibrationTable::load(&path).expect("load calibration");
    assert_eq!(table.len(), 4);
    assert_eq!(table.lookup(0.25).expect("lookup"), 0.4);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancel_during_streaming_is_honored_at_checkpoint() {
    let interlock = SafetyInterlock::new();
    let cancel = interlock.cancel_token();
    let output = MockOutput::new().on_write(move |index| {
        if index == 2 {
            cancel.cancel();
        }
        Ok(())
    });

    let mut seq = sequencer(MockStage::new(Nanometers(1_000)), output, &interlock);
    let report = seq.run(&plan(2, 2, 5, 0.3)).expect("print runs");

    // Layer 2 finishes streaming, then the checkpoint stops the job
    assert_eq!(
        report.outcome,
        PrintOutcome::Aborted {
            last_completed: Some(2)
        }
    );
    assert_eq!(seq.output().writes().len(), 3);
    assert_eq!(seq.stage().position(), Nanometers(1_000));
    assert_eq!(seq.output().level(Channel::Power), 0.0);
    assert!(report.recovery.returned_to_restore_point);
    assert!(!interlock.is_held());
}

#[test]
fn test_interrupted_write_after_cancel_aborts_with_previous_layer() {
    let interlock = SafetyInterlock::new();
    let cancel = interlock.cancel_token();
    let output = MockOutput::new().on_write(move |index| {
        if index == 1 {
            cancel.cancel();
            return Err(OutputError::Interrupted { emitted: 17 });
        }
        Ok(())
    });

    let mut seq = sequencer(MockStage::new(Nanometers(0)), output, &interlock);
    let report = seq.run(&plan(2, 2, 4, 0.3)).expect("print runs");

    assert_eq!(
        report.outcome,
        PrintOutcome::Aborted {
            last_completed: Some(0)
        }
    );
    assert_eq!(seq.state(), FrameState::Aborted);
    assert_eq!(seq.stage().position(), Nanometers(0));
    assert_eq!(seq.output().level(Channel::Power), 0.0);
}

#[test]
fn test_interrupted_write_without_cancel_is_a_failure() {
    let interlock = SafetyInterlock::new();
    let output = MockOutput::new().on_write(|index| {
        if index == 0 {
            Err(OutputError::Interrupted { emitted: 3 })
        } else {
            Ok(())
        }
    });

    let mut seq = sequencer(MockStage::new(Nanometers(0)), output, &interlock);
    let report = seq.run(&plan(2, 2, 2, 0.3)).expect("print runs");
    assert!(matches!(
        report.outcome,
        PrintOutcome::Failed {
            last_completed: None,
            error: Error::Output(OutputError::Interrupted { emitted: 3 })
        }
    ));
}

#[test]
fn test_stale_cancel_does_not_abort_next_print() {
    let interlock = SafetyInterlock::new();
    interlock.request_cancel();

    let mut seq = sequencer(MockStage::new(Nanometers(0)), MockOutput::new(), &interlock);
    let report = seq.run(&plan(1, 1, 2, 0.3)).expect("print runs");
    assert!(report.outcome.is_completed());
}

// =============================================================================
// Hardware failures
// =============================================================================

#[test]
fn test_motion_error_at_later_layer_recovers() {
    let interlock = SafetyInterlock::new();
    // Move index 2 is layer 2's axial step
    let stage = MockStage::new(Nanometers(500)).fail_on_move(2);
    let mut seq = sequencer(stage, MockOutput::new(), &interlock);
    let report = seq.run(&plan(2, 3, 4, 0.7)).expect("print runs");

    match &report.outcome {
        PrintOutcome::Failed {
            last_completed,
            error,
        } => {
            assert_eq!(*last_completed, Some(1));
            assert!(matches!(error, Error::Motion(MotionError::Fault(_))));
            assert!(error.is_hardware());
        }
        other => panic!("expected failure, got {:?}", other),
    }

    assert!(report.recovery.power_zeroed);
    assert!(report.recovery.returned_to_restore_point);
    assert_eq!(seq.output().level(Channel::Power), 0.0);
    assert_eq!(seq.output().writes().len(), 2);
    assert_eq!(seq.stage().moves().last(), Some(&Nanometers(500)));
    assert_eq!(seq.stage().position(), Nanometers(500));
    assert!(!interlock.is_held());
}

// =============================================================================
// Worker thread, interlock and manual lockout
// =============================================================================

#[test]
fn test_worker_rejects_second_print_and_locks_manual_control() {
    let interlock = SafetyInterlock::new();
    let stage = Shared::new(MockStage::new(Nanometers(0)));
    let output = Shared::new(MockOutput::new());

    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let gated = Shared::new(MockOutput::new().on_write(move |index| {
        if index == 0 {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        }
        Ok(())
    }));

    let first = FrameSequencer::new(stage.clone(), gated, NoopDelay::new(), interlock.clone());
    let handle = PrintWorker::start(first, plan(2, 2, 3, 0.5)).expect("worker starts");
    started_rx.recv().expect("first layer streaming");

    assert_eq!(handle.monitor().state(), FrameState::Streaming);
    assert_eq!(handle.monitor().layer(), Some(0));
    assert_eq!(handle.monitor().position(), Some(Nanometers(0)));

    // A second print on the same interlock fails immediately
    let second = FrameSequencer::new(stage.clone(), output.clone(), NoopDelay::new(), interlock.clone());
    let err = PrintWorker::start(second, plan(1, 1, 1, 0.5)).unwrap_err();
    assert_eq!(err, Error::Safety(SafetyError::ConcurrentPrint));
    assert!(output.with(|o| o.level_history().is_empty()).unwrap_or(false));

    // Manual jog and laser are locked out, stop still goes through
    let mut manual = ManualControl::new(interlock.clone(), stage.clone(), output.clone());
    assert_eq!(
        manual.move_by(Nanometers(1_000)),
        Err(Error::Safety(SafetyError::ManualControlLocked))
    );
    assert_eq!(
        manual.set_laser(1.0),
        Err(Error::Safety(SafetyError::ManualControlLocked))
    );
    manual.stop().expect("stop always allowed");

    release_tx.send(()).expect("release worker");
    let (report, seq) = handle.join().expect("worker joins");
    assert_eq!(report.outcome, PrintOutcome::Completed { last_layer: 2 });
    assert_eq!(seq.output().with(|o| o.writes().len()), Some(3));
    assert!(!interlock.is_held());

    // Unlocked once the print is over
    manual.move_by(Nanometers(1_000)).expect("jog after print");
    assert_eq!(stage.with(|s| s.position()), Some(Nanometers(1_000)));
}

#[test]
fn test_worker_cancel_stops_at_layer_boundary() {
    let interlock = SafetyInterlock::new();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let output = MockOutput::new().on_write(move |index| {
        if index == 1 {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        }
        Ok(())
    });

    let seq = sequencer(MockStage::new(Nanometers(-3_000)), output, &interlock);
    let handle = PrintWorker::start(seq, plan(2, 2, 6, 0.5)).expect("worker starts");

    started_rx.recv().expect("second layer streaming");
    handle.cancel();
    assert!(!handle.is_finished());
    release_tx.send(()).expect("release worker");

    let (report, seq) = handle.join().expect("worker joins");
    assert_eq!(
        report.outcome,
        PrintOutcome::Aborted {
            last_completed: Some(1)
        }
    );
    assert_eq!(seq.output().writes().len(), 2);
    assert_eq!(seq.stage().position(), Nanometers(-3_000));
    assert_eq!(seq.monitor().state(), FrameState::Aborted);
}
