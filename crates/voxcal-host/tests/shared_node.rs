//! Calibration through shared node handles, including from worker threads.
//!
//! Run with: `cargo test -p voxcal-host`

use std::sync::Arc;
use std::thread;

use glam::UVec3;
use voxcal_host::{
    CalibrationLogic, ScalarType, SharedVolumeNode, TransformConfig, Volume, VolumeNode,
    calibrated_name,
};

fn ramp(len: u32) -> Volume {
    let samples: Vec<u16> = (0..len as u16).collect();
    Volume::from_samples(UVec3::new(len, 1, 1), samples).unwrap()
}

#[test]
fn test_apply_from_worker_threads() {
    let logic = Arc::new(CalibrationLogic::new(TransformConfig::sequential()));
    let nodes: Vec<SharedVolumeNode> = (0..4)
        .map(|i| SharedVolumeNode::with_image(format!("scan{i}"), ramp(16)))
        .collect();

    let handles: Vec<_> = nodes
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, mut node)| {
            let logic = Arc::clone(&logic);
            thread::spawn(move || {
                logic
                    .apply_polynomial_on_volume(&mut node, &[1.0, i as f64])
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node.modified_count(), 1);
        let image = node.get_image_data().unwrap();
        let expected: Vec<u16> = (0..16).map(|v| v + i as u16).collect();
        assert_eq!(image.samples::<u16>().unwrap(), expected.as_slice());
    }
}

#[test]
fn test_reader_keeps_old_volume_while_writer_replaces() {
    let mut writer = SharedVolumeNode::with_image("gel", ramp(4));
    let reader = writer.clone();
    let held = reader.get_image_data().unwrap();

    CalibrationLogic::new(TransformConfig::sequential())
        .apply_polynomial_on_volume(&mut writer, &[2.0, 0.0])
        .unwrap();

    assert_eq!(held.samples::<u16>().unwrap(), &[0, 1, 2, 3]);
    assert_eq!(
        reader.get_image_data().unwrap().samples::<u16>().unwrap(),
        &[0, 2, 4, 6]
    );
}

#[test]
fn test_calibrate_into_new_named_node() {
    let measured = SharedVolumeNode::with_image("Gel", ramp(8));
    let existing = ["Gel", "Gel_Calibrated"];
    let mut target = SharedVolumeNode::new(calibrated_name(measured.name(), existing));
    assert_eq!(target.name(), "Gel_Calibrated_1");

    let config = TransformConfig::sequential().with_output_type(ScalarType::F32);
    CalibrationLogic::new(config)
        .calibrate_into(&measured, &mut target, &[0.5, 0.0])
        .unwrap();

    let dose = target.get_image_data().unwrap();
    assert_eq!(dose.scalar_type(), ScalarType::F32);
    assert_eq!(dose.samples::<f32>().unwrap()[7], 3.5);
    assert_eq!(measured.modified_count(), 0);
}

#[test]
fn test_config_round_trips_through_json() {
    let json = r#"{ "output_type": "F32", "parallel": false }"#;
    let config: TransformConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.output_type, Some(ScalarType::F32));
    assert!(!config.parallel);

    let logic = CalibrationLogic::new(config);
    let mut node = SharedVolumeNode::with_image("scan", ramp(2));
    logic.apply_polynomial_on_volume(&mut node, &[1.0]).unwrap();
    assert_eq!(
        node.get_image_data().unwrap().samples::<f32>().unwrap(),
        &[1.0, 1.0]
    );
}
