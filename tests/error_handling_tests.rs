//! Error handling tests for all modules

use dmx_head_tracker::{
    config::Config,
    dmx::DmxFrame,
    http::HttpBatchClient,
    osc,
    pose::{LinePoseSource, PoseSample, PoseSource},
    utils::safe_cast::*,
    Error, Result,
};
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_config_file_errors() {
    let dir = TempDir::new().unwrap();

    // Missing file
    let result = Config::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::Io(_))));

    // Malformed JSON
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"panChannel\": [").unwrap();
    assert!(matches!(Config::from_file(&path), Err(Error::Json(_))));

    // Malformed YAML
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "panChannel: [1, 2\n").unwrap();
    assert!(matches!(Config::from_file(&path), Err(Error::Yaml(_))));

    // Wrong type for a known key
    let path = dir.path().join("typed.json");
    std::fs::write(&path, r#"{"updateRate": -5}"#).unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_validation_error_messages() {
    let cases = vec![
        (Config { update_rate: 0, ..Config::default() }, "Update rate"),
        (Config { smoothing_factor: -0.1, ..Config::default() }, "Smoothing"),
        (Config { max_velocity: f64::NAN, ..Config::default() }, "Max velocity"),
        (Config { pan_gear: 0.05, ..Config::default() }, "pan gear"),
        (Config { tilt_limit: 1.5, ..Config::default() }, "tilt limit"),
        (Config { zoom_min: 10, zoom_max: 10, ..Config::default() }, "zoom min"),
        (Config { use_osc: true, osc_host: String::new(), ..Config::default() }, "OSC host"),
        (Config { dmx_api_url: String::new(), ..Config::default() }, "DMX API URL"),
    ];

    for (config, expected) in cases {
        match config.validate() {
            Err(Error::ConfigError(msg)) => assert!(msg.contains(expected), "{msg:?} should mention {expected:?}"),
            other => panic!("Expected ConfigError for {expected}, got {other:?}"),
        }
    }
}

#[test]
fn test_pose_input_errors() {
    let mut source = LinePoseSource::new(Cursor::new(b"0.1 x\n".to_vec()));
    assert!(matches!(source.next_sample(), Err(Error::InvalidInput(_))));
    assert!(matches!(source.next_sample(), Err(Error::InputClosed(_))));

    assert!("".parse::<PoseSample>().is_err());
}

#[test]
fn test_empty_frame_serialization_error() {
    match DmxFrame::new().to_json_body() {
        Err(Error::Serialization(msg)) => assert!(msg.contains("empty")),
        other => panic!("Expected Serialization error, got {other:?}"),
    }
}

#[test]
fn test_http_invalid_url() {
    let client = HttpBatchClient::new().unwrap();
    let mut frame = DmxFrame::new();
    frame.set(0, 1);
    assert!(matches!(client.post_frame("not a url", &frame), Err(Error::Http(_))));
}

#[test]
fn test_osc_decode_errors() {
    let errors: Vec<Result<osc::OscMessage>> = vec![
        osc::decode(&[]),
        osc::decode(b"/dmx/pan"),
        osc::decode(b"/x\0\0,f\0\0\0"),
        osc::decode(b"/x\0\0,s\0\0abc\0"),
    ];
    for result in errors {
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}

#[test]
fn test_safe_cast_edge_cases() {
    assert_eq!(f64_to_i32_clamp(f64::NAN, 10, 20), 10);
    assert_eq!(f64_to_i32_clamp(f64::INFINITY, 10, 20), 10);
    assert_eq!(f64_to_i32_clamp(1e300, 10, 20), 20);
    assert!(i32_to_dmx(256).is_err());
    assert!(i32_to_dmx(-1).is_err());
    assert_eq!(channel_to_slot(0), None);
}

#[test]
fn test_error_display() {
    let err = Error::Transport("connection refused".to_string());
    assert_eq!(err.to_string(), "Transport error: connection refused");

    let err = Error::InputClosed("eof".to_string());
    assert_eq!(err.to_string(), "Input closed: eof");

    let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(err.to_string().starts_with("IO error"));
}
