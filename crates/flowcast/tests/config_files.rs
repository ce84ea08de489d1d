//! Loading configuration from disk.

use std::io::Write;

use flowcast::{ConfigError, DegradationAction, Error, FlowcastConfig};
use flowcast_runtime::Variant;
use pretty_assertions::assert_eq;

fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(body.as_bytes()).expect("write");
    file
}

#[test]
fn loads_toml_by_extension() {
    let file = write_temp(".toml", "variant = \"after\"\n[layout]\nnode_width = 20\n");
    let cfg = FlowcastConfig::load(file.path()).unwrap();
    assert_eq!(cfg.variant, Variant::After);
    assert_eq!(cfg.layout.node_width, 20.0);
}

#[test]
fn loads_json_by_extension() {
    let file = write_temp(".json", r#"{"render": {"font_size": 14}}"#);
    let cfg = FlowcastConfig::load(file.path()).unwrap();
    assert_eq!(cfg.render.font_size, 14.0);
    assert_eq!(cfg.variant, Variant::Before);
}

#[test]
fn unknown_extension_is_rejected_before_reading() {
    let err = FlowcastConfig::load("/definitely/missing/flowcast.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownFormat(_)));
}

#[test]
fn missing_file_aborts() {
    let err = FlowcastConfig::load("/definitely/missing/flowcast.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert_eq!(Error::from(err).degradation(), DegradationAction::Abort);
}

#[test]
fn validated_load_reports_every_problem() {
    let file = write_temp(
        ".toml",
        "[viewport]\nwidth = -5\n[particles]\nmin_speed = 0.5\nmax_speed = 0.1\n",
    );
    match FlowcastConfig::load_validated(file.path()) {
        Err(ConfigError::Invalid(problems)) => {
            assert_eq!(problems.len(), 2, "{problems:?}");
        }
        other => panic!("expected invalid config, got {other:?}"),
    }
}
