//! Config loading: TOML parsing, defaults, validation, catalog wiring.

use std::io::Write;

use nichiboku_core::awards::{AwardCatalog, AwardMode};
use nichiboku_core::config::NichibokuConfig;
use nichiboku_core::{ScreenKey, SyncError};

const SAMPLE: &str = r#"
[storage]
db_path = "nichiboku.db"
read_pool_size = 4

[gate]
upgrade_route = "Planes"

[observability]
log_filter = "nichiboku=debug"
json = true

[awards.screens.CursoN5Screen]
points = 10
achievement_id = "n5_explorador"
mode = "on_enter"

[awards.screens."N3_FinalExamScreen.tsx"]
points = 50
achievement_id = "n3_exam_leon"
mode = "on_success"

[[awards.patterns]]
pattern = '^N2_B([2-5])_U\d+(?:\.tsx)?$'
points = 25
mode = "on_success"
achievement_prefix = "n2_b"
"#;

#[test]
fn empty_toml_gives_defaults() {
    let config = NichibokuConfig::from_toml("").unwrap();
    assert!(config.storage.db_path.is_none());
    assert_eq!(config.storage.read_pool_size, 2);
    assert_eq!(config.storage.busy_timeout_ms, 5000);
    assert_eq!(config.gate.upgrade_route, "Pagos");
    assert_eq!(config.observability.log_filter, "info");
    assert!(!config.observability.json);
    assert!(config.awards.screens.is_empty());
    config.validate().unwrap();
}

#[test]
fn sample_toml_parses_every_section() {
    let config = NichibokuConfig::from_toml(SAMPLE).unwrap();
    assert_eq!(config.storage.db_path.as_deref(), Some("nichiboku.db"));
    assert_eq!(config.storage.read_pool_size, 4);
    assert_eq!(config.storage.busy_timeout_ms, 5000);
    assert_eq!(config.gate.upgrade_route, "Planes");
    assert!(config.observability.json);
    assert_eq!(config.awards.screens.len(), 2);
    assert_eq!(config.awards.patterns.len(), 1);
    config.validate().unwrap();
}

#[test]
fn catalog_from_sample_resolves_screens() {
    let config = NichibokuConfig::from_toml(SAMPLE).unwrap();
    let catalog = AwardCatalog::from_config(&config.awards).unwrap();

    let exam = catalog.resolve(&ScreenKey::from("N3_FinalExamScreen")).unwrap();
    assert_eq!(exam.points, 50);
    assert_eq!(exam.mode, AwardMode::OnSuccess);

    let unit = catalog.resolve(&ScreenKey::from("N2_B3_U4")).unwrap();
    assert_eq!(unit.points, 25);
    assert_eq!(unit.achievement_id.unwrap().as_str(), "n2_b_n2_b3_u4");

    assert_eq!(
        catalog.mode_for(&ScreenKey::from("CursoN5Screen")),
        Some(AwardMode::OnEnter)
    );
}

#[test]
fn zero_pool_size_is_rejected() {
    let config = NichibokuConfig::from_toml("[storage]\nread_pool_size = 0\n").unwrap();
    assert!(matches!(config.validate(), Err(SyncError::Configuration(_))));
}

#[test]
fn load_reads_and_validates_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    let config = NichibokuConfig::load(file.path()).unwrap();
    assert_eq!(config.storage.read_pool_size, 4);
}

#[test]
fn load_rejects_invalid_pattern() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        b"[[awards.patterns]]\npattern = \"(\"\npoints = 1\nmode = \"on_enter\"\n",
    )
    .unwrap();
    assert!(matches!(
        NichibokuConfig::load(file.path()),
        Err(SyncError::Configuration(_))
    ));
}

#[test]
fn load_missing_file_is_configuration_error() {
    let err = NichibokuConfig::load(std::path::Path::new("/nonexistent/nichiboku.toml")).unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)));
}
