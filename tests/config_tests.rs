use std::path::PathBuf;
use std::time::Duration;

use scroll_frame::render::surface::Rgba;
use scroll_frame::Configuration;

#[test]
fn empty_config_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.base_path, PathBuf::from("Images"));
    assert_eq!(cfg.frame_count, 187);
    assert_eq!(cfg.priority_count, 20);
    assert_eq!(cfg.stagger_delay, Duration::from_millis(50));
    assert_eq!(cfg.scrub, Duration::from_millis(900));
    assert_eq!(cfg.placeholder_grace, Duration::from_millis(1200));
    assert_eq!(cfg.progress_log_interval, 50);
    assert_eq!(cfg.mobile.breakpoint, 768.0);
    assert!((cfg.mobile.scale - 1.2).abs() < f32::EPSILON);
    assert!(cfg.validated().is_ok());
}

#[test]
fn parse_kebab_case_with_durations() {
    let yaml = r#"
asset-root: "/srv/site"
base-path: "seq"
frame-count: 60
priority-count: 10
stagger-delay: 25ms
scrub: 1s 500ms
placeholder-grace: 2s
mobile:
  breakpoint: 600
  scale: 1.5
fallbacks:
  unscreen-dir: cutouts
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.asset_root, PathBuf::from("/srv/site"));
    assert_eq!(cfg.frame_count, 60);
    assert_eq!(cfg.priority_count, 10);
    assert_eq!(cfg.stagger_delay, Duration::from_millis(25));
    assert_eq!(cfg.scrub, Duration::from_millis(1500));
    assert_eq!(cfg.placeholder_grace, Duration::from_secs(2));
    assert_eq!(cfg.mobile.breakpoint, 600.0);
    assert_eq!(cfg.mobile.scale, 1.5);

    let layout = cfg.layout();
    assert_eq!(layout.base_path, PathBuf::from("seq"));
    assert_eq!(layout.unscreen_dir, PathBuf::from("cutouts"));
    assert_eq!(layout.frames_dir, PathBuf::from("frames"));
}

#[test]
fn priority_count_above_frame_count_is_rejected() {
    let cfg: Configuration = serde_yaml::from_str("frame-count: 5\npriority-count: 6\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("priority-count"), "{err}");
}

#[test]
fn zero_frames_is_rejected() {
    let cfg: Configuration = serde_yaml::from_str("frame-count: 0\npriority-count: 0\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn zero_tick_interval_is_rejected() {
    let cfg: Configuration = serde_yaml::from_str("tick-interval: 0s\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn default_shadow_is_translucent_cyan() {
    let cfg = Configuration::default();
    let shadow = cfg.shadow.shadow().expect("shadow enabled by default");
    assert_eq!(shadow.color, Rgba([0, 212, 255, 77]));
    assert_eq!(shadow.blur, 30.0);
}

#[test]
fn zero_opacity_disables_shadow() {
    let cfg: Configuration = serde_yaml::from_str("shadow:\n  opacity: 0\n").unwrap();
    assert!(cfg.shadow.shadow().is_none());
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player.yaml");
    std::fs::write(&path, "frame-count: 12\npriority-count: 3\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path)
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(cfg.frame_count, 12);
    assert_eq!(cfg.priority_count, 3);
}

#[test]
fn missing_file_reports_path() {
    let err = Configuration::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
}
