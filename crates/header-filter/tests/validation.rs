use header_filter::{ConfigError, FilterConfig, HeaderFilter, MatchMode};
use std::fs;
use std::path::PathBuf;

fn write_temp_yaml(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let p = dir.path().join(format!("{name}.yaml"));
    fs::write(&p, content).expect("write temp yaml");
    p
}

#[test]
fn no_rules_errors_in_both_modes() {
    let none: [&str; 0] = [];
    assert!(matches!(HeaderFilter::exact(none), Err(ConfigError::NoRules)));
    assert!(matches!(HeaderFilter::pattern(none), Err(ConfigError::NoRules)));
}

#[test]
fn blank_rule_errors_with_index() {
    let res = HeaderFilter::exact(["x", "  "]);
    assert!(matches!(res, Err(ConfigError::EmptyRule { index: 1 })));
}

#[test]
fn loads_exact_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = write_temp_yaml(&dir, "exact", "header_names: [x, z]\n");
    let filter = HeaderFilter::load_from_yaml_path(&p).unwrap();
    assert_eq!(filter.mode(), MatchMode::Exact);
    assert_eq!(filter.rules(), ["x".to_string(), "z".to_string()]);
}

#[test]
fn loads_pattern_config_from_file() {
    let yaml = r#"
header_names:
  - "time*"
  - x-debug
pattern_match: true
"#;
    let dir = tempfile::tempdir().unwrap();
    let p = write_temp_yaml(&dir, "pattern", yaml);
    let filter = HeaderFilter::load_from_yaml_path(&p).unwrap();
    assert_eq!(filter.mode(), MatchMode::Pattern);
    assert!(filter.is_match("timestamp"));
    assert!(filter.is_match("x-debug"));
    assert!(!filter.is_match("x-debugger"));
}

#[test]
fn empty_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let p = write_temp_yaml(&dir, "empty", "");
    let res = HeaderFilter::load_from_yaml_path(&p);
    assert!(matches!(res, Err(ConfigError::Yaml(_))));
}

#[test]
fn empty_rule_list_in_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let p = write_temp_yaml(&dir, "no_rules", "header_names: []\npattern_match: true\n");
    let res = HeaderFilter::load_from_yaml_path(&p);
    assert!(matches!(res, Err(ConfigError::NoRules)));
}

#[test]
fn missing_header_names_errors() {
    let res = HeaderFilter::from_yaml_str("pattern_match: true\n");
    assert!(matches!(res, Err(ConfigError::Yaml(_))), "expected missing field to error");
}

#[test]
fn missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let res = HeaderFilter::load_from_yaml_path(dir.path().join("absent.yaml"));
    match res {
        Err(ConfigError::Io { path, .. }) => assert!(path.ends_with("absent.yaml")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn config_round_trips_through_yaml() {
    let cfg = FilterConfig { header_names: vec!["a*".into()], pattern_match: true };
    let yaml = serde_yaml::to_string(&cfg).unwrap();
    let filter = HeaderFilter::from_yaml_str(&yaml).unwrap();
    assert_eq!(filter.mode(), MatchMode::Pattern);
    assert!(filter.is_match("abc"));
}
