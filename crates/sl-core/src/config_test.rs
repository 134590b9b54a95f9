use super::*;
use crate::step_name::StepName;
use crate::version::Version;
use std::path::Path;

#[test]
fn test_parse_minimal_config() {
    let config = Config::parse("name: field_groups").unwrap();
    assert_eq!(config.name, "field_groups");
    assert_eq!(config.version_option, "schema_version");
    assert_eq!(config.database.path, "stepladder.duckdb");
    assert!(config.auto_upgrade);
    assert_eq!(config.catalog_policy, CatalogPolicy::Strict);
    assert!(config.migrations.is_empty());
    assert!(config.steps.is_empty());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: field_groups
database:
  path: ":memory:"
version_option: field_groups_db_version
auto_upgrade: false
catalog_policy: lenient
migrations:
  - version: 1.0.0
    description: Create tables
    steps: [create_groups, create_fields]
    rollback: [drop_fields, drop_groups]
  - version: 1.1.0
    steps: [add_order]
    rollback: [drop_order]
steps:
  create_groups: "CREATE TABLE groups (id INTEGER)"
  create_fields: "CREATE TABLE fields (id INTEGER, group_id INTEGER)"
  drop_fields: "DROP TABLE fields"
  drop_groups: "DROP TABLE groups"
  add_order: "ALTER TABLE fields ADD COLUMN sort_order INTEGER"
  drop_order: "ALTER TABLE fields DROP COLUMN sort_order"
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.version_option, "field_groups_db_version");
    assert!(!config.auto_upgrade);
    assert_eq!(config.catalog_policy, CatalogPolicy::Lenient);
    assert_eq!(config.migrations.len(), 2);
    assert_eq!(config.migrations[0].steps[1], StepName::new("create_fields"));
    assert_eq!(config.steps.len(), 6);

    let (catalog, warnings) = config.build_catalog().unwrap();
    assert!(warnings.is_empty());
    assert_eq!(catalog.latest(), Some(Version::new(1, 1, 0)));
}

#[test]
fn test_unknown_fields_rejected() {
    assert!(Config::parse("name: x\nmigratons: []").is_err());
}

#[test]
fn test_empty_name_rejected() {
    let err = Config::parse("name: \"  \"").unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_empty_version_option_rejected() {
    let err = Config::parse("name: x\nversion_option: \"\"").unwrap_err();
    assert!(err.to_string().contains("version_option"));
}

#[test]
fn test_blank_step_sql_rejected() {
    let err = Config::parse("name: x\nsteps:\n  noop: \"  \"").unwrap_err();
    assert!(err.to_string().contains("Step 'noop' has no SQL"));
}

#[test]
fn test_out_of_order_catalog_strict_by_default() {
    let yaml = r#"
name: x
migrations:
  - version: 2.0.0
    steps: [b]
  - version: 1.0.0
    steps: [a]
"#;
    let config = Config::parse(yaml).unwrap();
    assert!(matches!(
        config.build_catalog(),
        Err(CoreError::CatalogOutOfOrder { .. })
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    assert!(err.to_string().contains("stepladder.yml"));
}

#[test]
fn test_load_from_dir_accepts_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("stepladder.yaml"), "name: alt").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "alt");
}

#[test]
fn test_load_reports_path_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stepladder.yml");
    std::fs::write(&path, "name: [unterminated").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
    assert!(err.to_string().contains("stepladder.yml"));
}

#[test]
fn test_database_path_resolution() {
    let config = Config::parse("name: x\ndatabase:\n  path: data/app.duckdb").unwrap();
    let root = Path::new("/srv/project");

    assert_eq!(
        config.database_path(root, None),
        root.join("data/app.duckdb").display().to_string()
    );
    assert_eq!(config.database_path(root, Some(":memory:")), ":memory:");
    assert_eq!(
        config.database_path(root, Some("/tmp/other.duckdb")),
        "/tmp/other.duckdb"
    );
}
