use nova_config::{ConfigError, ConfigWarning, NovaConfig, SignatureConfig};
use nova_signature_propagation::PropagationOptions;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn empty_config_uses_defaults() {
    let config = NovaConfig::load_from_str("").unwrap();
    assert_eq!(config, NovaConfig::default());
    assert_eq!(config.signatures.options(), PropagationOptions::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.stderr);
    assert!(!config.logging.json);
}

#[test]
fn signature_section_maps_to_options() {
    let text = r#"
[signatures]
platform_types = true
strict_projections = true
check_overrides = false
"#;
    let config = NovaConfig::load_from_str(text).unwrap();
    assert_eq!(
        config.signatures,
        SignatureConfig {
            platform_types: true,
            strict_projections: true,
            check_overrides: false,
        }
    );
    assert_eq!(
        config.signatures.options(),
        PropagationOptions {
            platform_types: true,
            strict_projections: true,
            check_overrides: false,
        }
    );
}

#[test]
fn unknown_keys_are_reported_with_full_paths() {
    let text = r#"
[signatures]
platform_type = true

[logging]
level = "debug"
colour = true

[extras]
enabled = true
"#;
    let (config, diagnostics) = NovaConfig::load_from_str_with_diagnostics(text).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert!(!config.signatures.platform_types);
    assert_eq!(
        diagnostics.unknown_keys,
        vec!["extras", "logging.colour", "signatures.platform_type"]
    );
    assert!(diagnostics.warnings.is_empty());

    // Plain loading ignores the same keys.
    assert_eq!(NovaConfig::load_from_str(text).unwrap(), config);
}

#[test]
fn suspicious_values_become_warnings() {
    let text = r#"
[signatures]
platform_types = true

[logging]
level = "warn,nova=foo"
"#;
    let (_, diagnostics) = NovaConfig::load_from_str_with_diagnostics(text).unwrap();
    assert!(diagnostics.unknown_keys.is_empty());
    assert_eq!(diagnostics.warnings.len(), 2);
    assert!(diagnostics
        .warnings
        .iter()
        .any(|warning| matches!(warning, ConfigWarning::LoggingLevelInvalid { value, .. } if value == "warn,nova=foo")));
    assert!(diagnostics.warnings.iter().any(|warning| matches!(
        warning,
        ConfigWarning::InvalidValue { toml_path, .. } if toml_path == "signatures.check_overrides"
    )));
}

#[test]
fn load_from_path_reads_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nova.toml");
    std::fs::write(&path, "[logging]\njson = true\n").unwrap();

    let config = NovaConfig::load_from_path(&path).unwrap();
    assert!(config.logging.json);

    let (config, diagnostics) = NovaConfig::load_from_path_with_diagnostics(&path).unwrap();
    assert!(config.logging.json);
    assert!(diagnostics.is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = NovaConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = NovaConfig::load_from_str("[signatures\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}
