use std::ffi::OsString;
use std::sync::Mutex;

use nova_config::{discover_config_path, load_for_workspace, NovaConfig, NOVA_CONFIG_ENV_VAR};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_nova_toml_in_workspace_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("nova.toml");
    std::fs::write(&config_path, "[signatures]\nstrict_projections = true\n").unwrap();

    let discovered = discover_config_path(dir.path()).expect("nova.toml should be discovered");
    assert_eq!(
        discovered,
        config_path.canonicalize().unwrap_or(config_path)
    );

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert!(config.signatures.strict_projections);
    assert_eq!(path, Some(discovered));
}

#[test]
fn dotfile_is_used_when_nova_toml_is_absent() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join(".nova.toml");
    std::fs::write(&config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(path, Some(config_path.canonicalize().unwrap_or(config_path)));
}

#[test]
fn env_var_overrides_discovery() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("nova.toml"), "[logging]\njson = false\n").unwrap();
    let custom = dir.path().join("custom.toml");
    std::fs::write(&custom, "[logging]\njson = true\n").unwrap();
    let _env = EnvVarGuard::set(NOVA_CONFIG_ENV_VAR, std::path::Path::new("custom.toml"));

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert!(config.logging.json);
    assert_eq!(path, Some(custom.canonicalize().unwrap_or(custom)));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(NOVA_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(config, NovaConfig::default());
    assert_eq!(path, None);
}
