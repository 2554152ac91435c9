//! Configuration resolution for the barrage binary.
//!
//! Run parameters resolve through the chain: CLI flag > env var > TOML
//! config file (`~/.config/barrage/config.toml`) > compile-time default.
//! Backend-specific settings stay env-only; the file only carries the
//! shared run parameters.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use barrage_core::RunParams;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub run: RunSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSection {
    pub total_ops: Option<u64>,
    pub concurrency_limit: Option<usize>,
}

/// Return the barrage config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/barrage` or `~/.config/barrage`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("barrage");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("barrage")
}

/// Return the path to the barrage config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Resolve run parameters using the chain: CLI flag > env var > config
/// file > default. A malformed env value or a zero concurrency limit is
/// a fatal configuration error.
pub fn resolve_run_params(
    cli_total_ops: Option<u64>,
    cli_concurrency: Option<usize>,
) -> Result<RunParams> {
    let file = load_config().map(|c| c.run).unwrap_or_default();

    let total_ops = match cli_total_ops {
        Some(value) => value,
        None => match std::env::var(RunParams::TOTAL_OPS_VAR) {
            Ok(raw) => raw.trim().parse().with_context(|| {
                format!("invalid value for {}: {raw:?}", RunParams::TOTAL_OPS_VAR)
            })?,
            Err(_) => file.total_ops.unwrap_or(RunParams::DEFAULT_TOTAL_OPS),
        },
    };

    let concurrency_limit = match cli_concurrency {
        Some(value) => value,
        None => match std::env::var(RunParams::CONCURRENCY_VAR) {
            Ok(raw) => raw.trim().parse().with_context(|| {
                format!("invalid value for {}: {raw:?}", RunParams::CONCURRENCY_VAR)
            })?,
            Err(_) => file
                .concurrency_limit
                .unwrap_or(RunParams::DEFAULT_CONCURRENCY_LIMIT),
        },
    };

    Ok(RunParams::new(total_ops, concurrency_limit)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Serialize tests that touch process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_run_env() {
        unsafe { std::env::remove_var(RunParams::TOTAL_OPS_VAR) };
        unsafe { std::env::remove_var(RunParams::CONCURRENCY_VAR) };
    }

    #[test]
    fn config_file_round_trip() {
        let original = ConfigFile {
            run: RunSection {
                total_ops: Some(1234),
                concurrency_limit: Some(5),
            },
        };

        let contents = toml::to_string_pretty(&original).unwrap();
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();

        assert_eq!(loaded.run.total_ops, Some(1234));
        assert_eq!(loaded.run.concurrency_limit, Some(5));
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let loaded: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(loaded.run.total_ops, None);
        assert_eq!(loaded.run.concurrency_limit, None);
    }

    #[test]
    fn cli_flag_overrides_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        unsafe { std::env::set_var(RunParams::TOTAL_OPS_VAR, "999") };

        let params = resolve_run_params(Some(5), Some(2)).unwrap();

        clear_run_env();
        assert_eq!(params.total_ops, 5);
        assert_eq!(params.concurrency_limit, 2);
    }

    #[test]
    fn env_overrides_config_file() {
        let _lock = ENV_LOCK.lock().unwrap();

        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("barrage");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[run]\ntotal_ops = 111\nconcurrency_limit = 11\n",
        )
        .unwrap();

        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        unsafe { std::env::set_var(RunParams::TOTAL_OPS_VAR, "222") };

        let params = resolve_run_params(None, None).unwrap();

        clear_run_env();
        match orig_xdg {
            Some(xdg) => unsafe { std::env::set_var("XDG_CONFIG_HOME", xdg) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        assert_eq!(params.total_ops, 222, "env beats file");
        assert_eq!(params.concurrency_limit, 11, "file beats default");
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_run_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let params = resolve_run_params(None, None).unwrap();

        match orig_xdg {
            Some(xdg) => unsafe { std::env::set_var("XDG_CONFIG_HOME", xdg) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        assert_eq!(params.total_ops, RunParams::DEFAULT_TOTAL_OPS);
        assert_eq!(params.concurrency_limit, RunParams::DEFAULT_CONCURRENCY_LIMIT);
    }

    #[test]
    fn malformed_env_is_fatal() {
        let _lock = ENV_LOCK.lock().unwrap();
        unsafe { std::env::set_var(RunParams::CONCURRENCY_VAR, "lots") };

        let result = resolve_run_params(None, None);

        clear_run_env();
        assert!(result.is_err());
    }

    #[test]
    fn zero_concurrency_is_fatal() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_run_env();

        assert!(resolve_run_params(Some(10), Some(0)).is_err());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("barrage/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
