//! Configuration for data file locations.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (BIBLIOTECA_HOME, BIBLIOTECA_USERS_FILE,
//!    BIBLIOTECA_RESOURCES_FILE, BIBLIOTECA_LOANS_FILE)
//! 2. Config file (.biblioteca/config.yaml)
//! 3. Defaults (usuarios.txt, recursos.txt, prestamos.txt in the current directory)
//!
//! Config file discovery:
//! - Searches current directory and parents for .biblioteca/config.yaml
//! - Paths in config file are relative to the project root (parent of .biblioteca/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::store::files::{
    DataFiles, DEFAULT_LOANS_FILE, DEFAULT_RESOURCES_FILE, DEFAULT_USERS_FILE,
};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_HOME: &str = "BIBLIOTECA_HOME";
pub const ENV_USERS_FILE: &str = "BIBLIOTECA_USERS_FILE";
pub const ENV_RESOURCES_FILE: &str = "BIBLIOTECA_RESOURCES_FILE";
pub const ENV_LOANS_FILE: &str = "BIBLIOTECA_LOANS_FILE";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the data files (relative to project root)
    pub data_dir: Option<String>,
    /// Individual file overrides (relative to data_dir)
    pub users_file: Option<String>,
    pub resources_file: Option<String>,
    pub loans_file: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory the data files live in
    pub data_dir: PathBuf,
    /// The three data files
    pub files: DataFiles,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching a directory and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".biblioteca").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base` or start with `~/`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Resolve configuration from a working directory and an env lookup
fn resolve_config<F>(cwd: &Path, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config_file = find_config_file(cwd);

    let paths = match config_file {
        Some(ref config_path) => load_config_file(config_path)?.paths,
        None => PathsConfig::default(),
    };

    // Base directory is the parent of .biblioteca/ (i.e., grandparent of config.yaml)
    let base_dir = config_file
        .as_ref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(cwd)
        .to_path_buf();

    let data_dir = if let Some(env_home) = env(ENV_HOME) {
        resolve_path(cwd, &env_home)
    } else if let Some(ref dir) = paths.data_dir {
        resolve_path(&base_dir, dir)
    } else {
        base_dir.clone()
    };

    let file = |env_key: &str, configured: &Option<String>, default: &str| {
        if let Some(value) = env(env_key) {
            resolve_path(cwd, &value)
        } else {
            resolve_path(&data_dir, configured.as_deref().unwrap_or(default))
        }
    };

    let files = DataFiles {
        users: file(ENV_USERS_FILE, &paths.users_file, DEFAULT_USERS_FILE),
        resources: file(ENV_RESOURCES_FILE, &paths.resources_file, DEFAULT_RESOURCES_FILE),
        loans: file(ENV_LOANS_FILE, &paths.loans_file, DEFAULT_LOANS_FILE),
    };

    Ok(ResolvedConfig {
        data_dir,
        files,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    resolve_config(&cwd, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the configured data files
pub fn data_files() -> Result<DataFiles> {
    Ok(config()?.files.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = resolve_config(temp.path(), no_env).unwrap();

        assert!(config.config_file.is_none());
        assert_eq!(config.data_dir, temp.path());
        assert_eq!(config.files, DataFiles::in_dir(temp.path()));
        assert_eq!(config.files.users, temp.path().join("usuarios.txt"));
    }

    #[test]
    fn test_config_file_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".biblioteca");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.yaml"),
            r#"
version: "1.0"
paths:
  data_dir: data
  loans_file: history.txt
"#,
        )
        .unwrap();

        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = resolve_config(&nested, no_env).unwrap();
        let data = temp.path().join("data");

        assert!(config.config_file.is_some());
        assert_eq!(config.data_dir, data);
        assert_eq!(config.files.resources, data.join("recursos.txt"));
        assert_eq!(config.files.loans, data.join("history.txt"));
    }

    #[test]
    fn test_config_file_paths_only() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".biblioteca");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.yaml"),
            "paths:\n  users_file: socios.txt\n",
        )
        .unwrap();

        let config = resolve_config(temp.path(), no_env).unwrap();

        assert_eq!(config.files.users, temp.path().join("socios.txt"));
        assert_eq!(config.files.loans, temp.path().join("prestamos.txt"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let env: HashMap<&str, String> = [
            (ENV_HOME, "/srv/library".to_string()),
            (ENV_USERS_FILE, "/tmp/people.txt".to_string()),
        ]
        .into_iter()
        .collect();

        let config = resolve_config(temp.path(), |key| env.get(key).cloned()).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/library"));
        assert_eq!(config.files.users, PathBuf::from("/tmp/people.txt"));
        assert_eq!(config.files.resources, PathBuf::from("/srv/library/recursos.txt"));
    }

    #[test]
    fn test_invalid_config_file_is_error() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".biblioteca");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.yaml"), "paths: [not, a, map]").unwrap();

        assert!(resolve_config(temp.path(), no_env).is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
