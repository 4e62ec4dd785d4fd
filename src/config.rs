/*
 *  config.rs
 *
 *  vkdyn - Vulkan dynamic loading shim
 *  (c) 2020-26 Stuart Hunter
 *
 *  Loader configuration - YAML file, environment and CLI layering
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use serde::{Deserialize, Serialize};
use dirs_next::home_dir;
use std::{env, ffi::OsString, fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::platform::default_library_names;

/// Environment variable naming a driver library tried before all others
pub const LIBRARY_ENV_VAR: &str = "VKDYN_LIBRARY";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub loader: Option<LoaderConfig>,
}

/// Where to look for the driver library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Library names, first loadable wins
    pub libraries: Vec<String>,
    /// Directories tried (joined with each name) before the system search path
    pub search_paths: Vec<PathBuf>,
    /// Exact library tried before everything else
    pub override_library: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            libraries: default_library_names(),
            search_paths: Vec::new(),
            override_library: None,
        }
    }
}

impl LoaderConfig {
    /// Platform defaults plus `$VKDYN_LIBRARY`
    pub fn from_env() -> Self {
        Self::default().with_override(env::var(LIBRARY_ENV_VAR).ok())
    }

    /// Set the library tried first; empty strings are ignored
    pub fn with_override(mut self, library: Option<String>) -> Self {
        self.override_library = library.filter(|name| !name.trim().is_empty());
        self
    }

    /// Ordered list of names/paths handed to the platform loader
    ///
    /// 1. the override library
    /// 2. every search path joined with every library name
    /// 3. the bare library names (platform search path)
    pub fn candidates(&self) -> Vec<OsString> {
        let mut candidates = Vec::new();

        if let Some(library) = &self.override_library {
            candidates.push(OsString::from(library));
        }

        for dir in &self.search_paths {
            for library in &self.libraries {
                candidates.push(dir.join(library).into_os_string());
            }
        }

        for library in &self.libraries {
            candidates.push(OsString::from(library));
        }

        candidates
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.libraries.is_empty() && self.override_library.is_none() {
            return Err(ConfigError::Validation("loader needs at least one library name".into()));
        }
        if self.libraries.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation("loader library names must not be empty".into()));
        }
        Ok(())
    }
}

/// Load the effective configuration: explicit path, or the first file
/// found by [`find_config_file`], or defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        merge(&mut cfg, read_yaml(p)?);
    } else if let Some(p) = find_config_file() {
        merge(&mut cfg, read_yaml(&p)?);
    }

    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
pub fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/vkdyn/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/vkdyn/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/vkdyn.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    let p = PathBuf::from("vkdyn.yaml");
    if p.exists() { return Some(p) }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    if src.loader.is_some()    { dst.loader = src.loader; }
}

/// Command line overrides (highest precedence)
pub fn apply_overrides(cfg: &mut Config, log_level: Option<String>, libraries: Vec<String>) {
    if log_level.is_some() { cfg.log_level = log_level; }
    if !libraries.is_empty() {
        cfg.loader.get_or_insert_with(LoaderConfig::default).libraries = libraries;
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => {},
            _ => return Err(ConfigError::Validation(format!("unknown log_level: {}", level))),
        }
    }
    if let Some(loader) = cfg.loader.as_ref() {
        loader.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let cfg = LoaderConfig {
            libraries: vec!["libvulkan.so".into(), "libvulkan.so.1".into()],
            search_paths: vec![PathBuf::from("/opt/vulkan/lib")],
            override_library: Some("/tmp/libstub.so".into()),
        };

        let candidates = cfg.candidates();
        assert_eq!(candidates, vec![
            OsString::from("/tmp/libstub.so"),
            PathBuf::from("/opt/vulkan/lib").join("libvulkan.so").into_os_string(),
            PathBuf::from("/opt/vulkan/lib").join("libvulkan.so.1").into_os_string(),
            OsString::from("libvulkan.so"),
            OsString::from("libvulkan.so.1"),
        ]);
    }

    #[test]
    fn test_empty_override_ignored() {
        let cfg = LoaderConfig::default().with_override(Some("  ".into()));
        assert!(cfg.override_library.is_none());
        assert_eq!(cfg.candidates().len(), default_library_names().len());
    }

    #[test]
    fn test_parse_yaml_partial_loader() {
        let cfg = parse_yaml("log_level: debug\nloader:\n  search_paths: [\"/opt/vk\"]\n").unwrap();

        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        let loader = cfg.loader.unwrap();
        assert_eq!(loader.libraries, default_library_names());
        assert_eq!(loader.search_paths, vec![PathBuf::from("/opt/vk")]);
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let mut cfg = Config::default();
        cfg.loader = Some(LoaderConfig {
            libraries: vec!["".into()],
            ..LoaderConfig::default()
        });
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));

        cfg.loader = Some(LoaderConfig {
            libraries: Vec::new(),
            ..LoaderConfig::default()
        });
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let cfg = Config { log_level: Some("chatty".into()), loader: None };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut cfg = parse_yaml("log_level: info\n").unwrap();
        apply_overrides(&mut cfg, Some("debug".into()), vec!["vulkan-custom.dll".into()]);

        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.loader.unwrap().libraries, vec!["vulkan-custom.dll".to_string()]);
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = load(Some(Path::new("/nonexistent/vkdyn.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
