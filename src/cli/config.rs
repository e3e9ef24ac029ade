// FILE: src/cli/config.rs

use crate::assignment::Scope;
use crate::error::{ReplayError, Result};
use crate::ReplayOptions;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub debug_mode: Option<bool>,
    pub max_concurrent_images: Option<usize>,
    pub image_timeout_ms: Option<u64>,
    pub max_image_bytes: Option<u64>,
    pub scope: Option<Scope>,
    pub fetch_images: Option<bool>,
    pub output_directory: Option<String>,
}

impl ConfigFile {
    /// Overlay the values set in the file onto `options`
    pub fn apply_to(&self, options: &mut ReplayOptions) {
        if let Some(debug_mode) = self.debug_mode {
            options.debug_mode = debug_mode;
        }
        if let Some(max) = self.max_concurrent_images {
            options.max_concurrent_images = max;
        }
        if let Some(timeout) = self.image_timeout_ms {
            options.image_timeout_ms = timeout;
        }
        if let Some(max_bytes) = self.max_image_bytes {
            options.max_image_bytes = max_bytes;
        }
        if let Some(scope) = self.scope {
            options.scope = scope;
        }
        if let Some(fetch_images) = self.fetch_images {
            options.fetch_images = fetch_images;
        }
    }
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path)
        .map_err(|e| ReplayError::file_not_found(format!("Config file {}", config_path), e))?;
    let config = parse(config_path, &config_content)?;
    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

fn parse(config_path: &str, content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = if config_path.ends_with(".json") {
        serde_json::from_str(content).map_err(|e| ReplayError::config(format!("Invalid JSON config: {}", e)))?
    } else if config_path.ends_with(".toml") {
        toml::from_str(content).map_err(|e| ReplayError::config(format!("Invalid TOML config: {}", e)))?
    } else {
        return Err(ReplayError::config("Config file must be .json or .toml format"));
    };

    if config.max_concurrent_images == Some(0) {
        return Err(ReplayError::config("max_concurrent_images must be at least 1"));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_config_overrides_defaults() {
        let config = parse(
            "contentify.toml",
            "max_concurrent_images = 6\nscope = \"selection\"\nfetch_images = false\n",
        )
        .unwrap();

        let mut options = ReplayOptions::default();
        config.apply_to(&mut options);
        assert_eq!(options.max_concurrent_images, 6);
        assert_eq!(options.scope, Scope::Selection);
        assert!(!options.fetch_images);
        assert_eq!(options.image_timeout_ms, 30_000);
    }

    #[test]
    fn test_json_config() {
        let config = parse("c.json", r#"{ "image_timeout_ms": 5000, "debug_mode": true }"#).unwrap();
        assert_eq!(config.image_timeout_ms, Some(5000));
        assert_eq!(config.debug_mode, Some(true));
    }

    #[test]
    fn test_rejects_unknown_extension_and_zero_workers() {
        assert!(matches!(parse("c.yaml", ""), Err(ReplayError::Config { .. })));
        assert!(parse("c.toml", "max_concurrent_images = 0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contentify.toml");
        std::fs::write(&path, "image_timeout_ms = 1000\n").unwrap();
        let config = load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.image_timeout_ms, Some(1000));
        assert!(load("/nonexistent/contentify.toml").is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contentify.toml");
        std::fs::write(&path, "max_concurrent_images = \"many\"\n").unwrap();
        assert!(matches!(load(path.to_str().unwrap()), Err(ReplayError::Config { .. })));
    }
}
