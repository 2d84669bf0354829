//! Configuration service implementation.
//!
//! Loads `RootConfig` from `~/.config/vesave/config.toml` (or an explicit
//! path), applies `VESAVE_*` environment overrides and caches the result.
//! Validation is left to the consumer: the CLI and the server need different
//! sections.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use vesave_core::config::{ClientMode, RootConfig};
use vesave_core::{Result, VeSaveError};

use crate::paths::VeSavePaths;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VESAVE_CONFIG";

/// Loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Uses `$VESAVE_CONFIG` when set, otherwise the default config path.
    pub fn new() -> Result<Self> {
        let path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => VeSavePaths::config_file()?,
        };
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it with process environment overrides on first use.
    pub fn get_config(&self) -> Result<RootConfig> {
        self.get_config_with(|key| std::env::var(key).ok())
    }

    /// Same as [`get_config`](Self::get_config) with an explicit variable lookup.
    pub fn get_config_with<F>(&self, lookup: F) -> Result<RootConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        {
            let cached = self
                .config
                .read()
                .map_err(|_| VeSaveError::internal("config cache lock poisoned"))?;
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, lookup)?;

        let mut cached = self
            .config
            .write()
            .map_err(|_| VeSaveError::internal("config cache lock poisoned"))?;
        *cached = Some(config.clone());

        Ok(config)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cached) = self.config.write() {
            *cached = None;
        }
    }

    fn load_file(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] No config at {}, using defaults",
                self.path.display()
            );
            return Ok(RootConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content).map_err(|e| {
            VeSaveError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })?;
        tracing::info!("[ConfigService] Loaded configuration from {}", self.path.display());
        Ok(config)
    }
}

/// Applies `VESAVE_*` overrides on top of file values.
pub fn apply_env_overrides<F>(config: &mut RootConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

    if let Some(mode) = get("VESAVE_MODE") {
        config.mode = ClientMode::from_str(&mode.to_lowercase())
            .map_err(|_| VeSaveError::config(format!("VESAVE_MODE: unknown mode '{}'", mode)))?;
    }
    if let Some(api_base) = get("VESAVE_BACKEND_API_BASE") {
        config.backend.api_base = api_base;
    }
    if let Some(value) = get("VESAVE_BRIDGE_FROM_CHAIN") {
        config.bridge.from_chain = value;
    }
    if let Some(value) = get("VESAVE_BRIDGE_TO_CHAIN") {
        config.bridge.to_chain = value;
    }
    if let Some(value) = get("VESAVE_BRIDGE_FROM_TOKEN") {
        config.bridge.from_token = value;
    }
    if let Some(value) = get("VESAVE_BRIDGE_TO_TOKEN") {
        config.bridge.to_token = value;
    }
    if let Some(value) = get("VESAVE_BRIDGE_PARTNER") {
        config.bridge.partner = Some(value).filter(|p| !p.is_empty());
    }
    if let Some(value) = get("VESAVE_DEFAULT_SLIPPAGE_BPS") {
        config.workflow.default_slippage_bps = parse_number("VESAVE_DEFAULT_SLIPPAGE_BPS", &value)?;
    }
    if let Some(value) = get("VESAVE_STAKE_ROUTER_ADDRESS") {
        config.stake.router_address = value;
    }
    if let Some(value) = get("VESAVE_SERVER_BIND") {
        config.server.bind = value;
    }
    if let Some(value) = get("VESAVE_WANBRIDGE_API_BASE") {
        config.server.wanbridge_api_base = value;
    }
    if let Some(value) = get("VESAVE_WANBRIDGE_STATUS_BASE") {
        config.server.wanbridge_status_base = value;
    }
    if let Some(value) = get("VESAVE_SOURCE_RPC_URL") {
        config.server.source_rpc_url = value;
    }
    if let Some(value) = get("VESAVE_ALLOWED_ORIGINS") {
        config.server.allowed_origins = value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(value) = get("VESAVE_SESSION_TTL_SECS") {
        config.server.session_ttl_secs = parse_number("VESAVE_SESSION_TTL_SECS", &value)?;
    }

    Ok(())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| VeSaveError::config(format!("{}: '{}' is not a valid number", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_file_uses_defaults_plus_env() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = service
            .get_config_with(env(&[("VESAVE_MODE", "Simulated")]))
            .unwrap();
        assert_eq!(config.mode, ClientMode::Simulated);
        assert_eq!(config.workflow.default_slippage_bps, 50);
    }

    #[test]
    fn env_overrides_file_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\napi_base = \"http://file/api\"\n[workflow]\ndefault_slippage_bps = 75\n",
        )
        .unwrap();
        let service = ConfigService::with_path(path);

        let config = service
            .get_config_with(env(&[
                ("VESAVE_BACKEND_API_BASE", "http://env/api"),
                ("VESAVE_ALLOWED_ORIGINS", "http://a, http://b,"),
                ("VESAVE_SOURCE_RPC_URL", "http://rpc.local"),
            ]))
            .unwrap();
        assert_eq!(config.backend.api_base, "http://env/api");
        assert_eq!(config.server.source_rpc_url, "http://rpc.local");
        assert_eq!(config.workflow.default_slippage_bps, 75);
        assert_eq!(config.server.allowed_origins, vec!["http://a", "http://b"]);
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let err = service
            .get_config_with(env(&[("VESAVE_DEFAULT_SLIPPAGE_BPS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, VeSaveError::Config(_)));
        assert!(err.to_string().contains("VESAVE_DEFAULT_SLIPPAGE_BPS"));

        let err = service
            .get_config_with(env(&[("VESAVE_MODE", "turbo")]))
            .unwrap_err();
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn caches_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let first = service
            .get_config_with(env(&[("VESAVE_MODE", "simulated")]))
            .unwrap();
        let cached = service
            .get_config_with(env(&[
                ("VESAVE_MODE", "simulated"),
                ("VESAVE_BRIDGE_PARTNER", "ignored"),
            ]))
            .unwrap();
        assert_eq!(first, cached);

        service.invalidate_cache();
        let reloaded = service
            .get_config_with(env(&[
                ("VESAVE_MODE", "simulated"),
                ("VESAVE_BRIDGE_PARTNER", "vesave"),
            ]))
            .unwrap();
        assert_eq!(reloaded.bridge.partner.as_deref(), Some("vesave"));
    }

    #[test]
    fn unparsable_file_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "mode = [").unwrap();
        let service = ConfigService::with_path(path);

        let err = service
            .get_config_with(env(&[("VESAVE_MODE", "simulated")]))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse configuration file"));
    }
}
