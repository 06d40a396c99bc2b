use crate::HubError;
use scenecast_core::CameraMode;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Where a camera mode takes viewer slot ids from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolSource {
    HostBound,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub mode: CameraMode,
    pub source: PoolSource,
    /// Concurrent viewers, not lifetime allocations.
    pub max: usize,
    #[serde(default)]
    pub fallback: Option<CameraMode>,
}

fn default_pools() -> Vec<PoolConfig> {
    vec![
        PoolConfig {
            mode: CameraMode::ThirdPerson,
            source: PoolSource::HostBound,
            max: 50,
            fallback: None,
        },
        PoolConfig {
            mode: CameraMode::ThirdPersonAi,
            source: PoolSource::HostBound,
            max: 50,
            fallback: Some(CameraMode::FixedAi),
        },
        PoolConfig {
            mode: CameraMode::Fixed,
            source: PoolSource::Generic,
            max: 50,
            fallback: None,
        },
        PoolConfig {
            mode: CameraMode::FixedAi,
            source: PoolSource::Generic,
            max: 50,
            fallback: None,
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HubConfig {
    pub bind_address: String,
    pub http_port: u16,
    pub streamer_port: u16,
    pub relay_port: u16,
    pub keep_alive_ms: u64,
    pub max_player_controllers: u32,
    pub pools: Vec<PoolConfig>,
    pub peer_connection_options: Value,
    /// Empty accepts everyone.
    pub access_tokens: Vec<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: 80,
            streamer_port: 8888,
            relay_port: 8889,
            keep_alive_ms: 30_000,
            max_player_controllers: 50,
            pools: default_pools(),
            peer_connection_options: Value::Object(Default::default()),
            access_tokens: Vec::new(),
        }
    }
}

impl HubConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, HubError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| HubError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config: HubConfig = serde_json::from_str(&raw).map_err(HubError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HubError> {
        if self.max_player_controllers == 0 {
            return Err(HubError::InvalidConfig(
                "maxPlayerControllers must be positive".into(),
            ));
        }
        if self.keep_alive_ms == 0 {
            return Err(HubError::InvalidConfig("keepAliveMs must be positive".into()));
        }
        for pool in &self.pools {
            if let Some(fallback) = pool.fallback {
                if fallback == pool.mode {
                    return Err(HubError::InvalidConfig(format!(
                        "pool {} falls back to itself",
                        pool.mode
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.keep_alive_ms)
    }
}
