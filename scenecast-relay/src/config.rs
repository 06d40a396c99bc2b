use crate::RelayError;
use crate::room::RoomSettings;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelayConfig {
    pub hub_url: String,
    pub worker_count: usize,
    pub slot_capacity: u16,
    pub reserved_slots: Vec<u16>,
    pub reconnect_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            hub_url: "ws://localhost:8889".to_string(),
            worker_count: 3,
            slot_capacity: 1024,
            // Render hosts keep the top slot for themselves.
            reserved_slots: vec![1023],
            reconnect_delay_ms: 2_000,
        }
    }
}

impl RelayConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, RelayError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| RelayError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config: RelayConfig = serde_json::from_str(&raw).map_err(RelayError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.worker_count == 0 {
            return Err(RelayError::InvalidConfig("workerCount must be positive".into()));
        }
        let usable = self
            .reserved_slots
            .iter()
            .filter(|slot| **slot != 0 && **slot < self.slot_capacity)
            .count();
        if (self.slot_capacity as usize) < usable + 3 {
            return Err(RelayError::InvalidConfig(
                "slotCapacity leaves no room for data channels".into(),
            ));
        }
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn room_settings(&self) -> RoomSettings {
        RoomSettings {
            worker_count: self.worker_count,
            slot_capacity: self.slot_capacity,
            reserved_slots: self.reserved_slots.clone(),
        }
    }
}
