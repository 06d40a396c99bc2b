use crate::config::{PoolConfig, PoolSource};
use crate::error::IdentityError;
use crate::registry::{HostRegistry, ViewerRegistry};
use scenecast_core::{CameraMode, PlayerId};
use std::collections::{HashMap, HashSet};

/// Which slot ids are taken right now, and which ones live render hosts have claimed.
#[derive(Debug, Default, Clone)]
pub struct Occupancy {
    /// Admitted viewer id -> pool it was drawn from.
    pub in_use: HashMap<PlayerId, CameraMode>,
    /// Ids declared by live render hosts, per host camera mode, in scene order.
    pub host_bound: HashMap<CameraMode, Vec<PlayerId>>,
}

impl Occupancy {
    pub fn from_registries(hosts: &HostRegistry, viewers: &ViewerRegistry) -> Self {
        let in_use = viewers
            .snapshot()
            .into_iter()
            .map(|(id, info)| (id, info.pool))
            .collect();
        let host_bound = CameraMode::ALL
            .into_iter()
            .filter(|mode| mode.is_free_camera())
            .map(|mode| {
                let ids = hosts
                    .bound_players(mode)
                    .into_iter()
                    .map(|(_, id)| id)
                    .collect();
                (mode, ids)
            })
            .collect();
        Self { in_use, host_bound }
    }

    fn used_in_pool(&self, pool: CameraMode) -> usize {
        self.in_use.values().filter(|p| **p == pool).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub player_id: PlayerId,
    pub pool: CameraMode,
}

/// Hands out viewer slot ids from per-camera-mode pools.
pub struct IdentityAllocator {
    id_space: u32,
    pools: HashMap<CameraMode, PoolConfig>,
    cursors: HashMap<CameraMode, u32>,
}

impl IdentityAllocator {
    pub fn new(id_space: u32, pools: &[PoolConfig]) -> Self {
        Self {
            id_space,
            pools: pools.iter().map(|p| (p.mode, p.clone())).collect(),
            cursors: HashMap::new(),
        }
    }

    pub fn get_free(
        &mut self,
        mode: CameraMode,
        occupancy: &Occupancy,
    ) -> Result<Allocation, IdentityError> {
        let mut visited = HashSet::new();
        let mut current = Some(mode);

        while let Some(pool_mode) = current {
            if !visited.insert(pool_mode) {
                break;
            }
            let Some(pool) = self.pools.get(&pool_mode).cloned() else {
                break;
            };

            if occupancy.used_in_pool(pool_mode) < pool.max {
                let found = match pool.source {
                    PoolSource::HostBound => Self::take_host_bound(pool_mode, occupancy),
                    PoolSource::Generic => self.take_generic(pool_mode, occupancy),
                };
                if let Some(player_id) = found {
                    return Ok(Allocation {
                        player_id,
                        pool: pool_mode,
                    });
                }
            }
            current = pool.fallback;
        }

        Err(IdentityError::CapacityFull(mode))
    }

    fn take_host_bound(mode: CameraMode, occupancy: &Occupancy) -> Option<PlayerId> {
        occupancy
            .host_bound
            .get(&mode)?
            .iter()
            .find(|id| !occupancy.in_use.contains_key(id))
            .copied()
    }

    fn take_generic(&mut self, mode: CameraMode, occupancy: &Occupancy) -> Option<PlayerId> {
        if self.id_space == 0 {
            return None;
        }
        let reserved: HashSet<PlayerId> = occupancy.host_bound.values().flatten().copied().collect();
        let cursor = self.cursors.entry(mode).or_insert(0);

        for step in 0..self.id_space {
            let candidate = PlayerId((*cursor + step) % self.id_space);
            if occupancy.in_use.contains_key(&candidate) || reserved.contains(&candidate) {
                continue;
            }
            *cursor = (candidate.0 + 1) % self.id_space;
            return Some(candidate);
        }
        None
    }
}
