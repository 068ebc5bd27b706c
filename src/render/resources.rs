use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Material,
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource {0:?} was already released")]
    AlreadyReleased(ResourceId),
    #[error("resource {0:?} was never allocated")]
    Unknown(ResourceId),
}

/// GPU-side geometry and material lifetimes, as handed out by the render engine.
/// Every allocation may be released exactly once.
///
/// Ids are handed out in increasing order, so any id below `next_id` that is no
/// longer live has been released. Only live handles are stored.
#[derive(Debug)]
pub struct ResourceRegistry {
    next_id: u64,
    live: HashMap<ResourceId, ResourceKind>,
    released: usize,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: HashMap::new(),
            released: 0,
        }
    }

    pub fn allocate(&mut self, kind: ResourceKind) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, kind);
        id
    }

    pub fn release(&mut self, id: ResourceId) -> Result<ResourceKind, ResourceError> {
        if let Some(kind) = self.live.remove(&id) {
            self.released += 1;
            return Ok(kind);
        }
        if id.0 >= 1 && id.0 < self.next_id {
            Err(ResourceError::AlreadyReleased(id))
        } else {
            Err(ResourceError::Unknown(id))
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn released_count(&self) -> usize {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceError, ResourceId, ResourceKind, ResourceRegistry};

    #[test]
    fn release_is_single_shot() {
        let mut registry = ResourceRegistry::new();
        let geometry = registry.allocate(ResourceKind::Geometry);
        let material = registry.allocate(ResourceKind::Material);
        assert_ne!(geometry, material);
        assert_eq!(registry.live_count(), 2);

        assert_eq!(registry.release(geometry).unwrap(), ResourceKind::Geometry);
        assert!(matches!(
            registry.release(geometry),
            Err(ResourceError::AlreadyReleased(id)) if id == geometry
        ));
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.released_count(), 1);
    }

    #[test]
    fn releasing_foreign_id_is_rejected() {
        let mut other = ResourceRegistry::new();
        other.allocate(ResourceKind::Material);
        let foreign = other.allocate(ResourceKind::Material);
        let mut registry = ResourceRegistry::new();
        assert!(matches!(
            registry.release(foreign),
            Err(ResourceError::Unknown(_))
        ));
    }

    #[test]
    fn storage_tracks_only_live_handles_across_swaps() {
        let mut registry = ResourceRegistry::new();
        let mut previous = Vec::new();
        for _ in 0..50 {
            for id in previous.drain(..) {
                registry.release(id).unwrap();
            }
            previous.push(registry.allocate(ResourceKind::Geometry));
            previous.push(registry.allocate(ResourceKind::Material));
        }
        assert_eq!(registry.live.len(), 2);
        assert!(registry.live.capacity() < 64);
        assert_eq!(registry.released_count(), 98);

        let first = ResourceId(1);
        assert!(matches!(
            registry.release(first),
            Err(ResourceError::AlreadyReleased(id)) if id == first
        ));
    }
}
