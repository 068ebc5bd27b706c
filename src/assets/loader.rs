use super::{AssetError, ModelData, ModelSource};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

/// Result of one load request, delivered in completion order.
#[derive(Debug)]
pub struct LoadOutcome {
    pub request: u64,
    pub model_id: String,
    pub result: Result<ModelData, AssetError>,
}

/// Runs each fetch on its own worker thread. In-flight requests are never
/// cancelled; completions arrive in whatever order the workers finish.
pub struct AsyncLoader {
    source: Arc<dyn ModelSource>,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    next_request: u64,
    in_flight: usize,
}

impl AsyncLoader {
    pub fn new(source: Arc<dyn ModelSource>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            source,
            sender,
            receiver,
            next_request: 1,
            in_flight: 0,
        }
    }

    pub fn request(&mut self, model_id: &str) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        self.in_flight += 1;

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let id = model_id.to_string();
        let spawned = std::thread::Builder::new()
            .name(format!("load-{request}"))
            .spawn(move || {
                let result = source.fetch(&id);
                if let Ok(model) = &result {
                    log::debug!("Fetched '{}' ({} meshes)", id, model.root.mesh_count());
                }
                let _ = sender.send(LoadOutcome {
                    request,
                    model_id: id,
                    result,
                });
            });

        if let Err(source) = spawned {
            let _ = self.sender.send(LoadOutcome {
                request,
                model_id: model_id.to_string(),
                result: Err(AssetError::Spawn {
                    model_id: model_id.to_string(),
                    source,
                }),
            });
        }
        request
    }

    /// Drain every completion that has arrived, without blocking.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let outcomes: Vec<LoadOutcome> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Block until the next completion or `timeout`.
    #[cfg(test)]
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<LoadOutcome> {
        let outcome = self.receiver.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::AsyncLoader;
    use crate::assets::{AssetError, MeshData, ModelData, ModelSource, NodeData};
    use crate::scene::Aabb;
    use glam::{Mat4, Vec3};
    use std::sync::Arc;
    use std::time::Duration;

    /// In-memory source: `"<n>meshes"` yields a flat model with `n` unit meshes.
    pub(crate) struct SyntheticSource;

    pub(crate) fn synthetic_model(model_id: &str, meshes: usize) -> ModelData {
        let mut root = NodeData::group("root", Mat4::IDENTITY);
        for i in 0..meshes {
            let mut child = NodeData::group(
                format!("mesh{i}"),
                Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)),
            );
            child.mesh = Some(MeshData {
                bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
                vertex_count: 8,
                base_color: [1.0, 1.0, 1.0, 1.0],
                metallic: 0.0,
                roughness: 1.0,
                base_color_texture: None,
            });
            root.children.push(child);
        }
        ModelData {
            model_id: model_id.to_string(),
            root,
        }
    }

    impl ModelSource for SyntheticSource {
        fn fetch(&self, model_id: &str) -> Result<ModelData, AssetError> {
            let count = model_id
                .strip_suffix("meshes")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| AssetError::NotFound {
                    path: model_id.to_string(),
                })?;
            Ok(synthetic_model(model_id, count))
        }
    }

    #[test]
    fn delivers_success_and_failure() {
        let mut loader = AsyncLoader::new(Arc::new(SyntheticSource));
        let ok = loader.request("3meshes");
        let bad = loader.request("missing.glb");
        assert_ne!(ok, bad);
        assert_eq!(loader.in_flight(), 2);

        let mut outcomes = Vec::new();
        while outcomes.len() < 2 {
            let outcome = loader
                .wait(Duration::from_secs(5))
                .expect("load completion");
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|outcome| outcome.request);
        assert_eq!(outcomes[0].result.as_ref().unwrap().root.mesh_count(), 3);
        assert!(matches!(
            outcomes[1].result,
            Err(AssetError::NotFound { .. })
        ));
        assert_eq!(loader.in_flight(), 0);
        assert!(loader.poll().is_empty());
    }
}
