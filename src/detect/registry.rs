use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};

use super::backend::{DetectionCapability, DetectorSettings, LandmarkBackend};
use super::backends::{ReplayBackend, SyntheticBackend};
use crate::config::GestureConfig;

/// Shared handle to a registered backend. `detect` takes `&mut self`, so
/// every backend sits behind its own lock.
pub type SharedBackend = Arc<Mutex<dyn LandmarkBackend>>;

/// Landmark backends by name, with one marked as the default.
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<&'static str, SharedBackend>,
    default_name: Option<&'static str>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in backends for a runtime configuration.
    ///
    /// `synthetic` is always available. `replay` is registered when a
    /// recording path is configured. The configured backend becomes the
    /// default and every backend receives the detector thresholds.
    pub fn from_config(config: &GestureConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(SyntheticBackend::demo_cycle());
        if let Some(path) = &config.replay_path {
            registry.register(ReplayBackend::open(path)?);
        }
        registry.set_default(&config.backend)?;
        registry.configure_all(&config.detector)?;
        Ok(registry)
    }

    /// Add a backend under its own name. The first one added is the default
    /// until `set_default` says otherwise.
    pub fn register<B: LandmarkBackend + 'static>(&mut self, backend: B) {
        let name = backend.name();
        self.default_name.get_or_insert(name);
        log::debug!("registered landmark backend '{}'", name);
        self.backends.insert(name, Arc::new(Mutex::new(backend)));
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        let (&key, _) = self
            .backends
            .get_key_value(name)
            .ok_or_else(|| anyhow!("backend '{}' not registered", name))?;
        self.default_name = Some(key);
        Ok(())
    }

    pub fn default_backend(&self) -> Option<SharedBackend> {
        self.default_name
            .and_then(|name| self.backends.get(name))
            .cloned()
    }

    /// Registered names in sorted order.
    pub fn list(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }

    /// Forward detector thresholds to every registered backend.
    pub fn configure_all(&self, settings: &DetectorSettings) -> Result<()> {
        for backend in self.backends.values() {
            lock(backend)?.configure(settings);
        }
        Ok(())
    }

    /// The default backend if it offers `capability`, otherwise the first
    /// capable backend by name.
    pub fn backend_for_capability(&self, capability: DetectionCapability) -> Result<SharedBackend> {
        let default = self.default_backend();
        for backend in default.iter().chain(self.backends.values()) {
            if lock(backend)?.supports(capability) {
                return Ok(Arc::clone(backend));
            }
        }
        Err(anyhow!(
            "no registered backend supports capability {:?}",
            capability
        ))
    }
}

fn lock(backend: &SharedBackend) -> Result<MutexGuard<'_, dyn LandmarkBackend + 'static>> {
    backend
        .lock()
        .map_err(|_| anyhow!("landmark backend lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DetectionResult;
    use crate::synthetic::Pose;

    struct BlindBackend;

    impl LandmarkBackend for BlindBackend {
        fn name(&self) -> &'static str {
            "blind"
        }

        fn supports(&self, _capability: DetectionCapability) -> bool {
            false
        }

        fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<DetectionResult> {
            Ok(DetectionResult::empty())
        }
    }

    #[test]
    fn first_registered_is_default() {
        let mut registry = BackendRegistry::new();
        registry.register(BlindBackend);
        registry.register(SyntheticBackend::constant(Pose::Paper));
        assert_eq!(registry.list(), vec!["blind", "synthetic"]);
        let default = registry.default_backend().unwrap();
        assert_eq!(default.lock().unwrap().name(), "blind");

        registry.set_default("synthetic").unwrap();
        assert!(registry.set_default("mediapipe").is_err());
        let default = registry.default_backend().unwrap();
        assert_eq!(default.lock().unwrap().name(), "synthetic");
    }

    #[test]
    fn falls_back_to_capable_backend() {
        let mut registry = BackendRegistry::new();
        registry.register(BlindBackend);
        registry.register(SyntheticBackend::constant(Pose::Rock));

        let backend = registry
            .backend_for_capability(DetectionCapability::HandLandmarks)
            .unwrap();
        let mut guard = backend.lock().unwrap();
        assert_eq!(guard.name(), "synthetic");
        assert_eq!(guard.detect(&[], 640, 480).unwrap().hands.len(), 1);
    }

    #[test]
    fn from_config_selects_configured_backend() {
        let cfg = GestureConfig::default();
        let registry = BackendRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.list(), vec!["synthetic"]);

        let missing = GestureConfig {
            backend: "replay".to_string(),
            ..GestureConfig::default()
        };
        assert!(BackendRegistry::from_config(&missing).is_err());
    }

    #[test]
    fn errors_when_nothing_supports_capability() {
        let mut registry = BackendRegistry::new();
        registry.register(BlindBackend);
        let err = registry
            .backend_for_capability(DetectionCapability::MultiHand)
            .err()
            .unwrap();
        assert!(err.to_string().contains("MultiHand"));
    }
}
