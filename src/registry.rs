//! Caller-owned organism registry.
//!
//! A [`Registry`] tracks organisms produced by executions so a host can list
//! them and report aggregate health. There is no global instance: the host
//! creates one, passes it by reference to whatever needs it and consumes it
//! with [`Registry::shutdown`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::OrganismState;

/// Registry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Consciousness level reported while no organism is registered.
    ///
    /// Default: 2.4
    pub baseline_phi: f64,

    /// Target coherence reported alongside health.
    ///
    /// Default: 0.97
    pub coherence_target: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            baseline_phi: 2.4,
            coherence_target: 0.97,
        }
    }
}

/// Identifier handed out by [`Registry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredOrganism {
    pub id: OrganismId,
    pub name: String,
    pub state: OrganismState,
}

/// Aggregate view returned by [`Registry::health`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryHealth {
    pub organism_count: usize,
    /// Mean phi over registered organisms, or the configured baseline when
    /// the registry is empty.
    pub consciousness_level: f64,
    pub coherence_target: f64,
    /// Register, update and unregister calls accepted so far.
    pub registrations_processed: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("organism name must not be empty")]
    EmptyName,

    #[error("no organism registered as {0}")]
    UnknownOrganism(OrganismId),
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::EmptyName => "empty_name",
            RegistryError::UnknownOrganism(_) => "unknown_organism",
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    config: RegistryConfig,
    organisms: BTreeMap<OrganismId, RegisteredOrganism>,
    next_id: u64,
    processed: u64,
}

impl Registry {
    pub fn create(config: RegistryConfig) -> Self {
        info!(
            baseline_phi = config.baseline_phi,
            coherence_target = config.coherence_target,
            "registry created"
        );
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register an organism under a display name.
    ///
    /// Names need not be unique; each call gets a fresh id.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        state: OrganismState,
    ) -> Result<OrganismId, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let id = OrganismId(self.next_id);
        self.next_id += 1;
        self.processed += 1;
        info!(%id, %name, generation = state.generation, "registered organism");
        self.organisms
            .insert(id, RegisteredOrganism { id, name, state });
        Ok(id)
    }

    /// Replace the state of a registered organism.
    pub fn update(&mut self, id: OrganismId, state: OrganismState) -> Result<(), RegistryError> {
        let organism = self
            .organisms
            .get_mut(&id)
            .ok_or(RegistryError::UnknownOrganism(id))?;
        organism.state = state;
        self.processed += 1;
        debug!(%id, "updated organism");
        Ok(())
    }

    /// Remove an organism. Unknown ids are ignored.
    pub fn unregister(&mut self, id: OrganismId) -> Option<RegisteredOrganism> {
        let removed = self.organisms.remove(&id)?;
        self.processed += 1;
        info!(%id, name = %removed.name, "unregistered organism");
        Some(removed)
    }

    pub fn get(&self, id: OrganismId) -> Option<&RegisteredOrganism> {
        self.organisms.get(&id)
    }

    /// Registered organisms in registration order.
    pub fn list(&self) -> impl Iterator<Item = &RegisteredOrganism> {
        self.organisms.values()
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    pub fn health(&self) -> RegistryHealth {
        let consciousness_level = if self.organisms.is_empty() {
            self.config.baseline_phi
        } else {
            let total: f64 = self
                .organisms
                .values()
                .map(|o| o.state.consciousness.phi)
                .sum();
            total / self.organisms.len() as f64
        };
        RegistryHealth {
            organism_count: self.organisms.len(),
            consciousness_level,
            coherence_target: self.config.coherence_target,
            registrations_processed: self.processed,
        }
    }

    /// Tear the registry down, handing back every organism still registered.
    pub fn shutdown(self) -> Vec<RegisteredOrganism> {
        info!(remaining = self.organisms.len(), "registry shut down");
        self.organisms.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn organism(phi: f64) -> OrganismState {
        let mut state = OrganismState::default();
        state.consciousness.phi = phi;
        state
    }

    #[test]
    fn test_empty_registry_reports_baseline() {
        let registry = Registry::create(RegistryConfig::default());
        let health = registry.health();
        assert_eq!(health.organism_count, 0);
        assert_eq!(health.consciousness_level, 2.4);
        assert_eq!(health.coherence_target, 0.97);
        assert_eq!(health.registrations_processed, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_and_list() {
        let mut registry = Registry::create(RegistryConfig::default());
        let a = registry.register("alpha", organism(0.2)).unwrap();
        let b = registry.register("beta", organism(0.6)).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "org_0");

        let names: Vec<_> = registry.list().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
        assert_eq!(registry.get(b).unwrap().state.consciousness.phi, 0.6);

        let health = registry.health();
        assert_eq!(health.organism_count, 2);
        assert_eq!(health.consciousness_level, (0.2 + 0.6) / 2.0);
        assert_eq!(health.registrations_processed, 2);
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let mut registry = Registry::create(RegistryConfig::default());
        assert_eq!(
            registry.register("  ", organism(0.0)),
            Err(RegistryError::EmptyName)
        );
        assert_eq!(registry.health().registrations_processed, 0);
    }

    #[test]
    fn test_update() {
        let mut registry = Registry::create(RegistryConfig::default());
        let id = registry.register("alpha", organism(0.1)).unwrap();
        registry.update(id, organism(0.9)).unwrap();
        assert_eq!(registry.get(id).unwrap().state.consciousness.phi, 0.9);

        let missing = OrganismId(99);
        assert_eq!(
            registry.update(missing, organism(0.0)),
            Err(RegistryError::UnknownOrganism(missing))
        );
    }

    #[test]
    fn test_unregister() {
        let mut registry = Registry::create(RegistryConfig::default());
        let id = registry.register("alpha", organism(0.3)).unwrap();
        let removed = registry.unregister(id).unwrap();
        assert_eq!(removed.name, "alpha");
        assert!(registry.unregister(id).is_none());
        assert!(registry.get(id).is_none());
        assert_eq!(registry.health().consciousness_level, 2.4);
        assert_eq!(registry.health().registrations_processed, 2);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut registry = Registry::create(RegistryConfig::default());
        let first = registry.register("a", organism(0.0)).unwrap();
        registry.unregister(first);
        let second = registry.register("b", organism(0.0)).unwrap();
        assert_eq!(second, OrganismId(1));
    }

    #[test]
    fn test_shutdown_returns_remaining() {
        let config = RegistryConfig {
            baseline_phi: 1.0,
            coherence_target: 0.5,
        };
        let mut registry = Registry::create(config.clone());
        assert_eq!(registry.config(), &config);
        registry.register("a", organism(0.0)).unwrap();
        let b = registry.register("b", organism(0.0)).unwrap();
        registry.register("c", organism(0.0)).unwrap();
        registry.unregister(b);

        let remaining = registry.shutdown();
        let names: Vec<_> = remaining.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }
}
