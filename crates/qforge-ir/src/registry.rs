//! Gate registry mapping canonical names to constructors.
//!
//! The [`GateRegistry`] is built once at startup (usually through
//! [`GateRegistry::standard`]) and then shared read-only by every circuit
//! builder. Registration needs `&mut self`, so writers are serialized by
//! construction.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::QubitId;

/// Constructor building a gate from positions and parameters.
pub type GateConstructor = Box<dyn Fn(&[QubitId], &[f64]) -> IrResult<Gate> + Send + Sync>;

/// Catalog of gate constructors keyed by canonical (lower-case) name.
pub struct GateRegistry {
    constructors: FxHashMap<String, GateConstructor>,
}

impl GateRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            constructors: FxHashMap::default(),
        }
    }

    /// Create a registry holding the standard gate catalog.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::standard::install(&mut registry);
        debug!("Standard gate registry ready with {} gates", registry.len());
        registry
    }

    /// Register a gate constructor.
    ///
    /// Fails with [`IrError::DuplicateName`] if the name is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(&[QubitId], &[f64]) -> IrResult<Gate> + Send + Sync + 'static,
    ) -> IrResult<()> {
        let name = name.into().to_lowercase();
        if self.constructors.contains_key(&name) {
            return Err(IrError::DuplicateName(name));
        }
        debug!("Registering gate: {}", name);
        self.constructors.insert(name, Box::new(constructor));
        Ok(())
    }

    /// Insert a built-in constructor. Catalog names are distinct by construction.
    pub(crate) fn insert_builtin(
        &mut self,
        name: &str,
        constructor: impl Fn(&[QubitId], &[f64]) -> IrResult<Gate> + Send + Sync + 'static,
    ) {
        debug_assert!(!self.constructors.contains_key(name), "duplicate built-in {name}");
        self.constructors.insert(name.to_string(), Box::new(constructor));
    }

    /// Instantiate a registered gate.
    pub fn create(&self, name: &str, qubits: &[QubitId], params: &[f64]) -> IrResult<Gate> {
        let key = name.to_lowercase();
        let constructor = self
            .constructors
            .get(&key)
            .ok_or_else(|| IrError::UnknownGate(key.clone()))?;
        constructor(qubits, params)
    }

    /// Check if a gate is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&name.to_lowercase())
    }

    /// List all registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered gates.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Default for GateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateRegistry")
            .field("gates", &self.names())
            .finish()
    }
}
