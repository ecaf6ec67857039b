//! Execution settings carried by a circuit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IrError;
use crate::qubit::QubitId;

/// Default number of shots.
pub const DEFAULT_SHOTS: u32 = 1000;

/// Wire format a circuit is rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Layered JSON token stream (backend "A").
    #[default]
    Compact,
    /// Flat nested-tuple program (backend "B").
    Nested,
}

impl FromStr for BackendKind {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "compact" => Ok(BackendKind::Compact),
            "b" | "nested" => Ok(BackendKind::Nested),
            _ => Err(IrError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Compact => write!(f, "compact"),
            BackendKind::Nested => write!(f, "nested"),
        }
    }
}

/// How the compact format groups gates into layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerMode {
    /// Left-justified layering.
    #[default]
    Default,
    /// Layers computed by an external sequencer.
    Optimized,
}

impl FromStr for CompilerMode {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(CompilerMode::Default),
            "optimized" | "optseq" => Ok(CompilerMode::Optimized),
            _ => Err(IrError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for CompilerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerMode::Default => write!(f, "default"),
            CompilerMode::Optimized => write!(f, "optimized"),
        }
    }
}

/// Measurement and submission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Measured positions, in measurement order.
    pub measured: Vec<QubitId>,
    /// Number of shots.
    pub shots: u32,
    /// Whether to run state tomography.
    pub tomography: bool,
    /// Target wire format.
    pub backend: BackendKind,
    /// Layering mode for the compact format.
    pub compiler: CompilerMode,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            measured: Vec::new(),
            shots: DEFAULT_SHOTS,
            tomography: false,
            backend: BackendKind::default(),
            compiler: CompilerMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_aliases() {
        assert_eq!("A".parse::<BackendKind>().unwrap(), BackendKind::Compact);
        assert_eq!("Compact".parse::<BackendKind>().unwrap(), BackendKind::Compact);
        assert_eq!("b".parse::<BackendKind>().unwrap(), BackendKind::Nested);
        assert!(matches!(
            "C".parse::<BackendKind>(),
            Err(IrError::UnknownBackend(name)) if name == "C"
        ));
    }

    #[test]
    fn test_compiler_aliases() {
        assert_eq!("optseq".parse::<CompilerMode>().unwrap(), CompilerMode::Optimized);
        assert_eq!("DEFAULT".parse::<CompilerMode>().unwrap(), CompilerMode::Default);
        assert!("fast".parse::<CompilerMode>().is_err());
        assert_eq!(CompilerMode::Optimized.to_string(), "optimized");
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: ExecutionSettings = serde_json::from_str(r#"{"measured":[0,2]}"#).unwrap();
        assert_eq!(settings.measured, vec![QubitId(0), QubitId(2)]);
        assert_eq!(settings.shots, DEFAULT_SHOTS);
        assert!(!settings.tomography);
        assert_eq!(settings.backend, BackendKind::Compact);

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains(r#""backend":"compact""#));
    }
}
