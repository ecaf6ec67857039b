//! Task assembly and the transport seam.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use qforge_ir::BackendKind;

use crate::error::BackendResult;

/// A compiled circuit ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Program text in the selected wire format.
    pub program: String,
    /// Number of shots.
    pub shots: u32,
    /// Whether to run state tomography.
    pub tomography: bool,
    /// Register size.
    pub qubits: usize,
    /// Wire format of `program`.
    pub backend: BackendKind,
}

/// Delivers a serialized task and returns the service response.
///
/// Implementations own networking, authentication and retries; the
/// response is passed back to the caller untouched.
pub trait Transport {
    fn send(&self, payload: &Value) -> BackendResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            program: "[1],[0,1]".into(),
            shots: 100,
            tomography: false,
            qubits: 2,
            backend: BackendKind::Compact,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["program"], "[1],[0,1]");
        assert_eq!(json["shots"], 100);
        assert_eq!(json["backend"], "compact");

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }
}
