//! Errores del core de seguimiento (InvalidState = mal uso del programador).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errores fatales del tracker. Nunca se absorben en silencio: un árbol
/// malformado no debe llegar a los listeners.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreTrackerError {
    #[error("end_group without a matching start_group")] UnbalancedGroupClose,
    #[error("finishing event with no pending step")] NoPendingStep,
    #[error("step event received with no active test")] NoActiveTest,
    #[error("default group result was already set")] DefaultResultAlreadySet,
    #[error("suspension pop without a matching push")] UnbalancedSuspensionPop,
    #[error("internal: {0}")] Internal(String),
}
