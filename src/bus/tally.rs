//! Recuento incremental de pasos materializados durante la ejecución.

use serde::{Deserialize, Serialize};

use crate::result::TestResult;

/// Contadores por resultado sobre los pasos hoja registrados. `step_failed`
/// suma siempre al recuento de fallos, incluido el cierre fallido de un
/// grupo promovido.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTally {
    pub success: usize,
    pub failure: usize,
    pub error: usize,
    pub pending: usize,
    pub ignored: usize,
    pub skipped: usize,
}

impl StepTally {
    pub fn record(&mut self, result: TestResult) {
        match result {
            TestResult::Success => self.success += 1,
            TestResult::Failure => self.failure += 1,
            TestResult::Error => self.error += 1,
            TestResult::Pending => self.pending += 1,
            TestResult::Ignored => self.ignored += 1,
            TestResult::Skipped => self.skipped += 1,
        }
    }

    /// Fallos contados (aserciones y errores normalizados).
    pub fn failures(&self) -> usize {
        self.failure + self.error
    }

    pub fn total(&self) -> usize {
        self.success + self.failure + self.error + self.pending + self.ignored + self.skipped
    }
}
