//! Paso hoja materializado al recibir su evento de cierre.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactRef;
use super::description::StepDescription;
use super::failure::FailureDetail;
use crate::result::TestResult;

/// Hoja del árbol de resultados. Invariante: el resultado se fija en la
/// construcción, antes de adjuntarse al árbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStep {
    pub description: StepDescription,
    pub result: TestResult,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub failure: Option<FailureDetail>,
    /// Handles opacos capturados por colaboradores externos durante el paso.
    pub artifacts: Vec<ArtifactRef>,
    pub tested_requirements: BTreeSet<String>,
}

impl TestStep {
    pub fn new(description: StepDescription, result: TestResult, started_at: DateTime<Utc>) -> Self {
        let duration_ms = (Utc::now() - started_at).num_milliseconds();
        Self { description,
               result,
               started_at,
               duration_ms,
               failure: None,
               artifacts: Vec::new(),
               tested_requirements: BTreeSet::new() }
    }

    pub fn with_failure(mut self, failure: FailureDetail) -> Self {
        self.failure = Some(failure);
        self
    }
}
