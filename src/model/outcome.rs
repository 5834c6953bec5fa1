//! Agregado raíz: la ejecución registrada de un test completo.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::failure::FailureDetail;
use super::group::StepNode;
use crate::result::TestResult;

/// Identificadores de la historia/requisito al que pertenece el test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRef {
    pub id: String,
    pub name: String,
    pub path: Option<String>,
}

impl StoryRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), path: None }
    }
}

/// Resultado sellado de una ejecución. Se crea en `test_started`, se sella en
/// `test_finished` y a partir de ahí pertenece a los listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub id: Uuid,
    pub title: String,
    pub story: Option<StoryRef>,
    /// Hijos de primer nivel, en orden de registro.
    pub children: Vec<StepNode>,
    pub result: TestResult,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub tested_requirements: BTreeSet<String>,
    pub pending: bool,
    pub failed: bool,
    /// Detalle del primer fallo registrado, si lo hubo.
    pub failure: Option<FailureDetail>,
}

impl TestOutcome {
    pub fn count_leaves(&self) -> usize {
        self.children.iter().map(StepNode::count_leaves).sum()
    }

    pub fn count_by_status(&self, status: TestResult) -> usize {
        self.children.iter().map(|c| c.count_by_status(status)).sum()
    }
}
