//! Grupo de pasos y nodo del árbol de resultados.
//!
//! El resultado de un grupo nunca se almacena: se deriva de sus hijos en cada
//! consulta (idempotente, sin cachés que envejezcan). La única excepción es
//! un resultado por defecto fijable una sola vez, pensado para grupos legados
//! no programáticos; se pliega en la agregación como un hijo más.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactRef;
use super::description::StepDescription;
use super::step::TestStep;
use crate::result::{aggregate, TestResult};

/// Hoja o rama del árbol de resultados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepNode {
    Step(TestStep),
    Group(StepGroup),
}

impl StepNode {
    pub fn result(&self) -> TestResult {
        match self {
            StepNode::Step(s) => s.result,
            StepNode::Group(g) => g.result(),
        }
    }

    pub fn description(&self) -> &StepDescription {
        match self {
            StepNode::Step(s) => &s.description,
            StepNode::Group(g) => &g.description,
        }
    }

    pub fn count_leaves(&self) -> usize {
        match self {
            StepNode::Step(_) => 1,
            StepNode::Group(g) => g.children.iter().map(StepNode::count_leaves).sum(),
        }
    }

    pub fn count_by_status(&self, status: TestResult) -> usize {
        match self {
            StepNode::Step(s) => usize::from(s.result == status),
            StepNode::Group(g) => g.children.iter().map(|c| c.count_by_status(status)).sum(),
        }
    }

    /// Une en `into` los tags de requisitos probados de todo el subárbol.
    pub fn collect_tested_requirements(&self, into: &mut BTreeSet<String>) {
        match self {
            StepNode::Step(s) => into.extend(s.tested_requirements.iter().cloned()),
            StepNode::Group(g) => {
                into.extend(g.tested_requirements.iter().cloned());
                for c in &g.children {
                    c.collect_tested_requirements(into);
                }
            }
        }
    }
}

/// Rama del árbol: descripción + hijos ordenados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepGroup {
    pub description: StepDescription,
    pub children: Vec<StepNode>,
    /// Override fijable una sola vez; `result()` lo pliega con los hijos.
    pub default_result: Option<TestResult>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    /// Adjuntos registrados mientras el grupo era el paso en ejecución.
    pub artifacts: Vec<ArtifactRef>,
    pub tested_requirements: BTreeSet<String>,
}

impl StepGroup {
    pub fn new(description: StepDescription, started_at: DateTime<Utc>) -> Self {
        Self { description: description.as_group(),
               children: Vec::new(),
               default_result: None,
               started_at,
               duration_ms: 0,
               artifacts: Vec::new(),
               tested_requirements: BTreeSet::new() }
    }

    /// Resultado derivado de los hijos actuales (más el override si existe).
    pub fn result(&self) -> TestResult {
        aggregate(self.children
                      .iter()
                      .map(StepNode::result)
                      .chain(self.default_result))
    }
}
