//! Árbol de resultados gestionado por pila para una ejecución.
//!
//! Mantiene una pila explícita de grupos abiertos. `record_leaf` anexa al
//! grupo en la cima (o a la lista raíz si la pila está vacía); `start_group`
//! empuja un grupo nuevo ya colgado del contenedor actual; `end_group`
//! desapila y el resultado del grupo se deriva bajo demanda con el agregador.
//!
//! Invariantes: append-only durante la ejecución; un grupo cerrado no se
//! reabre; `end_group` con la pila vacía es un error fatal de estado.

use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::CoreTrackerError;
use crate::model::{ArtifactRef, StepDescription, StepGroup, StepNode, TestStep};
use crate::result::{aggregate, TestResult};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OutcomeTree {
    roots: Vec<StepNode>,
    /// Camino de índices hacia el grupo abierto en la cima.
    open: Vec<usize>,
}

impl OutcomeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contenedor actualmente abierto (la raíz si no hay grupos abiertos).
    fn container_mut(&mut self) -> &mut Vec<StepNode> {
        let mut nodes = &mut self.roots;
        for &idx in &self.open {
            match &mut nodes[idx] {
                StepNode::Group(g) => nodes = &mut g.children,
                StepNode::Step(_) => unreachable!("open path always points at groups"),
            }
        }
        nodes
    }

    fn open_group_mut(&mut self) -> Option<&mut StepGroup> {
        let (last, prefix) = self.open.split_last()?;
        let mut nodes = &mut self.roots;
        for &idx in prefix {
            match &mut nodes[idx] {
                StepNode::Group(g) => nodes = &mut g.children,
                StepNode::Step(_) => unreachable!("open path always points at groups"),
            }
        }
        match &mut nodes[*last] {
            StepNode::Group(g) => Some(g),
            StepNode::Step(_) => unreachable!("open path always points at groups"),
        }
    }

    /// Hijos del contenedor abierto actualmente (la raíz si no hay grupos).
    pub fn current_container(&self) -> &[StepNode] {
        let mut nodes = &self.roots;
        for &idx in &self.open {
            match &nodes[idx] {
                StepNode::Group(g) => nodes = &g.children,
                StepNode::Step(_) => unreachable!("open path always points at groups"),
            }
        }
        nodes
    }

    /// Abre un grupo nuevo colgado del contenedor actual.
    pub fn start_group(&mut self, description: StepDescription) {
        let group = StepGroup::new(description, Utc::now());
        let container = self.container_mut();
        container.push(StepNode::Group(group));
        let idx = container.len() - 1;
        self.open.push(idx);
    }

    /// Anexa una hoja al contenedor actual. El resultado ya viene fijado.
    pub fn record_leaf(&mut self, step: TestStep) {
        self.container_mut().push(StepNode::Step(step));
    }

    /// Cierra el grupo en la cima y devuelve una instantánea con su duración
    /// fijada. La pila vacía es mal uso del programador.
    pub fn end_group(&mut self) -> Result<StepGroup, CoreTrackerError> {
        if self.open.is_empty() {
            return Err(CoreTrackerError::UnbalancedGroupClose);
        }
        let group = self.open_group_mut()
                        .ok_or(CoreTrackerError::UnbalancedGroupClose)?;
        group.duration_ms = (Utc::now() - group.started_at).num_milliseconds();
        let snapshot = group.clone();
        self.open.pop();
        Ok(snapshot)
    }

    /// Transfiere al grupo abierto los adjuntos registrados mientras era el
    /// paso en ejecución.
    pub fn attach_to_open_group(&mut self,
                                artifacts: Vec<ArtifactRef>,
                                tags: BTreeSet<String>)
                                -> Result<(), CoreTrackerError> {
        let group = self.open_group_mut().ok_or(CoreTrackerError::UnbalancedGroupClose)?;
        group.artifacts.extend(artifacts);
        group.tested_requirements.extend(tags);
        Ok(())
    }

    /// Fija el resultado por defecto del grupo abierto. Solo una vez.
    pub fn set_default_group_result(&mut self, result: TestResult) -> Result<(), CoreTrackerError> {
        let group = self.open_group_mut().ok_or(CoreTrackerError::UnbalancedGroupClose)?;
        if group.default_result.is_some() {
            return Err(CoreTrackerError::DefaultResultAlreadySet);
        }
        group.default_result = Some(result);
        Ok(())
    }

    /// Cierra defensivamente todos los grupos aún abiertos y devuelve cuántos
    /// había. Un árbol desbalanceado nunca llega a los listeners.
    pub fn close_open_groups(&mut self) -> usize {
        let mut closed = 0;
        while !self.open.is_empty() {
            // open no está vacío, end_group no puede fallar aquí
            let _ = self.end_group();
            closed += 1;
        }
        closed
    }

    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    /// Resultado agregado sobre los hijos de primer nivel.
    pub fn result(&self) -> TestResult {
        aggregate(self.roots.iter().map(StepNode::result))
    }

    pub fn count_leaves(&self) -> usize {
        self.roots.iter().map(StepNode::count_leaves).sum()
    }

    pub fn count_by_status(&self, status: TestResult) -> usize {
        self.roots.iter().map(|c| c.count_by_status(status)).sum()
    }

    pub fn roots(&self) -> &[StepNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<StepNode> {
        self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepDescription;
    use chrono::Utc;

    fn leaf(name: &str, result: TestResult) -> TestStep {
        TestStep::new(StepDescription::new("Lib", name), result, Utc::now())
    }

    #[test]
    fn leaves_attach_to_the_root_when_no_group_is_open() {
        let mut tree = OutcomeTree::new();
        tree.record_leaf(leaf("a", TestResult::Success));
        tree.record_leaf(leaf("b", TestResult::Success));
        assert_eq!(tree.count_leaves(), 2);
        assert_eq!(tree.result(), TestResult::Success);
    }

    #[test]
    fn count_leaves_matches_record_calls_for_balanced_sequences() {
        let mut tree = OutcomeTree::new();
        tree.record_leaf(leaf("a", TestResult::Success));
        tree.start_group(StepDescription::new("Lib", "g"));
        tree.record_leaf(leaf("x", TestResult::Success));
        tree.start_group(StepDescription::new("Lib", "h"));
        tree.record_leaf(leaf("y", TestResult::Failure));
        tree.end_group().expect("h open");
        tree.end_group().expect("g open");
        tree.record_leaf(leaf("b", TestResult::Ignored));
        assert_eq!(tree.count_leaves(), 4);
        assert_eq!(tree.count_by_status(TestResult::Success), 2);
        assert_eq!(tree.count_by_status(TestResult::Failure), 1);
    }

    #[test]
    fn group_result_is_derived_from_children() {
        let mut tree = OutcomeTree::new();
        tree.start_group(StepDescription::new("Lib", "g"));
        tree.record_leaf(leaf("x", TestResult::Success));
        tree.record_leaf(leaf("y", TestResult::Pending));
        assert_eq!(tree.current_container().len(), 2);
        let g = tree.end_group().expect("g open");
        assert_eq!(g.result(), TestResult::Pending);
        assert_eq!(tree.result(), TestResult::Pending);
    }

    #[test]
    fn default_result_folds_into_the_aggregate() {
        let mut tree = OutcomeTree::new();
        tree.start_group(StepDescription::new("Lib", "g"));
        tree.record_leaf(leaf("x", TestResult::Success));
        tree.set_default_group_result(TestResult::Failure).expect("first set");
        assert!(matches!(tree.set_default_group_result(TestResult::Success),
                         Err(CoreTrackerError::DefaultResultAlreadySet)));
        let g = tree.end_group().expect("g open");
        assert_eq!(g.result(), TestResult::Failure);
    }

    #[test]
    fn unbalanced_close_is_a_fatal_state_error() {
        let mut tree = OutcomeTree::new();
        assert!(matches!(tree.end_group(), Err(CoreTrackerError::UnbalancedGroupClose)));
    }

    #[test]
    fn close_open_groups_drains_the_stack() {
        let mut tree = OutcomeTree::new();
        tree.start_group(StepDescription::new("Lib", "g"));
        tree.start_group(StepDescription::new("Lib", "h"));
        assert_eq!(tree.close_open_groups(), 2);
        assert_eq!(tree.open_depth(), 0);
    }
}
