//! Bus de ejecución de pasos: el coordinador confinado a un hilo.
//!
//! Una instancia por hilo de trabajo; los tests en paralelo usan instancias
//! independientes sin estado compartido. El bus posee el árbol de resultados,
//! el recuento, el estado de suspensión y el registro de listeners. Cada
//! operación actualiza el estado local y después notifica a los listeners de
//! forma síncrona, en orden de registro.
//!
//! El estado de la ejecución se reinicia en `test_started` y en `clear`; los
//! listeners registrados persisten entre tests.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::suspension::SuspensionStack;
use super::tally::StepTally;
use crate::errors::CoreTrackerError;
use crate::listener::{notify_each, StepListener};
use crate::model::{ArtifactRef, FailureDetail, StepDescription, StepFault, StepNode, StoryRef,
                   TestOutcome, TestStep};
use crate::result::{aggregate, TestResult};
use crate::tree::OutcomeTree;

/// Handle de contexto de ejecución. `Rc` no es `Send`, así que el handle no
/// puede cruzar un traspaso a otro hilo de trabajo: el confinamiento queda
/// garantizado por el sistema de tipos.
pub type BusHandle = Rc<RefCell<StepEventBus>>;

/// Entrada de la pila de pasos pendientes (separada de la pila de grupos del
/// árbol). Si llega otro `step_started` antes de cerrar esta entrada, el paso
/// se promueve retroactivamente a grupo.
#[derive(Debug)]
struct PendingStep {
    description: StepDescription,
    started_at: DateTime<Utc>,
    promoted: bool,
    artifacts: Vec<ArtifactRef>,
    tags: BTreeSet<String>,
}

#[derive(Debug)]
struct ActiveRun {
    id: Uuid,
    title: String,
    story: Option<StoryRef>,
    started_at: DateTime<Utc>,
    tree: OutcomeTree,
    pending: Vec<PendingStep>,
    tally: StepTally,
    suspension: SuspensionStack,
    step_failed: bool,
    data_driven: bool,
    test_pending: bool,
    first_failure: Option<FailureDetail>,
}

impl ActiveRun {
    fn new(title: String, story: Option<StoryRef>) -> Self {
        Self { id: Uuid::new_v4(),
               title,
               story,
               started_at: Utc::now(),
               tree: OutcomeTree::new(),
               pending: Vec::new(),
               tally: StepTally::default(),
               suspension: SuspensionStack::default(),
               step_failed: false,
               data_driven: false,
               test_pending: false,
               first_failure: None }
    }
}

/// Coordinador del seguimiento de pasos de un test.
#[derive(Default)]
pub struct StepEventBus {
    listeners: Vec<Box<dyn StepListener>>,
    run: Option<ActiveRun>,
}

impl StepEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea un bus envuelto en su handle de contexto.
    pub fn handle() -> BusHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Registra un listener. Los listeners persisten entre tests.
    pub fn register_listener(&mut self, listener: Box<dyn StepListener>) {
        self.listeners.push(listener);
    }

    fn notify<F>(&mut self, event: &str, f: F)
        where F: FnMut(&mut dyn StepListener)
    {
        let mut listeners = std::mem::take(&mut self.listeners);
        notify_each(&mut listeners, event, f);
        self.listeners = listeners;
    }

    fn run_mut(&mut self) -> Result<&mut ActiveRun, CoreTrackerError> {
        self.run.as_mut().ok_or(CoreTrackerError::NoActiveTest)
    }

    // ------------------------------------------------------------------
    // Ciclo de vida del test
    // ------------------------------------------------------------------

    /// Abre una nueva ejecución, reiniciando pila, recuento y suspensión.
    pub fn test_started(&mut self, title: &str) {
        self.test_started_for(title, None);
    }

    /// Variante con identificadores de historia/requisito.
    pub fn test_started_for(&mut self, title: &str, story: Option<StoryRef>) {
        if let Some(run) = &self.run {
            log::warn!("test '{}' replaced without test_finished/clear", run.title);
        }
        self.run = Some(ActiveRun::new(title.to_string(), story));
        let title = title.to_string();
        self.notify("test_started", |l| l.test_started(&title));
    }

    /// Marca la ejecución como pendiente: todo paso posterior se cortocircuita
    /// en la intercepción, sea cual sea su resultado individual.
    pub fn test_pending(&mut self) -> Result<(), CoreTrackerError> {
        self.run_mut()?.test_pending = true;
        Ok(())
    }

    pub fn current_test_is_pending(&self) -> bool {
        self.run.as_ref().map(|r| r.test_pending).unwrap_or(false)
    }

    /// Sella la ejecución: cierra defensivamente los grupos abiertos, agrega
    /// el veredicto final, notifica y limpia el estado de la ejecución. El
    /// outcome sellado se devuelve al llamador; los listeners ya lo observaron.
    pub fn test_finished(&mut self) -> Result<TestOutcome, CoreTrackerError> {
        let mut run = self.run.take().ok_or(CoreTrackerError::NoActiveTest)?;

        let closed = run.tree.close_open_groups();
        if closed > 0 {
            log::warn!("test '{}' finished with {closed} unbalanced open group(s)", run.title);
        }
        if !run.pending.is_empty() {
            log::warn!("test '{}' finished with {} unfinished step(s)", run.title, run.pending.len());
            run.pending.clear();
        }

        let mut result = run.tree.result();
        if run.test_pending {
            result = aggregate([result, TestResult::Pending]);
        }

        let children = run.tree.into_roots();
        let mut tags = BTreeSet::new();
        for child in &children {
            child.collect_tested_requirements(&mut tags);
        }

        let outcome = TestOutcome { id: run.id,
                                    title: run.title,
                                    story: run.story,
                                    children,
                                    result,
                                    started_at: run.started_at,
                                    duration_ms: (Utc::now() - run.started_at).num_milliseconds(),
                                    tested_requirements: tags,
                                    pending: result.is_pending(),
                                    failed: result.is_failure(),
                                    failure: run.first_failure };

        self.notify("test_finished", |l| l.test_finished(&outcome));
        if outcome.failed {
            let detail = outcome.failure
                                .clone()
                                .unwrap_or_else(|| FailureDetail::from_fault(&StepFault::error("test failed")));
            self.notify("test_failed", |l| l.test_failed(&outcome, &detail));
        } else if matches!(outcome.result, TestResult::Ignored | TestResult::Skipped) {
            self.notify("test_ignored", |l| l.test_ignored(&outcome));
        }

        Ok(outcome)
    }

    /// Reinicio explícito entre tests. Los listeners registrados se conservan.
    pub fn clear(&mut self) {
        self.run = None;
    }

    // ------------------------------------------------------------------
    // Eventos de paso
    // ------------------------------------------------------------------

    /// Empuja la descripción a la pila de pasos pendientes. Si había otro paso
    /// pendiente sin promover, ese paso pasa a ser un grupo abierto en el
    /// árbol: resultará un `StepGroup`, no un `TestStep`.
    pub fn step_started(&mut self, description: StepDescription) -> Result<(), CoreTrackerError> {
        let run = self.run_mut()?;
        if let Some(top) = run.pending.last_mut() {
            if !top.promoted {
                top.promoted = true;
                let desc = top.description.clone();
                run.tree.start_group(desc);
            }
        }
        run.pending.push(PendingStep { description: description.clone(),
                                       started_at: Utc::now(),
                                       promoted: false,
                                       artifacts: Vec::new(),
                                       tags: BTreeSet::new() });
        self.notify("step_started", |l| l.step_started(&description));
        Ok(())
    }

    fn pop_pending(&mut self) -> Result<PendingStep, CoreTrackerError> {
        self.run_mut()?.pending.pop().ok_or(CoreTrackerError::NoPendingStep)
    }

    /// Materializa la entrada pendiente con el resultado dado y la cuelga del
    /// árbol. Devuelve el nodo materializado para notificarlo.
    fn materialize(&mut self,
                   result: TestResult,
                   failure: Option<FailureDetail>)
                   -> Result<StepNode, CoreTrackerError> {
        let entry = self.pop_pending()?;
        let run = self.run_mut()?;
        if entry.promoted {
            // El paso se promovió a grupo: su resultado se deriva de los
            // hijos; un cierre no exitoso queda plegado como override. Los
            // adjuntos registrados a nivel de grupo viajan con el grupo.
            run.tree.attach_to_open_group(entry.artifacts, entry.tags)?;
            if result != TestResult::Success {
                match run.tree.set_default_group_result(result) {
                    Ok(()) | Err(CoreTrackerError::DefaultResultAlreadySet) => {}
                    Err(e) => return Err(e),
                }
            }
            let group = run.tree.end_group()?;
            Ok(StepNode::Group(group))
        } else {
            let mut step = TestStep::new(entry.description, result, entry.started_at);
            step.artifacts = entry.artifacts;
            step.tested_requirements = entry.tags;
            if let Some(detail) = failure {
                step = step.with_failure(detail);
            }
            run.tally.record(result);
            run.tree.record_leaf(step.clone());
            Ok(StepNode::Step(step))
        }
    }

    /// Cierre normal del paso pendiente.
    pub fn step_finished(&mut self) -> Result<(), CoreTrackerError> {
        let node = self.materialize(TestResult::Success, None)?;
        self.notify("step_finished", |l| l.step_finished(&node));
        Ok(())
    }

    /// Registra el fallo del paso pendiente. Siempre queda mensaje y causa; si
    /// el fallo envuelve exactamente una causa anidada, el mensaje anidado se
    /// prefiere para el diagnóstico.
    pub fn step_failed(&mut self, fault: StepFault) -> Result<(), CoreTrackerError> {
        let detail = FailureDetail::from_fault(&fault);
        let node = self.materialize(detail.result, Some(detail.clone()))?;
        let run = self.run_mut()?;
        run.step_failed = true;
        if run.first_failure.is_none() {
            run.first_failure = Some(detail.clone());
        }
        if matches!(node, StepNode::Group(_)) {
            // Los grupos no pasan por el recuento de hojas; el fallo sí cuenta.
            run.tally.record(detail.result);
        }
        self.notify("step_failed", |l| l.step_failed(&node, &detail));
        Ok(())
    }

    /// Cierra el paso pendiente como omitido.
    pub fn step_ignored(&mut self) -> Result<(), CoreTrackerError> {
        let node = self.materialize(TestResult::Ignored, None)?;
        self.notify("step_ignored", |l| l.step_ignored(&node));
        Ok(())
    }

    /// Cierra el paso pendiente como pendiente de implementación.
    pub fn step_pending(&mut self) -> Result<(), CoreTrackerError> {
        let node = self.materialize(TestResult::Pending, None)?;
        self.notify("step_pending", |l| l.step_pending(&node));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Adjuntos al paso en ejecución
    // ------------------------------------------------------------------

    /// Adjunta un handle de artefacto al paso actualmente en ejecución.
    pub fn record_artifact(&mut self, artifact: ArtifactRef) {
        match self.run.as_mut().and_then(|r| r.pending.last_mut()) {
            Some(top) => top.artifacts.push(artifact),
            None => log::warn!("artifact {} dropped: no step in progress", artifact.id),
        }
    }

    /// Adjunta un tag de requisito probado al paso actualmente en ejecución.
    pub fn record_tested_requirement(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        match self.run.as_mut().and_then(|r| r.pending.last_mut()) {
            Some(top) => {
                top.tags.insert(tag);
            }
            None => log::warn!("requirement tag '{tag}' dropped: no step in progress"),
        }
    }

    // ------------------------------------------------------------------
    // Consultas de estado
    // ------------------------------------------------------------------

    /// `true` desde el primer `step_failed` de la ejecución, salvo mientras la
    /// ejecución es data-driven: la repetición por filas no debe suprimir las
    /// filas posteriores.
    pub fn a_step_has_failed(&self) -> bool {
        self.run
            .as_ref()
            .map(|r| r.step_failed && !r.data_driven)
            .unwrap_or(false)
    }

    /// Detalle del primer fallo registrado en la ejecución.
    pub fn failure_cause(&self) -> Option<FailureDetail> {
        self.run.as_ref().and_then(|r| r.first_failure.clone())
    }

    /// `true` si los efectos externos de los pasos deben omitirse.
    pub fn side_effects_suspended(&self) -> bool {
        let suspended = self.run
                            .as_ref()
                            .map(|r| r.suspension.is_active())
                            .unwrap_or(false);
        self.a_step_has_failed() || suspended
    }

    pub fn push_suspension(&mut self) -> Result<(), CoreTrackerError> {
        self.run_mut()?.suspension.push();
        Ok(())
    }

    pub fn pop_suspension(&mut self) -> Result<(), CoreTrackerError> {
        self.run_mut()?.suspension.pop()
    }

    /// Flag gestionado por el interceptor data-driven: la única excepción
    /// legítima a la regla de "omitir tras un fallo".
    pub fn set_data_driven(&mut self, active: bool) {
        if let Some(run) = self.run.as_mut() {
            run.data_driven = active;
        }
    }

    pub fn is_data_driven(&self) -> bool {
        self.run.as_ref().map(|r| r.data_driven).unwrap_or(false)
    }

    pub fn tally(&self) -> StepTally {
        self.run.as_ref().map(|r| r.tally).unwrap_or_default()
    }

    /// Profundidad de la pila de pasos pendientes (diagnóstico).
    pub fn pending_depth(&self) -> usize {
        self.run.as_ref().map(|r| r.pending.len()).unwrap_or(0)
    }

    pub fn has_active_test(&self) -> bool {
        self.run.is_some()
    }
}

/// Ámbito de suspensión: empuja al crearse y desapila en `Drop`, de modo que
/// el pop ocurre aunque la invocación en seco falle por el camino.
pub struct SuspensionScope {
    bus: BusHandle,
}

impl SuspensionScope {
    pub fn enter(bus: &BusHandle) -> Result<Self, CoreTrackerError> {
        bus.borrow_mut().push_suspension()?;
        Ok(Self { bus: Rc::clone(bus) })
    }
}

impl Drop for SuspensionScope {
    fn drop(&mut self) {
        if let Err(e) = self.bus.borrow_mut().pop_suspension() {
            log::warn!("suspension scope closed out of balance: {e}");
        }
    }
}

/// Ámbito data-driven: levanta el flag al crearse y lo baja en `Drop`, incluso
/// ante salidas tempranas del interceptor.
pub struct DataDrivenScope {
    bus: BusHandle,
}

impl DataDrivenScope {
    pub fn enter(bus: &BusHandle) -> Self {
        bus.borrow_mut().set_data_driven(true);
        Self { bus: Rc::clone(bus) }
    }
}

impl Drop for DataDrivenScope {
    fn drop(&mut self) {
        self.bus.borrow_mut().set_data_driven(false);
    }
}
