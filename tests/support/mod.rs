//! Utilidades compartidas por los tests de integración.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use verdict_core::{FailureDetail, StepDescription, StepListener, StepNode, TestOutcome};

/// Log compartido de eventos observados, en orden de generación.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Logging de test (idempotente).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Listener que registra cada evento como una línea legible.
pub struct Recorder {
    log: EventLog,
}

impl Recorder {
    pub fn new(log: &EventLog) -> Box<Self> {
        Box::new(Self { log: Rc::clone(log) })
    }
}

impl StepListener for Recorder {
    fn test_started(&mut self, title: &str) {
        self.log.borrow_mut().push(format!("test_started:{title}"));
    }

    fn test_finished(&mut self, outcome: &TestOutcome) {
        self.log
            .borrow_mut()
            .push(format!("test_finished:{}:{:?}", outcome.title, outcome.result));
    }

    fn test_failed(&mut self, _outcome: &TestOutcome, failure: &FailureDetail) {
        self.log.borrow_mut().push(format!("test_failed:{}", failure.message));
    }

    fn test_ignored(&mut self, outcome: &TestOutcome) {
        self.log.borrow_mut().push(format!("test_ignored:{}", outcome.title));
    }

    fn step_started(&mut self, description: &StepDescription) {
        self.log.borrow_mut().push(format!("step_started:{}", description.title));
    }

    fn step_finished(&mut self, step: &StepNode) {
        self.log
            .borrow_mut()
            .push(format!("step_finished:{}:{:?}", step.description().title, step.result()));
    }

    fn step_failed(&mut self, step: &StepNode, failure: &FailureDetail) {
        self.log
            .borrow_mut()
            .push(format!("step_failed:{}:{}", step.description().title, failure.message));
    }

    fn step_ignored(&mut self, step: &StepNode) {
        self.log.borrow_mut().push(format!("step_ignored:{}", step.description().title));
    }

    fn step_pending(&mut self, step: &StepNode) {
        self.log.borrow_mut().push(format!("step_pending:{}", step.description().title));
    }
}

/// Listener que entra en pánico en cada evento de paso (para los tests de
/// contención).
pub struct Panicker;

impl StepListener for Panicker {
    fn step_finished(&mut self, _step: &StepNode) {
        panic!("listener blew up");
    }
}
