//! verdict-core: seguimiento de pasos y veredicto de tests de aceptación.
//!
//! Observa la ejecución de pasos compuestos jerárquicamente dentro de un
//! test, construye el árbol de resultados y calcula el veredicto global
//! pass/fail/pending. El núcleo es el bus de eventos de pasos, el contrato de
//! intercepción, el árbol de resultados y el agregador; la automatización de
//! navegador, el runner de suites y el renderizado de informes son
//! colaboradores externos que consumen este core a través del contrato de
//! listener.
//!
//! Una instancia de bus por hilo de trabajo: el handle (`BusHandle`) no es
//! `Send`, así que el confinamiento lo garantiza el sistema de tipos.

pub mod bus;
pub mod errors;
pub mod intercept;
pub mod listener;
pub mod model;
pub mod result;
pub mod tree;

pub use bus::{BusHandle, DataDrivenScope, StepEventBus, StepTally, SuspensionScope, SuspensionStack};
pub use errors::CoreTrackerError;
pub use intercept::{DataDrivenRunner, DataTableRow, InterceptedLibrary, OperationMeta, OperationTable, StepValue};
pub use listener::StepListener;
pub use model::{ArtifactKind, ArtifactRef, FailureCause, FailureDetail, StepDescription, StepFault,
                StepGroup, StepNode, StoryRef, TestOutcome, TestStep};
pub use result::{aggregate, TestResult};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Librería de pasos mínima para los smoke tests.
    struct Shopper {
        cart: Vec<String>,
    }

    #[test]
    fn smoke_bus_records_a_flat_run() {
        let mut bus = StepEventBus::new();
        bus.test_started("buying apples");
        bus.step_started(StepDescription::new("Shopper", "open_shop")).expect("active test");
        bus.step_finished().expect("pending step");
        bus.step_started(StepDescription::new("Shopper", "buy_apples")).expect("active test");
        bus.step_failed(StepFault::assertion("no apples left")).expect("pending step");
        let outcome = bus.test_finished().expect("active test");

        assert_eq!(outcome.result, TestResult::Failure);
        assert_eq!(outcome.count_leaves(), 2);
        assert!(outcome.failed);
        assert_eq!(outcome.failure.expect("failure detail").message, "no apples left");
    }

    #[test]
    fn smoke_proxy_emits_events_for_an_intercepted_call() {
        let bus = StepEventBus::handle();
        bus.borrow_mut().test_started("smoke");

        let table = crate::step_operations! {
            "add_to_cart" { title: "Add {0} to the cart" },
        };
        let mut shopper = InterceptedLibrary::new("Shopper", Shopper { cart: vec![] }, bus.clone(), table);

        let value = shopper.call("add_to_cart", vec![json!("apples")], |s| {
                               s.inner_mut().cart.push("apples".into());
                               Ok(s.inner().cart.len())
                           })
                           .expect("valid state");
        assert_eq!(value, StepValue::Real(1));

        let outcome = bus.borrow_mut().test_finished().expect("active test");
        assert_eq!(outcome.result, TestResult::Success);
        assert_eq!(outcome.children[0].description().title, "Add apples to the cart");
    }
}
