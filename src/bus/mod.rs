//! Bus de eventos de pasos y su estado de ejecución.

pub mod core;
pub mod suspension;
pub mod tally;

pub use self::core::{BusHandle, DataDrivenScope, StepEventBus, SuspensionScope};
pub use suspension::SuspensionStack;
pub use tally::StepTally;
