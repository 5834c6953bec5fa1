//! Capa de intercepción: proxy de pasos, metadatos por operación y
//! repetición data-driven.

pub mod data_driven;
pub mod macros;
pub mod metadata;
pub mod proxy;
pub mod value;

pub use data_driven::{DataDrivenRunner, DataTableRow};
pub use metadata::{OperationMeta, OperationTable};
pub use proxy::InterceptedLibrary;
pub use value::StepValue;
