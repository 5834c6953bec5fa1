//! Repetición data-driven: una invocación lógica se reproduce una vez por
//! fila de una tabla de datos precargada.
//!
//! Cada fila ejecuta contra una instancia distinta de la librería de pasos,
//! ya poblada con los valores de esa fila por el proveedor externo. El fallo
//! de la fila *i* se registra y se traga para que la fila *i+1* siga
//! ejecutando: mientras el runner está activo levanta el flag data-driven del
//! bus, la única excepción legítima a la regla de omitir tras un fallo.

use serde_json::Value;

use super::metadata::OperationTable;
use super::value::StepValue;
use crate::bus::{BusHandle, DataDrivenScope};
use crate::errors::CoreTrackerError;
use crate::model::{StepDescription, StepFault};

/// Fila de la tabla: instancia poblada + valores renderizados de la fila.
pub struct DataTableRow<T> {
    pub instance: T,
    pub values: Vec<Value>,
}

impl<T> DataTableRow<T> {
    pub fn new(instance: T, values: Vec<Value>) -> Self {
        Self { instance, values }
    }
}

/// Envuelve una operación para reproducirla por filas con aislamiento de
/// fallos por fila.
pub struct DataDrivenRunner<T> {
    library: String,
    bus: BusHandle,
    table: OperationTable,
    rows: Vec<DataTableRow<T>>,
}

impl<T> DataDrivenRunner<T> {
    pub fn new(library: impl Into<String>,
               bus: BusHandle,
               table: OperationTable,
               rows: Vec<DataTableRow<T>>)
               -> Self {
        Self { library: library.into(),
               bus,
               table,
               rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Reproduce `operation` una vez por fila. Devuelve el valor por fila:
    /// `Real` si la fila completó, `Empty` si su fallo quedó registrado.
    pub fn invoke<R, F>(&mut self, operation: &str, mut body: F) -> Result<Vec<StepValue<R>>, CoreTrackerError>
        where F: FnMut(&mut T) -> Result<R, StepFault>
    {
        let _scope = DataDrivenScope::enter(&self.bus);
        let meta = self.table.resolve(operation);
        let mut results = Vec::with_capacity(self.rows.len());

        for (i, row) in self.rows.iter_mut().enumerate() {
            let description = StepDescription::resolved(&self.library,
                                                        operation,
                                                        meta.title.as_deref(),
                                                        meta.short_name.as_deref(),
                                                        row.values.clone(),
                                                        meta.group);
            self.bus.borrow_mut().step_started(description)?;
            match body(&mut row.instance) {
                Ok(v) => {
                    self.bus.borrow_mut().step_finished()?;
                    results.push(StepValue::Real(v));
                }
                Err(fault) => {
                    // Aislamiento por fila: el fallo queda registrado y la
                    // siguiente fila ejecuta igualmente.
                    log::warn!("row {i} of '{operation}' failed: {fault}");
                    self.bus.borrow_mut().step_failed(fault)?;
                    results.push(StepValue::Empty);
                }
            }
        }

        Ok(results)
    }
}
