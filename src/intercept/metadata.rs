//! Metadatos por operación, resueltos una sola vez en el registro.
//!
//! El mecanismo que extrae los marcadores declarativos (step/pending/ignored/
//! título) del código fuente es un colaborador externo: aquí solo se consumen
//! registros ya resueltos, nunca se re-escanea por invocación.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Registro resuelto de una operación expuesta por una librería de pasos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMeta {
    pub id: String,
    /// Título explícito (precedencia máxima; admite marcadores `{0}`).
    pub title: Option<String>,
    /// Nombre corto (precedencia media).
    pub short_name: Option<String>,
    /// Paso declarado pendiente: nunca ejecuta en real.
    pub pending: bool,
    /// Paso declarado omitido: nunca ejecuta en real.
    pub ignored: bool,
    /// El paso se compone de pasos anidados.
    pub group: bool,
}

impl OperationMeta {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(),
               title: None,
               short_name: None,
               pending: false,
               ignored: false,
               group: false }
    }
}

/// Tabla de metadatos de una librería de pasos, construida en el registro.
/// Una operación ausente de la tabla se trata como paso con metadatos por
/// defecto (título humanizado).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OperationTable {
    ops: HashMap<String, OperationMeta>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, meta: OperationMeta) {
        self.ops.insert(meta.id.clone(), meta);
    }

    pub fn get(&self, id: &str) -> Option<&OperationMeta> {
        self.ops.get(id)
    }

    /// Metadatos de la operación, con registro por defecto si no está declarada.
    pub fn resolve(&self, id: &str) -> OperationMeta {
        self.get(id).cloned().unwrap_or_else(|| OperationMeta::new(id))
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
