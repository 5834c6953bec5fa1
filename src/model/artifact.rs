//! Referencias opacas a artefactos capturados externamente.
//!
//! El core nunca captura pantallas ni fuentes de página: recibe el handle ya
//! creado y lo adjunta al paso en ejecución. La interpretación de `location`
//! pertenece al colaborador que capturó el artefacto.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipos de artefacto que el colaborador externo puede adjuntar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Screenshot,
    PageSource,
}

/// Handle opaco a un artefacto capturado fuera del core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub id: Uuid,
    pub kind: ArtifactKind,
    /// Localización opaca (ruta, URL...); el core no la interpreta.
    pub location: String,
}

impl ArtifactRef {
    pub fn new(kind: ArtifactKind, location: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(),
               kind,
               location: location.into() }
    }
}
