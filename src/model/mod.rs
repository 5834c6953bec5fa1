//! Objetos de valor del árbol de resultados.

pub mod artifact;
pub mod description;
pub mod failure;
pub mod group;
pub mod outcome;
pub mod step;

pub use artifact::{ArtifactKind, ArtifactRef};
pub use description::StepDescription;
pub use failure::{FailureCause, FailureDetail, StepFault};
pub use group::{StepGroup, StepNode};
pub use outcome::{StoryRef, TestOutcome};
pub use step::TestStep;
