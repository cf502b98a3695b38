//! The Modelo edit workflow: a typed form, the marca picklist it depends on
//! and the create-or-update submission.

pub mod form;
pub mod update;

pub use form::{Field, FieldValue, ModeloForm, Rule};
pub use update::{track_marca_by_id, ModeloUpdateWorkflow, WorkflowError, WorkflowPhase};
