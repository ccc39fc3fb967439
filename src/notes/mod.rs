//! Background clinical documentation
//!
//! Structured fact extraction and template-driven note drafting against an
//! external generation service, guarded so late results never overwrite
//! the view state of a different session.

mod generator;
mod trigger;

pub use generator::{
    ClinicalFacts, DraftedNote, GenerationEndpoints, GenerationService, NatsGenerationService,
    NoteTemplate, VitalSign,
};
pub use trigger::{DocumentationTrigger, OpenSessions, ViewContext};
