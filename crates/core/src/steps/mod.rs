//! External workflow steps: draft generation, machine translation,
//! quality scoring and translation memory.
//!
//! The orchestrator only sees the traits. Real services replace the stubs.

mod error;
mod stub;
mod traits;

pub use error::StepError;
pub use stub::{
    FixedScorer, NoopTranslationMemory, RandomScorer, StubDraftGenerator, StubTranslator,
    STUB_DRAFT_TEXT, STUB_TRANSLATION_TEXT,
};
pub use traits::{
    DraftGenerator, QualityAssessment, QualityScorer, StepProviders, TranslationMemory, Translator,
};
