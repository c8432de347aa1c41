pub mod config;
pub mod domain;
pub mod errors;

pub use domain::intent::{
    AnalysisRequest, AnalysisResult, EmotionalTone, Keyword, Priority, ProcessingMetrics,
    INTENT_CATEGORIES,
};
pub use errors::{ApplicationError, InterfaceError, ValidationError};
