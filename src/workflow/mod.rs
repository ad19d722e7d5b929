pub mod attempt;
pub mod session;

pub use attempt::{
    reduce, AnalysisAttempt, AttemptEvent, AttemptStatus, Effect, SessionVariant, SummaryView,
    Transition, TranslationState,
};
pub use session::AnalysisSession;
