pub mod document;
pub mod language;
pub mod summary;

pub use document::{DocumentKind, DocumentRecord, SelectedDocument};
pub use language::{Language, TranslationMode, TranslationTier};
pub use summary::{FieldId, LegacyKeyPointsRecord, SummaryRecord, WireSummary};
