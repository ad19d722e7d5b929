pub mod auth_service;
pub mod credential_store;
pub mod dictionary;
pub mod failure_classifier;
pub mod notifier;
pub mod sample_summary;
pub mod translation_cascade;
pub mod trial_quota;

pub use auth_service::AuthService;
pub use credential_store::{Credential, CredentialStore};
pub use notifier::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use translation_cascade::{TranslationCascade, TranslationOutcome, TranslationStrategy};
pub use trial_quota::{TrialQuota, TRIAL_LIMIT};
