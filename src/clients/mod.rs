pub mod api_client;
pub mod backend;

pub use api_client::ApiClient;
pub use backend::{AuthBackend, LoginResponse, RegisterRequest, SummaryBackend};
