// wardline-api: Async Rust client for the hospital directory HTTP API

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::TokenSource;
pub use client::ApiClient;
pub use endpoints::{LoginRequest, Registration, SearchFilter};
pub use error::Error;
pub use models::{
    AuthResponse, Hospital, HospitalDraft, Page, Pagination, ProfilePatch, Specialty, User,
};
pub use transport::{TlsMode, TransportConfig};
