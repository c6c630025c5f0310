// Typed endpoint groups
//
// Each file adds inherent methods to `ApiClient` for one area of the API.
// Paths are relative to the configured base URL.

mod auth;
mod hospitals;
mod specialties;
mod users;

pub use auth::{LoginRequest, Registration};
pub use hospitals::SearchFilter;
