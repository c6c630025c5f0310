// wardline-core: Session and paged-query state between wardline-api and consumers (CLI).

pub mod config;
pub mod error;
pub mod query;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_API_URL, TlsVerification};
pub use error::CoreError;
pub use query::{
    HospitalSource, PageQuery, PageSource, QueryConfig, QueryController, QueryStatus, QueryView,
    Scheduler, TimerHandle, TimerTask, TokioScheduler,
};
pub use session::{Credential, Session, SessionManager, SessionStatus};
pub use store::{FileStore, MemoryStore, PersistentStore, StoreError};

// Re-export the wire types consumers need alongside the core.
pub use wardline_api::{
    ApiClient, Hospital, HospitalDraft, LoginRequest, Page, Pagination, ProfilePatch,
    Registration, Specialty, User,
};
