//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::listener)
//!     → server.rs (ServerHandle: root router + middleware)
//!     → request.rs (assign request ID)
//!     → subsystem router nested under its namespace
//!     → response.rs (JSON errors, request ID echoed)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::ServerHandle;
