//! Mocked Responses Server
//!
//! A programmable HTTP test double. Mocks are registered through a small
//! management API and any later request matching a mock's method, URL and body
//! gets the mock's canned response.
//!
//! # Features
//!
//! - **Request Matching**: Exact method, exact URL or regex URL pattern, partial JSON body
//! - **Static Responses**: Fixed status code and JSON body per mock
//! - **Management API**: Create, replace, read, list and delete mocks at runtime
//! - **Expiry**: Optionally drop mocks that have not been used for a number of minutes
//!
//! # Example
//!
//! ```text
//! POST /mocked-responses
//! {
//!   "id": "hello-world",
//!   "method": "GET",
//!   "url": "/hello",
//!   "responseStatusCode": 200,
//!   "responseBody": { "message": "Hello, World!" }
//! }
//!
//! GET /hello  ->  200 {"message":"Hello, World!"}
//! ```

pub mod config;
pub mod error;
pub mod matcher;
pub mod mock;
pub mod registry;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ValidationError};
pub use mock::{Mock, MockDefinition};
pub use registry::{AddOutcome, Registry};
pub use server::{create_router, AppState};
