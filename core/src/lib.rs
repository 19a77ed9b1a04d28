//! Client core for a MongoDB-backed REST storage service.
//!
//! # Overview
//! Maps two resource shapes onto HTTP verbs: simple (singleton) resources
//! and list (collection) resources, each with CRUD plus named `~method`
//! views and operations. Every call resolves to an `Outcome` whose
//! `ResultCode` comes from a fixed status classification table.
//!
//! # Design
//! - `engine` splits each operation into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), so the I/O boundary is explicit and
//!   the FFI layer can let its host do the HTTP round-trip.
//! - `classify` is the status-to-`ResultCode` table; it is the only place
//!   response bodies of error statuses are read.
//! - `resource` glues the engine to a `Transport` and is the single point
//!   where `StorageError`s become `Outcome`s.
//! - Nothing is shared between calls: every value is built per call.
//!
//! # Example
//!
//! ```no_run
//! use remote_storage_core::{Authorization, Cursor, RemoteStorage, ResultCode, UreqTransport};
//! use serde_json::Value;
//!
//! let storage = RemoteStorage::new(
//!     "http://localhost:6666",
//!     Authorization::bearer("abcdef"),
//!     UreqTransport::new(),
//! );
//! let accounts = storage.list::<Value, Value>("accounts");
//! let page = accounts.list(&Cursor::new(0, 20));
//! if page.code() == ResultCode::Ok {
//!     for account in page.elements().unwrap_or_default() {
//!         println!("{account}");
//!     }
//! }
//! ```

pub mod classify;
pub mod codec;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod http;
pub mod outcome;
pub mod resource;
pub mod transport;
pub mod types;

pub use classify::{classify, classify_exchange};
pub use endpoint::Endpoint;
pub use error::{ConnectionError, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::{Outcome, ResultCategory, ResultCode};
pub use resource::{ListResource, NamedCalls, RemoteStorage, SimpleResource};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Args, Authorization, BadRequest, Conflict, Created, Cursor};
