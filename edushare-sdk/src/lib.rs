#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod api;
mod client;
pub mod config;
pub mod dispatch;
mod edushare;
pub mod errors;
pub mod forms;
pub mod session;
mod util;
pub mod views;

pub mod prelude;

// --- PUBLIC API EXPORTS ---
// Transport
pub use client::core::{EduHttpClient, EduHttpClientBuilder, DEFAULT_BASE_URL};
pub use client::query::Query;
pub use client::transport::{FileUpload, RequestOptions, Transport};
// Session
pub use session::backend::{MemoryStorage, StorageBackend, StorageEvent};
pub use session::core::{Session, SessionStore};
pub use session::persist::FileStorage;
// High level
pub use dispatch::Dispatcher;
pub use edushare::EduShare;

// Errors
pub use errors::{ApiError, BuildError, Error, Result};

// Re-exports
pub use edushare_common as common;
pub use edushare_common::{Id, Role, User};
pub use reqwest::{Method, StatusCode};
