#![doc = include_str!("../README.md")]
//!

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod collection;
pub mod comment;
pub mod constants;
pub mod id;
pub mod key;
pub mod password;
pub mod resource;
pub mod user;
pub mod validation;

pub use id::Id;
pub use user::{Role, User};
pub use validation::ValidationError;
