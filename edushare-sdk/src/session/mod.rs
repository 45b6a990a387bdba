//! Session store and its storage backends.

pub mod backend;
pub mod core;
pub mod persist;
