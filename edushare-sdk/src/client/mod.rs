pub mod core;
pub mod query;
pub mod transport;
