//! View controllers: which page to show given the session.

pub mod controller;
pub mod router;

pub use controller::{MemoryNavigator, Navigator, ViewController};
pub use router::{guard, Route, UnknownRoute};
