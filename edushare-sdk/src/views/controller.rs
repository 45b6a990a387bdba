//! Page navigation driven by the session.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError},
};

use edushare_common::constants::storage_keys;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use super::router::{guard, Route};
use crate::session::{backend::StorageEvent, core::SessionStore};

/// Whatever displays pages: a browser history, a terminal UI, a test double.
pub trait Navigator: Send + Sync + Debug {
    /// Page currently shown.
    fn current(&self) -> Route;

    /// Shows `route`.
    fn navigate(&self, route: Route);
}

/// [`Navigator`] that only records the pages it was sent to.
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl MemoryNavigator {
    /// Navigator showing `start`.
    pub fn starting_at(start: Route) -> Self {
        Self {
            history: Arc::new(Mutex::new(vec![start])),
        }
    }

    /// Every page shown so far, oldest first.
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times `route` was navigated to, the start page included.
    pub fn visits(&self, route: Route) -> usize {
        self.history().iter().filter(|r| **r == route).count()
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Route {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(Route::Home)
    }

    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

/// Keeps the shown page consistent with the session.
///
/// [`ViewController::enter`] guards every navigation. [`ViewController::watch`]
/// follows token changes made through other [`SessionStore`] handles on the
/// same storage (other tabs) and redirects when they sign in or out.
#[derive(Debug, Clone)]
pub struct ViewController {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ViewController {
    /// Controller over `session`, showing pages through `navigator`.
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// The navigator pages are shown through.
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Navigates to `route`, or to where the guard redirects it. Returns the
    /// page actually shown.
    pub fn enter(&self, route: Route) -> Route {
        let target = guard(route, self.session.is_authenticated()).unwrap_or(route);
        if target != route {
            tracing::debug!(from = %route, to = %target, "route guarded");
        }
        self.navigator.navigate(target);
        target
    }

    /// Reacts to one storage change. Returns the redirect it performed.
    ///
    /// Changes made through this controller's own session handle are
    /// ignored: whoever made them already navigated.
    pub fn on_storage_event(&self, event: &StorageEvent) -> Option<Route> {
        if event.origin == self.session.origin() || event.key != storage_keys::AUTH_TOKEN {
            return None;
        }
        let current = self.navigator.current();
        let redirect = guard(current, event.new_value.is_some())?;
        tracing::info!(from = %current, to = %redirect, "session changed in another tab");
        self.navigator.navigate(redirect);
        Some(redirect)
    }

    /// Spawns a task applying [`ViewController::on_storage_event`] to every
    /// change of the shared storage. Abort the handle to stop watching.
    pub fn watch(&self) -> JoinHandle<()> {
        let mut events = self.session.subscribe();
        let controller = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        controller.on_storage_event(&event);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "storage events dropped, re-checking the current page");
                        controller.enter(controller.navigator.current());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
