//! Routes of the application and the authentication guard.

use std::{fmt::Display, str::FromStr};

/// A page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, the public landing page.
    Home,
    /// `/login`.
    Login,
    /// `/register`.
    Register,
    /// `/dashboard`, where signed-in users land.
    Dashboard,
    /// `/profile`.
    Profile,
    /// `/collections`.
    Collections,
    /// `/ressources`.
    Ressources,
}

impl Route {
    /// Every route, in menu order.
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Profile,
        Route::Collections,
        Route::Ressources,
    ];

    /// Where an authenticated user is sent away from the sign-in pages.
    pub const LANDING: Route = Route::Dashboard;

    /// URL path.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::Collections => "/collections",
            Route::Ressources => "/ressources",
        }
    }

    /// Needs a session.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Profile | Route::Collections | Route::Ressources
        )
    }

    /// Sign-in and sign-up pages, pointless once authenticated.
    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Error returned for a path that names no route.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

/// Where to redirect a visitor of `route`, or `None` to let them in.
///
/// Anonymous visitors of a protected route go to [`Route::Login`];
/// authenticated visitors of an auth page go to [`Route::LANDING`].
pub fn guard(route: Route, authenticated: bool) -> Option<Route> {
    if route.is_protected() && !authenticated {
        Some(Route::Login)
    } else if route.is_auth_page() && authenticated {
        Some(Route::LANDING)
    } else {
        None
    }
}
