use std::sync::{Arc, Once};
use std::time::Duration;

use edushare::{
    views::{MemoryNavigator, Route},
    EduHttpClient, EduShare, SessionStore, User,
};
use httpmock::MockServer;
use serde_json::{json, Value};

static TRACING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("TRACING").unwrap_or_else(|_| "info".to_string()))
            // Use with_test_writer to ensure logs are captured correctly by the test runner.
            .with_test_writer()
            .init();
    });
}

/// A teacher as the backend sends it.
pub fn teacher_json() -> Value {
    json!({
        "id": 1,
        "email": "marie.curie@lycee.fr",
        "nom": "Curie",
        "prenom": "Marie",
        "role": "professeur",
        "matiere": "Physique"
    })
}

pub fn teacher() -> User {
    serde_json::from_value(teacher_json()).unwrap()
}

/// Client of `server` with an in-memory session, shown at `start`.
pub fn app_at(server: &MockServer, start: Route) -> (EduShare, MemoryNavigator) {
    init_tracing();
    let navigator = MemoryNavigator::starting_at(start);
    let app = EduShare::with_parts(
        EduHttpClient::new(server.url("/api")).unwrap(),
        SessionStore::in_memory(),
        Arc::new(navigator.clone()),
    );
    (app, navigator)
}

/// Same as [`app_at`], already signed in with `token`.
pub fn signed_in_at(server: &MockServer, start: Route, token: &str) -> (EduShare, MemoryNavigator) {
    let (app, navigator) = app_at(server, start);
    app.session().set(token, &teacher()).unwrap();
    (app, navigator)
}

/// Waits until `navigator` shows `route`, for at most two seconds.
pub async fn wait_for(navigator: &MemoryNavigator, route: Route) -> bool {
    for _ in 0..200 {
        if edushare::views::Navigator::current(navigator) == route {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
