use std::sync::Arc;

use edushare::{
    api::ListOptions,
    errors::Error,
    views::{MemoryNavigator, Route},
    EduShare, StatusCode,
};
use httpmock::prelude::*;
use serde_json::json;

use super::utils::{app_at, init_tracing, signed_in_at, teacher};

#[tokio::test]
async fn rejected_session_is_cleared_and_redirected_once() {
    let server = MockServer::start_async().await;
    let my = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/collections/my");
            then.status(401).json_body(json!({ "message": "Token expiré" }));
        })
        .await;

    let (app, navigator) = signed_in_at(&server, Route::Collections, "expired");
    let dispatcher = app.dispatcher();
    let collections = app.collections();

    let err = dispatcher
        .run(collections.my(&ListOptions::default()))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Token expiré");
    assert!(!app.session().is_authenticated());
    assert_eq!(app.session().user().unwrap(), None);
    assert_eq!(navigator.history(), vec![Route::Collections, Route::Login]);

    // Already on the login page: the second rejection does not navigate again.
    let err = dispatcher
        .run(collections.my(&ListOptions::default()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(navigator.visits(Route::Login), 1);
    assert_eq!(my.hits_async().await, 2);
}

#[tokio::test]
async fn parallel_rejections_redirect_once() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/me");
            then.status(401).json_body(json!({ "message": "Token invalide" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/ressources/my");
            then.status(401).json_body(json!({ "message": "Token invalide" }));
        })
        .await;

    let (app, navigator) = signed_in_at(&server, Route::Dashboard, "t1");
    let dispatcher = app.dispatcher();
    let auth = app.auth();
    let resources = app.resources();

    let options = ListOptions::default();
    let (me, mine) = tokio::join!(
        dispatcher.run(auth.me()),
        dispatcher.run(resources.my(&options)),
    );
    assert!(me.unwrap_err().is_unauthorized());
    assert!(mine.unwrap_err().is_unauthorized());
    assert_eq!(navigator.visits(Route::Login), 1);
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn validate_key_rejection_does_not_redirect() {
    let server = MockServer::start_async().await;
    let check = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/auth/validate-key/PROF_2024_ABC123");
            then.status(401).json_body(json!({ "message": "Clé expirée" }));
        })
        .await;

    let (app, navigator) = app_at(&server, Route::Register);
    let mut form = app.register_form();
    form.set_field("registration_key", "PROF_2024_ABC123").unwrap();

    let err = form.check_key(&app.auth()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(form.error("registration_key"), Some("Clé expirée"));
    assert_eq!(navigator.history(), vec![Route::Register]);
    check.assert_async().await;
}

#[tokio::test]
async fn malformed_key_is_never_sent() {
    let server = MockServer::start_async().await;
    let check = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/api/auth/validate-key/");
            then.status(200).json_body(json!({ "valid": true }));
        })
        .await;

    let (app, _) = app_at(&server, Route::Register);
    let err = app.auth().validate_key("prof_2024_abc123").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(err.field().as_deref(), Some("registration_key"));
    assert_eq!(check.hits_async().await, 0);
}

#[tokio::test]
async fn other_failures_keep_the_session() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/collections/3");
            then.status(403).json_body(json!({ "message": "Accès refusé" }));
        })
        .await;

    let (app, navigator) = signed_in_at(&server, Route::Collections, "t1");
    let err = app
        .dispatcher()
        .run(app.collections().delete(3))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    let api = err.api_error().unwrap();
    assert_eq!(api.status, 403);
    assert_eq!(api.message, "Accès refusé");
    assert!(app.session().is_authenticated());
    assert_eq!(navigator.history(), vec![Route::Collections]);
}

#[tokio::test]
async fn unreachable_backend_is_a_connection_error() {
    init_tracing();
    let navigator = MemoryNavigator::starting_at(Route::Dashboard);
    let app = EduShare::new("http://127.0.0.1:1/api")
        .unwrap()
        .with_navigator(Arc::new(navigator.clone()));
    app.session().set("t1", &teacher()).unwrap();

    let err = app.dispatcher().run(app.auth().me()).await.unwrap_err();
    let api = err.api_error().unwrap();
    assert_eq!(api.message, "connection error");
    assert_eq!(api.status, 500);
    assert!(app.session().is_authenticated());
    assert_eq!(navigator.history(), vec![Route::Dashboard]);
}
