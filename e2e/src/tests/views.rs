use std::sync::Arc;

use edushare::{
    api::auth::Credentials,
    views::{MemoryNavigator, Navigator, Route},
};
use httpmock::prelude::*;
use serde_json::json;

use super::utils::{app_at, signed_in_at, teacher_json, wait_for};

#[tokio::test]
async fn logout_in_one_tab_signs_out_the_others() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/logout");
            then.status(200).json_body(json!({ "message": "Déconnecté" }));
        })
        .await;

    let (first, first_nav) = signed_in_at(&server, Route::Dashboard, "t1");
    let second_nav = MemoryNavigator::starting_at(Route::Collections);
    let second = first.open_tab(Arc::new(second_nav.clone()));
    let watching_first = first.views().watch();
    let watching_second = second.views().watch();

    assert!(second.session().is_authenticated());
    first.auth().logout().await.unwrap();

    assert!(wait_for(&second_nav, Route::Login).await);
    assert!(!second.session().is_authenticated());
    // The tab that logged out ignores its own change.
    assert_eq!(first_nav.history(), vec![Route::Dashboard]);

    watching_first.abort();
    watching_second.abort();
}

#[tokio::test]
async fn login_in_one_tab_leaves_the_login_page_of_the_others() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200)
                .json_body(json!({ "token": "t1", "user": teacher_json() }));
        })
        .await;

    let (first, _) = app_at(&server, Route::Login);
    let second_nav = MemoryNavigator::starting_at(Route::Login);
    let second = first.open_tab(Arc::new(second_nav.clone()));
    let watching = second.views().watch();

    first
        .auth()
        .login(&Credentials::new("marie.curie@lycee.fr", "Secret123"), false)
        .await
        .unwrap();

    assert!(wait_for(&second_nav, Route::Dashboard).await);
    assert_eq!(
        second.auth().current_user().unwrap().unwrap().email,
        "marie.curie@lycee.fr"
    );
    watching.abort();
}

#[tokio::test]
async fn rejection_in_one_tab_reaches_the_others() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/me");
            then.status(401).json_body(json!({ "message": "Token invalide" }));
        })
        .await;

    let (first, first_nav) = signed_in_at(&server, Route::Profile, "t1");
    let second_nav = MemoryNavigator::starting_at(Route::Ressources);
    let second = first.open_tab(Arc::new(second_nav.clone()));
    let watching = second.views().watch();

    let err = first.dispatcher().run(first.auth().me()).await.unwrap_err();
    assert!(err.is_unauthorized());

    assert_eq!(first_nav.current(), Route::Login);
    assert!(wait_for(&second_nav, Route::Login).await);
    assert_eq!(second_nav.visits(Route::Login), 1);
    watching.abort();
}

#[tokio::test]
async fn public_pages_stay_put_on_sign_out() {
    let server = MockServer::start_async().await;
    let (first, _) = signed_in_at(&server, Route::Dashboard, "t1");
    let second_nav = MemoryNavigator::starting_at(Route::Home);
    let second = first.open_tab(Arc::new(second_nav.clone()));
    let views = second.views();

    let mut events = second.session().subscribe();
    first.session().clear().unwrap();
    let event = events.recv().await.unwrap();

    assert_eq!(views.on_storage_event(&event), None);
    assert_eq!(second_nav.history(), vec![Route::Home]);
    assert_eq!(views.enter(Route::Dashboard), Route::Login);
}
