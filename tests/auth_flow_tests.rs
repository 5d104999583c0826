// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Sign-up, sign-in and session restore against the fake backend.

mod common;

use common::FakeBackend;
use serena_care::error::AppError;
use serena_care::models::{SignInForm, SignUpForm, UserRole};
use serena_care::services::auth::{DUPLICATE_EMAIL_MESSAGE, INVALID_CREDENTIALS_MESSAGE};
use serena_care::session::AuthState;
use std::sync::Arc;

fn sign_up_form(email: &str) -> SignUpForm {
    SignUpForm {
        name: "Carla Souza".to_string(),
        email: email.to_string(),
        password: "s3cret".to_string(),
        role: UserRole::Caregiver,
    }
}

#[tokio::test]
async fn test_sign_up_then_sign_in_yields_same_user() {
    let backend = FakeBackend::spawn().await;
    let (app, _store) = backend.client();

    let created = app
        .session
        .sign_up(&sign_up_form("carla@care.com"))
        .await
        .unwrap();
    assert_eq!(created.role, UserRole::Caregiver);
    assert!(app.session.state().is_authenticated());

    app.session.logout();

    let signed_in = app
        .session
        .sign_in(&SignInForm {
            email: "carla@care.com".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(signed_in.id, created.id);
    assert_eq!(app.session.storage().user(), Some(signed_in));
    assert!(app.session.storage().token().is_some());
}

#[tokio::test]
async fn test_wrong_password_is_rejected_without_token() {
    let backend = FakeBackend::spawn().await;
    backend.seed_user("Dr. Alice", "alice@doctor.com", "right", "doctor");
    let (app, store) = backend.client();
    app.session.restore();

    let err = app
        .session
        .sign_in(&SignInForm {
            email: "alice@doctor.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        AppError::Authentication(msg) => assert_eq!(msg, INVALID_CREDENTIALS_MESSAGE),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(app.session.state(), AuthState::Unauthenticated);
    assert_eq!(app.session.token(), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_gets_friendly_message() {
    let backend = FakeBackend::spawn().await;
    backend.seed_user("Carla", "carla@care.com", "pw", "caregiver");
    let (app, _store) = backend.client();

    let err = app
        .session
        .sign_up(&sign_up_form("carla@care.com"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), DUPLICATE_EMAIL_MESSAGE);
}

#[tokio::test]
async fn test_incomplete_forms_send_nothing() {
    let backend = FakeBackend::spawn().await;
    let (app, _store) = backend.client();

    let err = app
        .session
        .sign_in(&SignInForm {
            email: String::new(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut form = sign_up_form("not-an-email");
    let err = app.session.sign_up(&form).await.unwrap_err();
    assert_eq!(err.user_message(), "Enter a valid e-mail address.");

    form.email = "carla@care.com".to_string();
    form.name = String::new();
    let err = app.session.sign_up(&form).await.unwrap_err();
    assert_eq!(err.user_message(), "Fill in all fields.");

    assert_eq!(backend.requests(), 0);
}

#[tokio::test]
async fn test_session_restores_in_a_new_client() {
    let backend = FakeBackend::spawn().await;
    let (app, store) = backend.client();
    let user = app
        .session
        .sign_up(&sign_up_form("carla@care.com"))
        .await
        .unwrap();

    let restarted = backend.client_with_store(Arc::new(store));
    assert_eq!(restarted.session.state(), AuthState::Loading);
    assert_eq!(restarted.session.restore(), AuthState::Authenticated(user));
    assert_eq!(restarted.session.token(), app.session.token());
}
