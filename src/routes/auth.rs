// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{clear_session_cookie, create_jwt, session_cookie};
use crate::models::User;
use crate::services::{Credentials, RegisterRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/verification-email", post(resend_verification))
}

/// Acknowledgement with a message for the user.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message: text.to_string(),
    })
}

/// Create the account and send the verification email. No session is issued.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    state.sessions.register(request).await?;
    Ok((
        StatusCode::CREATED,
        message(
            "A verification email has been sent to your email address. \
             Please verify your email before logging in.",
        ),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Sign in a verified user; the session token is returned and set as a cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let signed_in = state.sessions.login(&credentials).await?;

    let token = create_jwt(&signed_in.session, &state.config.jwt_signing_key)
        .map_err(AppError::Internal)?;

    let jar = jar.add(session_cookie(
        token.clone(),
        state.config.secure_cookies(),
    ));

    Ok((
        jar,
        Json(LoginResponse {
            token,
            user: signed_in.user,
        }),
    ))
}

/// Clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        clear_session_cookie(jar, state.config.secure_cookies()),
        StatusCode::NO_CONTENT,
    )
}

#[derive(Deserialize)]
struct PasswordResetRequest {
    #[serde(default)]
    email: String,
}

/// The reply is the same whether or not the account exists.
async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>> {
    state.sessions.request_password_reset(&request.email).await?;
    Ok(message(
        "If an account with this email exists, a password reset link will be sent to your inbox.",
    ))
}

async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<MessageResponse>> {
    state.sessions.resend_verification(&credentials).await?;
    Ok(message("Please check your inbox for the verification email."))
}
