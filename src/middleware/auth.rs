// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session middleware and session cookies.

use crate::error::AppError;
use crate::models::Session;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "fitlog_token";

/// Session lifetime in seconds (30 days).
pub const SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider user id)
    pub sub: String,
    /// Email the session was issued for (used for re-authentication)
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Resolve the session from the `fitlog_token` cookie or a bearer token.
pub fn session_from_parts(
    jar: &CookieJar,
    headers: &axum::http::HeaderMap,
    signing_key: &[u8],
) -> Result<Session, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.trim().to_string(),
            None => return Err(AppError::NoSession),
        }
    };

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::InvalidToken
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(Session {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

/// Middleware that requires a valid session.
///
/// The token alone is not enough: the user document must still exist, so
/// tokens issued before an account was deleted stop working.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = session_from_parts(&jar, request.headers(), &state.config.jwt_signing_key)?;
    if state.store.get_user(&session.user_id).await?.is_none() {
        tracing::info!(user_id = %session.user_id, "Rejected session for deleted account");
        return Err(AppError::InvalidToken);
    }
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Create a JWT for a user session.
pub fn create_jwt(session: &Session, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session.user_id.clone(),
        email: session.email.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session cookie holding `token`.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Jar update that expires the session cookie. Attributes match `session_cookie`.
pub fn clear_session_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(time::Duration::ZERO)
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    const KEY: &[u8] = b"unit_test_signing_key_32_bytes!!";

    fn session() -> Session {
        Session {
            user_id: "uid-1".to_string(),
            email: "a@b.co".to_string(),
        }
    }

    #[test]
    fn test_bearer_round_trip() {
        let token = create_jwt(&session(), KEY).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let resolved = session_from_parts(&CookieJar::new(), &headers, KEY).unwrap();
        assert_eq!(resolved, session());
    }

    #[test]
    fn test_missing_and_bad_tokens() {
        let headers = HeaderMap::new();
        assert!(matches!(
            session_from_parts(&CookieJar::new(), &headers, KEY),
            Err(AppError::NoSession)
        ));

        let token = create_jwt(&session(), b"some_other_key_entirely_32_bytes").unwrap();
        let jar = CookieJar::new().add(session_cookie(token, false));
        assert!(matches!(
            session_from_parts(&jar, &headers, KEY),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("t".to_string(), true).to_string();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
    }
}
