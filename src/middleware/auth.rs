//! Login token authentication middleware.
//!
//! This middleware intercepts every request to:
//! 1. Extract the login token from the Authorization header or `token` query parameter
//! 2. Hash it and look up the matching user
//! 3. Inject the current user into the request when found
//!
//! `require_user` then rejects requests without a user on routes that need one.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// The signed-in user, attached to request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
}

/// SHA-256 hex digest of a login token, as stored in `users.login_token_hash`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Value of the `token` query parameter, if any.
pub fn query_token(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolve the current user without rejecting anonymous requests.
///
/// # Flow
///
/// 1. Take `Authorization: Bearer <token>`, falling back to `?token=<token>`
/// 2. Hash the token using SHA-256
/// 3. Look up the user with that hash
/// 4. If found: inject `CurrentUser`; either way call the next handler
pub async fn load_current_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).or_else(|| query_token(request.uri()));

    if let Some(token) = token {
        let user = state.store.user_by_token_hash(&hash_token(&token)).await?;
        match user {
            Some(user) => {
                request.extensions_mut().insert(CurrentUser {
                    user_id: user.id,
                    email: user.email,
                });
            }
            None => tracing::debug!("Login token did not match any user"),
        }
    }

    Ok(next.run(request).await)
}

/// Reject requests that carry no signed-in user with HTTP 401.
pub async fn require_user(request: Request, next: Next) -> Result<Response, AppError> {
    if request.extensions().get::<CurrentUser>().is_none() {
        return Err(AppError::Unauthenticated);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_query_token() {
        let uri: Uri = "/sixways/start?token=a%2Bb&x=1".parse().unwrap();
        assert_eq!(query_token(&uri).as_deref(), Some("a+b"));

        let empty: Uri = "/sixways/start?token=".parse().unwrap();
        assert_eq!(query_token(&empty), None);

        let none: Uri = "/sixways/start".parse().unwrap();
        assert_eq!(query_token(&none), None);
    }
}
