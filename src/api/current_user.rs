//! Current user service
//!
//! Get the current user from the request, based on the token issued by the identity provider.
//! The token is read from the `Authorization` header or, for browsers, from the session cookie.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::Deserialize;
use uuid::Uuid;

use crate::storage::Storage;
use crate::storage::UpsertUserValues;
use crate::users::User;

use super::Error;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "duoplan_session";

/// The key used for decoding JWT tokens
///
/// Tokens are issued by the identity provider, signed with the shared secret
#[derive(Clone)]
pub struct JwtKeys {
    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create a new decoding key, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Decode and validate a token
    pub fn decode(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::default();
        // identity providers set their own audience, it is not checked
        validation.validate_aud = false;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| Error::forbidden(format!("Invalid token: {err}")))
    }
}

/// The JWT claims to identify a user
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// The user ID
    pub sub: Uuid,

    /// Timestamp the token expires at
    #[allow(dead_code)] // checked by the validation
    pub exp: i64,

    /// Email address, if the identity provider shares it
    #[serde(default)]
    pub email: Option<String>,
}

/// Read the raw token from the request
///
/// The `Authorization` header wins over the session cookie
async fn extract_token(parts: &mut Parts) -> Option<String> {
    if let Ok(TypedHeader(Authorization(bearer))) =
        parts.extract::<TypedHeader<Authorization<Bearer>>>().await
    {
        return Some(bearer.token().to_string());
    }

    let Ok(jar) = parts.extract::<CookieJar>().await;

    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve the user of a token
///
/// Users are registered on first sight
async fn resolve_user<S: Storage>(parts: &mut Parts, token: &str) -> Result<User, Error> {
    let Extension(jwt_keys) = parts
        .extract::<Extension<JwtKeys>>()
        .await
        .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

    let Extension(storage) = parts
        .extract::<Extension<S>>()
        .await
        .map_err(|_| Error::internal_server_error("Could not get a storage pool"))?;

    let claims = jwt_keys.decode(token)?;

    let values = UpsertUserValues {
        id: &claims.sub,
        email: claims.email.as_deref(),
    };

    let user = storage.upsert_user(&values).await?;

    Ok(user)
}

/// Get the current user of a request, if there is a valid session
///
/// A missing or invalid session is not an error, the caller decides what to do without a user
pub async fn get_current_user<S: Storage>(parts: &mut Parts) -> Option<User> {
    let token = extract_token(parts).await?;

    match resolve_user::<S>(parts, &token).await {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::debug!("Ignoring session: {}", err.message());
            None
        }
    }
}

/// Current user service
pub struct CurrentUser<S: Storage> {
    /// The actual user
    user: Arc<User>,

    /// The storage the user came from
    storage: PhantomData<S>,
}

impl<S: Storage> CurrentUser<S> {
    /// Create the current user from a user
    pub fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
            storage: PhantomData,
        }
    }
}

impl<S: Storage> Clone for CurrentUser<S> {
    fn clone(&self) -> Self {
        Self {
            user: Arc::clone(&self.user),
            storage: PhantomData,
        }
    }
}

impl<S: Storage> Deref for CurrentUser<S> {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<B, S> FromRequestParts<B> for CurrentUser<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &B) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .await
            .ok_or_else(|| Error::forbidden("Missing API token"))?;

        let user = resolve_user::<S>(parts, &token).await?;

        Ok(CurrentUser::new(user))
    }
}
