//! Sign in and out
//!
//! Authentication itself happens at the hosted identity provider. It sends the browser back to
//! `/auth/callback` with an access token, which is kept in the session cookie.

use axum::Extension;
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use minijinja::context;
use serde::Deserialize;
use url::Url;

use crate::api::JwtKeys;
use crate::api::SESSION_COOKIE;
use crate::storage::Storage;

use super::AUTH_PATH;
use super::SessionUser;
use super::Views;

/// Where signed in users land
const HOME_PATH: &str = "/notes";

/// The hosted identity provider
#[derive(Clone, Debug)]
pub struct AuthProvider {
    /// Sign-in URL at the provider, including where to send the browser back to
    sign_in_url: Url,
}

impl AuthProvider {
    /// Create the provider from its sign-in URL and the public URL of this app
    ///
    /// # Errors
    ///
    /// Will return `Err` when either URL is invalid
    pub fn new(provider_url: &str, public_url: &str) -> Result<Self, url::ParseError> {
        let callback_url = Url::parse(public_url)?.join("/auth/callback")?;

        let mut sign_in_url = Url::parse(provider_url)?;
        sign_in_url
            .query_pairs_mut()
            .append_pair("redirect_to", callback_url.as_str());

        Ok(Self { sign_in_url })
    }

    /// The URL to send the browser to for signing in
    pub fn sign_in_url(&self) -> &str {
        self.sign_in_url.as_str()
    }
}

/// The sign-in page
///
/// Users with a session go straight to their notes
pub async fn sign_in<S: Storage>(
    Extension(views): Extension<Views>,
    Extension(provider): Extension<AuthProvider>,
    session: Option<SessionUser<S>>,
) -> Response {
    if session.is_some() {
        return Redirect::to(HOME_PATH).into_response();
    }

    views.response(
        "auth.html",
        context! {
            sign_in_url => provider.sign_in_url(),
        },
    )
}

/// Query of the identity provider callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Token of the signed in user, missing when signing in failed
    access_token: Option<String>,
}

/// Return from the identity provider
///
/// A valid token starts the session, anything else goes back to the sign-in page
pub async fn callback(
    Extension(jwt_keys): Extension<JwtKeys>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let Some(access_token) = query.access_token else {
        tracing::debug!("Callback without access token");

        return (jar, Redirect::to(AUTH_PATH));
    };

    if let Err(err) = jwt_keys.decode(&access_token) {
        tracing::debug!("Callback with unusable token: {}", err.message());

        return (jar, Redirect::to(AUTH_PATH));
    }

    let cookie = Cookie::build((SESSION_COOKIE, access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), Redirect::to(HOME_PATH))
}

/// End the session
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let cookie = Cookie::build(SESSION_COOKIE).path("/");

    (jar.remove(cookie), Redirect::to(AUTH_PATH))
}
