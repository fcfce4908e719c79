//! Dashboard pages
//!
//! Server rendered pages for browsers. Pages need a session; without one the browser is sent to
//! the sign-in page at [`AUTH_PATH`].

use std::convert::Infallible;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::extract::OptionalFromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum::routing::get;
use minijinja::Environment;
use serde::Serialize;

pub use auth::AuthProvider;

use crate::api::get_current_user;
use crate::storage::Storage;
use crate::users::User;

mod auth;
mod dashboard;

/// Entry point for signing in
pub const AUTH_PATH: &str = "/auth";

/// Templates, embedded in the binary
const TEMPLATES: [(&str, &str); 5] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("auth.html", include_str!("../../templates/auth.html")),
    ("notes.html", include_str!("../../templates/notes.html")),
    (
        "shared_notes.html",
        include_str!("../../templates/shared_notes.html"),
    ),
    (
        "user_section.html",
        include_str!("../../templates/user_section.html"),
    ),
];

/// Get the Axum router for all pages
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/", get(root))
        .route(AUTH_PATH, get(auth::sign_in::<S>))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/dashboard/notes", get(dashboard::notes::<S>))
        .route("/dashboard/shared-notes", get(dashboard::shared_notes::<S>))
        .route(
            "/dashboard/user/{section}",
            get(dashboard::user_section::<S>),
        )
}

/// The dashboard is where it starts
async fn root() -> Redirect {
    Redirect::to("/notes")
}

/// Template rendering
#[derive(Clone)]
pub struct Views {
    /// Environment holding the templates
    env: Arc<Environment<'static>>,
}

impl Views {
    /// Load all templates
    ///
    /// # Errors
    ///
    /// Will return `Err` when a template does not parse
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env: Arc::new(env) })
    }

    /// Render a template into an HTML response
    pub fn response<D: Serialize>(&self, name: &str, data: D) -> Response {
        match self.render(name, data) {
            Ok(html) => Html(html).into_response(),
            Err(err) => internal_error(err),
        }
    }

    fn render<D: Serialize>(&self, name: &str, data: D) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(name)?;

        template.render(data)
    }
}

/// The user of a page session
///
/// Rejects with a redirect to the sign-in page when there is no session
pub struct SessionUser<S: Storage> {
    /// The signed in user
    pub user: User,

    /// The storage the user came from
    storage: PhantomData<S>,
}

impl<S: Storage> SessionUser<S> {
    fn new(user: User) -> Self {
        Self {
            user,
            storage: PhantomData,
        }
    }
}

impl<B, S> FromRequestParts<B> for SessionUser<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &B) -> Result<Self, Self::Rejection> {
        if let Some(user) = get_current_user::<S>(parts).await {
            Ok(Self::new(user))
        } else {
            tracing::debug!(
                "No session for {}, redirecting to {AUTH_PATH}",
                parts.uri.path()
            );

            Err(Redirect::to(AUTH_PATH))
        }
    }
}

impl<B, S> OptionalFromRequestParts<B> for SessionUser<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &B,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(get_current_user::<S>(parts).await.map(Self::new))
    }
}

/// Utility function for mapping any error into a `500 Internal Server Error`
/// response.
fn internal_error<E>(err: E) -> Response
where
    E: std::fmt::Display,
{
    tracing::error!("Could not build page: {err}");

    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}
