//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use audit_trail::AuditTrail;
pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use current_user::SESSION_COOKIE;
pub use current_user::get_current_user;
pub use request::Form;
pub use request::PathParameters;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod audit_trail;
mod breakpoints;
mod current_user;
mod notes;
mod request;
mod response;
mod shared_notes;
mod spaces;
mod users;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let users = Router::new().route("/me", get(users::me::<S>));

    let notes = Router::new()
        .route("/", get(notes::list::<S>).post(notes::create::<S>))
        .route(
            "/{note}",
            get(notes::single::<S>)
                .patch(notes::update::<S>)
                .delete(notes::delete::<S>),
        )
        .route("/{note}/share", post(notes::share::<S>));

    let spaces = Router::new()
        .route("/", get(spaces::list::<S>).post(spaces::create::<S>))
        .route("/{space}", get(spaces::single::<S>))
        .route("/{space}/shared-notes", get(spaces::shared_notes::<S>));

    let shared_notes = Router::new()
        .route("/", get(shared_notes::list::<S>))
        .route("/{shared_note}", get(shared_notes::single::<S>));

    Router::new()
        .nest("/users", users)
        .nest("/notes", notes)
        .nest("/spaces", spaces)
        .nest("/shared-notes", shared_notes)
        .route("/breakpoints", get(breakpoints::current))
}
