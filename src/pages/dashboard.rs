//! Dashboard pages, laid out for the device class of the client

use std::sync::Arc;

use axum::Extension;
use axum::extract::Path;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use minijinja::Value;
use minijinja::context;

use crate::breakpoints::BreakpointObserver;
use crate::breakpoints::SharedViewport;
use crate::breakpoints::Viewport;
use crate::storage::Storage;

use super::SessionUser;
use super::Views;
use super::internal_error;

/// Sections below `/dashboard/user`
const USER_SECTIONS: [&str; 5] = [
    "account",
    "notifications",
    "billing",
    "feedback",
    "support",
];

/// Ask browsers to send their viewport width on next requests
const ACCEPT_CH: (&str, &str) = ("accept-ch", "Sec-CH-Viewport-Width");

/// Layout until the browser reports its viewport width, the `0` placeholder is no measurement
const UNMEASURED_LAYOUT: &str = "full";

/// Notes of the signed in user
pub async fn notes<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(views): Extension<Views>,
    SessionUser { user, .. }: SessionUser<S>,
    headers: HeaderMap,
) -> Response {
    let notes = match storage.find_all_notes_by_user(&user).await {
        Ok(notes) => notes,
        Err(err) => return internal_error(err),
    };

    render(
        &views,
        &headers,
        "notes.html",
        context! {
            user => user,
            notes => notes,
        },
    )
}

/// Notes shared with the signed in user, and the spaces they share
pub async fn shared_notes<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(views): Extension<Views>,
    SessionUser { user, .. }: SessionUser<S>,
    headers: HeaderMap,
) -> Response {
    let shared_notes = match storage.find_all_shared_notes_by_recipient(&user).await {
        Ok(shared_notes) => shared_notes,
        Err(err) => return internal_error(err),
    };

    let spaces = match storage.find_all_spaces_by_user(&user).await {
        Ok(spaces) => spaces,
        Err(err) => return internal_error(err),
    };

    render(
        &views,
        &headers,
        "shared_notes.html",
        context! {
            user => user,
            shared_notes => shared_notes,
            spaces => spaces,
        },
    )
}

/// Account related sections
pub async fn user_section<S: Storage>(
    Extension(views): Extension<Views>,
    SessionUser { user, .. }: SessionUser<S>,
    Path(section): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !USER_SECTIONS.contains(&section.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    render(
        &views,
        &headers,
        "user_section.html",
        context! {
            user => user,
            section => section,
        },
    )
}

/// Render a page with the layout for the breakpoints of the client
///
/// Without a viewport width the page gets the full layout with all navigation
fn render(views: &Views, headers: &HeaderMap, template: &str, page: Value) -> Response {
    let viewport = SharedViewport::from_client_hints(headers)
        .map(|viewport| Arc::new(viewport) as Arc<dyn Viewport>);

    let observer = BreakpointObserver::activate(viewport);
    let breakpoints = observer.breakpoints();
    let measured = observer.is_measured();

    let layout = if measured {
        breakpoints.device_class().as_str()
    } else {
        UNMEASURED_LAYOUT
    };

    let response = views.response(
        template,
        context! {
            layout => layout,
            compact => measured && breakpoints.is_mobile,
            breakpoints => breakpoints,
            measured => measured,
            ..page
        },
    );

    ([ACCEPT_CH], response).into_response()
}
