//! Breakpoints of the requesting client

use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;

use crate::breakpoints::BreakpointObserver;
use crate::breakpoints::Breakpoints;
use crate::breakpoints::DeviceClass;
use crate::breakpoints::SharedViewport;
use crate::breakpoints::Viewport;

use super::Error;
use super::Success;

/// Breakpoints of a client, with how they came about
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointsResponse {
    /// Width and its classification
    #[serde(flatten)]
    pub breakpoints: Breakpoints,

    /// The one device class that applies
    pub device_class: DeviceClass,

    /// `false` when the client sent no viewport width and `width` is a placeholder
    pub is_measured: bool,
}

/// Classify the viewport the client reports through its client hints
///
/// Request:
/// ```sh
/// curl -v -H 'Sec-CH-Viewport-Width: 800' http://localhost:6000/api/breakpoints
/// ```
///
/// Response:
/// ```json
/// { "data": { "width": 800, "isMobile": false, "isTablet": true, "isDesktop": false, ... } }
/// ```
pub async fn current(headers: HeaderMap) -> Result<Success<BreakpointsResponse>, Error> {
    let viewport = SharedViewport::from_client_hints(&headers)
        .map(|viewport| Arc::new(viewport) as Arc<dyn Viewport>);

    let observer = BreakpointObserver::activate(viewport);
    let breakpoints = observer.breakpoints();

    Ok(Success::ok(BreakpointsResponse {
        breakpoints,
        device_class: breakpoints.device_class(),
        is_measured: observer.is_measured(),
    }))
}
