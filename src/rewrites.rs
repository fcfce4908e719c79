//! Short public paths for dashboard pages
//!
//! The browser keeps showing the short path; the request is routed to the internal page.

use axum::extract::Request;
use axum::http::Uri;
use axum::http::uri::PathAndQuery;

/// Public path and the internal path it is served from
const REWRITES: [(&str, &str); 7] = [
    ("/notes", "/dashboard/notes"),
    ("/shared-notes", "/dashboard/shared-notes"),
    ("/account", "/dashboard/user/account"),
    ("/notifications", "/dashboard/user/notifications"),
    ("/billing", "/dashboard/user/billing"),
    ("/feedback", "/dashboard/user/feedback"),
    ("/support", "/dashboard/user/support"),
];

/// Internal path for a public path, only exact matches are rewritten
pub fn rewrite_path(path: &str) -> Option<&'static str> {
    REWRITES
        .iter()
        .find(|(public, _)| *public == path)
        .map(|(_, internal)| *internal)
}

/// Rewrite the URI of a request, keeping its query
pub fn rewrite_request(mut request: Request) -> Request {
    let Some(internal) = rewrite_path(request.uri().path()) else {
        return request;
    };

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{internal}?{query}"),
        None => internal.to_string(),
    };

    let mut parts = request.uri().clone().into_parts();
    match path_and_query.parse::<PathAndQuery>() {
        Ok(path_and_query) => parts.path_and_query = Some(path_and_query),
        Err(err) => {
            tracing::warn!("Could not rewrite `{}`: {err}", request.uri());

            return request;
        }
    }

    match Uri::from_parts(parts) {
        Ok(uri) => {
            tracing::debug!("Rewriting `{}` to `{uri}`", request.uri());

            *request.uri_mut() = uri;
        }
        Err(err) => tracing::warn!("Could not rewrite `{}`: {err}", request.uri()),
    }

    request
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_rewrite_path() {
        assert_eq!(Some("/dashboard/notes"), rewrite_path("/notes"));
        assert_eq!(
            Some("/dashboard/shared-notes"),
            rewrite_path("/shared-notes")
        );
        assert_eq!(Some("/dashboard/user/billing"), rewrite_path("/billing"));
        assert_eq!(Some("/dashboard/user/support"), rewrite_path("/support"));
    }

    #[test]
    fn test_rewrite_path_exact_only() {
        assert_eq!(None, rewrite_path("/notes/"));
        assert_eq!(None, rewrite_path("/notes/123"));
        assert_eq!(None, rewrite_path("/api/notes"));
        assert_eq!(None, rewrite_path("/dashboard/notes"));
        assert_eq!(None, rewrite_path("/"));
    }

    #[test]
    fn test_rewrite_request_keeps_query() {
        let rewritten = rewrite_request(request("/account?tab=profile"));

        assert_eq!("/dashboard/user/account?tab=profile", rewritten.uri().to_string());
    }

    #[test]
    fn test_rewrite_request_untouched() {
        let rewritten = rewrite_request(request("/api/notes?limit=2"));

        assert_eq!("/api/notes?limit=2", rewritten.uri().to_string());
    }
}
