#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::ServiceExt;
use axum::extract::Request;
use axum_client_ip::ClientIpSource;
use tokio::net::TcpListener;
use tower::util::MapRequest;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::JwtKeys;
use crate::pages::AuthProvider;
use crate::pages::Views;
use crate::storage::Storage;
use crate::storage::setup;
use crate::utils::env_var_or_else;

mod api;
mod breakpoints;
mod client_ip;
mod graceful_shutdown;
mod notes;
mod nullable;
mod pages;
mod rewrites;
mod shared_notes;
mod spaces;
mod storage;
#[cfg(test)]
mod tests;
mod users;
mod utils;

const DEFAULT_RUST_LOG: &str = "duoplan=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";
const DEFAULT_AUTH_PROVIDER_URL: &str = "http://localhost:9999/authorize";

/// The app: all routes, behind the rewrites of short public paths
pub type App = MapRequest<Router, fn(Request) -> Request>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app().await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = TcpListener::bind(address).await?;

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(graceful_shutdown::handler())
    .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Storage connection
/// - Identity provider URLs
/// - Templates
pub async fn setup_app() -> Result<App> {
    let storage = setup().await?;
    let jwt_keys = setup_jwt_keys();
    let auth_provider = setup_auth_provider()?;

    create_app(storage, jwt_keys, auth_provider)
}

/// Create the app for Duoplan
///
/// # Errors
///
/// Will return `Err` when the templates do not load
pub fn create_app<S: Storage>(
    storage: S,
    jwt_keys: JwtKeys,
    auth_provider: AuthProvider,
) -> Result<App> {
    let views = Views::new()?;

    let router = Router::new()
        .nest("/api", api::router::<S>())
        .merge(pages::router::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(ClientIpSource::ConnectInfo.into_extension())
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
        .layer(Extension(auth_provider))
        .layer(Extension(views));

    Ok(MapRequest::new(
        router,
        rewrites::rewrite_request as fn(Request) -> Request,
    ))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_jwt_keys() -> JwtKeys {
    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = uuid::Uuid::new_v4().simple().to_string();
        tracing::info!(
            "`JWT_SECRET` is not set, using temporary one; no identity provider token will be accepted"
        );
        jwt_secret
    });

    JwtKeys::new(jwt_secret.as_bytes())
}

fn setup_auth_provider() -> Result<AuthProvider> {
    let provider_url = env_var_or_else("AUTH_PROVIDER_URL", || {
        tracing::info!("`AUTH_PROVIDER_URL` is not set, using {DEFAULT_AUTH_PROVIDER_URL}");
        String::from(DEFAULT_AUTH_PROVIDER_URL)
    });

    let public_url = env_var_or_else("PUBLIC_URL", || {
        let port = std::env::var("PORT").unwrap_or_default();
        if port.is_empty() {
            String::from("http://localhost:6000")
        } else {
            format!("http://localhost:{port}")
        }
    });

    Ok(AuthProvider::new(&provider_url, &public_url)?)
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
