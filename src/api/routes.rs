//! HTTP API route definitions.

use axum::{middleware, routing::get, Router};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tower_http::trace::TraceLayer;

use super::handlers::{all, not_found, search, server_time, status, AppState};
use super::logging::log_requests;

/// A routable endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Endpoint {
    /// `GET /{ns}/server`
    Server,
    /// `GET /{ns}/status`
    Status,
    /// `GET /{ns}/all`
    All,
    /// `GET /{ns}/search?date=`
    Search,
}

impl Endpoint {
    /// Route path under `namespace`.
    pub fn path(&self, namespace: &str) -> String {
        format!("/{}/{}", namespace, self)
    }
}

/// Endpoints the service exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet(Vec<Endpoint>);

impl EndpointSet {
    /// Every endpoint.
    pub fn all() -> Self {
        Self(Endpoint::iter().collect())
    }

    /// Parse endpoint names, ignoring blanks and duplicates.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut endpoints = Vec::new();
        for name in names.iter().map(|n| n.as_ref().trim()).filter(|n| !n.is_empty()) {
            let endpoint = name
                .parse::<Endpoint>()
                .map_err(|_| format!("unknown endpoint `{}`", name))?;
            if !endpoints.contains(&endpoint) {
                endpoints.push(endpoint);
            }
        }

        if endpoints.is_empty() {
            return Err("ENDPOINTS must name at least one endpoint".to_string());
        }

        Ok(Self(endpoints))
    }

    /// Whether `endpoint` is enabled.
    pub fn contains(&self, endpoint: Endpoint) -> bool {
        self.0.contains(&endpoint)
    }

    /// Enabled endpoints in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.0.iter().copied()
    }
}

impl Default for EndpointSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Create the API router for the configured endpoint set.
pub fn create_router(state: AppState) -> Router {
    let namespace = state.settings.namespace.clone();
    let endpoints = state.settings.endpoints.clone();

    let mut router: Router<AppState> = Router::new();
    for endpoint in endpoints.iter() {
        let path = endpoint.path(&namespace);
        router = match endpoint {
            Endpoint::Server => router.route(&path, get(server_time)),
            Endpoint::Status => router.route(&path, get(status)),
            Endpoint::All => router.route(&path, get(all)),
            Endpoint::Search => router.route(&path, get(search)),
        };
    }

    router
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
