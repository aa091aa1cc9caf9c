//! Mounting actions on an axum router.
//!
//! Every request to a mounted action goes through the same explicit pipeline:
//! negotiate → run action → filter → render.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use axum::Router;
use percent_encoding::percent_decode_str;

use crate::config::{ResponseConfig, ServiceConfig};
use crate::http::request::{is_secure, request_id, RenderContext};
use crate::negotiation::negotiator::path_extension;
use crate::negotiation::{Format, Negotiator, RepresentationKind};
use crate::observability::metrics;
use crate::service::action::{Action, ActionRequest};
use crate::service::error_result::ErrorResultFactory;
use crate::service::filter::ResultFilter;

/// Read-only settings shared by every request.
#[derive(Clone)]
pub struct ServiceState {
    inner: Arc<ServiceSettings>,
}

struct ServiceSettings {
    filter: ResultFilter,
    response: ResponseConfig,
    tls_enabled: bool,
    path_extension: bool,
}

impl ServiceState {
    pub fn filter(&self) -> &ResultFilter {
        &self.inner.filter
    }

    pub fn response(&self) -> &ResponseConfig {
        &self.inner.response
    }
}

struct MountedAction {
    method: MethodFilter,
    path: String,
    name: Arc<str>,
    action: Arc<dyn Action>,
}

/// Builder collecting named actions before producing an axum router.
pub struct ServiceRouter {
    filter: ResultFilter,
    response: ResponseConfig,
    tls_enabled: bool,
    path_extension: bool,
    actions: Vec<MountedAction>,
}

impl ServiceRouter {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            filter: ResultFilter::new(Negotiator::new(config.negotiation.clone())),
            response: config.response.clone(),
            tls_enabled: config.listener.tls.is_some(),
            path_extension: config.negotiation.path_extension,
            actions: Vec::new(),
        }
    }

    /// Translate action faults into the given error payload.
    pub fn with_error_result(mut self, factory: ErrorResultFactory) -> Self {
        self.filter = self.filter.with_error_result(factory);
        self
    }

    /// Mount an action. `name` becomes the download filename stem.
    pub fn action<A: Action>(mut self, method: MethodFilter, path: &str, name: &str, action: A) -> Self {
        self.actions.push(MountedAction {
            method,
            path: path.to_string(),
            name: Arc::from(name),
            action: Arc::new(action),
        });
        self
    }

    pub fn get<A: Action>(self, path: &str, name: &str, action: A) -> Self {
        self.action(MethodFilter::GET, path, name, action)
    }

    pub fn post<A: Action>(self, path: &str, name: &str, action: A) -> Self {
        self.action(MethodFilter::POST, path, name, action)
    }

    pub fn into_router(self) -> Router {
        let state = ServiceState {
            inner: Arc::new(ServiceSettings {
                filter: self.filter,
                response: self.response,
                tls_enabled: self.tls_enabled,
                path_extension: self.path_extension,
            }),
        };

        let mut router = Router::new();
        for mounted in self.actions {
            let paths = mounted_paths(&mounted.path, self.path_extension);
            tracing::debug!(action = %mounted.name, paths = ?paths, "Mounting action");

            if mounted.path.contains('{') {
                let handler = {
                    let name = mounted.name.clone();
                    let action = mounted.action.clone();
                    move |State(state): State<ServiceState>,
                          Path(params): Path<HashMap<String, String>>,
                          request: Request| {
                        let name = name.clone();
                        let action = action.clone();
                        async move { dispatch(state, &name, action, params, request).await }
                    }
                };
                for path in &paths {
                    router = router.route(path, on(mounted.method, handler.clone()));
                }
            } else {
                let handler = {
                    let name = mounted.name.clone();
                    let action = mounted.action.clone();
                    move |State(state): State<ServiceState>, request: Request| {
                        let name = name.clone();
                        let action = action.clone();
                        async move { dispatch(state, &name, action, HashMap::new(), request).await }
                    }
                };
                for path in &paths {
                    router = router.route(path, on(mounted.method, handler.clone()));
                }
            }
        }

        router.with_state(state)
    }
}

/// The path itself plus one route per format extension for static paths.
fn mounted_paths(path: &str, path_extension: bool) -> Vec<String> {
    let mut paths = vec![path.to_string()];
    if path_extension && !path.contains('{') && !path.ends_with('/') {
        paths.extend(
            Format::ALL
                .iter()
                .map(|f| f.extension())
                .chain(["html"])
                .map(|ext| format!("{path}.{ext}")),
        );
    }
    paths
}

/// `/products/7.json` captures `7.json`; actions see `7`.
///
/// Only the parameter captured from the last path segment is touched.
fn strip_format_extension(params: &mut HashMap<String, String>, path: &str) {
    let Some(ext) = path_extension(path).filter(|ext| RepresentationKind::from_extension(ext).is_some())
    else {
        return;
    };
    let Some(segment) = path.rsplit('/').next() else {
        return;
    };
    let segment = percent_decode_str(segment).decode_utf8_lossy();
    let suffix = format!(".{ext}");

    if let Some(value) = params.values_mut().find(|value| **value == *segment) {
        value.truncate(value.len() - suffix.len());
    }
}

async fn dispatch(
    state: ServiceState,
    name: &str,
    action: Arc<dyn Action>,
    mut params: HashMap<String, String>,
    request: Request,
) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let kind = state.filter().on_action_executing(&parts);
    let secure = is_secure(
        &parts,
        state.inner.tls_enabled,
        state.response().trust_forwarded_proto,
    );
    let callback = state.filter().negotiator().callback_name(&parts.uri);
    if state.inner.path_extension {
        strip_format_extension(&mut params, parts.uri.path());
    }
    metrics::record_negotiation(kind);

    tracing::debug!(
        request_id = %request_id(&parts),
        action = %name,
        kind = %kind,
        secure,
        "Dispatching action"
    );

    let body = match axum::body::to_bytes(body, state.response().max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(action = %name, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let request = ActionRequest {
        kind,
        method: parts.method.clone(),
        uri: parts.uri.clone(),
        headers: parts.headers.clone(),
        params,
        body,
    };

    let outcome = action.call(request).await;
    metrics::record_action(name, start);

    let result = match state.filter().on_action_executed(kind, outcome) {
        Ok(result) => result,
        Err(fault) => return fault.into_response(),
    };

    let ctx = RenderContext::new(name, secure, state.response()).with_callback(callback);
    result.render(&ctx)
}
