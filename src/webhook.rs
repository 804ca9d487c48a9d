// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface cert-manager talks to.
//!
//! cert-manager reaches the solver through the Kubernetes API aggregation
//! layer, which forwards to these routes:
//!
//! - `POST /apis/{group}/v1alpha1/{solver}` - handle a `ChallengeReview`
//! - `GET /apis/{group}/v1alpha1` - API discovery
//! - `GET /healthz` - liveness
//! - `GET /metrics` - Prometheus metrics
//!
//! TLS is terminated in front of this router.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::challenge::{ChallengeAction, ChallengeResponse, ChallengeReview};
use crate::constants::{
    CHALLENGE_REVIEW_API_VERSION, CHALLENGE_REVIEW_KIND, MAX_REVIEW_BODY_BYTES, SOLVER_API_VERSION,
};
use crate::metrics::gather_metrics;
use crate::solver::Solver;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    /// API group the solver is registered under
    pub group_name: String,
    /// The solver handling challenges
    pub solver: Arc<dyn Solver>,
}

/// Build the webhook router.
pub fn create_router(state: WebhookState) -> Router {
    Router::new()
        .route("/apis/{group}/{version}", get(discovery))
        .route("/apis/{group}/{version}/{resource}", post(handle_review))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(MAX_REVIEW_BODY_BYTES))
        .with_state(state)
}

fn is_served(state: &WebhookState, group: &str, version: &str) -> bool {
    group == state.group_name && version == SOLVER_API_VERSION
}

/// Advertise the solver resource for API discovery.
async fn discovery(
    State(state): State<WebhookState>,
    Path((group, version)): Path<(String, String)>,
) -> Response {
    if !is_served(&state, &group, &version) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let name = state.solver.name();
    Json(json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": format!("{group}/{version}"),
        "resources": [{
            "name": name,
            "singularName": name,
            "namespaced": false,
            "kind": "ChallengePayload",
            "verbs": ["create"]
        }]
    }))
    .into_response()
}

/// Decode a `ChallengeReview`, run the requested action and echo the review back.
async fn handle_review(
    State(state): State<WebhookState>,
    Path((group, version, resource)): Path<(String, String, String)>,
    body: Bytes,
) -> Response {
    if !is_served(&state, &group, &version) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let review: ChallengeReview = match serde_json::from_slice(&body) {
        Ok(review) => review,
        Err(e) => {
            warn!(error = %e, "Rejecting malformed ChallengeReview");
            return (StatusCode::BAD_REQUEST, format!("malformed ChallengeReview: {e}"))
                .into_response();
        }
    };

    let Some(request) = review.request else {
        warn!("Rejecting ChallengeReview without a request");
        return (StatusCode::BAD_REQUEST, "ChallengeReview has no request").into_response();
    };

    debug!(
        uid = %request.uid,
        action = request.action.as_str(),
        solver = %resource,
        "Received ChallengeReview"
    );

    let response = if resource == state.solver.name() {
        let result = match request.action {
            ChallengeAction::Present => state.solver.present(&request).await,
            ChallengeAction::CleanUp => state.solver.cleanup(&request).await,
        };
        match result {
            Ok(()) => ChallengeResponse::success(&request.uid),
            Err(e) => {
                error!(uid = %request.uid, error = %e, "Challenge request failed");
                ChallengeResponse::from_error(&request.uid, &e)
            }
        }
    } else {
        warn!(solver = %resource, "No solver registered under this name");
        ChallengeResponse::failure(
            &request.uid,
            "UnknownSolver",
            format!("no solver named '{resource}' is registered"),
        )
    };

    Json(ChallengeReview {
        api_version: CHALLENGE_REVIEW_API_VERSION.to_string(),
        kind: CHALLENGE_REVIEW_KIND.to_string(),
        request: Some(request),
        response: Some(response),
    })
    .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics() -> Response {
    match gather_metrics() {
        Ok(text) => text.into_response(),
        Err(e) => {
            error!(error = %e, "Failed to gather metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
