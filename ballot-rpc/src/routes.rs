//! Route handlers for the ballot node API

use crate::error::RpcError;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use ballot_core::{Address, EventSequence, Proposal, ProposalId, SignedCall, VoterRecord};
use ballot_engine::{CallExecutor, CallReceipt, EventRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared state behind the route handlers
pub struct RpcState {
    executor: CallExecutor,
}

impl RpcState {
    pub fn new(executor: CallExecutor) -> Self {
        Self { executor }
    }
}

/// Build the ballot API router
pub fn ballot_routes(state: Arc<RpcState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/calls", post(submit_call_handler))
        .route("/phase", get(phase_handler))
        .route("/winner", get(winner_handler))
        .route("/proposals/count", get(proposal_count_handler))
        .route("/proposals/{id}", get(proposal_handler))
        .route("/voters/{address}", get(voter_handler))
        .route("/events", get(events_handler))
        .with_state(state)
}

/// Asserted caller identity for voter-gated reads. Reads cannot alter
/// state; state-changing calls are signature-proven instead.
#[derive(Deserialize)]
struct CallerQuery {
    caller: String,
}

impl CallerQuery {
    fn address(&self) -> Result<Address, RpcError> {
        Address::from_hex(&self.caller)
            .map_err(|e| RpcError::BadRequest(format!("invalid caller address: {}", e)))
    }
}

#[derive(Deserialize)]
struct EventsQuery {
    /// Return events with a sequence strictly greater than this (default 0)
    since: Option<EventSequence>,
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit_call_handler(
    State(state): State<Arc<RpcState>>,
    Json(signed): Json<SignedCall>,
) -> Result<Json<CallReceipt>, RpcError> {
    let receipt = state.executor.execute(&signed)?;
    Ok(Json(receipt))
}

async fn phase_handler(State(state): State<Arc<RpcState>>) -> Json<Value> {
    let phase = state.executor.ledger().phase();
    Json(json!({
        "phase": phase,
        "phase_code": phase.as_u8(),
    }))
}

async fn winner_handler(State(state): State<Arc<RpcState>>) -> Json<Value> {
    Json(json!({
        "winning_proposal_id": state.executor.ledger().winner(),
    }))
}

async fn proposal_count_handler(State(state): State<Arc<RpcState>>) -> Json<Value> {
    Json(json!({
        "count": state.executor.ledger().proposal_count(),
    }))
}

async fn proposal_handler(
    State(state): State<Arc<RpcState>>,
    Path(id): Path<ProposalId>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<Proposal>, RpcError> {
    let caller = query.address()?;
    let proposal = state.executor.ledger().proposal(caller, id)?;
    Ok(Json(proposal))
}

async fn voter_handler(
    State(state): State<Arc<RpcState>>,
    Path(address): Path<String>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<VoterRecord>, RpcError> {
    let caller = query.address()?;
    let address = Address::from_hex(&address)
        .map_err(|e| RpcError::BadRequest(format!("invalid voter address: {}", e)))?;
    let record = state.executor.ledger().voter_of(caller, address)?;
    Ok(Json(record))
}

async fn events_handler(
    State(state): State<Arc<RpcState>>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let since = query.since.unwrap_or(0);
    Json(state.executor.ledger().events_since(since))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ballot_core::{Call, Keypair};
    use ballot_engine::SharedLedger;
    use tower::util::ServiceExt;

    fn test_router() -> (Router, Keypair) {
        let admin = Keypair::generate();
        let executor = CallExecutor::new(SharedLedger::new(admin.address()));
        let router = ballot_routes(Arc::new(RpcState::new(executor)));
        (router, admin)
    }

    fn signed_call_body(keypair: &Keypair, nonce: u64, call: Call) -> Body {
        let mut signed = SignedCall::new(nonce, call);
        signed.sign(keypair).unwrap();
        Body::from(serde_json::to_vec(&signed).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = test_router();
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_phase_starts_at_registering_voters() {
        let (router, _) = test_router();
        let response = router
            .oneshot(Request::builder().uri("/phase").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["phase"], "registering_voters");
        assert_eq!(body["phase_code"], 0);
    }

    #[tokio::test]
    async fn test_submit_call_and_read_back() {
        let (router, admin) = test_router();
        let voter = Keypair::generate();

        let request = Request::builder()
            .method("POST")
            .uri("/calls")
            .header("content-type", "application/json")
            .body(signed_call_body(
                &admin,
                0,
                Call::RegisterVoter { voter: voter.address() },
            ))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let receipt = body_json(response).await;
        assert_eq!(receipt["operation"], "register_voter");
        assert_eq!(receipt["caller"], admin.address().to_string());

        // The registered voter can read its own record back
        let uri = format!("/voters/{}?caller={}", voter.address(), voter.address());
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let record = body_json(response).await;
        assert_eq!(record["is_registered"], true);
        assert_eq!(record["has_voted"], false);
    }

    #[tokio::test]
    async fn test_engine_rejection_maps_to_error_code() {
        let (router, _admin) = test_router();
        let outsider = Keypair::generate();

        let request = Request::builder()
            .method("POST")
            .uri("/calls")
            .header("content-type", "application/json")
            .body(signed_call_body(&outsider, 0, Call::TallyVotes))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_gated_read_requires_voter() {
        let (router, _admin) = test_router();
        let outsider = Keypair::generate();

        let uri = format!("/proposals/0?caller={}", outsider.address());
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_a_voter");
    }

    #[tokio::test]
    async fn test_bad_caller_address_is_rejected() {
        let (router, _admin) = test_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/proposals/0?caller=nothex")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_events_polling() {
        let (router, admin) = test_router();
        let voter = Keypair::generate();

        for (nonce, call) in [
            (0, Call::RegisterVoter { voter: voter.address() }),
            (1, Call::StartProposalsRegistration),
        ] {
            let request = Request::builder()
                .method("POST")
                .uri("/calls")
                .header("content-type", "application/json")
                .body(signed_call_body(&admin, nonce, call))
                .unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let events = body_json(response).await;
        assert_eq!(events.as_array().unwrap().len(), 2);
        assert_eq!(events[0]["sequence"], 1);
        assert_eq!(events[0]["event"]["event"], "voter_registered");

        // Incremental poll from the last seen sequence
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/events?since=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let tail = body_json(response).await;
        assert_eq!(tail.as_array().unwrap().len(), 1);
        assert_eq!(tail[0]["event"]["event"], "workflow_status_change");
    }
}
