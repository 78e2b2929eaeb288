//! RPC error mapping
//!
//! Every engine rejection surfaces to the client as a distinct, stable
//! error code; presentation is the client's job.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ballot_engine::EngineError;
use serde_json::json;
use thiserror::Error;

/// RPC-level error type
#[derive(Error, Debug)]
pub enum RpcError {
    /// An engine rejection, passed through with its own code
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Malformed request input (bad address hex, bad parameters)
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl RpcError {
    /// Stable machine-readable code for the error
    pub fn code(&self) -> &'static str {
        match self {
            RpcError::Engine(err) => match err {
                EngineError::Unauthorized { .. } => "unauthorized",
                EngineError::PhaseMismatch { .. } => "phase_mismatch",
                EngineError::AlreadyRegistered(_) => "already_registered",
                EngineError::NotAVoter(_) => "not_a_voter",
                EngineError::EmptyProposal => "empty_proposal",
                EngineError::AlreadyVoted(_) => "already_voted",
                EngineError::ProposalNotFound(_) => "proposal_not_found",
                EngineError::InvalidNonce { .. } => "invalid_nonce",
                EngineError::Core(_) => "invalid_call",
            },
            RpcError::BadRequest(_) => "bad_request",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            RpcError::Engine(err) => match err {
                EngineError::Unauthorized { .. } | EngineError::NotAVoter(_) => {
                    StatusCode::FORBIDDEN
                }
                EngineError::PhaseMismatch { .. }
                | EngineError::AlreadyRegistered(_)
                | EngineError::AlreadyVoted(_)
                | EngineError::InvalidNonce { .. } => StatusCode::CONFLICT,
                EngineError::EmptyProposal => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::ProposalNotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Core(_) => StatusCode::BAD_REQUEST,
            },
            RpcError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_core::Address;

    #[test]
    fn test_error_codes() {
        let err = RpcError::from(EngineError::EmptyProposal);
        assert_eq!(err.code(), "empty_proposal");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = RpcError::from(EngineError::NotAVoter(Address::zero()));
        assert_eq!(err.code(), "not_a_voter");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = RpcError::BadRequest("nope".to_string());
        assert_eq!(err.code(), "bad_request");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
