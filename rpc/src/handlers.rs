//! RPC request handlers.

use std::str::FromStr;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use vulcan_service::RegistrationStats;
use vulcan_store::ReferralStats;
use vulcan_types::{Owner, WalletAddress};

use crate::{RpcError, RpcState};

// ── Input normalization ──────────────────────────────────────────────────

/// Trim and lowercase an email; `None` unless it looks like `local@domain`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return None;
    }
    Some(email)
}

/// Owners in paths that are not even well-formed cannot exist.
fn path_owner(raw: &str) -> Result<Owner, RpcError> {
    Owner::from_str(raw).map_err(|_| RpcError::NotFound)
}

fn observed<T: IntoResponse>(
    state: &RpcState,
    route: &str,
    started: Instant,
    result: Result<T, RpcError>,
) -> Response {
    let response = result.into_response();
    state.metrics.observe(
        route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

// ── Registration ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub owner: String,
}

pub async fn register(State(state): State<RpcState>, Json(req): Json<RegisterRequest>) -> Response {
    let started = Instant::now();
    let result = do_register(&state, req).await;
    observed(&state, "register", started, result)
}

async fn do_register(
    state: &RpcState,
    req: RegisterRequest,
) -> Result<Json<RegisterResponse>, RpcError> {
    let email = normalize_email(&req.email)
        .ok_or_else(|| RpcError::InvalidRequest("invalid email".into()))?;
    let address = WalletAddress::new(req.address.trim());
    let referral_code = req
        .referral_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let owner = state.service.register(&email, &address, referral_code).await?;
    state.metrics.registrations.inc();
    Ok(Json(RegisterResponse {
        owner: owner.to_string(),
    }))
}

pub async fn confirm(
    State(state): State<RpcState>,
    Path((owner, code)): Path<(String, String)>,
) -> Response {
    let started = Instant::now();
    let result = do_confirm(&state, &owner, &code).await;
    observed(&state, "confirm", started, result)
}

async fn do_confirm(state: &RpcState, owner: &str, code: &str) -> Result<StatusCode, RpcError> {
    let owner = path_owner(owner)?;
    state.service.confirm(&owner, code).await?;
    state.metrics.confirmations.inc();
    Ok(StatusCode::OK)
}

// ── Testnet faucet ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TestnetStakeRequest {
    pub address: String,
}

pub async fn testnet_stake(
    State(state): State<RpcState>,
    Json(req): Json<TestnetStakeRequest>,
) -> Response {
    let started = Instant::now();
    let result = do_testnet_stake(&state, &req).await;
    observed(&state, "testnet_stake", started, result)
}

async fn do_testnet_stake(
    state: &RpcState,
    req: &TestnetStakeRequest,
) -> Result<Json<RegisterResponse>, RpcError> {
    let address = WalletAddress::new(req.address.trim());
    let owner = state.service.grant_testnet_stake(&address).await?;
    Ok(Json(RegisterResponse {
        owner: owner.to_string(),
    }))
}

// ── Referrals ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TrackReferralRequest {
    pub owner: String,
    pub referral_code: String,
}

pub async fn track_referral(
    State(state): State<RpcState>,
    Json(req): Json<TrackReferralRequest>,
) -> Response {
    let started = Instant::now();
    let result = do_track_referral(&state, &req).await;
    observed(&state, "referral_track", started, result)
}

async fn do_track_referral(
    state: &RpcState,
    req: &TrackReferralRequest,
) -> Result<StatusCode, RpcError> {
    let owner = path_owner(&req.owner)?;
    state
        .service
        .track_referral(&owner, req.referral_code.trim())
        .await?;
    Ok(StatusCode::OK)
}

pub async fn referral_installed(
    State(state): State<RpcState>,
    Path(owner): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = do_referral_installed(&state, &owner).await;
    observed(&state, "referral_installed", started, result)
}

async fn do_referral_installed(state: &RpcState, owner: &str) -> Result<StatusCode, RpcError> {
    let owner = path_owner(owner)?;
    state.service.mark_installed(&owner).await?;
    Ok(StatusCode::OK)
}

pub async fn referral_stats(
    State(state): State<RpcState>,
    Path(owner): Path<String>,
) -> Response {
    let started = Instant::now();
    let result = do_referral_stats(&state, &owner);
    observed(&state, "referral_stats", started, result)
}

fn do_referral_stats(state: &RpcState, owner: &str) -> Result<Json<ReferralStats>, RpcError> {
    let owner = Owner::from_str(owner).map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    Ok(Json(state.service.referral_stats(&owner)?))
}

pub async fn registration_stats(State(state): State<RpcState>) -> Response {
    let started = Instant::now();
    let result: Result<Json<RegistrationStats>, RpcError> = state
        .service
        .registration_stats()
        .map(Json)
        .map_err(RpcError::from);
    observed(&state, "registration_stats", started, result)
}

// ── Operations ───────────────────────────────────────────────────────────

pub async fn health(State(state): State<RpcState>) -> Response {
    match state.service.ping().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

pub async fn metrics(State(state): State<RpcState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => RpcError::Server(e.to_string()).into_response(),
    }
}
