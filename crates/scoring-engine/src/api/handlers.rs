//! HTTP API handlers for the scoring engine

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};
use common::MatchId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::command::{Command, ScoreRequest};
use crate::error::ScoringError;
use crate::service::{ScoringService, Subscription};
use crate::state::{MatchState, MatchSummary, SPORT_CRICKET};

/// State shared by all scoring handlers
#[derive(Clone)]
pub struct ScoringApiState {
    pub service: Arc<ScoringService>,
}

impl ScoringApiState {
    pub fn new(service: Arc<ScoringService>) -> Self {
        Self { service }
    }
}

/// Request to schedule a match
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub team_a: String,
    pub team_b: String,
    #[serde(default)]
    pub sport: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "scoring",
    })
}

/// Schedule a new match
pub async fn create_match(
    State(state): State<ScoringApiState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchState>), ApiError> {
    let sport = req.sport.as_deref().unwrap_or(SPORT_CRICKET);
    let created = state
        .service
        .create_match(sport, req.team_a, req.team_b)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_matches(
    State(state): State<ScoringApiState>,
) -> Result<Json<Vec<MatchSummary>>, ApiError> {
    Ok(Json(state.service.list_matches().await?))
}

pub async fn get_match(
    State(state): State<ScoringApiState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchState>, ApiError> {
    Ok(Json(state.service.get_match(match_id).await?))
}

/// Flat score request
pub async fn submit_score(
    State(state): State<ScoringApiState>,
    Path(match_id): Path<MatchId>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<MatchState>, ApiError> {
    if let Some(body_id) = req.match_id {
        if body_id != match_id {
            return Err(ScoringError::validation(format!(
                "matchId {} does not match path {}",
                body_id, match_id
            ))
            .into());
        }
    }
    let command = Command::try_from(req)?;
    Ok(Json(state.service.submit(match_id, command).await?))
}

/// Tagged command
pub async fn submit_command(
    State(state): State<ScoringApiState>,
    Path(match_id): Path<MatchId>,
    Json(command): Json<Command>,
) -> Result<Json<MatchState>, ApiError> {
    Ok(Json(state.service.submit(match_id, command).await?))
}

/// WebSocket feed: the current state on connect, then every committed state
///
/// A completed match gets its final state and an immediate Close.
pub async fn live_feed(
    ws: WebSocketUpgrade,
    State(state): State<ScoringApiState>,
    Path(match_id): Path<MatchId>,
) -> Result<Response, ApiError> {
    let Subscription { current, updates } = state.service.subscribe(match_id).await?;
    Ok(ws.on_upgrade(move |socket| stream_match(socket, current, updates)))
}

async fn stream_match(
    mut socket: WebSocket,
    current: MatchState,
    updates: Option<broadcast::Receiver<Arc<MatchState>>>,
) {
    let match_id = current.id;
    debug!(match_id = %match_id, "Live feed connected");
    if !send_state(&mut socket, &current).await {
        return;
    }
    let Some(mut rx) = updates else {
        let _ = socket.send(Message::Close(None)).await;
        debug!(match_id = %match_id, "Live feed closed on completed match");
        return;
    };

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(next) => {
                    if !send_state(&mut socket, &next).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(match_id = %match_id, skipped, "Live feed lagging");
                }
                Err(RecvError::Closed) => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!(match_id = %match_id, "Live feed disconnected");
}

async fn send_state(socket: &mut WebSocket, state: &MatchState) -> bool {
    let text = match serde_json::to_string(state) {
        Ok(text) => text,
        Err(err) => {
            warn!(match_id = %state.id, error = %err, "Failed to serialize state");
            return true;
        }
    };
    socket.send(Message::Text(text)).await.is_ok()
}
