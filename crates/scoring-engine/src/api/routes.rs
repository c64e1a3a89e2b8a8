//! HTTP routes for the scoring API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers::*;
use crate::service::ScoringService;

/// Create the scoring router
///
/// Routes:
/// - GET  /api/v1/scoring/health                 - Health check
/// - POST /api/v1/matches                        - Schedule a match
/// - GET  /api/v1/matches                        - List matches
/// - GET  /api/v1/matches/:match_id              - Full match state
/// - POST /api/v1/matches/:match_id/score        - Flat score request
/// - POST /api/v1/matches/:match_id/commands     - Tagged command
/// - GET  /api/v1/matches/:match_id/live         - WebSocket live feed
pub fn create_router(state: ScoringApiState) -> Router {
    Router::new()
        .route("/api/v1/scoring/health", get(health))
        .route("/api/v1/matches", post(create_match).get(list_matches))
        .route("/api/v1/matches/:match_id", get(get_match))
        .route("/api/v1/matches/:match_id/score", post(submit_score))
        .route("/api/v1/matches/:match_id/commands", post(submit_command))
        .route("/api/v1/matches/:match_id/live", get(live_feed))
        .with_state(state)
}

/// Create the router straight from a service
pub fn create_service_router(service: Arc<ScoringService>) -> Router {
    create_router(ScoringApiState::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScoringEngine;
    use crate::state::MatchState;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use common::{MatchId, PlayerId};
    use futures::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio_tungstenite::{connect_async, tungstenite::Message};
    use tower::ServiceExt;

    fn router() -> (Router, Arc<ScoringService>) {
        let service = Arc::new(ScoringService::in_memory(ScoringEngine::new(), 16));
        (create_service_router(service.clone()), service)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn scheduled(router: &Router) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/api/v1/matches",
            Some(json!({"teamA": "Lions", "teamB": "Tigers"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn ready(router: &Router, id: &str) {
        let uri = format!("/api/v1/matches/{}/score", id);
        let requests = [
            json!({"toss": {"winner": "A", "decision": "BAT"}}),
            json!({"selectBatsman": {"player": {"id": PlayerId::new(), "name": "One"}, "slot": "striker"}}),
            json!({"selectBatsman": {"player": {"id": PlayerId::new(), "name": "Two"}, "slot": "nonStriker"}}),
            json!({"selectBowler": {"id": PlayerId::new(), "name": "Quick"}}),
        ];
        for req in requests {
            let (status, body) = send(router, "POST", &uri, Some(req)).await;
            assert_eq!(status, StatusCode::OK, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = router();
        let (status, body) = send(&router, "GET", "/api/v1/scoring/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_get_list() {
        let (router, _) = router();
        let id = scheduled(&router).await;

        let (status, body) = send(&router, "GET", &format!("/api/v1/matches/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "scheduled");
        assert_eq!(body["teamB"]["name"], "Tigers");

        let (status, body) = send(&router, "GET", "/api/v1/matches", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &router,
            "POST",
            "/api/v1/matches",
            Some(json!({"teamA": "A", "teamB": "B", "sport": "tennis"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_score_flow_and_error_mapping() {
        let (router, _) = router();
        let id = scheduled(&router).await;
        ready(&router, &id).await;
        let uri = format!("/api/v1/matches/{}/score", id);

        let (status, body) = send(&router, "POST", &uri, Some(json!({"team": "A", "runs": 4}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"]["A"]["runs"], 4);
        assert_eq!(body["scores"]["A"]["overs"], 0.1);
        assert_eq!(body["status"], "live");

        let (status, body) = send(&router, "POST", &uri, Some(json!({"team": "A", "runs": 9}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");
        assert_eq!(body["success"], false);

        let (status, _) = send(
            &router,
            "POST",
            &uri,
            Some(json!({"team": "A", "runs": 1, "isUndo": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&router, "POST", &uri, Some(json!({"isUndo": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"]["A"]["runs"], 0);

        let (status, body) = send(&router, "POST", &uri, Some(json!({"isUndo": true}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "no_history");

        let (status, _) = send(
            &router,
            "POST",
            &uri,
            Some(json!({"matchId": MatchId::new(), "team": "A", "runs": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tagged_commands() {
        let (router, _) = router();
        let id = scheduled(&router).await;
        ready(&router, &id).await;
        let uri = format!("/api/v1/matches/{}/commands", id);

        let (status, body) = send(
            &router,
            "POST",
            &uri,
            Some(json!({"type": "ball", "team": "A", "event": {"kind": "extra", "extra": "NOBALL"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"]["A"]["extras"]["noBalls"], 1);

        let (status, _) = send(&router, "POST", &uri, Some(json!({"type": "complete_match"}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, "POST", &uri, Some(json!({"type": "switch_strike"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_state");
    }

    #[tokio::test]
    async fn test_unknown_match_is_not_found() {
        let (router, _) = router();
        let uri = format!("/api/v1/matches/{}", MatchId::new());
        let (status, _) = send(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&router, "POST", &format!("{}/commands", uri), Some(json!({"type": "undo"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_live_feed_pushes_committed_states() {
        let (router, service) = router();
        let created = service.create_match("cricket", "Lions", "Tigers").await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let url = format!("ws://{}/api/v1/matches/{}/live", addr, created.id);
        let (mut ws, _) = connect_async(url).await.unwrap();

        let first = match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str::<MatchState>(&text).unwrap(),
            other => panic!("unexpected message: {:?}", other),
        };
        assert_eq!(first.id, created.id);
        assert_eq!(first.version, 0);

        service
            .submit(
                created.id,
                crate::command::Command::Toss {
                    winner: common::TeamSide::B,
                    decision: crate::state::TossDecision::Bat,
                },
            )
            .await
            .unwrap();

        let pushed = match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str::<MatchState>(&text).unwrap(),
            other => panic!("unexpected message: {:?}", other),
        };
        assert_eq!(pushed.version, 1);
        assert_eq!(pushed.batting, Some(common::TeamSide::B));

        ws.send(Message::Close(None)).await.unwrap();
    }

    async fn serve(router: Router) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_live_feed_on_completed_match_closes() {
        let (router, service) = router();
        let created = service.create_match("cricket", "Lions", "Tigers").await.unwrap();
        service
            .submit(created.id, crate::command::Command::CompleteMatch)
            .await
            .unwrap();
        let addr = serve(router).await;

        let url = format!("ws://{}/api/v1/matches/{}/live", addr, created.id);
        let (mut ws, _) = connect_async(url).await.unwrap();

        let last = match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str::<MatchState>(&text).unwrap(),
            other => panic!("unexpected message: {:?}", other),
        };
        assert!(last.is_completed());

        let next = tokio::time::timeout(std::time::Duration::from_secs(2), ws.next())
            .await
            .expect("feed stayed open");
        assert!(matches!(next, Some(Ok(Message::Close(_))) | None));
    }

    #[tokio::test]
    async fn test_live_feed_for_unknown_match_is_refused() {
        let broadcaster = Arc::new(crate::broadcast::ChannelBroadcaster::new());
        let service = Arc::new(ScoringService::new(
            ScoringEngine::new(),
            Arc::new(crate::store::InMemoryMatchStore::new()),
            broadcaster.clone(),
        ));
        let addr = serve(create_service_router(service.clone())).await;

        for _ in 0..10 {
            let url = format!("ws://{}/api/v1/matches/{}/live", addr, MatchId::new());
            assert!(connect_async(url).await.is_err());
        }
        assert_eq!(broadcaster.channel_count(), 0);
        assert_eq!(service.lock_count(), 0);
    }
}
