use crate::archive::GameRecord;
use crate::session::SessionManager;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::TcpListener;

#[derive(Serialize)]
struct PastGame {
    id: u64,
    #[serde(flatten)]
    record: GameRecord,
}

pub fn make_router(manager: &'static SessionManager) -> Router {
    Router::new()
        .route("/sessions", get(get_sessions))
        .route("/pastgames", get(get_past_games))
        .with_state(manager)
}

/// Serves the statistics API until the listener fails.
pub async fn serve(manager: &'static SessionManager, port: u16) {
    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), port);
    let Ok(listener) = TcpListener::bind(addr).await else {
        log::error!("Could not bind API to address: {:?}", addr);
        return;
    };
    log::info!("API listening on: {:?}", addr);
    if let Err(err) = axum::serve(listener, make_router(manager)).await {
        log::error!("API server stopped: {}", err);
    }
}

async fn get_sessions(State(manager): State<&'static SessionManager>) -> Json<Value> {
    Json(json!({
        "num_sessions": manager.num_games()
    }))
}

async fn get_past_games(State(manager): State<&'static SessionManager>) -> Json<Value> {
    let games: Vec<_> = manager
        .past_games()
        .into_iter()
        .map(|(id, record)| PastGame { id, record })
        .collect();

    Json(json!({
        "games": games
    }))
}
