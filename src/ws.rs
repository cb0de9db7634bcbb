use crate::{
    client::{Client, GameAction},
    error::ValidationError,
    game::GameOptions,
    session::SessionManager,
};
use futures_util::{SinkExt, StreamExt, TryStreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

#[derive(Error, Debug)]
enum WsError {
    #[error("violation of the application-layer protocol")]
    ProtocolError,
}

pub async fn accept_connection(stream: TcpStream, manager: &SessionManager) {
    log::info!("Accepted new connection");

    let Ok(stream) = tokio_tungstenite::accept_async(stream).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, mut read) = stream.split();

    let mut client = Client::new(manager);

    loop {
        tokio::select! {
            msg = read.try_next() => {
                let Ok(Some(Message::Text(msg))) = msg else {
                    break;
                };
                let Ok(req) = serde_json::from_str::<Value>(&msg) else {
                    log::error!("Invalid JSON received: {}", &msg);
                    break;
                };
                let Ok(req) = parse_request(&req) else {
                    log::error!("Invalid message received: {}", &msg);
                    break;
                };
                let reply = match process_request(req, &mut client) {
                    Ok(Some(reply)) => format_reply(reply),
                    Ok(None) => continue,
                    Err(err) => {
                        log::warn!("Rejected action: {}", err);
                        json!({
                            "type": "error",
                            "error": err.to_string()
                        })
                    }
                };
                write.send(Message::Text(reply.to_string())).await.ok();
            },
            state = client.next_state() => {
                let reply = json!({
                    "type": "update",
                    "state": state
                });
                if write.send(Message::Text(reply.to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            }
        }
    }

    client.leave();
    log::info!("Connection closed");
}

/// A message sent by a game client to the server.
#[derive(Debug, PartialEq)]
enum Request {
    CreateGame { options: GameOptions },
    Join { game_id: String },
    Leave,
    Heartbeat,
    Action(GameAction),
}

/// A message sent by the server to a game client.
enum Response {
    GameCreated { game_id: String },
    GameJoined { game_id: String },
}

/// Parses a websockets message from the client.
fn parse_request(req: &Value) -> Result<Request, WsError> {
    match req["type"].as_str().unwrap_or("") {
        "create_game" => {
            let options = match (&req["preset"], &req["options"]) {
                (Value::String(preset), _) => GameOptions::preset(preset).ok_or(WsError::ProtocolError)?,
                (_, Value::Null) => GameOptions::default(),
                (_, options) => serde_json::from_value(options.clone()).map_err(|_| WsError::ProtocolError)?,
            };
            Ok(Request::CreateGame { options })
        }
        "join" => {
            let game_id = req["gameId"]
                .as_str()
                .ok_or(WsError::ProtocolError)?
                .to_ascii_uppercase();
            Ok(Request::Join { game_id })
        }
        "leave" => Ok(Request::Leave),
        "heartbeat" => Ok(Request::Heartbeat),
        _ => serde_json::from_value(req.clone())
            .map(Request::Action)
            .map_err(|_| WsError::ProtocolError),
    }
}

/// Processes a request from the client.
fn process_request(req: Request, client: &mut Client) -> Result<Option<Response>, ValidationError> {
    match req {
        Request::CreateGame { options } => {
            let game_id = client.create_game(options)?;
            return Ok(Some(Response::GameCreated { game_id }));
        }
        Request::Join { game_id } => {
            client.join(&game_id)?;
            return Ok(Some(Response::GameJoined { game_id }));
        }
        Request::Leave => client.leave(),
        Request::Heartbeat => client.heartbeat(),
        Request::Action(action) => client.perform(action)?,
    }
    Ok(None)
}

/// Formats a reply to the client to be sent over websockets.
fn format_reply(res: Response) -> Value {
    match res {
        Response::GameCreated { game_id } => json!({
            "type": "game_created",
            "gameId": game_id
        }),
        Response::GameJoined { game_id } => json!({
            "type": "game_joined",
            "gameId": game_id
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::options::AwardMode;

    #[test]
    fn create_game_defaults_its_options() {
        let req = parse_request(&json!({ "type": "create_game" })).unwrap();
        assert_eq!(req, Request::CreateGame { options: GameOptions::default() });
    }

    #[test]
    fn create_game_accepts_partial_options() {
        let req = parse_request(&json!({
            "type": "create_game",
            "options": { "startingScore": 1, "awardMode": "multi" }
        }))
        .unwrap();
        let Request::CreateGame { options } = req else {
            panic!("expected create_game");
        };
        assert_eq!(options.starting_score, 1);
        assert_eq!(options.award_mode, AwardMode::Multi);
        assert_eq!(options.win_threshold, GameOptions::default().win_threshold);
    }

    #[test]
    fn create_game_accepts_a_preset() {
        let req = parse_request(&json!({ "type": "create_game", "preset": "levels" })).unwrap();
        assert_eq!(req, Request::CreateGame { options: GameOptions::levels() });
        assert!(parse_request(&json!({ "type": "create_game", "preset": "turbo" })).is_err());
    }

    #[test]
    fn join_upper_cases_the_game_id() {
        let req = parse_request(&json!({ "type": "join", "gameId": "abcd" })).unwrap();
        assert_eq!(req, Request::Join { game_id: "ABCD".into() });
        assert!(parse_request(&json!({ "type": "join" })).is_err());
    }

    #[test]
    fn game_actions_are_passed_through() {
        let req = parse_request(&json!({ "type": "skip_turn" })).unwrap();
        assert_eq!(req, Request::Action(GameAction::SkipTurn));
    }

    #[test]
    fn unknown_messages_are_protocol_errors() {
        assert!(parse_request(&json!({ "type": "bogus" })).is_err());
        assert!(parse_request(&json!({})).is_err());
    }

    #[test]
    fn replies_are_tagged() {
        let reply = format_reply(Response::GameCreated { game_id: "ABCD".into() });
        assert_eq!(reply, json!({ "type": "game_created", "gameId": "ABCD" }));
    }
}
