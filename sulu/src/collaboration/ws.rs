// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::registry::{CollaborationRegistry, Collaborator, ResourceRef};
use crate::app_state::AppState;
use crate::util::next_connection_id;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use actix_ws::{AggregatedMessage, AggregatedMessageStream, Session};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const WS_MAX_MESSAGE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationCommand {
    Enter,
    Update,
    Leave,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationMessage {
    pub command: CollaborationCommand,
    #[serde(rename = "type")]
    pub resource_key: String,
    pub id: String,
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationReply {
    pub command: CollaborationCommand,
    #[serde(rename = "type")]
    pub resource_key: String,
    pub id: String,
    pub connection_id: u32,
    pub collaborators: Vec<Collaborator>,
}

/// Applies one client message and builds the answer for it.
pub fn apply_message(
    registry: &CollaborationRegistry,
    connection_id: u32,
    raw: &str,
) -> Result<(ResourceRef, CollaborationReply), String> {
    let message: CollaborationMessage =
        serde_json::from_str(raw).map_err(|err| format!("Invalid collaboration message: {}", err))?;
    let resource = ResourceRef::new(&message.resource_key, &message.id);
    let collaborators = match message.command {
        CollaborationCommand::Enter => {
            registry.enter(&resource, connection_id, &message.user_id, &message.username)
        }
        CollaborationCommand::Update => {
            registry.update(&resource, connection_id, &message.user_id, &message.username)
        }
        CollaborationCommand::Leave => registry.leave(&resource, connection_id),
    };
    let reply = CollaborationReply {
        command: message.command,
        resource_key: message.resource_key,
        id: message.id,
        connection_id,
        collaborators,
    };
    Ok((resource, reply))
}

pub async fn collaboration_ws(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    log::debug!("Collaboration WS connection starting");
    let (response, session, message_stream) = actix_ws::handle(&req, stream)?;
    let message_stream = message_stream
        .max_frame_size(WS_MAX_MESSAGE_BYTES)
        .aggregate_continuations()
        .max_continuation_size(WS_MAX_MESSAGE_BYTES);
    let registry = app_state.collaboration.clone();
    let interval = Duration::from_secs(app_state.config.collaboration.interval_seconds.max(1));

    actix_web::rt::spawn(async move {
        if let Err(err) = handle_ws_session(session, message_stream, registry, interval).await {
            log::warn!("Collaboration WS session ended: {}", err);
        }
    });

    Ok(response)
}

async fn handle_ws_session(
    mut session: Session,
    mut messages: AggregatedMessageStream,
    registry: Arc<CollaborationRegistry>,
    interval: Duration,
) -> Result<(), String> {
    let connection_id = next_connection_id();
    log::debug!("Collaboration WS session {} started", connection_id);
    let mut entered: BTreeSet<ResourceRef> = BTreeSet::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    let result = loop {
        tokio::select! {
            message = messages.next() => {
                let Some(message) = message else {
                    break Ok(());
                };
                let message = match message {
                    Ok(message) => message,
                    Err(err) => break Err(format!("WS error: {}", err)),
                };
                match message {
                    AggregatedMessage::Text(text) => {
                        match apply_message(&registry, connection_id, &text) {
                            Ok((resource, reply)) => {
                                if reply.command == CollaborationCommand::Leave {
                                    entered.remove(&resource);
                                } else {
                                    entered.insert(resource);
                                }
                                if let Err(err) = send_json(&mut session, &reply).await {
                                    break Err(err);
                                }
                            }
                            Err(err) => {
                                log::warn!("Collaboration WS message rejected: {}", err);
                                let body = serde_json::json!({ "error": err });
                                if let Err(err) = send_json(&mut session, &body).await {
                                    break Err(err);
                                }
                            }
                        }
                    }
                    AggregatedMessage::Ping(bytes) => {
                        if let Err(err) = session.pong(&bytes).await {
                            break Err(err.to_string());
                        }
                    }
                    AggregatedMessage::Close(_) => break Ok(()),
                    _ => {}
                }
            }
            _ = ticker.tick() => {
                // Push the current list so clients notice users that left or expired.
                let mut failed = None;
                for resource in &entered {
                    let reply = CollaborationReply {
                        command: CollaborationCommand::Update,
                        resource_key: resource.resource_key.clone(),
                        id: resource.id.clone(),
                        connection_id,
                        collaborators: registry.list(resource),
                    };
                    if let Err(err) = send_json(&mut session, &reply).await {
                        failed = Some(err);
                        break;
                    }
                }
                if let Some(err) = failed {
                    break Err(err);
                }
            }
        }
    };

    registry.leave_all(connection_id);
    log::info!("Collaboration WS session {} closed", connection_id);
    result
}

async fn send_json<T: Serialize>(session: &mut Session, value: &T) -> Result<(), String> {
    let text = serde_json::to_string(value).map_err(|err| err.to_string())?;
    session.text(text).await.map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_leave_messages_update_registry() {
        let registry = CollaborationRegistry::new(Duration::from_secs(60));
        let enter = r#"{"command":"enter","type":"pages","id":"abc","userId":"7","username":"max"}"#;
        let (resource, reply) = apply_message(&registry, 3, enter).unwrap();
        assert_eq!(resource, ResourceRef::new("pages", "abc"));
        assert_eq!(reply.collaborators.len(), 1);

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "pages");
        assert_eq!(json["connectionId"], 3);
        assert_eq!(json["collaborators"][0]["username"], "max");

        let leave = r#"{"command":"leave","type":"pages","id":"abc","userId":"7","username":"max"}"#;
        let (_, reply) = apply_message(&registry, 3, leave).unwrap();
        assert!(reply.collaborators.is_empty());
    }

    #[test]
    fn malformed_messages_are_rejected() {
        let registry = CollaborationRegistry::new(Duration::from_secs(60));
        assert!(apply_message(&registry, 1, "{}").is_err());
        assert!(apply_message(&registry, 1, r#"{"command":"lock","type":"pages","id":"a","userId":"1","username":"x"}"#).is_err());
    }
}
