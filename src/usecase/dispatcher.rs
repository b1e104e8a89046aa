//! Event dispatcher: binds each inbound message type to its middleware chain
//! and handler.
//!
//! The mapping from message type to descriptor is static and resolved at
//! compile time, not rebuilt per connection. Dispatch builds a fresh request
//! context from the event's room-id / path arguments, runs the middleware
//! pipeline in order, and invokes the handler only if the status is still
//! clean. Failures of any kind are reported to the originating connection
//! only and never escape the dispatch boundary.

use std::sync::Arc;

use crate::domain::{ClientId, MessagePusher, NodePath, RoomId, SessionRegistry};
use crate::infrastructure::dto::websocket::{ClientEvent, EventKind, ServerEvent};

use super::context::RequestContext;
use super::document::DocumentUseCase;
use super::middleware::Middleware;
use super::presence::PresenceUseCase;
use super::room_session::RoomSessionUseCase;

/// Per-message-type record: the ordered middleware chain run before the
/// handler
#[derive(Debug, Clone, Copy)]
pub struct HandlerDescriptor {
    pub middlewares: &'static [Middleware],
}

/// Resolve the handler descriptor for a message type
pub fn descriptor(kind: EventKind) -> &'static HandlerDescriptor {
    match kind {
        EventKind::RoomCreate => &HandlerDescriptor { middlewares: &[] },
        EventKind::RoomJoin => &HandlerDescriptor {
            middlewares: &[Middleware::Room],
        },
        EventKind::FileCreate => &HandlerDescriptor {
            middlewares: &[Middleware::Room],
        },
        EventKind::FolderCreate => &HandlerDescriptor {
            middlewares: &[Middleware::Room],
        },
        EventKind::FileSelect => &HandlerDescriptor {
            middlewares: &[Middleware::Room, Middleware::File { optional: true }],
        },
        EventKind::FolderSelect => &HandlerDescriptor {
            middlewares: &[Middleware::Room, Middleware::Folder { optional: true }],
        },
        EventKind::FileContentChange => &HandlerDescriptor {
            middlewares: &[Middleware::Room, Middleware::File { optional: false }],
        },
        EventKind::NodeRename => &HandlerDescriptor {
            middlewares: &[Middleware::Room, Middleware::Node],
        },
        EventKind::CursorMove => &HandlerDescriptor {
            middlewares: &[Middleware::Room],
        },
        EventKind::MousePosition => &HandlerDescriptor {
            middlewares: &[Middleware::Room],
        },
        EventKind::CodeExecute => &HandlerDescriptor {
            middlewares: &[Middleware::Room],
        },
    }
}

/// Routes inbound client events through validation to the use-case handlers
pub struct EventDispatcher {
    registry: Arc<dyn SessionRegistry>,
    pusher: Arc<dyn MessagePusher>,
    room_session: RoomSessionUseCase,
    document: DocumentUseCase,
    presence: PresenceUseCase,
}

impl EventDispatcher {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        pusher: Arc<dyn MessagePusher>,
        room_session: RoomSessionUseCase,
        document: DocumentUseCase,
        presence: PresenceUseCase,
    ) -> Self {
        Self {
            registry,
            pusher,
            room_session,
            document,
            presence,
        }
    }

    /// Handle one inbound event to completion.
    ///
    /// Never fails outward: every error ends up as an `error` message to the
    /// sender, or in the log when even that cannot be delivered.
    pub async fn dispatch(&self, sender: &ClientId, event: ClientEvent) {
        let kind = event.kind();
        tracing::debug!("Dispatching {:?} from '{}'", kind, sender.as_str());

        // 1. build the request context from the event's arguments
        let mut ctx = match Self::build_context(sender, &event) {
            Ok(ctx) => ctx,
            Err(message) => {
                self.report_error(sender, &message).await;
                return;
            }
        };

        // 2. run the middleware chain in declared order
        for middleware in descriptor(kind).middlewares {
            middleware.run(self.registry.as_ref(), &mut ctx).await;
            if !ctx.ok() {
                break;
            }
        }

        if !ctx.ok() {
            let message = ctx
                .error
                .take()
                .unwrap_or_else(|| "Request failed".to_string());
            tracing::debug!(
                "{:?} from '{}' rejected by middleware: {}",
                kind,
                sender.as_str(),
                message
            );
            self.report_error(sender, &message).await;
            return;
        }

        // 3. invoke the handler
        let result = match event {
            ClientEvent::RoomCreate => self.room_session.create(sender).await,
            ClientEvent::RoomJoin { .. } => self.room_session.join(&ctx).await,
            ClientEvent::FileCreate { .. } => self.document.create_file(&ctx).await,
            ClientEvent::FolderCreate { .. } => self.document.create_folder(&ctx).await,
            ClientEvent::FileSelect { .. } => self.document.select_file(&ctx).await,
            ClientEvent::FolderSelect { .. } => self.document.select_folder(&ctx).await,
            ClientEvent::FileContentChange {
                content,
                cursor,
                selection,
                ..
            } => {
                self.document
                    .change_content(&ctx, content, cursor, selection)
                    .await
            }
            ClientEvent::NodeRename { new_name, .. } => {
                self.document.rename_node(&ctx, new_name).await
            }
            ClientEvent::CursorMove {
                position,
                selection,
                ..
            } => self.presence.cursor_move(&ctx, position, selection).await,
            ClientEvent::MousePosition { x, y, .. } => {
                self.presence.mouse_position(&ctx, x, y).await
            }
            ClientEvent::CodeExecute { .. } => self.document.execute(&ctx).await,
        };

        if let Err(e) = result {
            tracing::debug!(
                "{:?} from '{}' failed: {}",
                kind,
                sender.as_str(),
                e
            );
            self.report_error(sender, &e.to_string()).await;
        }
    }

    /// Connection dropped: leave the joined room and release the channel
    pub async fn handle_disconnect(&self, client_id: &ClientId) {
        self.room_session.leave(client_id).await;
    }

    /// Report a malformed inbound frame to the sender
    pub async fn report_parse_error(&self, sender: &ClientId) {
        self.report_error(sender, "Invalid message format").await;
    }

    fn build_context(sender: &ClientId, event: &ClientEvent) -> Result<RequestContext, String> {
        // 不正な形式の room id は「存在しないルーム」として扱う
        let room_id = event
            .room_id()
            .and_then(|raw| RoomId::new(raw.to_string()).ok());

        let path = match event.node_path() {
            Some(segments) => Some(NodePath::parse(segments).map_err(|e| e.to_string())?),
            None => None,
        };

        Ok(RequestContext::new(sender.clone(), room_id, path))
    }

    async fn report_error(&self, target: &ClientId, message: &str) {
        let event = ServerEvent::Error {
            message: message.to_string(),
        };
        if let Err(e) = self.pusher.push_to(target, &event.to_json()).await {
            tracing::warn!(
                "Failed to report error to client '{}': {}",
                target.as_str(),
                e
            );
        }
    }
}
