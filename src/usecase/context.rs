//! Per-request context threaded through the middleware pipeline.

use crate::domain::{ClientId, Node, NodePath, RoomId, SharedRoom};

/// Mutable state shared by the middleware chain and the handler of one
/// request.
///
/// Middleware resolve the referenced entities into the optional slots or set
/// a non-zero status with an error message, which short-circuits the rest of
/// the chain and the handler.
pub struct RequestContext {
    /// Originating connection; errors are reported only here
    pub sender: ClientId,
    /// 0 while the request is healthy; any other value halts the pipeline
    pub status: i32,
    /// Human-readable error set together with a non-zero status
    pub error: Option<String>,
    /// Room id argument as sent by the client (None when absent or invalid)
    pub room_id: Option<RoomId>,
    /// Node path argument as sent by the client
    pub path: Option<NodePath>,
    /// Resolved room, set by [`Middleware::Room`](super::Middleware)
    pub room: Option<SharedRoom>,
    /// Snapshot of the resolved node, set by the node/file/folder resolvers
    pub node: Option<Node>,
}

impl RequestContext {
    pub fn new(sender: ClientId, room_id: Option<RoomId>, path: Option<NodePath>) -> Self {
        Self {
            sender,
            status: 0,
            error: None,
            room_id,
            path,
            room: None,
            node: None,
        }
    }

    /// Mark the request failed; later middleware and the handler are skipped
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = -1;
        self.error = Some(message.into());
    }

    pub fn ok(&self) -> bool {
        self.status == 0
    }
}
