//! Request middleware: resolvers run in declared order before a handler.
//!
//! Each resolver looks up the entity referenced by the request and attaches
//! it to the shared [`RequestContext`], or sets an error status that
//! short-circuits the remaining middleware and the handler. The error texts
//! are part of the wire contract.

use crate::domain::SessionRegistry;

use super::context::RequestContext;

/// One validation/resolution step of a handler's pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Middleware {
    /// Resolve the room id argument into [`RequestContext::room`]
    Room,
    /// Resolve the path argument into [`RequestContext::node`], any kind
    Node,
    /// Resolve the path argument, requiring a file.
    ///
    /// With `optional`, a request without a path skips resolution entirely
    /// (used by selection clearing).
    File { optional: bool },
    /// Resolve the path argument, requiring a folder
    Folder { optional: bool },
}

impl Middleware {
    pub async fn run(&self, registry: &dyn SessionRegistry, ctx: &mut RequestContext) {
        match self {
            Middleware::Room => resolve_room(registry, ctx).await,
            Middleware::Node => resolve_node(ctx, Expect::Any, false).await,
            Middleware::File { optional } => resolve_node(ctx, Expect::File, *optional).await,
            Middleware::Folder { optional } => resolve_node(ctx, Expect::Folder, *optional).await,
        }
    }
}

enum Expect {
    Any,
    File,
    Folder,
}

async fn resolve_room(registry: &dyn SessionRegistry, ctx: &mut RequestContext) {
    let Some(room_id) = ctx.room_id.clone() else {
        ctx.fail("Room doesn't exist");
        return;
    };
    match registry.get_room(&room_id).await {
        Some(room) => ctx.room = Some(room),
        None => ctx.fail("Room doesn't exist"),
    }
}

async fn resolve_node(ctx: &mut RequestContext, expect: Expect, optional: bool) {
    let Some(path) = ctx.path.clone() else {
        if !optional {
            ctx.fail("Node doesn't exist");
        }
        return;
    };

    // Room ミドルウェアが先に実行されている前提
    let Some(room) = ctx.room.clone() else {
        ctx.fail("Room doesn't exist");
        return;
    };

    let room = room.lock().await;
    let resolved = match expect {
        Expect::Any => room.tree.get_node(&path).cloned(),
        Expect::File => room
            .tree
            .get_file(&path)
            .map(|file| crate::domain::Node::File(file.clone())),
        Expect::Folder => room
            .tree
            .get_folder(&path)
            .map(|folder| crate::domain::Node::Folder(folder.clone())),
    };

    match resolved {
        Ok(node) => ctx.node = Some(node),
        Err(e) => ctx.fail(e.to_string()),
    }
}
