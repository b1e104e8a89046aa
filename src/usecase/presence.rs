//! UseCase: プレゼンス（カーソル・ポインタ）の中継
//!
//! カーソル移動はメンバー状態を更新してから他メンバーへ通知する。
//! マウス座標は状態を持たない純粋な中継。

use std::sync::Arc;

use crate::domain::{CursorPosition, CursorSelection, MessagePusher};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::context::RequestContext;
use super::error::HandlerError;

/// メンバーのプレゼンス情報を扱うユースケース
pub struct PresenceUseCase {
    pusher: Arc<dyn MessagePusher>,
}

impl PresenceUseCase {
    pub fn new(pusher: Arc<dyn MessagePusher>) -> Self {
        Self { pusher }
    }

    /// 送信者のカーソル状態を更新し、他メンバーへ cursorMoved を送る
    pub async fn cursor_move(
        &self,
        ctx: &RequestContext,
        position: CursorPosition,
        selection: CursorSelection,
    ) -> Result<(), HandlerError> {
        let room = ctx.room.as_ref().ok_or(HandlerError::MissingRoom)?;
        let targets = {
            let mut room = room.lock().await;
            if let Some(member) = room.member_mut(&ctx.sender) {
                member.cursor_position = position;
                member.cursor_selection = selection;
            }
            room.member_ids_except(&ctx.sender)
        };

        let event = ServerEvent::CursorMoved {
            member_id: ctx.sender.as_str().to_string(),
            position,
            selection,
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }

    /// マウス座標を他メンバーへ中継する
    pub async fn mouse_position(
        &self,
        ctx: &RequestContext,
        x: f64,
        y: f64,
    ) -> Result<(), HandlerError> {
        let room = ctx.room.as_ref().ok_or(HandlerError::MissingRoom)?;
        let targets = {
            let room = room.lock().await;
            room.member_ids_except(&ctx.sender)
        };

        let event = ServerEvent::MousePosition {
            member_id: ctx.sender.as_str().to_string(),
            x,
            y,
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }
}
