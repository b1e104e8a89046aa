//! UseCase: ドキュメントツリー操作
//!
//! ## 責務
//!
//! - ファイル・フォルダの作成と選択、内容の置換、表示名の変更
//! - 内容置換後のカーソル再調整（編集者以外のメンバーを走査）
//! - 実行リクエストの中継
//!
//! どのハンドラもルームのロック内で状態を変更し、ブロードキャスト対象を
//! 確定してからロックを手放して送信します。

use std::sync::Arc;

use crate::domain::{
    CursorPosition, CursorSelection, MessagePusher, NodeName, NodePath, SharedRoom,
};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::context::RequestContext;
use super::error::HandlerError;

/// ドキュメントツリーを操作するユースケース
pub struct DocumentUseCase {
    pusher: Arc<dyn MessagePusher>,
}

impl DocumentUseCase {
    pub fn new(pusher: Arc<dyn MessagePusher>) -> Self {
        Self { pusher }
    }

    fn room(ctx: &RequestContext) -> Result<&SharedRoom, HandlerError> {
        ctx.room.as_ref().ok_or(HandlerError::MissingRoom)
    }

    fn path(ctx: &RequestContext) -> Result<NodePath, HandlerError> {
        ctx.path.clone().ok_or(HandlerError::MissingPath)
    }

    /// ファイルを作成し、他のメンバーへ fileCreated をブロードキャストする
    ///
    /// 単一セグメントのパスは選択中フォルダ（未選択ならルート）配下に
    /// 作成される。複数セグメントのパスは絶対パスとして扱い、親フォルダが
    /// 既に存在しなければならない。
    pub async fn create_file(&self, ctx: &RequestContext) -> Result<(), HandlerError> {
        let path = Self::path(ctx)?;
        let (file, targets) = {
            let mut room = Self::room(ctx)?.lock().await;
            let file = if path.len() == 1 {
                let name = path.name().cloned().ok_or(HandlerError::MissingPath)?;
                room.tree.append_file_to_selected(name)?
            } else {
                room.tree.append_file(path)?
            };
            (file, room.member_ids_except(&ctx.sender))
        };
        tracing::debug!("File '{}' created", file.path);

        let event = ServerEvent::FileCreated {
            path: file.path.to_segments(),
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }

    /// フォルダを作成し、他のメンバーへ folderCreated をブロードキャストする
    pub async fn create_folder(&self, ctx: &RequestContext) -> Result<(), HandlerError> {
        let path = Self::path(ctx)?;
        let (folder, targets) = {
            let mut room = Self::room(ctx)?.lock().await;
            let folder = if path.len() == 1 {
                let name = path.name().cloned().ok_or(HandlerError::MissingPath)?;
                room.tree.append_folder_to_selected(name)?
            } else {
                room.tree.append_folder(path)?
            };
            (folder, room.member_ids_except(&ctx.sender))
        };
        tracing::debug!("Folder '{}' created", folder.path);

        let event = ServerEvent::FolderCreated {
            path: folder.path.to_segments(),
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }

    /// 共有の選択ファイルポインタを更新する（None で解除）
    pub async fn select_file(&self, ctx: &RequestContext) -> Result<(), HandlerError> {
        let path = ctx.path.clone();
        let targets = {
            let mut room = Self::room(ctx)?.lock().await;
            room.tree.select_file(path.clone())?;
            room.member_ids_except(&ctx.sender)
        };

        let event = ServerEvent::FileSelected {
            path: path.as_ref().map(NodePath::to_segments),
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }

    /// 共有の選択フォルダポインタを更新する（None で解除）
    pub async fn select_folder(&self, ctx: &RequestContext) -> Result<(), HandlerError> {
        let path = ctx.path.clone();
        let targets = {
            let mut room = Self::room(ctx)?.lock().await;
            room.tree.select_folder(path.clone())?;
            room.member_ids_except(&ctx.sender)
        };

        let event = ServerEvent::FolderSelected {
            path: path.as_ref().map(NodePath::to_segments),
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }

    /// ファイル内容を全置換し、編集者のカーソルを更新する
    ///
    /// 置換後、編集者以外のメンバーのカーソル・選択範囲を新しい行数に
    /// 合わせて再調整し、補正があれば全メンバーへ cursorMoved を
    /// ブロードキャストする（全員が同じ値に収束するように）。
    pub async fn change_content(
        &self,
        ctx: &RequestContext,
        content: Vec<String>,
        cursor: CursorPosition,
        selection: CursorSelection,
    ) -> Result<(), HandlerError> {
        let path = Self::path(ctx)?;
        let (others, everyone, corrections) = {
            let mut room = Self::room(ctx)?.lock().await;
            room.tree.set_content(&path, content.clone())?;

            // 編集者自身のカーソル状態を更新
            if let Some(member) = room.member_mut(&ctx.sender) {
                member.cursor_position = cursor;
                member.cursor_selection = selection;
            }

            let corrections = room.reconcile_cursors(&ctx.sender, &content);
            (
                room.member_ids_except(&ctx.sender),
                room.member_ids(),
                corrections,
            )
        };

        let event = ServerEvent::FileContentChanged {
            member_id: ctx.sender.as_str().to_string(),
            path: path.to_segments(),
            content,
            cursor,
            selection,
        };
        self.pusher.broadcast(others, &event.to_json()).await?;

        for correction in corrections {
            let event = ServerEvent::CursorMoved {
                member_id: correction.member_id.as_str().to_string(),
                position: correction.position,
                selection: correction.selection,
            };
            self.pusher
                .broadcast(everyone.clone(), &event.to_json())
                .await?;
        }

        Ok(())
    }

    /// ノードの表示名を変更する。パスによる参照は変わらない
    pub async fn rename_node(
        &self,
        ctx: &RequestContext,
        new_name: String,
    ) -> Result<(), HandlerError> {
        let path = Self::path(ctx)?;
        let new_name = NodeName::new(new_name)?;
        let targets = {
            let mut room = Self::room(ctx)?.lock().await;
            room.tree.rename(&path, new_name.clone())?;
            room.member_ids_except(&ctx.sender)
        };

        let event = ServerEvent::NodeRenamed {
            path: path.to_segments(),
            new_name: new_name.into_string(),
        };
        self.pusher.broadcast(targets, &event.to_json()).await?;
        Ok(())
    }

    /// 実行リクエストを他のメンバーへ中継する
    ///
    /// バンドルと実行は受信側（クライアント）で行われるため、ここでは
    /// シグナルの転送のみを行い、ルームのロックは送信前に手放す。
    pub async fn execute(&self, ctx: &RequestContext) -> Result<(), HandlerError> {
        let targets = {
            let room = Self::room(ctx)?.lock().await;
            room.member_ids_except(&ctx.sender)
        };

        self.pusher
            .broadcast(targets, &ServerEvent::ExecuteCode.to_json())
            .await?;
        Ok(())
    }
}
