//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ送信を抽象化します。WebSocket の生成は
//! UI 層で行われ、この trait の実装は生成済みの sender チャンネルを
//! 管理してメッセージ送信に使用します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ClientId;

/// Channel used to push serialized messages to one client's socket task
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Outbound message delivery to connected clients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの sender を登録する。既に登録済みの場合はエラー
    async fn register_client(
        &self,
        client_id: ClientId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError>;

    /// クライアントの sender を登録解除する
    async fn unregister_client(&self, client_id: &ClientId);

    /// 特定のクライアントへ送信する
    async fn push_to(&self, client_id: &ClientId, content: &str) -> Result<(), MessagePushError>;

    /// 複数クライアントへ送信する。一部の送信失敗は許容する
    async fn broadcast(
        &self,
        targets: Vec<ClientId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
