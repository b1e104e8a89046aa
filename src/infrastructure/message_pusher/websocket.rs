//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続中クライアントの `UnboundedSender` を管理
//! - クライアントへのメッセージ送信（push_to, broadcast）
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! sender は unbounded チャンネルなので送信はブロックせず、受信側の
//! ソケットタスクが遅くても送信元のリクエスト処理は停止しません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中クライアントの sender マップ
    clients: Mutex<HashMap<ClientId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        client_id: ClientId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(&client_id) {
            return Err(MessagePushError::AlreadyRegistered(
                client_id.as_str().to_string(),
            ));
        }
        tracing::debug!("Client '{}' registered to MessagePusher", client_id.as_str());
        clients.insert(client_id, sender);
        Ok(())
    }

    async fn unregister_client(&self, client_id: &ClientId) {
        let mut clients = self.clients.lock().await;
        clients.remove(client_id);
        tracing::debug!(
            "Client '{}' unregistered from MessagePusher",
            client_id.as_str()
        );
    }

    async fn push_to(&self, client_id: &ClientId, content: &str) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.as_str().to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to client '{}'", client_id.as_str());
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ClientId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!(
                            "Failed to push message to client '{}': {}",
                            target.as_str(),
                            e
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        "Client '{}' not found during broadcast, skipping",
                        target.as_str()
                    );
                }
            }
        }

        Ok(())
    }
}
