//! Server state shared by the connection handlers.

use std::sync::Arc;

use crate::domain::{MessagePusher, SessionRegistry};
use crate::usecase::EventDispatcher;

/// Shared application state
pub struct AppState {
    /// EventDispatcher（イベントの検証と処理）
    pub dispatcher: Arc<EventDispatcher>,
    /// SessionRegistry（ルーム状態の照会、HTTP エンドポイント用）
    pub registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（接続チャンネルの登録・解除）
    pub pusher: Arc<dyn MessagePusher>,
}
