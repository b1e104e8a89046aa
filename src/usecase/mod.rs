//! UseCase 層
//!
//! 受信イベントごとのミドルウェアパイプラインとハンドラを実装します。
//! Dispatcher がイベント種別からディスクリプタ（ミドルウェア列）を引き、
//! リクエストコンテキストを検証してからハンドラを実行します。

pub mod context;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod middleware;
pub mod presence;
pub mod room_session;

pub use context::RequestContext;
pub use dispatcher::{EventDispatcher, HandlerDescriptor, descriptor};
pub use document::DocumentUseCase;
pub use error::HandlerError;
pub use middleware::Middleware;
pub use presence::PresenceUseCase;
pub use room_session::RoomSessionUseCase;
