//! ドメイン層
//!
//! ルーム・メンバー・ドキュメントツリーのドメインモデルと、
//! Infrastructure 層が実装するインターフェース（trait）を定義します。

pub mod entity;
pub mod error;
pub mod pusher;
pub mod registry;
pub mod tree;
pub mod value_object;

pub use entity::{CursorCorrection, Member, Room};
pub use error::{MessagePushError, RegistryError, ValidationError};
pub use pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use registry::{MemberDeparture, SessionRegistry, SharedRoom};
pub use tree::{
    DocumentTree, FileNode, FolderNode, Node, NodePath, TreeError, clamp_position, clamp_selection,
};
pub use value_object::{
    ClientId, CursorPosition, CursorSelection, MemberColor, NodeName, RoomId, RoomIdFactory,
    Timestamp,
};
