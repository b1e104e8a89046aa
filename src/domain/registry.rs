//! SessionRegistry trait 定義
//!
//! ルームのライフサイクル（作成・参加・退出・空ルーム回収）と検索を担う
//! インターフェースです。共有状態の所有はこの trait の実装に閉じ、
//! 外部へはこの API だけを公開します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::entity::{Member, Room};
use super::error::RegistryError;
use super::value_object::{ClientId, RoomId};

/// A live room guarded by its own lock, so unrelated rooms can proceed
/// concurrently
pub type SharedRoom = Arc<Mutex<Room>>;

/// Result of removing a member from its room
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDeparture {
    pub room_id: RoomId,
    pub member_id: ClientId,
    /// Ids of the members still in the room; empty when the room was
    /// deallocated
    pub remaining: Vec<ClientId>,
}

/// Session registry: connection identity → at most one room
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// ルームを新規作成し、初期メンバーを参加させる
    ///
    /// owner に一致するメンバーに isOwner フラグが立つ。
    /// 戻り値は作成直後のスナップショット。
    async fn create_room(&self, clients: Vec<ClientId>, owner: ClientId) -> Room;

    /// 既存ルームへ非オーナーとして参加させる
    ///
    /// 戻り値は参加後のスナップショットと、新規メンバーのレコード
    /// （既存メンバーへのブロードキャスト用）。
    async fn join_room(
        &self,
        room_id: &RoomId,
        clients: Vec<ClientId>,
    ) -> Result<(Room, Vec<Member>), RegistryError>;

    /// ルームを id で検索する
    async fn get_room(&self, room_id: &RoomId) -> Option<SharedRoom>;

    /// 接続が参加しているルームの id を返す
    async fn room_of(&self, client_id: &ClientId) -> Option<RoomId>;

    /// メンバーを退出させる。最後のメンバーだった場合はルームを破棄する
    async fn remove_member(&self, client_id: &ClientId) -> Option<MemberDeparture>;

    /// 全ルームのスナップショットを返す
    async fn list_rooms(&self) -> Vec<Room>;

    /// 登録中のルーム数
    async fn count_rooms(&self) -> usize;
}
