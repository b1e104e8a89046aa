//! インメモリ SessionRegistry 実装
//!
//! ドメイン層が定義する SessionRegistry trait の具体的な実装。
//! ルーム全体のマップは短時間だけロックされ、各ルームは自身の
//! Mutex で保護されます。無関係なルームの処理は互いにブロックしません。
//!
//! ## ロック順序
//!
//! ルームマップのロックとルーム自身のロックを同時に保持しないこと。
//! join ではルームロック → joined マップの順で取得し、remove では
//! joined マップを単独で取得してから解放します。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::{Clock, SystemClock};
use crate::domain::{
    ClientId, Member, MemberDeparture, RegistryError, Room, RoomId, RoomIdFactory, SessionRegistry,
    SharedRoom, Timestamp,
};

/// インメモリ SessionRegistry 実装
pub struct InMemorySessionRegistry {
    /// 登録中の全ルーム（joined マップより前にこのロックを取らないこと）
    rooms: Mutex<HashMap<RoomId, SharedRoom>>,
    /// 接続 → 参加中ルームのマップ
    joined: Mutex<HashMap<ClientId, RoomId>>,
    clock: Box<dyn Clock>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// テスト用にクロックを差し替えて作成する
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            joined: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn build_members(
        room: &mut Room,
        joined: &mut HashMap<ClientId, RoomId>,
        clients: Vec<ClientId>,
        owner: Option<&ClientId>,
    ) -> Vec<Member> {
        let mut new_members = Vec::new();
        for client_id in clients {
            let is_owner = owner.is_some_and(|o| *o == client_id);
            let member = Member::new(client_id.clone(), is_owner);
            room.add_member(member.clone());
            joined.insert(client_id, room.id.clone());
            new_members.push(member);
        }
        new_members
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn create_room(&self, clients: Vec<ClientId>, owner: ClientId) -> Room {
        let id = RoomIdFactory::generate();
        let mut room = Room::new(id.clone(), Timestamp::new(self.clock.now_millis()));

        {
            let mut joined = self.joined.lock().await;
            Self::build_members(&mut room, &mut joined, clients, Some(&owner));
        }

        let snapshot = room.clone();
        let mut rooms = self.rooms.lock().await;
        rooms.insert(id.clone(), Arc::new(Mutex::new(room)));
        tracing::info!("Room '{}' created by '{}'", id.as_str(), owner.as_str());

        snapshot
    }

    async fn join_room(
        &self,
        room_id: &RoomId,
        clients: Vec<ClientId>,
    ) -> Result<(Room, Vec<Member>), RegistryError> {
        let shared = {
            let rooms = self.rooms.lock().await;
            rooms.get(room_id).cloned()
        }
        .ok_or(RegistryError::RoomNotFound)?;

        let mut room = shared.lock().await;
        let new_members = {
            let mut joined = self.joined.lock().await;
            Self::build_members(&mut room, &mut joined, clients, None)
        };
        tracing::info!(
            "{} member(s) joined room '{}' ({} total)",
            new_members.len(),
            room_id.as_str(),
            room.member_count()
        );

        Ok((room.clone(), new_members))
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<SharedRoom> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn room_of(&self, client_id: &ClientId) -> Option<RoomId> {
        let joined = self.joined.lock().await;
        joined.get(client_id).cloned()
    }

    async fn remove_member(&self, client_id: &ClientId) -> Option<MemberDeparture> {
        let room_id = {
            let mut joined = self.joined.lock().await;
            joined.remove(client_id)
        }?;

        let shared = {
            let rooms = self.rooms.lock().await;
            rooms.get(&room_id).cloned()
        }?;

        let remaining = {
            let mut room = shared.lock().await;
            room.remove_member(client_id);
            room.member_ids()
        };

        if remaining.is_empty() {
            let mut rooms = self.rooms.lock().await;
            rooms.remove(&room_id);
            tracing::info!(
                "Room '{}' deallocated after last member left",
                room_id.as_str()
            );
        }

        Some(MemberDeparture {
            room_id,
            member_id: client_id.clone(),
            remaining,
        })
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let shared_rooms: Vec<SharedRoom> = {
            let rooms = self.rooms.lock().await;
            rooms.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(shared_rooms.len());
        for shared in shared_rooms {
            snapshots.push(shared.lock().await.clone());
        }
        snapshots.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        snapshots
    }

    async fn count_rooms(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}
