//! UseCase: ルームの作成・参加・退出
//!
//! ## 責務
//!
//! - ルーム作成者への応答（スナップショット送信）
//! - 参加者への応答と、既存メンバーへの memberJoined ブロードキャスト
//! - 退出時のメンバー削除・空ルーム回収・memberLeft ブロードキャスト

use std::sync::Arc;

use crate::domain::{ClientId, MessagePusher, SessionRegistry};
use crate::infrastructure::dto::websocket::{MemberDto, RoomDto, ServerEvent};

use super::context::RequestContext;
use super::error::HandlerError;

/// ルームのライフサイクルを扱うユースケース
pub struct RoomSessionUseCase {
    registry: Arc<dyn SessionRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl RoomSessionUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// ルームを新規作成し、作成者にスナップショットを返信する
    pub async fn create(&self, creator: &ClientId) -> Result<(), HandlerError> {
        // 1. ルームを作成（作成者が owner）
        let room = self
            .registry
            .create_room(vec![creator.clone()], creator.clone())
            .await;

        // 2. 作成者にのみ応答
        let reply = ServerEvent::RoomCreated {
            room: RoomDto::from(&room),
        };
        self.pusher.push_to(creator, &reply.to_json()).await?;

        Ok(())
    }

    /// 既存ルームに参加し、既存メンバーへ新メンバーを通知する
    pub async fn join(&self, ctx: &RequestContext) -> Result<(), HandlerError> {
        let room_id = ctx.room_id.clone().ok_or(HandlerError::MissingRoom)?;

        // 1. 非オーナーとして参加
        let (room, new_members) = self
            .registry
            .join_room(&room_id, vec![ctx.sender.clone()])
            .await?;

        // 2. 参加者にルームのスナップショットを返信
        let reply = ServerEvent::RoomJoined {
            room: RoomDto::from(&room),
        };
        self.pusher.push_to(&ctx.sender, &reply.to_json()).await?;

        // 3. 既存メンバーへ memberJoined をブロードキャスト
        let new_ids: Vec<&ClientId> = new_members.iter().map(|m| &m.id).collect();
        let existing: Vec<ClientId> = room
            .member_ids()
            .into_iter()
            .filter(|id| !new_ids.contains(&id))
            .collect();
        for member in &new_members {
            let event = ServerEvent::MemberJoined {
                member: MemberDto::from(member),
            };
            self.pusher
                .broadcast(existing.clone(), &event.to_json())
                .await?;
        }

        Ok(())
    }

    /// 接続の切断処理：ルームから退出し、残りのメンバーへ通知する
    ///
    /// 未参加の接続では何もしない。最後のメンバーだった場合、ルームは
    /// レジストリ側で破棄済みで remaining は空になる。
    pub async fn leave(&self, client_id: &ClientId) {
        if let Some(departure) = self.registry.remove_member(client_id).await {
            tracing::info!(
                "Member '{}' left room '{}' ({} remaining)",
                client_id.as_str(),
                departure.room_id.as_str(),
                departure.remaining.len()
            );

            if !departure.remaining.is_empty() {
                let event = ServerEvent::MemberLeft {
                    member_id: client_id.as_str().to_string(),
                };
                if let Err(e) = self
                    .pusher
                    .broadcast(departure.remaining, &event.to_json())
                    .await
                {
                    tracing::warn!("Failed to broadcast member-left: {}", e);
                }
            }
        }

        self.pusher.unregister_client(client_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessagePusher, RoomIdFactory};
    use crate::infrastructure::registry::InMemorySessionRegistry;

    fn client(raw: &str) -> ClientId {
        ClientId::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_replies_to_creator_only() {
        // テスト項目: ルーム作成の応答が作成者のみに送信される
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|id, content| {
                id.as_str() == "alice" && content.contains(r#""type":"roomCreated""#)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = RoomSessionUseCase::new(registry.clone(), Arc::new(pusher));

        // when (操作):
        let result = usecase.create(&client("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(registry.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_join_notifies_existing_members() {
        // テスト項目: 参加時に既存メンバーへ memberJoined が送られる
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let room = registry
            .create_room(vec![client("alice")], client("alice"))
            .await;

        let mut pusher = MockMessagePusher::new();
        // 参加者への返信
        pusher
            .expect_push_to()
            .withf(|id, content| {
                id.as_str() == "bob" && content.contains(r#""type":"roomJoined""#)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        // 既存メンバー (alice) へのブロードキャスト
        pusher
            .expect_broadcast()
            .withf(|targets, content| {
                targets.len() == 1
                    && targets[0].as_str() == "alice"
                    && content.contains(r#""type":"memberJoined""#)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = RoomSessionUseCase::new(registry.clone(), Arc::new(pusher));

        let ctx = RequestContext::new(client("bob"), Some(room.id.clone()), None);

        // when (操作):
        let result = usecase.join(&ctx).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_join_unknown_room_returns_error() {
        // テスト項目: 存在しないルームへの参加がエラーになる
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let pusher = MockMessagePusher::new();
        let usecase = RoomSessionUseCase::new(registry, Arc::new(pusher));
        let ctx = RequestContext::new(
            client("bob"),
            Some(RoomIdFactory::generate()),
            None,
        );

        // when (操作):
        let result = usecase.join(&ctx).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err().to_string(),
            "Room doesn't exist".to_string()
        );
    }

    #[tokio::test]
    async fn test_leave_broadcasts_to_remaining_members() {
        // テスト項目: 退出時に残りのメンバーへ memberLeft が送られる
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let room = registry
            .create_room(vec![client("alice")], client("alice"))
            .await;
        registry
            .join_room(&room.id, vec![client("bob")])
            .await
            .unwrap();

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(|targets, content| {
                targets.len() == 1
                    && targets[0].as_str() == "bob"
                    && content.contains(r#""type":"memberLeft""#)
                    && content.contains(r#""memberId":"alice""#)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        pusher
            .expect_unregister_client()
            .times(1)
            .returning(|_| ());
        let usecase = RoomSessionUseCase::new(registry.clone(), Arc::new(pusher));

        // when (操作):
        usecase.leave(&client("alice")).await;

        // then (期待する結果): ルームは残っている
        assert_eq!(registry.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_leave_of_last_member_removes_room_silently() {
        // テスト項目: 最後のメンバーの退出でルームが消え、通知は送られない
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        registry
            .create_room(vec![client("alice")], client("alice"))
            .await;

        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().times(0);
        pusher
            .expect_unregister_client()
            .times(1)
            .returning(|_| ());
        let usecase = RoomSessionUseCase::new(registry.clone(), Arc::new(pusher));

        // when (操作):
        usecase.leave(&client("alice")).await;

        // then (期待する結果):
        assert_eq!(registry.count_rooms().await, 0);
    }
}
