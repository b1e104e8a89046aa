//! Domain entities: rooms and the members inside them.

use std::collections::HashMap;

use serde::Serialize;

use super::tree::{DocumentTree, clamp_position, clamp_selection};
use super::value_object::{
    ClientId, CursorPosition, CursorSelection, MemberColor, RoomId, Timestamp,
};

/// A participant's live presence inside a room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub id: ClientId,
    /// Informational flag on the room creator; confers no special authority
    pub is_owner: bool,
    pub color: MemberColor,
    pub cursor_position: CursorPosition,
    pub cursor_selection: CursorSelection,
}

impl Member {
    /// Create a member with a freshly assigned random color and the cursor
    /// at the origin
    pub fn new(id: ClientId, is_owner: bool) -> Self {
        Self {
            id,
            is_owner,
            color: MemberColor::random(),
            cursor_position: CursorPosition::default(),
            cursor_selection: CursorSelection::default(),
        }
    }
}

/// A corrected cursor produced by reconciliation after a content change
#[derive(Debug, Clone, PartialEq)]
pub struct CursorCorrection {
    pub member_id: ClientId,
    pub position: CursorPosition,
    pub selection: CursorSelection,
}

/// A collaboration session: members plus one shared document tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub members: HashMap<ClientId, Member>,
    pub tree: DocumentTree,
}

impl Room {
    /// Create an empty room with a fresh document tree
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            members: HashMap::new(),
            tree: DocumentTree::new(),
        }
    }

    pub fn add_member(&mut self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    pub fn remove_member(&mut self, id: &ClientId) -> Option<Member> {
        self.members.remove(id)
    }

    pub fn member(&self, id: &ClientId) -> Option<&Member> {
        self.members.get(id)
    }

    pub fn member_mut(&mut self, id: &ClientId) -> Option<&mut Member> {
        self.members.get_mut(id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All members sorted by id for consistent ordering
    pub fn members_sorted(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members
    }

    /// Broadcast targets: every member id except the given one, sorted
    pub fn member_ids_except(&self, exclude: &ClientId) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self
            .members
            .keys()
            .filter(|id| *id != exclude)
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// All member ids, sorted
    pub fn member_ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.members.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Reconcile every member's cursor and selection against the new content
    /// of an edited file, skipping the editor.
    ///
    /// Members whose tracked positions fall outside the new bounds are
    /// clamped in place; the returned corrections (sorted by member id) are
    /// rebroadcast so all participants converge on the same in-bounds values.
    pub fn reconcile_cursors(
        &mut self,
        editor: &ClientId,
        lines: &[String],
    ) -> Vec<CursorCorrection> {
        let mut corrections = Vec::new();
        for (id, member) in self.members.iter_mut() {
            if id == editor {
                continue;
            }
            let position = clamp_position(lines, &member.cursor_position);
            let selection = clamp_selection(lines, &member.cursor_selection);
            if position != member.cursor_position || selection != member.cursor_selection {
                member.cursor_position = position;
                member.cursor_selection = selection;
                corrections.push(CursorCorrection {
                    member_id: id.clone(),
                    position,
                    selection,
                });
            }
        }
        corrections.sort_by(|a, b| a.member_id.cmp(&b.member_id));
        corrections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(raw: &str) -> ClientId {
        ClientId::new(raw.to_string()).unwrap()
    }

    fn test_room() -> Room {
        Room::new(
            crate::domain::RoomIdFactory::generate(),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_add_and_remove_member() {
        // テスト項目: メンバーの追加・削除が反映される
        // given (前提条件):
        let mut room = test_room();
        room.add_member(Member::new(client("alice"), true));
        room.add_member(Member::new(client("bob"), false));

        // when (操作):
        let removed = room.remove_member(&client("alice"));

        // then (期待する結果):
        assert!(removed.is_some());
        assert_eq!(room.member_count(), 1);
        assert!(room.member(&client("alice")).is_none());
        assert!(!room.is_empty());
    }

    #[test]
    fn test_owner_flag_is_set_only_for_creator() {
        // テスト項目: owner フラグは作成者のメンバーにのみ立つ
        // given (前提条件):
        let mut room = test_room();

        // when (操作):
        room.add_member(Member::new(client("alice"), true));
        room.add_member(Member::new(client("bob"), false));

        // then (期待する結果):
        assert!(room.member(&client("alice")).unwrap().is_owner);
        assert!(!room.member(&client("bob")).unwrap().is_owner);
    }

    #[test]
    fn test_member_ids_except_excludes_sender() {
        // テスト項目: ブロードキャスト対象から送信者が除外される
        // given (前提条件):
        let mut room = test_room();
        room.add_member(Member::new(client("charlie"), false));
        room.add_member(Member::new(client("alice"), true));
        room.add_member(Member::new(client("bob"), false));

        // when (操作):
        let targets = room.member_ids_except(&client("alice"));

        // then (期待する結果): alice 以外の2人が id 順に並ぶ
        assert_eq!(targets, vec![client("bob"), client("charlie")]);
    }

    #[test]
    fn test_reconcile_clamps_out_of_bounds_cursor() {
        // テスト項目: ファイル縮小時に他メンバーのカーソルが丸められる
        // given (前提条件):
        let mut room = test_room();
        room.add_member(Member::new(client("alice"), true));
        room.add_member(Member::new(client("bob"), false));
        room.member_mut(&client("bob")).unwrap().cursor_position = CursorPosition::new(5, 10);

        // when (操作): alice の編集で 2 行に縮小
        let lines = vec!["hello".to_string(), "hi".to_string()];
        let corrections = room.reconcile_cursors(&client("alice"), &lines);

        // then (期待する結果): bob のカーソルが最終行・行長に丸められる
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].member_id, client("bob"));
        assert_eq!(corrections[0].position, CursorPosition::new(1, 2));
        assert_eq!(
            room.member(&client("bob")).unwrap().cursor_position,
            CursorPosition::new(1, 2)
        );
    }

    #[test]
    fn test_reconcile_skips_the_editor() {
        // テスト項目: 編集者自身のカーソルは再調整の対象外
        // given (前提条件):
        let mut room = test_room();
        room.add_member(Member::new(client("alice"), true));
        room.member_mut(&client("alice")).unwrap().cursor_position = CursorPosition::new(99, 0);

        // when (操作):
        let corrections = room.reconcile_cursors(&client("alice"), &["x".to_string()]);

        // then (期待する結果): 補正は発生しない
        assert!(corrections.is_empty());
        assert_eq!(
            room.member(&client("alice")).unwrap().cursor_position,
            CursorPosition::new(99, 0)
        );
    }

    #[test]
    fn test_reconcile_leaves_in_bounds_members_untouched() {
        // テスト項目: 範囲内のメンバーには補正が発生しない
        // given (前提条件):
        let mut room = test_room();
        room.add_member(Member::new(client("alice"), true));
        room.add_member(Member::new(client("bob"), false));
        room.member_mut(&client("bob")).unwrap().cursor_position = CursorPosition::new(0, 1);

        // when (操作):
        let corrections = room.reconcile_cursors(&client("alice"), &["hello".to_string()]);

        // then (期待する結果):
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_reconcile_clamps_selection_endpoints() {
        // テスト項目: 選択範囲の端点も再調整される
        // given (前提条件):
        let mut room = test_room();
        room.add_member(Member::new(client("alice"), true));
        room.add_member(Member::new(client("bob"), false));
        room.member_mut(&client("bob")).unwrap().cursor_selection =
            CursorSelection::new(CursorPosition::new(0, 0), CursorPosition::new(4, 7));

        // when (操作):
        let corrections = room.reconcile_cursors(&client("alice"), &["abc".to_string()]);

        // then (期待する結果): end が丸められる
        assert_eq!(corrections.len(), 1);
        assert_eq!(
            corrections[0].selection,
            CursorSelection::new(CursorPosition::new(0, 0), CursorPosition::new(0, 3))
        );
    }
}
