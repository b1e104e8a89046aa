//! Conversion logic between domain entities and DTOs.

use crate::common::time::timestamp_to_rfc3339;
use crate::domain::{DocumentTree, Member, Node, NodePath, Room};

use super::http::{RoomDetailDto, RoomSummaryDto};
use super::websocket::{MemberDto, NodeDto, NodeKindDto, RoomDto, TreeDto};

fn path_segments(path: Option<&NodePath>) -> Option<Vec<String>> {
    path.map(NodePath::to_segments)
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.as_str().to_string(),
            is_owner: member.is_owner,
            color: member.color,
            cursor_position: member.cursor_position,
            cursor_selection: member.cursor_selection,
        }
    }
}

impl From<&Node> for NodeDto {
    fn from(node: &Node) -> Self {
        match node {
            Node::File(file) => Self {
                kind: NodeKindDto::File,
                name: file.name.as_str().to_string(),
                path: file.path.to_segments(),
                content: Some(file.content.clone()),
            },
            Node::Folder(folder) => Self {
                kind: NodeKindDto::Folder,
                name: folder.name.as_str().to_string(),
                path: folder.path.to_segments(),
                content: None,
            },
        }
    }
}

impl From<&DocumentTree> for TreeDto {
    fn from(tree: &DocumentTree) -> Self {
        // Sort by joined path for consistent ordering
        let mut nodes: Vec<NodeDto> = tree.nodes().map(NodeDto::from).collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));

        Self {
            nodes,
            entry_file: path_segments(tree.entry_file()),
            selected_file: path_segments(tree.selected_file()),
            selected_folder: path_segments(tree.selected_folder()),
        }
    }
}

impl From<&Room> for RoomDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            members: room.members_sorted().into_iter().map(MemberDto::from).collect(),
            tree: TreeDto::from(&room.tree),
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            member_count: room.member_count(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            members: room.members_sorted().into_iter().map(MemberDto::from).collect(),
            tree: TreeDto::from(&room.tree),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, RoomIdFactory, Timestamp};

    fn path(segments: &[&str]) -> NodePath {
        NodePath::parse(&segments.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    fn test_room() -> Room {
        let mut room = Room::new(RoomIdFactory::generate(), Timestamp::new(1672531200000));
        room.add_member(Member::new(
            ClientId::new("bob".to_string()).unwrap(),
            false,
        ));
        room.add_member(Member::new(
            ClientId::new("alice".to_string()).unwrap(),
            true,
        ));
        room
    }

    #[test]
    fn test_room_dto_members_are_sorted_by_id() {
        // テスト項目: RoomDto のメンバーが id 順に並ぶ
        // given (前提条件):
        let room = test_room();

        // when (操作):
        let dto = RoomDto::from(&room);

        // then (期待する結果):
        assert_eq!(dto.members.len(), 2);
        assert_eq!(dto.members[0].id, "alice");
        assert!(dto.members[0].is_owner);
        assert_eq!(dto.members[1].id, "bob");
    }

    #[test]
    fn test_tree_dto_carries_nodes_and_pointers() {
        // テスト項目: TreeDto にノードとポインタが変換される
        // given (前提条件):
        let mut room = test_room();
        room.tree.append_file(path(&["a.js"])).unwrap();
        room.tree.append_folder(path(&["src"])).unwrap();
        room.tree.select_folder(Some(path(&["src"]))).unwrap();

        // when (操作):
        let dto = TreeDto::from(&room.tree);

        // then (期待する結果): パス順に並び、ポインタが反映されている
        assert_eq!(dto.nodes.len(), 2);
        assert_eq!(dto.nodes[0].path, vec!["a.js".to_string()]);
        assert_eq!(dto.nodes[0].kind, NodeKindDto::File);
        assert_eq!(dto.nodes[0].content, Some(vec![String::new()]));
        assert_eq!(dto.nodes[1].kind, NodeKindDto::Folder);
        assert_eq!(dto.nodes[1].content, None);
        assert_eq!(dto.entry_file, Some(vec!["a.js".to_string()]));
        assert_eq!(dto.selected_folder, Some(vec!["src".to_string()]));
        assert_eq!(dto.selected_file, None);
    }

    #[test]
    fn test_room_summary_dto_formats_created_at() {
        // テスト項目: RoomSummaryDto の created_at が RFC 3339 で表現される
        // given (前提条件):
        let room = test_room();

        // when (操作):
        let dto = RoomSummaryDto::from(&room);

        // then (期待する結果):
        assert_eq!(dto.member_count, 2);
        assert!(dto.created_at.starts_with("2023-01-01T00:00:00"));
    }
}
