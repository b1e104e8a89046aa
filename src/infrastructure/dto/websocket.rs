//! WebSocket message DTOs.
//!
//! Both directions use internally tagged JSON: the `type` field selects the
//! message variant, all field names are camelCase. Paths travel as arrays of
//! raw name segments and are validated when the request context is built.

use serde::{Deserialize, Serialize};

use crate::domain::{CursorPosition, CursorSelection, MemberColor};

/// Message-type discriminant for inbound events, used by the dispatcher to
/// look up the handler descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RoomCreate,
    RoomJoin,
    FileCreate,
    FolderCreate,
    FileSelect,
    FolderSelect,
    FileContentChange,
    NodeRename,
    CursorMove,
    MousePosition,
    CodeExecute,
}

/// Inbound event sent by a client over the WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    RoomCreate,
    RoomJoin {
        room_id: String,
    },
    FileCreate {
        room_id: String,
        path: Vec<String>,
    },
    FolderCreate {
        room_id: String,
        path: Vec<String>,
    },
    FileSelect {
        room_id: String,
        #[serde(default)]
        path: Option<Vec<String>>,
    },
    FolderSelect {
        room_id: String,
        #[serde(default)]
        path: Option<Vec<String>>,
    },
    FileContentChange {
        room_id: String,
        path: Vec<String>,
        content: Vec<String>,
        cursor: CursorPosition,
        selection: CursorSelection,
    },
    NodeRename {
        room_id: String,
        path: Vec<String>,
        new_name: String,
    },
    CursorMove {
        room_id: String,
        position: CursorPosition,
        selection: CursorSelection,
    },
    MousePosition {
        room_id: String,
        x: f64,
        y: f64,
    },
    CodeExecute {
        room_id: String,
    },
}

impl ClientEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::RoomCreate => EventKind::RoomCreate,
            ClientEvent::RoomJoin { .. } => EventKind::RoomJoin,
            ClientEvent::FileCreate { .. } => EventKind::FileCreate,
            ClientEvent::FolderCreate { .. } => EventKind::FolderCreate,
            ClientEvent::FileSelect { .. } => EventKind::FileSelect,
            ClientEvent::FolderSelect { .. } => EventKind::FolderSelect,
            ClientEvent::FileContentChange { .. } => EventKind::FileContentChange,
            ClientEvent::NodeRename { .. } => EventKind::NodeRename,
            ClientEvent::CursorMove { .. } => EventKind::CursorMove,
            ClientEvent::MousePosition { .. } => EventKind::MousePosition,
            ClientEvent::CodeExecute { .. } => EventKind::CodeExecute,
        }
    }

    /// The room id argument, present on every event except room creation
    pub fn room_id(&self) -> Option<&str> {
        match self {
            ClientEvent::RoomCreate => None,
            ClientEvent::RoomJoin { room_id }
            | ClientEvent::FileCreate { room_id, .. }
            | ClientEvent::FolderCreate { room_id, .. }
            | ClientEvent::FileSelect { room_id, .. }
            | ClientEvent::FolderSelect { room_id, .. }
            | ClientEvent::FileContentChange { room_id, .. }
            | ClientEvent::NodeRename { room_id, .. }
            | ClientEvent::CursorMove { room_id, .. }
            | ClientEvent::MousePosition { room_id, .. }
            | ClientEvent::CodeExecute { room_id } => Some(room_id),
        }
    }

    /// The node path argument referenced by the event, if any
    pub fn node_path(&self) -> Option<&[String]> {
        match self {
            ClientEvent::FileCreate { path, .. }
            | ClientEvent::FolderCreate { path, .. }
            | ClientEvent::FileContentChange { path, .. }
            | ClientEvent::NodeRename { path, .. } => Some(path),
            ClientEvent::FileSelect { path, .. } | ClientEvent::FolderSelect { path, .. } => {
                path.as_deref()
            }
            _ => None,
        }
    }
}

/// Outbound event pushed by the server to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Sent once to a connection right after it is accepted
    Welcome {
        client_id: String,
    },
    RoomCreated {
        room: RoomDto,
    },
    RoomJoined {
        room: RoomDto,
    },
    MemberJoined {
        member: MemberDto,
    },
    MemberLeft {
        member_id: String,
    },
    FileCreated {
        path: Vec<String>,
    },
    FolderCreated {
        path: Vec<String>,
    },
    FileSelected {
        #[serde(default)]
        path: Option<Vec<String>>,
    },
    FolderSelected {
        #[serde(default)]
        path: Option<Vec<String>>,
    },
    FileContentChanged {
        member_id: String,
        path: Vec<String>,
        content: Vec<String>,
        cursor: CursorPosition,
        selection: CursorSelection,
    },
    CursorMoved {
        member_id: String,
        position: CursorPosition,
        selection: CursorSelection,
    },
    NodeRenamed {
        path: Vec<String>,
        new_name: String,
    },
    MousePosition {
        member_id: String,
        x: f64,
        y: f64,
    },
    ExecuteCode,
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Serialize for the wire. Serialization of our own enums cannot fail.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

/// Wire representation of a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: String,
    pub is_owner: bool,
    pub color: MemberColor,
    pub cursor_position: CursorPosition,
    pub cursor_selection: CursorSelection,
}

/// Wire representation of one document tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub kind: NodeKindDto,
    pub name: String,
    pub path: Vec<String>,
    /// Present for files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKindDto {
    File,
    Folder,
}

/// Wire representation of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDto {
    pub nodes: Vec<NodeDto>,
    pub entry_file: Option<Vec<String>>,
    pub selected_file: Option<Vec<String>>,
    pub selected_folder: Option<Vec<String>>,
}

/// Wire representation of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub members: Vec<MemberDto>,
    pub tree: TreeDto,
}
