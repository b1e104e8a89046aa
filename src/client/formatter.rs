//! Event formatting utilities for client display.

use std::io::Write;

use crate::infrastructure::dto::websocket::{RoomDto, ServerEvent};

/// Event formatter for client display
pub struct EventFormatter;

fn join_path(path: &[String]) -> String {
    path.join("/")
}

fn join_optional_path(path: &Option<Vec<String>>) -> String {
    match path {
        Some(path) => join_path(path),
        None => "(none)".to_string(),
    }
}

impl EventFormatter {
    /// Format a room snapshot shown after creating or joining a room
    pub fn format_room(room: &RoomDto, current_client_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Room: {}\n", room.id));
        output.push_str("Members:\n");
        for member in &room.members {
            let me_suffix = if member.id == current_client_id {
                " (me)"
            } else {
                ""
            };
            let owner_suffix = if member.is_owner { " [owner]" } else { "" };
            output.push_str(&format!("  {}{}{}\n", member.id, me_suffix, owner_suffix));
        }
        if room.tree.nodes.is_empty() {
            output.push_str("Tree: (empty)\n");
        } else {
            output.push_str("Tree:\n");
            for node in &room.tree.nodes {
                output.push_str(&format!("  {}\n", join_path(&node.path)));
            }
        }
        output.push_str("============================================================\n");
        output
    }

    /// Format one server event as a display line
    pub fn format_event(event: &ServerEvent, current_client_id: &str) -> String {
        match event {
            ServerEvent::Welcome { client_id } => {
                format!("\n* connected as '{}'\n", client_id)
            }
            ServerEvent::RoomCreated { room } | ServerEvent::RoomJoined { room } => {
                Self::format_room(room, current_client_id)
            }
            ServerEvent::MemberJoined { member } => {
                format!("\n+ {} joined the room\n", member.id)
            }
            ServerEvent::MemberLeft { member_id } => {
                format!("\n- {} left the room\n", member_id)
            }
            ServerEvent::FileCreated { path } => {
                format!("\n* file created: {}\n", join_path(path))
            }
            ServerEvent::FolderCreated { path } => {
                format!("\n* folder created: {}\n", join_path(path))
            }
            ServerEvent::FileSelected { path } => {
                format!("\n* file selected: {}\n", join_optional_path(path))
            }
            ServerEvent::FolderSelected { path } => {
                format!("\n* folder selected: {}\n", join_optional_path(path))
            }
            ServerEvent::FileContentChanged {
                member_id, path, ..
            } => {
                format!("\n* {} edited {}\n", member_id, join_path(path))
            }
            ServerEvent::CursorMoved {
                member_id,
                position,
                ..
            } => {
                format!(
                    "\n* {} moved cursor to {}:{}\n",
                    member_id, position.line, position.column
                )
            }
            ServerEvent::NodeRenamed { path, new_name } => {
                format!("\n* {} renamed to {}\n", join_path(path), new_name)
            }
            ServerEvent::MousePosition { member_id, x, y } => {
                format!("\n* {} pointer at ({:.0}, {:.0})\n", member_id, x, y)
            }
            ServerEvent::ExecuteCode => "\n* execution requested\n".to_string(),
            ServerEvent::Error { message } => {
                format!("\n! error: {}\n", message)
            }
        }
    }

    /// Format a raw message that failed to parse as a server event
    pub fn format_raw_message(text: &str) -> String {
        format!("\n? {}\n", text)
    }
}

/// Redisplay the REPL prompt after asynchronous output
pub fn redisplay_prompt(client_id: &str) {
    print!("{}> ", client_id);
    let _ = std::io::stdout().flush();
}
