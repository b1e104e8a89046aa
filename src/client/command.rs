//! REPL command parsing: slash commands typed by the user are mapped to
//! protocol events.

use crate::domain::{CursorPosition, CursorSelection};
use crate::infrastructure::dto::websocket::ClientEvent;

/// Help text printed for `/help` and unknown commands
pub const HELP_TEXT: &str = "\
Commands:
  /create                    create a new room
  /join <roomId>             join an existing room
  /file <path>               create a file (e.g. /file src/main.js)
  /folder <path>             create a folder
  /open [path]               select a file; no path clears the selection
  /cd [path]                 select a folder; no path clears the selection
  /edit <path> <text>        replace a file's content with one line of text
  /rename <path> <newName>   rename a node (display name only)
  /run                       ask the other members to execute the code
  /help                      show this help
";

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create,
    Join { room_id: String },
    NewFile { path: Vec<String> },
    NewFolder { path: Vec<String> },
    SelectFile { path: Option<Vec<String>> },
    SelectFolder { path: Option<Vec<String>> },
    Edit { path: Vec<String>, text: String },
    Rename { path: Vec<String>, new_name: String },
    Run,
    Help,
}

fn split_path(raw: &str) -> Vec<String> {
    raw.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Parse one REPL line into a command
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.trim().split_whitespace();
    let keyword = parts.next().ok_or_else(|| "empty command".to_string())?;

    match keyword {
        "/create" => Ok(Command::Create),
        "/join" => {
            let room_id = parts.next().ok_or("usage: /join <roomId>")?;
            Ok(Command::Join {
                room_id: room_id.to_string(),
            })
        }
        "/file" => {
            let path = parts.next().ok_or("usage: /file <path>")?;
            Ok(Command::NewFile {
                path: split_path(path),
            })
        }
        "/folder" => {
            let path = parts.next().ok_or("usage: /folder <path>")?;
            Ok(Command::NewFolder {
                path: split_path(path),
            })
        }
        "/open" => Ok(Command::SelectFile {
            path: parts.next().map(split_path),
        }),
        "/cd" => Ok(Command::SelectFolder {
            path: parts.next().map(split_path),
        }),
        "/edit" => {
            let path = parts.next().ok_or("usage: /edit <path> <text>")?;
            let text = parts.collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return Err("usage: /edit <path> <text>".to_string());
            }
            Ok(Command::Edit {
                path: split_path(path),
                text,
            })
        }
        "/rename" => {
            let path = parts.next().ok_or("usage: /rename <path> <newName>")?;
            let new_name = parts.next().ok_or("usage: /rename <path> <newName>")?;
            Ok(Command::Rename {
                path: split_path(path),
                new_name: new_name.to_string(),
            })
        }
        "/run" => Ok(Command::Run),
        "/help" => Ok(Command::Help),
        other => Err(format!("unknown command '{}', try /help", other)),
    }
}

impl Command {
    /// Convert the command into the protocol event it stands for.
    ///
    /// Commands other than `/create` need the id of the joined room.
    pub fn to_event(&self, room_id: Option<&str>) -> Result<ClientEvent, String> {
        let require_room =
            || room_id.map(|id| id.to_string()).ok_or("join a room first (/create or /join)");

        match self {
            Command::Create => Ok(ClientEvent::RoomCreate),
            Command::Join { room_id } => Ok(ClientEvent::RoomJoin {
                room_id: room_id.clone(),
            }),
            Command::NewFile { path } => Ok(ClientEvent::FileCreate {
                room_id: require_room()?,
                path: path.clone(),
            }),
            Command::NewFolder { path } => Ok(ClientEvent::FolderCreate {
                room_id: require_room()?,
                path: path.clone(),
            }),
            Command::SelectFile { path } => Ok(ClientEvent::FileSelect {
                room_id: require_room()?,
                path: path.clone(),
            }),
            Command::SelectFolder { path } => Ok(ClientEvent::FolderSelect {
                room_id: require_room()?,
                path: path.clone(),
            }),
            Command::Edit { path, text } => {
                let column = text.chars().count();
                Ok(ClientEvent::FileContentChange {
                    room_id: require_room()?,
                    path: path.clone(),
                    content: vec![text.clone()],
                    cursor: CursorPosition::new(0, column),
                    selection: CursorSelection::default(),
                })
            }
            Command::Rename { path, new_name } => Ok(ClientEvent::NodeRename {
                room_id: require_room()?,
                path: path.clone(),
                new_name: new_name.clone(),
            }),
            Command::Run => Ok(ClientEvent::CodeExecute {
                room_id: require_room()?,
            }),
            Command::Help => Err(HELP_TEXT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_and_join() {
        // テスト項目: /create と /join が解析できる
        // given (前提条件):

        // when (操作):
        let create = parse_command("/create").unwrap();
        let join = parse_command("/join abc123").unwrap();

        // then (期待する結果):
        assert_eq!(create, Command::Create);
        assert_eq!(
            join,
            Command::Join {
                room_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn test_parse_file_command_splits_path() {
        // テスト項目: /file のパスがセグメントに分割される
        // given (前提条件):

        // when (操作):
        let command = parse_command("/file src/main.js").unwrap();

        // then (期待する結果):
        assert_eq!(
            command,
            Command::NewFile {
                path: vec!["src".to_string(), "main.js".to_string()]
            }
        );
    }

    #[test]
    fn test_parse_open_without_path_clears_selection() {
        // テスト項目: 引数なしの /open が選択解除になる
        // given (前提条件):

        // when (操作):
        let command = parse_command("/open").unwrap();

        // then (期待する結果):
        assert_eq!(command, Command::SelectFile { path: None });
    }

    #[test]
    fn test_parse_edit_joins_remaining_words() {
        // テスト項目: /edit の残りの語がテキストとして連結される
        // given (前提条件):

        // when (操作):
        let command = parse_command("/edit a.js let x = 1;").unwrap();

        // then (期待する結果):
        assert_eq!(
            command,
            Command::Edit {
                path: vec!["a.js".to_string()],
                text: "let x = 1;".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_command_fails() {
        // テスト項目: 未知のコマンドがエラーになる
        // given (前提条件):

        // when (操作):
        let result = parse_command("/fly");

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_to_event_requires_room_for_document_commands() {
        // テスト項目: ルーム未参加のドキュメント操作はイベントに変換できない
        // given (前提条件):
        let command = Command::Run;

        // when (操作):
        let without_room = command.to_event(None);
        let with_room = command.to_event(Some("abc123"));

        // then (期待する結果):
        assert!(without_room.is_err());
        assert_eq!(
            with_room.unwrap(),
            ClientEvent::CodeExecute {
                room_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn test_edit_event_places_cursor_at_end_of_line() {
        // テスト項目: /edit のイベントはカーソルを行末に置く
        // given (前提条件):
        let command = parse_command("/edit a.js hello").unwrap();

        // when (操作):
        let event = command.to_event(Some("abc123")).unwrap();

        // then (期待する結果):
        match event {
            ClientEvent::FileContentChange {
                content, cursor, ..
            } => {
                assert_eq!(content, vec!["hello".to_string()]);
                assert_eq!(cursor, CursorPosition::new(0, 5));
            }
            other => panic!("expected fileContentChange, got {:?}", other),
        }
    }
}
