//! Shared document tree.
//!
//! The tree is a flat, path-keyed namespace of file and folder nodes. A path
//! is the ordered list of names from the root down to the node and is unique
//! within the tree. The tree also owns the room-wide pointers: the entry file
//! (first file ever created, the execution entry point) and the currently
//! selected file and folder.
//!
//! Nodes are only ever appended; there is no remove operation and nodes live
//! for the lifetime of the room. Renaming updates the display name of a node
//! without changing its addressing path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::ValidationError;
use super::value_object::{CursorPosition, CursorSelection, NodeName};

/// Errors raised by document tree operations.
///
/// The display strings are the exact texts reported back to the requesting
/// client, so they are part of the wire contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("path must not be empty")]
    EmptyPath,

    #[error("Node doesn't exist")]
    NotFound { path: String },

    #[error("'{path}' is not a File")]
    NotAFile { path: String },

    #[error("'{path}' isn't a Folder")]
    NotAFolder { path: String },

    #[error("Folder doesn't exist")]
    ParentNotFound { path: String },

    #[error("Node '{path}' already exists")]
    NameCollision { path: String },
}

/// Path of a node: the ordered list of names from the root to the node.
///
/// The empty path addresses the tree root itself, which is a valid implicit
/// parent but never a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<NodeName>);

impl NodePath {
    /// The root path (no segments)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_names(names: Vec<NodeName>) -> Self {
        Self(names)
    }

    /// Parse raw string segments, validating each as a node name
    pub fn parse(segments: &[String]) -> Result<Self, ValidationError> {
        let names = segments
            .iter()
            .map(|s| NodeName::new(s.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(names))
    }

    pub fn segments(&self) -> &[NodeName] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final segment, i.e. the node's own name within its parent
    pub fn name(&self) -> Option<&NodeName> {
        self.0.last()
    }

    /// The path of the containing folder (empty for top-level nodes)
    pub fn parent(&self) -> NodePath {
        match self.0.len() {
            0 | 1 => NodePath::root(),
            n => NodePath(self.0[..n - 1].to_vec()),
        }
    }

    /// Extend this path with one more name
    pub fn child(&self, name: NodeName) -> NodePath {
        let mut segments = self.0.clone();
        segments.push(name);
        NodePath(segments)
    }

    /// Join the segments with the reserved `/` separator.
    ///
    /// Unambiguous because `/` is rejected inside individual names.
    pub fn join(&self) -> String {
        self.0
            .iter()
            .map(NodeName::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn to_segments(&self) -> Vec<String> {
        self.0.iter().map(|n| n.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.join())
    }
}

/// A file node: display name, addressing path and the full text as lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: NodeName,
    pub path: NodePath,
    pub content: Vec<String>,
}

/// A folder node: display name and addressing path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: NodeName,
    pub path: NodePath,
}

/// A node in the document tree, either a file or a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    File(FileNode),
    Folder(FolderNode),
}

impl Node {
    pub fn name(&self) -> &NodeName {
        match self {
            Node::File(file) => &file.name,
            Node::Folder(folder) => &folder.name,
        }
    }

    pub fn path(&self) -> &NodePath {
        match self {
            Node::File(file) => &file.path,
            Node::Folder(folder) => &folder.path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }
}

/// The room-shared hierarchy of file and folder nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentTree {
    /// All nodes, keyed by joined path
    children: HashMap<String, Node>,
    /// First file ever created; execution entry point
    entry_file: Option<NodePath>,
    /// Room-wide selected file (shared, not per member)
    selected_file: Option<NodePath>,
    /// Room-wide selected folder; appends land here when set
    selected_folder: Option<NodePath>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_file(&self) -> Option<&NodePath> {
        self.entry_file.as_ref()
    }

    pub fn selected_file(&self) -> Option<&NodePath> {
        self.selected_file.as_ref()
    }

    pub fn selected_folder(&self) -> Option<&NodePath> {
        self.selected_folder.as_ref()
    }

    pub fn node_exists(&self, path: &NodePath) -> bool {
        self.children.contains_key(&path.join())
    }

    /// Iterate over all nodes in unspecified order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    pub fn node_count(&self) -> usize {
        self.children.len()
    }

    /// Append a file at the given path.
    ///
    /// The parent of a multi-segment path must already resolve to a folder.
    /// A sibling name collision is rejected and the tree is left untouched.
    /// The first file ever appended becomes the entry file.
    pub fn append_file(&mut self, path: NodePath) -> Result<FileNode, TreeError> {
        let name = path.name().cloned().ok_or(TreeError::EmptyPath)?;
        self.check_parent(&path)?;

        let key = path.join();
        if self.children.contains_key(&key) {
            return Err(TreeError::NameCollision { path: key });
        }

        let file = FileNode {
            name,
            path,
            content: vec![String::new()],
        };
        if self.entry_file.is_none() {
            self.entry_file = Some(file.path.clone());
        }
        self.children.insert(key, Node::File(file.clone()));

        Ok(file)
    }

    /// Append a folder at the given path; same parent and collision rules
    /// as [`append_file`](Self::append_file).
    pub fn append_folder(&mut self, path: NodePath) -> Result<FolderNode, TreeError> {
        let name = path.name().cloned().ok_or(TreeError::EmptyPath)?;
        self.check_parent(&path)?;

        let key = path.join();
        if self.children.contains_key(&key) {
            return Err(TreeError::NameCollision { path: key });
        }

        let folder = FolderNode { name, path };
        self.children.insert(key, Node::Folder(folder.clone()));

        Ok(folder)
    }

    /// Append a file named `name` under the currently selected folder, or
    /// under the root when no folder is selected.
    pub fn append_file_to_selected(&mut self, name: NodeName) -> Result<FileNode, TreeError> {
        let base = self.selected_folder.clone().unwrap_or_default();
        self.append_file(base.child(name))
    }

    /// Append a folder named `name` under the currently selected folder, or
    /// under the root when no folder is selected.
    pub fn append_folder_to_selected(&mut self, name: NodeName) -> Result<FolderNode, TreeError> {
        let base = self.selected_folder.clone().unwrap_or_default();
        self.append_folder(base.child(name))
    }

    pub fn get_node(&self, path: &NodePath) -> Result<&Node, TreeError> {
        self.children
            .get(&path.join())
            .ok_or_else(|| TreeError::NotFound { path: path.join() })
    }

    pub fn get_file(&self, path: &NodePath) -> Result<&FileNode, TreeError> {
        match self.get_node(path)? {
            Node::File(file) => Ok(file),
            Node::Folder(_) => Err(TreeError::NotAFile { path: path.join() }),
        }
    }

    pub fn get_folder(&self, path: &NodePath) -> Result<&FolderNode, TreeError> {
        match self.get_node(path)? {
            Node::Folder(folder) => Ok(folder),
            Node::File(_) => Err(TreeError::NotAFolder { path: path.join() }),
        }
    }

    /// Update the shared selected-file pointer; `None` clears it.
    ///
    /// Fails without touching the pointer when the path does not resolve to
    /// a file.
    pub fn select_file(&mut self, path: Option<NodePath>) -> Result<(), TreeError> {
        if let Some(ref p) = path {
            self.get_file(p)?;
        }
        self.selected_file = path;
        Ok(())
    }

    /// Update the shared selected-folder pointer; `None` clears it.
    pub fn select_folder(&mut self, path: Option<NodePath>) -> Result<(), TreeError> {
        if let Some(ref p) = path {
            self.get_folder(p)?;
        }
        self.selected_folder = path;
        Ok(())
    }

    /// Replace a file's line sequence wholesale (last full write wins).
    pub fn set_content(&mut self, path: &NodePath, lines: Vec<String>) -> Result<(), TreeError> {
        match self.children.get_mut(&path.join()) {
            Some(Node::File(file)) => {
                file.content = lines;
                Ok(())
            }
            Some(Node::Folder(_)) => Err(TreeError::NotAFile { path: path.join() }),
            None => Err(TreeError::NotFound { path: path.join() }),
        }
    }

    /// Change a node's display name. The addressing path is left untouched:
    /// the node stays reachable under the path it was created with.
    pub fn rename(&mut self, path: &NodePath, new_name: NodeName) -> Result<(), TreeError> {
        match self.children.get_mut(&path.join()) {
            Some(Node::File(file)) => {
                file.name = new_name;
                Ok(())
            }
            Some(Node::Folder(folder)) => {
                folder.name = new_name;
                Ok(())
            }
            None => Err(TreeError::NotFound { path: path.join() }),
        }
    }

    fn check_parent(&self, path: &NodePath) -> Result<(), TreeError> {
        let parent = path.parent();
        if parent.is_empty() {
            // the root tree itself is a valid implicit parent
            return Ok(());
        }
        match self.children.get(&parent.join()) {
            Some(Node::Folder(_)) => Ok(()),
            Some(Node::File(_)) => Err(TreeError::NotAFolder {
                path: parent.join(),
            }),
            None => Err(TreeError::ParentNotFound {
                path: parent.join(),
            }),
        }
    }
}

/// Clamp a cursor position into the bounds of the given content lines.
///
/// The line is clamped to the last valid line and the column to that line's
/// character length. Empty content collapses to the origin.
pub fn clamp_position(lines: &[String], position: &CursorPosition) -> CursorPosition {
    if lines.is_empty() {
        return CursorPosition::default();
    }
    let line = position.line.min(lines.len() - 1);
    let column = position.column.min(lines[line].chars().count());
    CursorPosition { line, column }
}

/// Clamp both endpoints of a selection into the bounds of the given lines.
pub fn clamp_selection(lines: &[String], selection: &CursorSelection) -> CursorSelection {
    CursorSelection {
        start: clamp_position(lines, &selection.start),
        end: clamp_position(lines, &selection.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> NodePath {
        NodePath::parse(&segments.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    fn name(raw: &str) -> NodeName {
        NodeName::new(raw.to_string()).unwrap()
    }

    #[test]
    fn test_append_file_at_root() {
        // テスト項目: ルート直下にファイルを追加できる
        // given (前提条件):
        let mut tree = DocumentTree::new();

        // when (操作):
        let file = tree.append_file(path(&["a.js"])).unwrap();

        // then (期待する結果):
        assert_eq!(file.name.as_str(), "a.js");
        assert_eq!(file.content, vec![String::new()]);
        assert!(tree.node_exists(&path(&["a.js"])));
    }

    #[test]
    fn test_first_file_becomes_entry_file() {
        // テスト項目: 最初に作成されたファイルがエントリファイルになる
        // given (前提条件):
        let mut tree = DocumentTree::new();

        // when (操作):
        tree.append_file(path(&["a.js"])).unwrap();
        tree.append_file(path(&["b.js"])).unwrap();

        // then (期待する結果): エントリファイルは最初のファイルのまま
        assert_eq!(tree.entry_file(), Some(&path(&["a.js"])));
    }

    #[test]
    fn test_folder_is_not_an_entry_file() {
        // テスト項目: フォルダ作成ではエントリファイルが設定されない
        // given (前提条件):
        let mut tree = DocumentTree::new();

        // when (操作):
        tree.append_folder(path(&["src"])).unwrap();

        // then (期待する結果):
        assert_eq!(tree.entry_file(), None);
    }

    #[test]
    fn test_append_under_missing_parent_fails_without_mutation() {
        // テスト項目: 存在しない親パスへの追加は失敗し、ツリーは変化しない
        // given (前提条件):
        let mut tree = DocumentTree::new();

        // when (操作):
        let result = tree.append_file(path(&["src", "b.js"]));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(TreeError::ParentNotFound {
                path: "src".to_string()
            })
        );
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.entry_file(), None);
    }

    #[test]
    fn test_append_under_file_parent_fails() {
        // テスト項目: ファイルを親に指定した追加は失敗する
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();

        // when (操作):
        let result = tree.append_file(path(&["a.js", "b.js"]));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(TreeError::NotAFolder {
                path: "a.js".to_string()
            })
        );
    }

    #[test]
    fn test_append_into_existing_folder() {
        // テスト項目: 既存フォルダ配下にファイルを追加できる
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_folder(path(&["src"])).unwrap();

        // when (操作):
        let file = tree.append_file(path(&["src", "b.js"])).unwrap();

        // then (期待する結果):
        assert_eq!(file.path, path(&["src", "b.js"]));
        assert!(tree.get_file(&path(&["src", "b.js"])).is_ok());
    }

    #[test]
    fn test_sibling_name_collision_is_rejected() {
        // テスト項目: 兄弟ノードとの名前衝突が拒否される
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();

        // when (操作): 同名のファイルとフォルダを追加
        let file_result = tree.append_file(path(&["a.js"]));
        let folder_result = tree.append_folder(path(&["a.js"]));

        // then (期待する結果): どちらも衝突エラー
        assert_eq!(
            file_result,
            Err(TreeError::NameCollision {
                path: "a.js".to_string()
            })
        );
        assert_eq!(
            folder_result,
            Err(TreeError::NameCollision {
                path: "a.js".to_string()
            })
        );
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_get_file_and_get_folder_distinguish_kinds() {
        // テスト項目: ファイルとして作成したパスは get_folder では種別エラーになる
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();

        // when (操作):
        let as_file = tree.get_file(&path(&["a.js"]));
        let as_folder = tree.get_folder(&path(&["a.js"]));
        let missing = tree.get_file(&path(&["missing.js"]));

        // then (期待する結果):
        assert!(as_file.is_ok());
        assert_eq!(
            as_folder,
            Err(TreeError::NotAFolder {
                path: "a.js".to_string()
            })
        );
        assert_eq!(
            missing,
            Err(TreeError::NotFound {
                path: "missing.js".to_string()
            })
        );
    }

    #[test]
    fn test_append_to_selected_folder() {
        // テスト項目: 選択中フォルダ配下への追加と、選択なし時のルート追加
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_folder(path(&["src"])).unwrap();
        tree.select_folder(Some(path(&["src"]))).unwrap();

        // when (操作):
        let nested = tree.append_file_to_selected(name("b.js")).unwrap();
        tree.select_folder(None).unwrap();
        let top_level = tree.append_file_to_selected(name("c.js")).unwrap();

        // then (期待する結果):
        assert_eq!(nested.path, path(&["src", "b.js"]));
        assert_eq!(top_level.path, path(&["c.js"]));
    }

    #[test]
    fn test_select_file_requires_file_kind() {
        // テスト項目: select_file はファイル以外・不在のパスを拒否し、ポインタを変えない
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();
        tree.append_folder(path(&["src"])).unwrap();
        tree.select_file(Some(path(&["a.js"]))).unwrap();

        // when (操作):
        let missing = tree.select_file(Some(path(&["missing.js"])));
        let wrong_kind = tree.select_file(Some(path(&["src"])));

        // then (期待する結果):
        assert_eq!(
            missing,
            Err(TreeError::NotFound {
                path: "missing.js".to_string()
            })
        );
        assert_eq!(
            wrong_kind,
            Err(TreeError::NotAFile {
                path: "src".to_string()
            })
        );
        assert_eq!(tree.selected_file(), Some(&path(&["a.js"])));
    }

    #[test]
    fn test_select_none_clears_pointer() {
        // テスト項目: None の選択でポインタがクリアされる
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();
        tree.select_file(Some(path(&["a.js"]))).unwrap();

        // when (操作):
        tree.select_file(None).unwrap();

        // then (期待する結果):
        assert_eq!(tree.selected_file(), None);
    }

    #[test]
    fn test_set_content_replaces_lines_wholesale() {
        // テスト項目: set_content は行列全体を置き換える
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();

        // when (操作):
        tree.set_content(
            &path(&["a.js"]),
            vec!["let x = 1;".to_string(), "x += 1;".to_string()],
        )
        .unwrap();
        tree.set_content(&path(&["a.js"]), vec!["// reset".to_string()])
            .unwrap();

        // then (期待する結果): 最後の書き込みが全体を置き換えている
        let file = tree.get_file(&path(&["a.js"])).unwrap();
        assert_eq!(file.content, vec!["// reset".to_string()]);
    }

    #[test]
    fn test_rename_changes_display_name_only() {
        // テスト項目: rename は表示名のみを変更し、パスでの参照は維持される
        // given (前提条件):
        let mut tree = DocumentTree::new();
        tree.append_file(path(&["a.js"])).unwrap();

        // when (操作):
        tree.rename(&path(&["a.js"]), name("main.js")).unwrap();

        // then (期待する結果): 旧パスで参照でき、名前だけが変わっている
        let file = tree.get_file(&path(&["a.js"])).unwrap();
        assert_eq!(file.name.as_str(), "main.js");
        assert_eq!(file.path, path(&["a.js"]));
    }

    #[test]
    fn test_clamp_position_inside_bounds_is_unchanged() {
        // テスト項目: 範囲内のカーソル位置は変更されない
        // given (前提条件):
        let lines = vec!["hello".to_string(), "world!".to_string()];
        let position = CursorPosition::new(1, 3);

        // when (操作):
        let clamped = clamp_position(&lines, &position);

        // then (期待する結果):
        assert_eq!(clamped, position);
    }

    #[test]
    fn test_clamp_position_out_of_bounds() {
        // テスト項目: 範囲外のカーソル位置が最終行・行長に丸められる
        // given (前提条件):
        let lines = vec!["hello".to_string(), "hi".to_string()];
        let position = CursorPosition::new(9, 99);

        // when (操作):
        let clamped = clamp_position(&lines, &position);

        // then (期待する結果): 最終行 (1) の行長 (2) に丸められる
        assert_eq!(clamped, CursorPosition::new(1, 2));
    }

    #[test]
    fn test_clamp_position_with_empty_content() {
        // テスト項目: 空コンテンツでは原点に丸められる
        // given (前提条件):
        let lines: Vec<String> = Vec::new();
        let position = CursorPosition::new(3, 4);

        // when (操作):
        let clamped = clamp_position(&lines, &position);

        // then (期待する結果):
        assert_eq!(clamped, CursorPosition::default());
    }

    #[test]
    fn test_clamp_selection_clamps_both_endpoints() {
        // テスト項目: 選択範囲の両端が丸められる
        // given (前提条件):
        let lines = vec!["abc".to_string()];
        let selection =
            CursorSelection::new(CursorPosition::new(0, 2), CursorPosition::new(5, 10));

        // when (操作):
        let clamped = clamp_selection(&lines, &selection);

        // then (期待する結果):
        assert_eq!(clamped.start, CursorPosition::new(0, 2));
        assert_eq!(clamped.end, CursorPosition::new(0, 3));
    }
}
