//! Value object 定義
//!
//! ルーム ID・クライアント ID・ノード名などの検証付き newtype と、
//! カーソル位置・メンバーカラーの小さな値型を定義します。

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;

const MAX_ID_LENGTH: usize = 64;
const MAX_NODE_NAME_LENGTH: usize = 255;

/// Room identifier (uuid-v4 simple format when generated by [`RoomIdFactory`])
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Create a RoomId after validating the raw string
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty);
        }
        if value.len() > MAX_ID_LENGTH {
            return Err(ValidationError::TooLong(value.len()));
        }
        if let Some(c) = value.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidCharacter(c));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Factory generating collision-resistant room ids
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a fresh RoomId from a uuid v4
    pub fn generate() -> RoomId {
        // uuid simple 形式は常にバリデーションを満たす
        RoomId(Uuid::new_v4().simple().to_string())
    }
}

/// Client identifier, stable for the lifetime of one connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Create a ClientId after validating the raw string
    ///
    /// Allowed characters: alphanumerics, `-`, `_` and `.`.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty);
        }
        if value.len() > MAX_ID_LENGTH {
            return Err(ValidationError::TooLong(value.len()));
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ValidationError::InvalidCharacter(c));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name of a file or folder node
///
/// The path separator `/` is reserved and never allowed inside a single name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeName(String);

impl NodeName {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty);
        }
        if value.len() > MAX_NODE_NAME_LENGTH {
            return Err(ValidationError::TooLong(value.len()));
        }
        if value.contains('/') {
            return Err(ValidationError::ReservedSeparator(value));
        }
        if let Some(c) = value.chars().find(|c| c.is_control()) {
            return Err(ValidationError::InvalidCharacter(c));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Display color assigned to a member at join time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl MemberColor {
    /// Generate a random color with three 0-255 components
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            r: rng.random(),
            g: rng.random(),
            b: rng.random(),
        }
    }
}

/// Cursor position inside a file, zero-based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl CursorPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Cursor selection range, a pair of positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSelection {
    pub start: CursorPosition,
    pub end: CursorPosition,
}

impl CursorSelection {
    pub fn new(start: CursorPosition, end: CursorPosition) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_factory_generates_valid_ids() {
        // テスト項目: RoomIdFactory が検証を満たす ID を生成する
        // given (前提条件):

        // when (操作):
        let id1 = RoomIdFactory::generate();
        let id2 = RoomIdFactory::generate();

        // then (期待する結果):
        assert_eq!(id1.as_str().len(), 32);
        assert_ne!(id1, id2);
        assert!(RoomId::new(id1.as_str().to_string()).is_ok());
    }

    #[test]
    fn test_client_id_rejects_empty_string() {
        // テスト項目: 空文字の ClientId が拒否される
        // given (前提条件):
        let raw = String::new();

        // when (操作):
        let result = ClientId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::Empty));
    }

    #[test]
    fn test_client_id_rejects_invalid_characters() {
        // テスト項目: 許可されない文字を含む ClientId が拒否される
        // given (前提条件):
        let raw = "alice smith".to_string();

        // when (操作):
        let result = ClientId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::InvalidCharacter(' ')));
    }

    #[test]
    fn test_client_id_accepts_typical_ids() {
        // テスト項目: 一般的な形式の ClientId が受理される
        // given (前提条件):
        let raw = "alice_01.test-x".to_string();

        // when (操作):
        let result = ClientId::new(raw.clone());

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), raw);
    }

    #[test]
    fn test_node_name_rejects_path_separator() {
        // テスト項目: パス区切り文字を含むノード名が拒否される
        // given (前提条件):
        let raw = "src/main.js".to_string();

        // when (操作):
        let result = NodeName::new(raw.clone());

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::ReservedSeparator(raw)));
    }

    #[test]
    fn test_node_name_accepts_spaces() {
        // テスト項目: 空白を含むノード名が受理される
        // given (前提条件):
        let raw = "my notes.txt".to_string();

        // when (操作):
        let result = NodeName::new(raw);

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_member_color_generation_varies() {
        // テスト項目: メンバーカラーの生成が毎回同一にはならない
        // given (前提条件):

        // when (操作):
        let colors: Vec<MemberColor> = (0..64).map(|_| MemberColor::random()).collect();

        // then (期待する結果): 64 回生成して全てが同一になることは事実上ない
        let first = colors[0];
        assert!(colors.iter().any(|c| *c != first));
    }
}
