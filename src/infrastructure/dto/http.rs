//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{MemberDto, TreeDto};

/// Room summary for the rooms listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub member_count: usize,
    pub created_at: String,
}

/// Room detail for the single-room endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub created_at: String,
    pub members: Vec<MemberDto>,
    pub tree: TreeDto,
}
