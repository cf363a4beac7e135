// src/models/history.rs

use serde::{Deserialize, Serialize};

/// Body of `GET /api/history`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub seen_count: usize,
    pub seen_ids: Vec<i64>,
}
