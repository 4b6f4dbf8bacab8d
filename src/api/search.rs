//! 搜索 API
//!
//! 对线索/答案/格位做大小写不敏感的子串搜索，结果上限 5 条

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::api::AppState;

/// 搜索结果上限
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// 搜索请求参数
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/search?q=
///
/// 查询串少于 2 个字符时返回空结果（不报错）
pub async fn search_api(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<JsonValue> {
    let query = params.q.unwrap_or_default();
    let results = state.search.search(&query, SEARCH_RESULT_LIMIT).await;
    Json(json!({ "results": results }))
}
