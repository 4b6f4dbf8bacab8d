//! HTTP 层 - 对外接口
//!
//! 路由分组：
//! - 公开页面：首页 / 日期页 / 答案页 / 归档 / 搜索 / sitemap
//! - 管理接口：密码登录 + 五个上传端点（Cookie 认证）
//! - 静态文件：已上传的拼图文件

pub mod auth;
pub mod pages;
pub mod search;
pub mod sitemap;
pub mod upload;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::error::{AppError, AuthError, ParseError};
use crate::services::{AnswerStore, SearchService};
use crate::workflow::UploadFlow;

/// 各请求处理器共享的应用状态
///
/// 存储和服务在进程启动时构建一次，这里只持有共享引用
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<AnswerStore>,
    pub flow: Arc<UploadFlow>,
    pub search: Arc<SearchService>,
}

impl AppState {
    /// 构建应用状态（store 与各服务各构建一次）
    pub fn new(config: Config) -> Self {
        let store = Arc::new(AnswerStore::new(&config.data_file));
        let flow = Arc::new(UploadFlow::new(&config, store.clone()));
        let search = Arc::new(SearchService::new(store.clone()));
        Self {
            config,
            store,
            flow,
            search,
        }
    }
}

/// 组装路由
pub fn build_router(state: AppState) -> Router {
    let uploads_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/", get(pages::home_page))
        .route("/answers", get(pages::answers_page))
        .route("/answer/:slug", get(pages::answer_page))
        .route("/archive", get(pages::archive_page))
        .route("/upload", get(pages::upload_page))
        .route("/sitemap.xml", get(sitemap::sitemap_xml))
        .route("/api/search", get(search::search_api))
        .route("/api/auth", post(auth::login))
        .route("/api/upload-answers", post(upload::upload_answers))
        .route("/api/upload-text", post(upload::upload_text))
        .route("/api/upload-image", post(upload::upload_image))
        .route("/api/upload-solved", post(upload::upload_solved))
        .route("/api/upload-crossword", post(upload::upload_crossword))
        // 动态日期页放在静态路由之后注册，路径形如 /2025-01-15
        .route("/:date", get(pages::date_page))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 把应用错误映射为 API 错误响应
///
/// 错误分类：
/// - 输入校验错误 → 400，用户可见的具体信息
/// - 认证错误 → 401，不泄露密码是否接近正确
/// - AI / 其他错误 → 500，统一的笼统信息
pub fn error_response(error: &AppError) -> (StatusCode, Json<JsonValue>) {
    let (status, message) = match error {
        AppError::Parse(ParseError::EmptyInput) => (StatusCode::BAD_REQUEST, "No text provided"),
        AppError::Parse(ParseError::NoValidAnswers) => (
            StatusCode::BAD_REQUEST,
            "No valid answers found. Please use format: Position: Answer (e.g., 1A: FASTEN)",
        ),
        AppError::Auth(AuthError::AuthenticationRequired) => {
            (StatusCode::UNAUTHORIZED, "Authentication required")
        }
        AppError::Auth(AuthError::InvalidPassword) => {
            (StatusCode::UNAUTHORIZED, "Invalid password")
        }
        AppError::Extract(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Processing failed. Please try again.",
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    };

    (status, Json(json!({ "error": message })))
}
