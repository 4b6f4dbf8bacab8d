//! 上传端点
//!
//! 五个端点共用同一套流程：Cookie 认证 → 读取输入 → 交给 UploadFlow →
//! 统一的成功/失败响应。上传的原始文件另存到 uploads 目录（保存失败
//! 不影响提取流程）

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::api::{auth, error_response, AppState};
use crate::workflow::upload_ctx::today;
use crate::workflow::UploadOutcome;

/// 文本类上传请求体
#[derive(Debug, Deserialize)]
pub struct TextUploadRequest {
    pub text: Option<String>,
}

/// POST /api/upload-answers
///
/// 手动粘贴答案，纯本地解析，不调 AI
pub async fn upload_answers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TextUploadRequest>,
) -> Response {
    if let Err(e) = auth::require_upload_auth(&headers) {
        return error_response(&e).into_response();
    }

    let text = req.text.unwrap_or_default();
    match state.flow.run_manual_text(&text, None).await {
        Ok(outcome) => upload_success(&outcome),
        Err(e) => {
            error!("❌ 手动答案上传失败: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /api/upload-text
///
/// 粘贴拼图文本，交给 AI 提取
pub async fn upload_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TextUploadRequest>,
) -> Response {
    if let Err(e) = auth::require_upload_auth(&headers) {
        return error_response(&e).into_response();
    }

    let text = req.text.unwrap_or_default();
    match state.flow.run_ai_text(&text, None).await {
        Ok(outcome) => upload_success(&outcome),
        Err(e) => {
            error!("❌ 文本上传失败: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /api/upload-image
///
/// 未填拼图图片，交给 AI Vision 提取
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(e) = auth::require_upload_auth(&headers) {
        return error_response(&e).into_response();
    }

    let (file, _date) = read_multipart(&mut multipart).await;
    let Some(file) = file else {
        return bad_request("No file uploaded");
    };
    if !file.content_type.starts_with("image/") {
        return bad_request("File must be an image");
    }

    let filename = format!("crossword-{}.{}", today(), file.extension());
    save_upload_file(&state.config.upload_dir, &filename, &file.data).await;

    match state.flow.run_image(&file.content_type, &file.data, None, false).await {
        Ok(outcome) => upload_success(&outcome),
        Err(e) => {
            error!("❌ 图片上传失败: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /api/upload-solved
///
/// 已填拼图图片，可附带目标日期
pub async fn upload_solved(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(e) = auth::require_upload_auth(&headers) {
        return error_response(&e).into_response();
    }

    let (file, date) = read_multipart(&mut multipart).await;
    let Some(file) = file else {
        return bad_request("No file uploaded");
    };
    if !file.content_type.starts_with("image/") {
        return bad_request("File must be an image");
    }

    let target_date = date.clone().unwrap_or_else(today);
    let filename = format!(
        "solved-crossword-{}-{}.{}",
        target_date,
        chrono::Local::now().timestamp_millis(),
        file.extension()
    );
    save_upload_file(&state.config.upload_dir, &filename, &file.data).await;

    match state
        .flow
        .run_image(&file.content_type, &file.data, date.as_deref(), true)
        .await
    {
        Ok(outcome) => upload_success(&outcome),
        Err(e) => {
            error!("❌ 已填拼图上传失败: {}", e);
            error_response(&e).into_response()
        }
    }
}

/// POST /api/upload-crossword
///
/// 拼图 PDF，转发给 AI 服务（PDF 渲染由服务方完成）
pub async fn upload_crossword(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(e) = auth::require_upload_auth(&headers) {
        return error_response(&e).into_response();
    }

    let (file, _date) = read_multipart(&mut multipart).await;
    let Some(file) = file else {
        return bad_request("No file provided");
    };
    if file.content_type != "application/pdf" {
        return bad_request("File must be a PDF");
    }

    let filename = format!("crossword-{}.pdf", today());
    save_upload_file(&state.config.upload_dir, &filename, &file.data).await;

    match state.flow.run_pdf(&file.data).await {
        Ok(outcome) => upload_success(&outcome),
        Err(e) => {
            error!("❌ PDF 上传失败: {}", e);
            error_response(&e).into_response()
        }
    }
}

// ========== 辅助函数 ==========

/// multipart 中读出的上传文件
struct UploadedFile {
    content_type: String,
    data: Vec<u8>,
}

impl UploadedFile {
    /// 从 MIME 类型推断文件扩展名
    fn extension(&self) -> &str {
        self.content_type.split('/').nth(1).unwrap_or("bin")
    }
}

/// 读取 multipart 表单中的 `file` 和可选的 `date` 字段
async fn read_multipart(multipart: &mut Multipart) -> (Option<UploadedFile>, Option<String>) {
    let mut file = None;
    let mut date = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        // name() 借用 field，而 bytes()/text() 会消耗 field，先拷贝出来
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some(UploadedFile {
                            content_type,
                            data: bytes.to_vec(),
                        })
                    }
                    Err(e) => warn!("⚠️ 读取上传文件失败: {}", e),
                }
            }
            Some("date") => {
                date = field
                    .text()
                    .await
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    (file, date)
}

/// 把上传的原始文件保存到 uploads 目录
///
/// 保存失败只记日志，不中断提取流程
async fn save_upload_file(upload_dir: &str, filename: &str, data: &[u8]) {
    let path = std::path::Path::new(upload_dir).join(filename);
    let result = async {
        tokio::fs::create_dir_all(upload_dir).await?;
        tokio::fs::write(&path, data).await
    }
    .await;

    match result {
        Ok(()) => info!("📁 上传文件已保存: {}", path.display()),
        Err(e) => warn!("⚠️ 上传文件保存失败 ({}): {}", path.display(), e),
    }
}

/// 统一的上传成功响应
fn upload_success(outcome: &UploadOutcome) -> Response {
    Json(json!({
        "success": true,
        "answers": outcome.answers,
        "total": outcome.total,
        "date": outcome.date,
        "method": outcome.method,
    }))
    .into_response()
}

/// 400 错误响应
fn bad_request(message: &str) -> Response {
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
    )
        .into_response()
}
