//! 上传接口的密码认证
//!
//! 密码正确时签发一个不透明的认证 Cookie（固定值 + 固定有效期）；
//! 受保护的端点只检查 Cookie 是否存在且值正确，不做会话管理

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::api::AppState;
use crate::error::{AppError, AppResult, AuthError};

/// 认证 Cookie 名
pub const AUTH_COOKIE_NAME: &str = "upload-auth";
/// 认证 Cookie 值（不透明标记，不含敏感信息）
const AUTH_COOKIE_VALUE: &str = "authenticated";
/// Cookie 有效期：24 小时
const AUTH_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// 登录请求体
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub password: String,
}

/// POST /api/auth
///
/// 密码匹配则设置认证 Cookie；不匹配返回 401，响应体不区分
/// "接近正确"的程度
pub async fn login(State(state): State<AppState>, Json(req): Json<AuthRequest>) -> Response {
    if req.password == state.config.upload_password {
        info!("🔓 管理密码校验通过，签发认证 Cookie");
        let cookie = build_auth_cookie(state.config.secure_cookies);
        (
            [(header::SET_COOKIE, cookie)],
            Json(json!({ "success": true })),
        )
            .into_response()
    } else {
        warn!("⚠️ 管理密码校验失败");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid password" })),
        )
            .into_response()
    }
}

/// 构建认证 Cookie 字符串
fn build_auth_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        AUTH_COOKIE_NAME, AUTH_COOKIE_VALUE, AUTH_COOKIE_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// 检查请求是否带有有效的认证 Cookie
pub fn check_upload_auth(headers: &HeaderMap) -> bool {
    cookie_value(headers, AUTH_COOKIE_NAME).as_deref() == Some(AUTH_COOKIE_VALUE)
}

/// 要求认证，未认证时返回错误
pub fn require_upload_auth(headers: &HeaderMap) -> AppResult<()> {
    if check_upload_auth(headers) {
        Ok(())
    } else {
        Err(AppError::Auth(AuthError::AuthenticationRequired))
    }
}

/// 从 Cookie 头中取指定名字的值
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookie_header.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_cookie_accepted() {
        let headers = headers_with_cookie("upload-auth=authenticated");
        assert!(check_upload_auth(&headers));

        // 混在其他 Cookie 中也能识别
        let headers = headers_with_cookie("theme=dark; upload-auth=authenticated; lang=en");
        assert!(check_upload_auth(&headers));
    }

    #[test]
    fn test_missing_or_wrong_cookie_rejected() {
        assert!(!check_upload_auth(&HeaderMap::new()));

        let headers = headers_with_cookie("upload-auth=forged");
        assert!(!check_upload_auth(&headers));

        let headers = headers_with_cookie("other=authenticated");
        assert!(!check_upload_auth(&headers));
    }

    #[test]
    fn test_require_upload_auth_error() {
        let err = require_upload_auth(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::AuthenticationRequired)));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = build_auth_cookie(false);
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let cookie = build_auth_cookie(true);
        assert!(cookie.ends_with("; Secure"));
    }
}
