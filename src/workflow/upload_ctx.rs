//! 上传处理上下文
//!
//! 封装"这次上传写哪一天、来源是什么"这一信息

use std::fmt::Display;

/// 上传处理上下文
#[derive(Debug, Clone)]
pub struct UploadCtx {
    /// 目标日期，格式 YYYY-MM-DD
    pub date: String,

    /// 来源标签（同时用作 DayEntry.source 和响应里的 method）
    pub source: &'static str,
}

impl UploadCtx {
    /// 创建新的上传上下文
    ///
    /// 未指定日期时使用服务器本地的今天
    pub fn new(date: Option<&str>, source: &'static str) -> Self {
        let date = match date {
            Some(d) if !d.trim().is_empty() => d.trim().to_string(),
            _ => today(),
        };
        Self { date, source }
    }
}

impl Display for UploadCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[日期 {} | 来源 {}]", self.date, self.source)
    }
}

/// 服务器本地的今天，格式 YYYY-MM-DD
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
