//! # Crossword Answers Site
//!
//! 每日填字游戏答案站点：服务端渲染的答案页面 + 管理员上传流程
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只提供一种能力
//! - `AnswerStore` - 两级存储（JSON 文件 + 内存回落）
//! - `ManualParser` - 自由文本到答案记录的解析能力
//! - `ExtractionService` - AI 文本/图片提取能力
//! - `SearchService` - 跨日期检索能力
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一次上传"的完整处理流程
//! - `UploadCtx` - 上下文封装（日期 + 来源标签）
//! - `UploadFlow` - 流程编排（校验 → 解析/提取 → 落盘）
//!
//! ### ③ HTTP 层（Api）
//! - `api/` - axum 路由、页面渲染、Cookie 认证、上传端点
//!
//! ### ④ 编排层（App）
//! - `app` - 持有配置，构建共享状态，运行服务
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnswerRecord, DayEntry};
pub use services::{AnswerStore, ExtractionService, ManualParser, SearchService};
pub use utils::slugify;
pub use workflow::{UploadCtx, UploadFlow, UploadOutcome};
