//! 应用编排层
//!
//! 持有配置，构建共享状态和路由，运行 HTTP 服务

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{build_router, AppState};
use crate::config::Config;

/// 应用主结构
pub struct App {
    config: Config,
    router: axum::Router,
}

impl App {
    /// 初始化应用
    ///
    /// 存储和各服务在这里构建一次，之后通过共享状态传给请求处理器
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        ensure_directories(&config).await;

        let state = AppState::new(config.clone());
        let router = build_router(state);

        Ok(Self { config, router })
    }

    /// 运行 HTTP 服务（阻塞直到服务退出）
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.config.bind_address)
            .await
            .with_context(|| format!("无法监听地址: {}", self.config.bind_address))?;

        info!("🌐 HTTP 服务已启动: http://{}", self.config.bind_address);

        axum::serve(listener, self.router)
            .await
            .context("HTTP 服务异常退出")?;

        Ok(())
    }
}

/// 预创建数据目录和上传目录
///
/// 失败只记警告（只读文件系统时存储会走内存层）
async fn ensure_directories(config: &Config) {
    if let Some(parent) = std::path::Path::new(&config.data_file).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("⚠️ 无法创建数据目录 ({}): {}", parent.display(), e);
            }
        }
    }
    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        warn!("⚠️ 无法创建上传目录 ({}): {}", config.upload_dir, e);
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 每日填字游戏答案站点");
    info!("📂 数据文件: {}", config.data_file);
    info!("📁 上传目录: {}", config.upload_dir);
    info!("🤖 AI 模型: {}", config.llm_model_name);
    info!("🔗 站点地址: {}", config.base_url);
    info!("{}", "=".repeat(60));
}
