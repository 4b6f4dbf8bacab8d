use serde::Deserialize;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_address: String,
    /// 站点根 URL（用于 sitemap / canonical 链接）
    pub base_url: String,
    /// 答案数据文件路径
    pub data_file: String,
    /// 上传文件存放目录
    pub upload_dir: String,
    /// 上传接口的管理密码
    pub upload_password: String,
    /// 认证 Cookie 是否加 Secure 标记（生产环境开启）
    pub secure_cookies: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            base_url: "http://localhost:3000".to_string(),
            data_file: "data/answers.json".to_string(),
            upload_dir: "public/uploads".to_string(),
            upload_password: "crossword_admin_2025".to_string(),
            secure_cookies: false,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：config.toml（如果存在）提供基础值，环境变量优先级最高
    pub fn load() -> Self {
        let base = Self::from_file("config.toml").unwrap_or_default();
        base.apply_env()
    }

    /// 从 TOML 配置文件加载
    pub fn from_file(path: &str) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("配置文件解析失败 ({}): {}，使用默认配置", path, e);
                None
            }
        }
    }

    /// 用环境变量覆盖当前配置
    pub fn apply_env(self) -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(self.bind_address),
            base_url: std::env::var("BASE_URL").unwrap_or(self.base_url),
            data_file: std::env::var("DATA_FILE").unwrap_or(self.data_file),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or(self.upload_dir),
            upload_password: std::env::var("UPLOAD_PASSWORD").unwrap_or(self.upload_password),
            secure_cookies: std::env::var("SECURE_COOKIES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.secure_cookies),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
        }
    }

    /// 仅从环境变量构建（测试用）
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }
}
