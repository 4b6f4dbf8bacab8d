//! 上传处理流程 - 流程层
//!
//! 核心职责：定义"一次上传"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验输入（非空 / 类型正确）
//! 2. 解析（手动）或 AI 提取（文本 / 图片 / PDF）
//! 3. 零条结果视为输入校验失败
//! 4. 构建 DayEntry 并写入存储（整体替换该日期）

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ParseError};
use crate::models::{AnswerRecord, DayEntry};
use crate::services::{AnswerStore, ExtractionService, ManualParser};
use crate::workflow::upload_ctx::UploadCtx;

/// 来源标签：手动粘贴答案（纯本地解析）
pub const SOURCE_MANUAL: &str = "manual_answers_upload";
/// 来源标签：粘贴文本交给 AI 提取
pub const SOURCE_TEXT: &str = "text_upload";
/// 来源标签：未填拼图图片
pub const SOURCE_IMAGE: &str = "vision_image_upload";
/// 来源标签：已填拼图图片
pub const SOURCE_SOLVED: &str = "solved_vision_upload";
/// 来源标签：拼图 PDF
pub const SOURCE_PDF: &str = "pdf_upload";

/// 一次上传的处理结果
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// 写入的日期
    pub date: String,
    /// 写入的答案列表
    pub answers: Vec<AnswerRecord>,
    /// 答案总数
    pub total: usize,
    /// 处理方式（即来源标签）
    pub method: &'static str,
}

/// 上传处理流程
///
/// 职责：
/// - 编排完整的上传处理流程
/// - 决定何时解析、何时调 AI、何时落盘
/// - 只依赖业务能力（services），不持有 HTTP 细节
pub struct UploadFlow {
    store: Arc<AnswerStore>,
    extraction: ExtractionService,
    parser: ManualParser,
    verbose_logging: bool,
}

impl UploadFlow {
    /// 创建新的上传处理流程
    pub fn new(config: &Config, store: Arc<AnswerStore>) -> Self {
        Self {
            store,
            extraction: ExtractionService::new(config),
            parser: ManualParser::new(),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 手动答案上传：纯本地解析，不调 AI
    pub async fn run_manual_text(&self, text: &str, date: Option<&str>) -> AppResult<UploadOutcome> {
        if text.trim().is_empty() {
            return Err(AppError::Parse(ParseError::EmptyInput));
        }

        let ctx = UploadCtx::new(date, SOURCE_MANUAL);
        info!("📝 开始处理手动答案上传 {}", ctx);

        let answers = self.parser.parse(text);
        if answers.is_empty() {
            warn!("⚠️ 手动答案解析结果为空 {}", ctx);
            return Err(AppError::Parse(ParseError::NoValidAnswers));
        }

        info!("✓ 本地解析出 {} 条答案", answers.len());
        if self.verbose_logging {
            self.log_answers(&answers);
        }
        Ok(self.persist(ctx, answers).await)
    }

    /// 文本上传：交给 AI 提取
    pub async fn run_ai_text(&self, text: &str, date: Option<&str>) -> AppResult<UploadOutcome> {
        if text.trim().is_empty() {
            return Err(AppError::Parse(ParseError::EmptyInput));
        }

        let ctx = UploadCtx::new(date, SOURCE_TEXT);
        info!("🤖 开始处理文本上传，交给 AI 提取 {}", ctx);

        let answers = self.extraction.extract_from_text(text).await?;
        self.finish_extraction(ctx, answers).await
    }

    /// 图片上传：交给 AI Vision 提取
    ///
    /// # 参数
    /// - `mime_type`: 图片 MIME 类型
    /// - `data`: 图片原始字节
    /// - `date`: 目标日期（已填拼图上传可指定），缺省为今天
    /// - `solved`: 是否为已填好的拼图
    pub async fn run_image(
        &self,
        mime_type: &str,
        data: &[u8],
        date: Option<&str>,
        solved: bool,
    ) -> AppResult<UploadOutcome> {
        let source = if solved { SOURCE_SOLVED } else { SOURCE_IMAGE };
        let ctx = UploadCtx::new(date, source);
        info!("🤖 开始处理图片上传 ({} 字节) {}", data.len(), ctx);

        let answers = self.extraction.extract_from_image(mime_type, data, solved).await?;
        self.finish_extraction(ctx, answers).await
    }

    /// PDF 上传：转发给 AI 服务（PDF 渲染由服务方完成）
    pub async fn run_pdf(&self, data: &[u8]) -> AppResult<UploadOutcome> {
        let ctx = UploadCtx::new(None, SOURCE_PDF);
        info!("🤖 开始处理 PDF 上传 ({} 字节) {}", data.len(), ctx);

        let answers = self.extraction.extract_from_pdf(data).await?;
        self.finish_extraction(ctx, answers).await
    }

    /// AI 提取后的公共收尾：零条结果视为输入校验失败
    async fn finish_extraction(
        &self,
        ctx: UploadCtx,
        answers: Vec<AnswerRecord>,
    ) -> AppResult<UploadOutcome> {
        if answers.is_empty() {
            warn!("⚠️ AI 提取结果为空 {}", ctx);
            return Err(AppError::Parse(ParseError::NoValidAnswers));
        }

        info!("✓ AI 提取出 {} 条答案", answers.len());
        if self.verbose_logging {
            self.log_answers(&answers);
        }
        Ok(self.persist(ctx, answers).await)
    }

    /// 显示前几条答案（详细日志模式）
    fn log_answers(&self, answers: &[AnswerRecord]) {
        for (i, record) in answers.iter().take(3).enumerate() {
            info!("  {}. {}", i + 1, record);
        }
    }

    /// 构建 DayEntry 并写入存储
    async fn persist(&self, ctx: UploadCtx, answers: Vec<AnswerRecord>) -> UploadOutcome {
        let entry = DayEntry::new(ctx.date.clone(), answers.clone(), ctx.source);
        self.store.put(entry).await;

        info!(
            "✅ 上传处理完成 {}: 共 {} 条答案",
            ctx,
            answers.len()
        );

        UploadOutcome {
            date: ctx.date,
            total: answers.len(),
            answers,
            method: ctx.source,
        }
    }
}
