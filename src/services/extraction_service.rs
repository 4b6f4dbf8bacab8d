//! AI 提取服务 - 业务能力层
//!
//! 只负责"把文本/图片交给 AI 提取答案"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（图片通过 Vision API 的 data URL 传递）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ExtractError};
use crate::models::AnswerRecord;
use crate::utils::logging::truncate_text;

/// AI 提取服务
///
/// 职责：
/// - 调用 AI API 从文本 / 图片 / PDF 中提取答案
/// - 对返回内容做括号匹配式的 JSON 数组恢复
/// - 逐条校验外部数据，丢弃非法记录
/// - 不关心日期、存储和流程顺序
pub struct ExtractionService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl ExtractionService {
    /// 创建新的 AI 提取服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 从粘贴的拼图文本中提取答案
    pub async fn extract_from_text(&self, text: &str) -> AppResult<Vec<AnswerRecord>> {
        let user_message = build_text_prompt(text);
        let content = self.send_to_llm(&user_message, None, None).await?;
        self.parse_answers_response(&content)
    }

    /// 从拼图图片中提取答案
    ///
    /// # 参数
    /// - `mime_type`: 图片 MIME 类型，如 "image/png"
    /// - `data`: 图片原始字节
    /// - `solved`: 是否为已填好的拼图（提示词不同）
    pub async fn extract_from_image(
        &self,
        mime_type: &str,
        data: &[u8],
        solved: bool,
    ) -> AppResult<Vec<AnswerRecord>> {
        let prompt = if solved {
            SOLVED_IMAGE_PROMPT
        } else {
            IMAGE_PROMPT
        };
        let image_url = data_url(mime_type, data);
        let content = self.send_to_llm(prompt, None, Some(&image_url)).await?;
        self.parse_answers_response(&content)
    }

    /// 从拼图 PDF 中提取答案
    ///
    /// PDF 到图片的转换由 AI 服务方完成，这里只负责转发
    pub async fn extract_from_pdf(&self, data: &[u8]) -> AppResult<Vec<AnswerRecord>> {
        let pdf_url = data_url("application/pdf", data);
        let content = self.send_to_llm(PDF_PROMPT, None, Some(&pdf_url)).await?;
        self.parse_answers_response(&content)
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `image_data_url`: 图片 data URL（可选），会作为 Vision 内容追加
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        image_data_url: Option<&str>,
    ) -> AppResult<String> {
        debug!("调用 AI API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::extract_api_failed(&self.model_name, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 构建用户消息内容（支持图片）
        let user_msg = if let Some(url) = image_data_url {
            // 使用 Vision API：构建包含文本和图片的内容
            let content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
                ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: user_message.to_string(),
                    },
                ),
                ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: url.to_string(),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ),
            ];

            debug!("使用 Vision API，附带 1 个附件");

            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                .build()
                .map_err(|e| AppError::extract_api_failed(&self.model_name, e))?
        } else {
            // 纯文本消息
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| AppError::extract_api_failed(&self.model_name, e))?
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(2000u32)
            .build()
            .map_err(|e| AppError::extract_api_failed(&self.model_name, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("AI API 调用失败: {}", e);
            AppError::extract_api_failed(&self.model_name, e)
        })?;

        debug!("AI API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Extract(ExtractError::EmptyContent {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }

    /// 从 AI 响应中恢复答案列表
    ///
    /// AI 常在 JSON 前后夹带说明文字，这里取第一个 `[` 到最后一个 `]`
    /// 之间的片段解析；片段内的记录逐条校验，非法记录丢弃并计数
    pub fn parse_answers_response(&self, content: &str) -> AppResult<Vec<AnswerRecord>> {
        let slice = match (content.find('['), content.rfind(']')) {
            (Some(start), Some(end)) if start < end => &content[start..=end],
            _ => {
                return Err(AppError::Extract(ExtractError::NoJsonArray {
                    preview: truncate_text(content, 80),
                }))
            }
        };

        let value: serde_json::Value = serde_json::from_str(slice).map_err(|e| {
            warn!("AI响应的JSON片段解析失败: {}", e);
            AppError::Extract(ExtractError::NoJsonArray {
                preview: truncate_text(slice, 80),
            })
        })?;

        let Some(items) = value.as_array() else {
            return Err(AppError::Extract(ExtractError::NoJsonArray {
                preview: truncate_text(slice, 80),
            }));
        };

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for item in items {
            match AnswerRecord::from_json(item) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("⚠️ 丢弃 {} 条格式非法的AI答案记录", dropped);
        }
        debug!("AI响应解析完成: {} 条有效记录", records.len());

        Ok(records)
    }
}

/// 把原始字节编码为 data URL
fn data_url(mime_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(data)
    )
}

/// 构建文本提取的提示词
fn build_text_prompt(text: &str) -> String {
    format!(
        r#"You are a crossword puzzle expert. Analyze this crossword puzzle text and extract ALL answers with their clues.

IMPORTANT: Look carefully for:
1. Clue numbers and letters (like "1A", "2D", "3A", etc.)
2. The actual answer words
3. Any clue text that's visible

Return a JSON array with this exact format:
[
  {{
    "clue": "The clue text as shown",
    "answer": "THEANSWER",
    "position": "1A",
    "confidence": 0.95
  }}
]

Rules:
- Look for BOTH across (A) and down (D) clues
- Extract as many as possible, even if confidence is low
- Use the exact clue text as shown
- Position should be in format like "1A", "2D", etc.
- Confidence should be 0.0-1.0 based on clarity
- Return empty array ONLY if you see absolutely no crossword content

Here's the text to analyze:
{}"#,
        text
    )
}

/// 未填拼图图片的提示词
const IMAGE_PROMPT: &str = r#"Extract crossword answers from this image. Return JSON array:
[
  {
    "clue": "clue text",
    "answer": "ANSWER",
    "position": "1A",
    "confidence": 0.95
  }
]
Look for BOTH across (A) and down (D) clues and extract everything you can see."#;

/// 已填拼图图片的提示词
const SOLVED_IMAGE_PROMPT: &str = r#"You are a crossword puzzle expert. Analyze this solved crossword puzzle image and extract ALL answers with their clues.

IMPORTANT: This is a SOLVED crossword puzzle, so you can see:
1. The completed grid with all answers filled in
2. The clue list (usually on the side or below the grid)

Your task is to match each clue with its answer from the filled grid.

Return a JSON array with this exact format:
[
  {
    "clue": "The exact clue text as shown",
    "answer": "THEANSWER",
    "position": "1A",
    "confidence": 0.95
  }
]

Rules:
- Look for BOTH across (A) and down (D) clues
- Use the exact clue text as shown in the image
- Answer should be the word(s) filled in the grid
- Confidence should be 0.0-1.0 based on clarity
- Return empty array ONLY if you see absolutely no crossword content"#;

/// PDF 附件的提示词
const PDF_PROMPT: &str = r#"You are a crossword puzzle expert. Analyze this crossword puzzle PDF and extract ALL visible answers with their clues.

Return a JSON array with this exact format:
[
  {
    "clue": "The clue text as shown",
    "answer": "THEANSWER",
    "position": "1A",
    "confidence": 0.95
  }
]

Rules:
- Look for BOTH across (A) and down (D) clues
- Extract as many as possible, even if confidence is low
- Position should be in format like "1A", "2D", etc.
- Confidence should be 0.0-1.0 based on clarity
- Return empty array ONLY if you see absolutely no crossword content"#;
