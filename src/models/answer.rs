//! 答案数据模型
//!
//! 单条答案记录（AnswerRecord）与单日答案集合（DayEntry）

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 高置信度阈值：confidence 严格大于该值的记录计入 high_confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// 单条填字游戏答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 线索文本
    pub clue: String,
    /// 答案（大写）
    pub answer: String,
    /// 格位，如 "1A" / "14D"（大写）
    pub position: String,
    /// 提取置信度，范围 [0, 1]
    pub confidence: f64,
}

impl AnswerRecord {
    /// 创建手动录入的答案记录
    ///
    /// 答案和格位会被转为大写；没有线索文本时合成 "Answer for <格位>"；
    /// 手动录入的置信度固定为 1.0
    pub fn manual(clue: Option<&str>, position: &str, answer: &str) -> Self {
        let position = position.trim().to_uppercase();
        let clue = match clue {
            Some(text) => text.trim().to_string(),
            None => format!("Answer for {}", position),
        };
        Self {
            clue,
            answer: answer.trim().to_uppercase(),
            position,
            confidence: 1.0,
        }
    }

    /// 从 AI 服务返回的 JSON 对象构建答案记录
    ///
    /// 逐条校验外部数据，任何字段缺失或非法都返回 None（整条丢弃）：
    /// - `clue`: 非空字符串
    /// - `answer`: 非空字符串，转为大写
    /// - `position`: 匹配 `\d+[AD]`，转为大写
    /// - `confidence`: [0, 1] 范围内的数值
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let clue = value.get("clue")?.as_str()?.trim();
        if clue.is_empty() {
            return None;
        }

        let answer = value.get("answer")?.as_str()?.trim();
        if answer.is_empty() {
            return None;
        }

        let position = value.get("position")?.as_str()?.trim().to_uppercase();
        if !is_valid_position(&position) {
            return None;
        }

        let confidence = value.get("confidence")?.as_f64()?;
        if !(0.0..=1.0).contains(&confidence) {
            return None;
        }

        Some(Self {
            clue: clue.to_string(),
            answer: answer.to_uppercase(),
            position,
            confidence,
        })
    }

    /// 是否为高置信度记录
    pub fn is_high_confidence(&self) -> bool {
        self.confidence > HIGH_CONFIDENCE_THRESHOLD
    }
}

impl std::fmt::Display for AnswerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [置信度: {:.2}]",
            self.position, self.answer, self.confidence
        )
    }
}

/// 校验格位格式：一个或多个数字后跟 A（横向）或 D（纵向）
pub fn is_valid_position(position: &str) -> bool {
    let Some(direction) = position.chars().last() else {
        return false;
    };
    if direction != 'A' && direction != 'D' {
        return false;
    }
    let digits = &position[..position.len() - 1];
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// 单日答案集合（含来源元数据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    /// 日期，格式 YYYY-MM-DD
    pub date: String,
    /// 当日全部答案
    pub answers: Vec<AnswerRecord>,
    /// 来源标签，如 "manual_answers_upload"
    pub source: String,
    /// 上传时间（ISO-8601）
    pub uploaded_at: String,
    /// 答案总数，恒等于 answers.len()
    pub total_answers: usize,
    /// 高置信度答案数（confidence > 0.8）
    pub high_confidence: usize,
}

impl DayEntry {
    /// 构建单日答案集合
    ///
    /// total_answers 和 high_confidence 由 answers 推导，保证不变量成立
    pub fn new(date: impl Into<String>, answers: Vec<AnswerRecord>, source: impl Into<String>) -> Self {
        let total_answers = answers.len();
        let high_confidence = answers.iter().filter(|a| a.is_high_confidence()).count();
        Self {
            date: date.into(),
            answers,
            source: source.into(),
            uploaded_at: chrono::Local::now().to_rfc3339(),
            total_answers,
            high_confidence,
        }
    }
}
