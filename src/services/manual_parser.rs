//! 手动答案解析服务 - 业务能力层
//!
//! 只负责"把粘贴的自由文本解析成答案记录"能力，不关心流程
//!
//! 解析策略：按优先级排列的 (正则, 提取函数) 列表，首个匹配生效。
//! 每个提取函数明确声明哪个捕获组是线索/格位/答案，不做模式字符串探测

use regex::{Captures, Regex};
use tracing::debug;

use crate::models::AnswerRecord;
use crate::utils::logging::truncate_text;

/// 一行文本解析出的原始字段
struct ParsedLine {
    /// 线索文本（多数格式不包含线索，由调用方合成）
    clue: Option<String>,
    position: String,
    answer: String,
}

/// 提取函数：把正则捕获组映射到明确的字段
type Extractor = fn(&Captures) -> ParsedLine;

/// 捕获组顺序：1=线索 2=格位 3=答案
fn extract_clue_position_answer(caps: &Captures) -> ParsedLine {
    ParsedLine {
        clue: Some(caps[1].to_string()),
        position: caps[2].to_string(),
        answer: caps[3].to_string(),
    }
}

/// 捕获组顺序：1=格位 2=答案
fn extract_position_answer(caps: &Captures) -> ParsedLine {
    ParsedLine {
        clue: None,
        position: caps[1].to_string(),
        answer: caps[2].to_string(),
    }
}

/// 捕获组顺序：1=答案 2=格位
fn extract_answer_position(caps: &Captures) -> ParsedLine {
    ParsedLine {
        clue: None,
        position: caps[2].to_string(),
        answer: caps[1].to_string(),
    }
}

/// 手动答案解析服务
///
/// 职责：
/// - 把一段自由文本（每行一个候选）解析为 AnswerRecord 列表
/// - 不匹配的行静默丢弃，从不报错
/// - 保持输入行顺序
pub struct ManualParser {
    patterns: Vec<(Regex, Extractor)>,
}

impl ManualParser {
    /// 创建新的解析服务
    ///
    /// 模式优先级是设计决定：一行可能同时满足多个格式时，列表中靠前者生效
    pub fn new() -> Self {
        fn pattern(source: &str, extract: Extractor) -> (Regex, Extractor) {
            (
                Regex::new(source).expect("内置正则模式必定合法"),
                extract,
            )
        }

        let patterns = vec![
            // 格式: • Sew quickly (1A): FASTEN
            pattern(r"(?i)^•\s*(.+?)\s*\((\d+[AD])\)\s*:\s*(.+)$", extract_clue_position_answer),
            // 格式: Sew quickly, 1A, FASTEN
            pattern(r"(?i)^(.+?)\s*,\s*(\d+[AD])\s*,\s*(.+)$", extract_clue_position_answer),
            // 格式: 1A: FASTEN
            pattern(r"(?i)^(\d+[AD]):\s*(.+)$", extract_position_answer),
            // 格式: 1A - FASTEN
            pattern(r"(?i)^(\d+[AD])\s*-\s*(.+)$", extract_position_answer),
            // 格式: 1A FASTEN
            pattern(r"(?i)^(\d+[AD])\s+(.+)$", extract_position_answer),
            // 格式: FASTEN (1A)
            pattern(r"(?i)^(.+?)\s*\((\d+[AD])\)$", extract_answer_position),
            // 格式: FASTEN - 1A
            pattern(r"(?i)^(.+?)\s*-\s*(\d+[AD])$", extract_answer_position),
        ];

        Self { patterns }
    }

    /// 解析整段文本
    ///
    /// # 参数
    /// - `text`: 自由文本，每行一个候选答案
    ///
    /// # 返回
    /// 按行顺序排列的答案记录；没有任何行匹配时返回空列表
    pub fn parse(&self, text: &str) -> Vec<AnswerRecord> {
        let mut records = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || is_section_header(line) {
                continue;
            }

            match self.parse_line(line) {
                Some(record) => records.push(record),
                None => debug!("忽略无法识别的行: {}", truncate_text(line, 60)),
            }
        }

        records
    }

    /// 解析单行，首个匹配的模式生效
    fn parse_line(&self, line: &str) -> Option<AnswerRecord> {
        for (regex, extract) in &self.patterns {
            if let Some(caps) = regex.captures(line) {
                let parsed = extract(&caps);
                return Some(AnswerRecord::manual(
                    parsed.clue.as_deref(),
                    &parsed.position,
                    &parsed.answer,
                ));
            }
        }
        None
    }
}

impl Default for ManualParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 判断是否为分区标题行（"Across" / "Down"）
fn is_section_header(line: &str) -> bool {
    line.eq_ignore_ascii_case("across") || line.eq_ignore_ascii_case("down")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> AnswerRecord {
        let records = ManualParser::new().parse(line);
        assert_eq!(records.len(), 1, "期望恰好解析出一条: {:?}", records);
        records.into_iter().next().unwrap()
    }

    #[test]
    fn test_colon_form() {
        let record = parse_one("1A: FASTEN");
        assert_eq!(record.clue, "Answer for 1A");
        assert_eq!(record.answer, "FASTEN");
        assert_eq!(record.position, "1A");
        assert_eq!(record.confidence, 1.0);
    }

    #[test]
    fn test_bulleted_form_keeps_clue() {
        let record = parse_one("• Sew quickly (1A): FASTEN");
        assert_eq!(record.clue, "Sew quickly");
        assert_eq!(record.answer, "FASTEN");
        assert_eq!(record.position, "1A");
    }

    #[test]
    fn test_comma_form_keeps_clue() {
        let record = parse_one("Lotion ingredient, 14D, ALOE");
        assert_eq!(record.clue, "Lotion ingredient");
        assert_eq!(record.answer, "ALOE");
        assert_eq!(record.position, "14D");
    }

    #[test]
    fn test_dash_form() {
        let record = parse_one("2D - LOTION");
        assert_eq!(record.position, "2D");
        assert_eq!(record.answer, "LOTION");
    }

    #[test]
    fn test_space_form() {
        let record = parse_one("3A ALOE");
        assert_eq!(record.position, "3A");
        assert_eq!(record.answer, "ALOE");
    }

    #[test]
    fn test_answer_first_parenthetical() {
        let record = parse_one("FASTEN (1A)");
        assert_eq!(record.position, "1A");
        assert_eq!(record.answer, "FASTEN");
        assert_eq!(record.clue, "Answer for 1A");
    }

    #[test]
    fn test_answer_first_dash() {
        let record = parse_one("FASTEN - 1A");
        assert_eq!(record.position, "1A");
        assert_eq!(record.answer, "FASTEN");
    }

    #[test]
    fn test_position_first_dash_wins_over_answer_first() {
        // "2A - 1D" 同时满足破折号格式（格位在前）和答案在前格式，
        // 优先级靠前的破折号格式生效
        let record = parse_one("2A - 1D");
        assert_eq!(record.position, "2A");
        assert_eq!(record.answer, "1D");
    }

    #[test]
    fn test_lowercase_input_normalized() {
        let record = parse_one("1a: fasten");
        assert_eq!(record.position, "1A");
        assert_eq!(record.answer, "FASTEN");
        assert_eq!(record.clue, "Answer for 1A");
    }

    #[test]
    fn test_unmatched_lines_dropped_silently() {
        let text = "Across\n1A: FASTEN\nhello world\n2D: LOTION";
        let records = ManualParser::new().parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, "1A");
        assert_eq!(records[1].position, "2D");
    }

    #[test]
    fn test_section_headers_dropped() {
        let text = "ACROSS\n1A: FASTEN\nDown\n2D: LOTION";
        let records = ManualParser::new().parse(text);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_line_order_preserved() {
        let text = "5D: ALOE\n1A: FASTEN\n3A: TIE";
        let records = ManualParser::new().parse(text);
        let positions: Vec<&str> = records.iter().map(|r| r.position.as_str()).collect();
        assert_eq!(positions, vec!["5D", "1A", "3A"]);
    }

    #[test]
    fn test_empty_and_junk_input() {
        let parser = ManualParser::new();
        assert!(parser.parse("").is_empty());
        assert!(parser.parse("\n\n  \n").is_empty());
        assert!(parser.parse("no positions here at all").is_empty());
    }
}
