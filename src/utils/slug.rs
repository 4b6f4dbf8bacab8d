//! 线索 slug 生成
//!
//! 把线索文本映射为 URL 路径段：小写、去掉字母数字和空白以外的字符、
//! 空白折叠为单个连字符。纯函数，结果确定，但不保证不同线索产生不同 slug

/// 从线索文本生成 URL slug
///
/// # 示例
/// ```
/// use crossword_answers_site::utils::slugify;
/// assert_eq!(slugify("Sew quickly!"), "sew-quickly");
/// ```
pub fn slugify(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Sew quickly!"), "sew-quickly");
        assert_eq!(slugify("Lotion ingredient"), "lotion-ingredient");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(slugify("\"Don't stop!\" e.g."), "dont-stop-eg");
        assert_eq!(slugify("50%-off sale"), "50off-sale");
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(slugify("  Sew   quickly  "), "sew-quickly");
        assert_eq!(slugify("a\tb\nc"), "a-b-c");
    }

    #[test]
    fn test_deterministic() {
        let clue = "Capital of France?";
        assert_eq!(slugify(clue), slugify(clue));
    }

    #[test]
    fn test_non_ascii_removed() {
        assert_eq!(slugify("café au lait"), "caf-au-lait");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
