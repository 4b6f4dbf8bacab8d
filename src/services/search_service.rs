//! 答案检索服务 - 业务能力层
//!
//! 只负责"跨日期检索答案"能力：子串搜索和按 slug 查找

use std::sync::Arc;

use serde::Serialize;

use crate::models::AnswerRecord;
use crate::services::AnswerStore;
use crate::utils::slugify;

/// 搜索 API 的最短查询长度
pub const MIN_QUERY_LEN: usize = 2;

/// 一条检索结果：答案记录加上所属日期和线索 slug
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub clue: String,
    pub answer: String,
    pub position: String,
    pub confidence: f64,
    pub date: String,
    pub slug: String,
}

impl SearchHit {
    fn new(date: &str, record: &AnswerRecord) -> Self {
        Self {
            clue: record.clue.clone(),
            answer: record.answer.clone(),
            position: record.position.clone(),
            confidence: record.confidence,
            date: date.to_string(),
            slug: slugify(&record.clue),
        }
    }
}

/// 答案检索服务
///
/// 职责：
/// - 对线索/答案/格位做大小写不敏感的子串搜索
/// - 按线索 slug 查找单条答案（跨日期，存储迭代顺序中首个匹配生效）
/// - 不修改任何数据
pub struct SearchService {
    store: Arc<AnswerStore>,
}

impl SearchService {
    /// 创建新的检索服务
    pub fn new(store: Arc<AnswerStore>) -> Self {
        Self { store }
    }

    /// 子串搜索
    ///
    /// # 参数
    /// - `query`: 查询串，少于 2 个字符时直接返回空
    /// - `limit`: 结果上限
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let mut hits = Vec::new();

        for (date, entry) in self.store.get_all().await {
            for record in &entry.answers {
                let matched = record.clue.to_lowercase().contains(&needle)
                    || record.answer.to_lowercase().contains(&needle)
                    || record.position.to_lowercase().contains(&needle);
                if matched {
                    hits.push(SearchHit::new(&date, record));
                    if hits.len() >= limit {
                        return hits;
                    }
                }
            }
        }

        hits
    }

    /// 按线索 slug 查找
    ///
    /// slug 在不同日期间可能冲突；按日期升序迭代，首个匹配生效
    pub async fn find_by_slug(&self, slug: &str) -> Option<SearchHit> {
        for (date, entry) in self.store.get_all().await {
            for record in &entry.answers {
                if slugify(&record.clue) == slug {
                    return Some(SearchHit::new(&date, record));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayEntry;

    async fn build_service() -> SearchService {
        // 把一个普通文件当作父目录，强制存储走内存层
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = Arc::new(AnswerStore::new(blocker.join("answers.json")));

        store
            .put(DayEntry::new(
                "2025-01-14",
                vec![AnswerRecord::manual(Some("Sew quickly"), "1A", "FASTEN")],
                "manual_answers_upload",
            ))
            .await;
        store
            .put(DayEntry::new(
                "2025-01-15",
                vec![
                    AnswerRecord::manual(Some("Lotion ingredient"), "2D", "ALOE"),
                    AnswerRecord::manual(Some("Sew quickly"), "7A", "BASTE"),
                ],
                "manual_answers_upload",
            ))
            .await;

        // 数据都在内存层，tempdir 删除与否不影响后续读取
        drop(dir);
        SearchService::new(store)
    }

    #[tokio::test]
    async fn test_search_matches_clue_answer_position() {
        let service = build_service().await;

        assert_eq!(service.search("sew", 5).await.len(), 2);
        assert_eq!(service.search("ALOE", 5).await.len(), 1);
        assert_eq!(service.search("2d", 5).await.len(), 1);
    }

    #[tokio::test]
    async fn test_search_short_query_empty() {
        let service = build_service().await;
        assert!(service.search("a", 5).await.is_empty());
        assert!(service.search("", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let service = build_service().await;
        assert_eq!(service.search("sew", 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_slug_first_match_wins() {
        let service = build_service().await;

        // "Sew quickly" 在两个日期都出现，日期升序迭代，先命中 2025-01-14
        let hit = service.find_by_slug("sew-quickly").await.unwrap();
        assert_eq!(hit.date, "2025-01-14");
        assert_eq!(hit.answer, "FASTEN");
    }

    #[tokio::test]
    async fn test_find_by_slug_missing() {
        let service = build_service().await;
        assert!(service.find_by_slug("no-such-clue").await.is_none());
    }
}
