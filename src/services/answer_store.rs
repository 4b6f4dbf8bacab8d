//! 答案存储服务 - 业务能力层
//!
//! 只负责"按日期存取答案"能力，不关心流程
//!
//! 两级存储：
//! 1. 主存储：磁盘上的单个 JSON 文件（date → DayEntry）
//! 2. 备用存储：进程内内存映射（文件系统不可用时回落，进程重启即清空）

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::DayEntry;

/// 答案存储服务
///
/// 职责：
/// - 读写 date → DayEntry 映射
/// - 文件层失败时透明回落到内存层，从不向调用方抛错
/// - 在进程启动时构建一次，通过共享引用传给各请求处理器
pub struct AnswerStore {
    data_file: PathBuf,
    memory: RwLock<HashMap<String, DayEntry>>,
}

impl AnswerStore {
    /// 创建新的答案存储服务
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            memory: RwLock::new(HashMap::new()),
        }
    }

    /// 按日期读取单日答案
    ///
    /// 先查文件层，文件层不可用或没有该日期时再查内存层
    pub async fn get(&self, date: &str) -> Option<DayEntry> {
        if let Some(all) = self.read_file_tier().await {
            if let Some(entry) = all.get(date) {
                return Some(entry.clone());
            }
        }
        self.memory.read().await.get(date).cloned()
    }

    /// 读取全部数据（两层合并，文件层优先）
    pub async fn get_all(&self) -> BTreeMap<String, DayEntry> {
        let mut merged: BTreeMap<String, DayEntry> = self
            .memory
            .read()
            .await
            .iter()
            .map(|(date, entry)| (date.clone(), entry.clone()))
            .collect();

        if let Some(file_map) = self.read_file_tier().await {
            merged.extend(file_map);
        }

        merged
    }

    /// 读取全部日期，按字典序降序（ISO 日期即时间倒序）
    pub async fn get_all_dates(&self) -> Vec<String> {
        self.get_all().await.keys().rev().cloned().collect()
    }

    /// 写入单日答案（整体替换该日期的数据）
    ///
    /// 对 JSON 文件做读-改-写（无锁、非原子）；文件写入失败时
    /// 写入内存层，失败不向调用方传播
    pub async fn put(&self, entry: DayEntry) {
        let date = entry.date.clone();
        match self.write_file_tier(&entry).await {
            Ok(()) => {
                info!("💾 已保存 {} 的 {} 条答案到数据文件", date, entry.total_answers);
            }
            Err(e) => {
                warn!("⚠️ 数据文件写入失败，回落到内存存储: {}", e);
                self.memory.write().await.insert(date, entry);
            }
        }
    }

    /// 读取文件层
    ///
    /// 返回 None 表示该层不可用（文件不存在 / 读取失败 / JSON 损坏），
    /// 调用方转而使用内存层
    async fn read_file_tier(&self) -> Option<BTreeMap<String, DayEntry>> {
        let content = match tokio::fs::read_to_string(&self.data_file).await {
            Ok(content) => content,
            Err(e) => {
                debug!("数据文件不可读 ({}): {}", self.data_file.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(all) => Some(all),
            Err(e) => {
                warn!("数据文件JSON损坏 ({}): {}，按空存储处理", self.data_file.display(), e);
                None
            }
        }
    }

    /// 写入文件层（读-改-写）
    async fn write_file_tier(&self, entry: &DayEntry) -> AppResult<()> {
        let mut all = self.read_file_tier().await.unwrap_or_default();
        all.insert(entry.date.clone(), entry.clone());

        let json = serde_json::to_string_pretty(&all)?;
        let path_display = self.data_file.display().to_string();

        if let Some(parent) = self.data_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::store_write_failed(&path_display, e))?;
            }
        }

        tokio::fs::write(&self.data_file, json)
            .await
            .map_err(|e| AppError::store_write_failed(&path_display, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerRecord;

    fn sample_entry(date: &str) -> DayEntry {
        DayEntry::new(
            date,
            vec![
                AnswerRecord::manual(Some("Sew quickly"), "1A", "FASTEN"),
                AnswerRecord::manual(None, "2D", "LOTION"),
            ],
            "manual_answers_upload",
        )
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnswerStore::new(dir.path().join("answers.json"));

        let entry = sample_entry("2025-01-15");
        store.put(entry.clone()).await;

        let loaded = store.get("2025-01-15").await.unwrap();
        assert_eq!(loaded.answers, entry.answers);
        assert_eq!(loaded.total_answers, 2);
        assert_eq!(loaded.high_confidence, 2);
    }

    #[tokio::test]
    async fn test_get_missing_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnswerStore::new(dir.path().join("answers.json"));
        assert!(store.get("2025-01-15").await.is_none());
    }

    #[tokio::test]
    async fn test_dates_descending() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnswerStore::new(dir.path().join("answers.json"));

        // 乱序写入
        for date in ["2025-01-02", "2024-12-31", "2025-01-15", "2025-01-01"] {
            store.put(sample_entry(date)).await;
        }

        let dates = store.get_all_dates().await;
        assert_eq!(
            dates,
            vec!["2025-01-15", "2025-01-02", "2025-01-01", "2024-12-31"]
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        tokio::fs::write(&path, "{ not valid json").await.unwrap();

        let store = AnswerStore::new(&path);
        assert!(store.get("2025-01-15").await.is_none());
        assert!(store.get_all_dates().await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_fallback_when_file_unavailable() {
        // 把一个普通文件当作父目录，create_dir_all 必然失败
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, "x").await.unwrap();

        let store = AnswerStore::new(blocker.join("answers.json"));
        let entry = sample_entry("2025-01-15");
        store.put(entry.clone()).await;

        // 同进程内仍然可读
        let loaded = store.get("2025-01-15").await.unwrap();
        assert_eq!(loaded.answers, entry.answers);
        assert_eq!(store.get_all_dates().await, vec!["2025-01-15"]);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnswerStore::new(dir.path().join("answers.json"));

        store.put(sample_entry("2025-01-15")).await;
        let replacement = DayEntry::new(
            "2025-01-15",
            vec![AnswerRecord::manual(None, "3A", "ALOE")],
            "text_upload",
        );
        store.put(replacement).await;

        let loaded = store.get("2025-01-15").await.unwrap();
        assert_eq!(loaded.total_answers, 1);
        assert_eq!(loaded.source, "text_upload");
    }
}
