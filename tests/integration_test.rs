use std::sync::Arc;

use crossword_answers_site::utils::logging;
use crossword_answers_site::workflow::upload_flow::{SOURCE_MANUAL, SOURCE_TEXT};
use crossword_answers_site::{AnswerStore, Config, SearchService, UploadFlow};

/// 文件存储版的完整上传链路：解析 → 落盘 → 读回
#[tokio::test]
async fn test_manual_upload_end_to_end() {
    logging::try_init();

    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("answers.json");
    let store = Arc::new(AnswerStore::new(&data_file));
    let flow = UploadFlow::new(&Config::default(), store.clone());

    let text = "Across\n• Sew quickly (1A): FASTEN\n1D - LOTION\nDown\n14D ALOE\njunk line";
    let outcome = flow
        .run_manual_text(text, Some("2025-01-15"))
        .await
        .expect("手动上传应该成功");

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.method, SOURCE_MANUAL);

    // 读回并逐字段核对
    let entry = store.get("2025-01-15").await.expect("应该能读回当日数据");
    assert_eq!(entry.total_answers, entry.answers.len());
    assert_eq!(entry.answers, outcome.answers);
    assert_eq!(entry.high_confidence, 3); // 手动答案置信度全为 1.0
    assert_eq!(entry.answers[0].clue, "Sew quickly");
    assert_eq!(entry.answers[1].clue, "Answer for 1D");

    // 数据确实写进了文件
    let raw = std::fs::read_to_string(&data_file).unwrap();
    assert!(raw.contains("FASTEN"));
    assert!(raw.contains("2025-01-15"));
}

/// 文件层不可用时，同进程内写入和读取走内存层
#[tokio::test]
async fn test_upload_falls_back_to_memory_store() {
    logging::try_init();

    // 把一个普通文件当作父目录，文件层必然写失败
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();

    let store = Arc::new(AnswerStore::new(blocker.join("answers.json")));
    let flow = UploadFlow::new(&Config::default(), store.clone());

    let outcome = flow
        .run_manual_text("1A: FASTEN", Some("2025-01-15"))
        .await
        .expect("回落到内存层后上传仍应成功");
    assert_eq!(outcome.total, 1);

    let entry = store.get("2025-01-15").await.expect("内存层应该能读回数据");
    assert_eq!(entry.answers[0].answer, "FASTEN");
    assert_eq!(store.get_all_dates().await, vec!["2025-01-15"]);
}

/// 上传多天数据后：日期倒序、搜索、slug 查找
#[tokio::test]
async fn test_search_and_slug_lookup_end_to_end() {
    logging::try_init();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AnswerStore::new(dir.path().join("answers.json")));
    let flow = UploadFlow::new(&Config::default(), store.clone());
    let search = SearchService::new(store.clone());

    // 乱序上传三天
    flow.run_manual_text("• Sew quickly (1A): FASTEN", Some("2025-01-14"))
        .await
        .unwrap();
    flow.run_manual_text("• Lotion ingredient (2D): ALOE", Some("2025-01-16"))
        .await
        .unwrap();
    flow.run_manual_text("• Sew quickly (7A): BASTE", Some("2025-01-15"))
        .await
        .unwrap();

    // 日期严格倒序
    assert_eq!(
        store.get_all_dates().await,
        vec!["2025-01-16", "2025-01-15", "2025-01-14"]
    );

    // 子串搜索命中线索和答案
    let hits = search.search("sew", 5).await;
    assert_eq!(hits.len(), 2);
    let hits = search.search("ALOE", 5).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].slug, "lotion-ingredient");

    // slug 冲突：两天都有 "Sew quickly"，日期升序迭代先命中 2025-01-14
    let hit = search.find_by_slug("sew-quickly").await.unwrap();
    assert_eq!(hit.date, "2025-01-14");
    assert_eq!(hit.answer, "FASTEN");
}

/// 同一天重复上传整体替换
#[tokio::test]
async fn test_reupload_replaces_day() {
    logging::try_init();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AnswerStore::new(dir.path().join("answers.json")));
    let flow = UploadFlow::new(&Config::default(), store.clone());

    flow.run_manual_text("1A: FASTEN\n2D: ALOE", Some("2025-01-15"))
        .await
        .unwrap();
    flow.run_manual_text("3A: TIE", Some("2025-01-15"))
        .await
        .unwrap();

    let entry = store.get("2025-01-15").await.unwrap();
    assert_eq!(entry.total_answers, 1);
    assert_eq!(entry.answers[0].position, "3A");
}

/// 测试真实 AI 文本提取链路（需要可用的 API 配置）
///
/// 运行方式：cargo test test_live_ai_text_upload -- --ignored --nocapture
#[tokio::test]
#[ignore]
async fn test_live_ai_text_upload() {
    logging::try_init();

    let config = Config::from_env();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AnswerStore::new(dir.path().join("answers.json")));
    let flow = UploadFlow::new(&config, store.clone());

    let text = "Across\n1. Sew quickly: FASTEN\nDown\n2. Lotion ingredient: ALOE";

    println!("\n========== 测试 AI 文本上传 ==========");
    match flow.run_ai_text(text, Some("2025-01-15")).await {
        Ok(outcome) => {
            println!("✅ AI 上传成功，共 {} 条答案", outcome.total);
            assert_eq!(outcome.method, SOURCE_TEXT);
            assert!(store.get("2025-01-15").await.is_some());
        }
        Err(e) => {
            println!("❌ AI 上传失败: {}", e);
            panic!("测试失败: {}", e);
        }
    }
}
