//! 页面渲染
//!
//! 服务端渲染的 HTML 页面，数据全部来自答案存储。
//! 页面骨架和样式内嵌在 layout 中，不依赖模板引擎

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, NaiveDate};

use crate::api::AppState;
use crate::models::{AnswerRecord, DayEntry};
use crate::utils::slugify;
use crate::workflow::upload_ctx::today;

/// 站点名称（页面标题和头部）
pub const SITE_NAME: &str = "Daily Crossword Answers";

/// GET /
///
/// 今天的答案；还没有数据时显示占位页
pub async fn home_page(State(state): State<AppState>) -> Html<String> {
    let date = today();
    let entry = state.store.get(&date).await;
    let dates = state.store.get_all_dates().await;

    let html = match entry {
        Some(entry) => {
            let (prev, next) = adjacent_dates(&dates, &entry.date);
            layout(
                &format!("{} - Today's Puzzle", SITE_NAME),
                "Complete answers and solutions for today's crossword puzzle, updated daily.",
                &state.config.base_url,
                &day_body(&entry, prev.as_deref(), next.as_deref()),
            )
        }
        None => layout(
            &format!("{} - No Answers Yet", SITE_NAME),
            "Today's crossword answers are on the way. Check back soon!",
            &state.config.base_url,
            r#"<div class="empty-state">
  <h1>No Answers Available</h1>
  <p>We're working on getting today's crossword answers. Check back soon!</p>
  <p class="hint">💡 <strong>Tip:</strong> browse the <a href="/archive">archive</a> for previous puzzles.</p>
</div>"#,
        ),
    };

    Html(html)
}

/// GET /:date
///
/// 指定日期的答案页
pub async fn date_page(State(state): State<AppState>, Path(date): Path<String>) -> Response {
    let Some(entry) = state.store.get(&date).await else {
        return not_found_page("Crossword Answers Not Found");
    };

    let dates = state.store.get_all_dates().await;
    let (prev, next) = adjacent_dates(&dates, &date);
    let canonical = format!("{}/{}", state.config.base_url.trim_end_matches('/'), date);

    let html = layout(
        &format!("Crossword {} Answers | {}", entry.date, SITE_NAME),
        &format!(
            "Complete answers and solutions for the crossword puzzle from {}. {} answers included.",
            format_display_date(&entry.date),
            entry.total_answers
        ),
        &canonical,
        &day_body(&entry, prev.as_deref(), next.as_deref()),
    );

    Html(html).into_response()
}

/// GET /answers
///
/// 全部答案列表，日期倒序
pub async fn answers_page(State(state): State<AppState>) -> Html<String> {
    let all = state.store.get_all().await;

    let mut body = String::from("<h1>All Crossword Answers</h1>\n");
    if all.is_empty() {
        body.push_str("<p>No answers available yet.</p>");
    }
    for (date, entry) in all.iter().rev() {
        body.push_str(&format!(
            r#"<section class="day-section">
  <h2><a href="/{date}">{display}</a> <span class="count">{total} answers</span></h2>
  {cards}
</section>
"#,
            date = date,
            display = format_display_date(date),
            total = entry.total_answers,
            cards = render_answer_cards(&entry.answers),
        ));
    }

    Html(layout(
        &format!("All Answers | {}", SITE_NAME),
        "Browse every published crossword answer, newest first.",
        &format!("{}/answers", state.config.base_url.trim_end_matches('/')),
        &body,
    ))
}

/// GET /answer/:slug
///
/// 单条答案的 SEO 页面；slug 冲突时存储迭代顺序中首个匹配生效
pub async fn answer_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(hit) = state.search.find_by_slug(&slug).await else {
        return not_found_page("Answer Not Found");
    };

    let clue = html_escape(&hit.clue);
    let answer = html_escape(&hit.answer);
    let canonical = format!(
        "{}/answer/{}",
        state.config.base_url.trim_end_matches('/'),
        slug
    );

    let body = format!(
        r#"<article class="answer-detail">
  <h1>{clue} Crossword Answer</h1>
  <div class="answer-hero">
    <div class="answer-position">Position: {position}</div>
    <div class="answer-word">{answer}</div>
  </div>
  <h2>Answer to "{clue}"</h2>
  <p>The answer to the crossword clue <strong>"{clue}"</strong> is <strong>"{answer}"</strong>.
  This clue appeared in position {position} of the crossword puzzle from
  <a href="/{date}">{display_date}</a>.</p>
  <h3>Crossword Tips</h3>
  <ul>
    <li>Look for wordplay and double meanings in clues</li>
    <li>Consider abbreviations and common crossword answers</li>
    <li>Use the crossing letters to narrow down possibilities</li>
  </ul>
  <p><a class="button" href="/answers">View All Answers</a></p>
</article>"#,
        clue = clue,
        answer = answer,
        position = html_escape(&hit.position),
        date = hit.date,
        display_date = format_display_date(&hit.date),
    );

    Html(layout(
        &format!("{} Crossword Answer | {}", clue, SITE_NAME),
        &format!(
            "Find the answer to \"{}\" from the crossword puzzle. Complete solution and more answers.",
            clue
        ),
        &canonical,
        &body,
    ))
    .into_response()
}

/// GET /archive
///
/// 按年、月分组的归档页，新的在前
pub async fn archive_page(State(state): State<AppState>) -> Html<String> {
    let dates = state.store.get_all_dates().await;
    let grouped = group_dates_by_month(&dates);

    let mut body = String::from(
        "<h1>Crossword Archive</h1>\n<p>Browse all previous crossword answers and solutions.</p>\n",
    );

    if grouped.is_empty() {
        body.push_str("<p>No archive data available yet. Check back soon.</p>");
    }

    for (year, months) in grouped.iter().rev() {
        body.push_str(&format!("<h2>{}</h2>\n<div class=\"archive-year\">\n", year));
        for (month, dates_in_month) in months.iter().rev() {
            let month_name = month_name(*month);
            body.push_str(&format!(
                "<div class=\"archive-month\">\n<h3>{}</h3>\n<ul>\n",
                month_name
            ));
            for date in dates_in_month {
                body.push_str(&format!(
                    "<li><a href=\"/{}\">{}</a></li>\n",
                    date,
                    format_display_date(date)
                ));
            }
            body.push_str("</ul>\n</div>\n");
        }
        body.push_str("</div>\n");
    }

    Html(layout(
        &format!("Archive | {}", SITE_NAME),
        "Browse all previous crossword answers and solutions in our archive.",
        &format!("{}/archive", state.config.base_url.trim_end_matches('/')),
        &body,
    ))
}

/// GET /upload
///
/// 管理页面：密码登录 + 各类上传表单（提交走 /api/* 接口）
pub async fn upload_page(State(state): State<AppState>) -> Html<String> {
    Html(layout(
        &format!("Admin Upload | {}", SITE_NAME),
        "Admin puzzle upload.",
        &format!("{}/upload", state.config.base_url.trim_end_matches('/')),
        UPLOAD_PAGE_BODY,
    ))
}

// ========== 渲染辅助函数 ==========

/// 404 页面
fn not_found_page(title: &str) -> Response {
    let body = format!(
        r#"<div class="empty-state"><h1>{}</h1><p>The page you requested is not available. <a href="/">Back to today's answers</a></p></div>"#,
        title
    );
    (
        StatusCode::NOT_FOUND,
        Html(layout(title, "Page not found.", "", &body)),
    )
        .into_response()
}

/// 单日答案区块（标题 + 前后导航 + 答案卡片）
fn day_body(entry: &DayEntry, prev: Option<&str>, next: Option<&str>) -> String {
    let mut nav = String::new();
    if let Some(prev) = prev {
        nav.push_str(&format!(
            "<a class=\"button\" href=\"/{}\">&larr; Previous</a> ",
            prev
        ));
    }
    if let Some(next) = next {
        nav.push_str(&format!(
            "<a class=\"button\" href=\"/{}\">Next &rarr;</a>",
            next
        ));
    }

    format!(
        r#"<div class="day-header">
  <div>
    <h1>Crossword Answers</h1>
    <p class="day-date">{display}</p>
  </div>
  <nav class="day-nav">{nav}</nav>
</div>
<p class="day-meta">{total} answers &middot; {high} high confidence</p>
{cards}
"#,
        display = format_display_date(&entry.date),
        nav = nav,
        total = entry.total_answers,
        high = entry.high_confidence,
        cards = render_answer_cards(&entry.answers),
    )
}

/// 答案卡片列表
fn render_answer_cards(answers: &[AnswerRecord]) -> String {
    let mut html = String::from("<div class=\"answer-grid\">\n");
    for record in answers {
        html.push_str(&format!(
            r#"<div class="answer-card">
  <div class="card-position">{position}</div>
  <div class="card-answer"><a href="/answer/{slug}">{answer}</a></div>
  <div class="card-clue">{clue}</div>
</div>
"#,
            position = html_escape(&record.position),
            slug = slugify(&record.clue),
            answer = html_escape(&record.answer),
            clue = html_escape(&record.clue),
        ));
    }
    html.push_str("</div>\n");
    html
}

/// 把 ISO 日期格式化为 "Wednesday, January 15, 2025"
///
/// 解析失败时原样返回
fn format_display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{}, {} {}, {}", d.format("%A"), d.format("%B"), d.day(), d.year()),
        Err(_) => date.to_string(),
    }
}

/// 在降序日期列表中找当前日期的前一天/后一天
fn adjacent_dates(dates: &[String], current: &str) -> (Option<String>, Option<String>) {
    match dates.iter().position(|d| d == current) {
        Some(i) => {
            // 列表降序：i+1 是更早的一天，i-1 是更晚的一天
            let prev = dates.get(i + 1).cloned();
            let next = if i > 0 { dates.get(i - 1).cloned() } else { None };
            (prev, next)
        }
        None => (None, None),
    }
}

/// 把日期列表按 年 → 月 分组
fn group_dates_by_month(dates: &[String]) -> BTreeMap<i32, BTreeMap<u32, Vec<String>>> {
    let mut grouped: BTreeMap<i32, BTreeMap<u32, Vec<String>>> = BTreeMap::new();
    for date in dates {
        if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            grouped
                .entry(d.year())
                .or_default()
                .entry(d.month())
                .or_default()
                .push(date.clone());
        }
    }
    grouped
}

/// 月份英文名
fn month_name(month: u32) -> String {
    match NaiveDate::from_ymd_opt(2000, month, 1) {
        Some(d) => d.format("%B").to_string(),
        None => month.to_string(),
    }
}

/// HTML 转义
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// 页面骨架：头部导航 + 搜索框 + 内容 + 页脚
fn layout(title: &str, description: &str, canonical: &str, body: &str) -> String {
    let canonical_tag = if canonical.is_empty() {
        String::new()
    } else {
        format!("<link rel=\"canonical\" href=\"{}\">", canonical)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <meta name="description" content="{description}">
  {canonical_tag}
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #f7f8fa; color: #1f2430; }}
    header {{ background: #ffffff; border-bottom: 1px solid #e3e6ec; padding: 16px 24px; display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 12px; }}
    header .brand {{ font-size: 20px; font-weight: 700; color: #1d4ed8; text-decoration: none; }}
    header nav a {{ margin-left: 16px; color: #374151; text-decoration: none; }}
    header nav a:hover {{ color: #1d4ed8; }}
    .search-box {{ position: relative; }}
    .search-box input {{ padding: 6px 10px; border: 1px solid #d1d5db; border-radius: 6px; width: 220px; }}
    .search-results {{ position: absolute; top: 34px; left: 0; right: 0; background: #fff; border: 1px solid #d1d5db; border-radius: 6px; display: none; z-index: 10; }}
    .search-results a {{ display: block; padding: 6px 10px; color: #374151; text-decoration: none; font-size: 13px; }}
    .search-results a:hover {{ background: #eef2ff; }}
    main {{ max-width: 960px; margin: 24px auto; padding: 0 16px; }}
    h1 {{ font-size: 28px; margin-bottom: 8px; }}
    h2 {{ font-size: 22px; margin: 24px 0 8px; }}
    h3 {{ font-size: 17px; margin: 16px 0 8px; }}
    .day-header {{ display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 8px; }}
    .day-date {{ color: #6b7280; font-size: 16px; }}
    .day-meta {{ color: #6b7280; margin: 8px 0 16px; }}
    .count {{ color: #6b7280; font-size: 14px; font-weight: 400; }}
    .answer-grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 12px; }}
    .answer-card {{ background: #ffffff; border: 1px solid #e3e6ec; border-radius: 10px; padding: 12px; }}
    .card-position {{ color: #1d4ed8; font-size: 13px; font-weight: 600; }}
    .card-answer {{ font-size: 20px; font-weight: 700; margin: 4px 0; }}
    .card-answer a {{ color: #1f2430; text-decoration: none; }}
    .card-answer a:hover {{ color: #1d4ed8; }}
    .card-clue {{ color: #6b7280; font-size: 14px; }}
    .answer-hero {{ background: #eef2ff; border: 1px solid #c7d2fe; border-radius: 12px; padding: 24px; text-align: center; margin: 16px 0; }}
    .answer-position {{ color: #1d4ed8; font-size: 14px; font-weight: 600; }}
    .answer-word {{ font-size: 48px; font-weight: 800; color: #1e3a8a; }}
    .archive-year {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 12px; margin-bottom: 16px; }}
    .archive-month {{ background: #ffffff; border: 1px solid #e3e6ec; border-radius: 10px; padding: 12px; }}
    .archive-month ul {{ list-style: none; }}
    .archive-month a {{ color: #1d4ed8; text-decoration: none; font-size: 14px; }}
    .button {{ display: inline-block; padding: 8px 14px; background: #1d4ed8; color: #ffffff; border-radius: 8px; text-decoration: none; font-size: 14px; border: none; cursor: pointer; }}
    .button:hover {{ background: #1e40af; }}
    .empty-state {{ text-align: center; padding: 48px 0; }}
    .empty-state .hint {{ background: #fefce8; border: 1px solid #fde68a; border-radius: 8px; padding: 12px; max-width: 420px; margin: 16px auto 0; font-size: 14px; }}
    .upload-section {{ background: #ffffff; border: 1px solid #e3e6ec; border-radius: 10px; padding: 16px; margin-bottom: 16px; }}
    .upload-section textarea {{ width: 100%; min-height: 100px; margin: 8px 0; padding: 8px; border: 1px solid #d1d5db; border-radius: 6px; }}
    .upload-section input {{ margin: 8px 0; }}
    .upload-status {{ font-size: 14px; margin-top: 8px; white-space: pre-wrap; }}
    footer {{ text-align: center; color: #9ca3af; font-size: 13px; padding: 24px; }}
  </style>
</head>
<body>
  <header>
    <a class="brand" href="/">{site_name}</a>
    <div class="search-box">
      <input id="search-input" type="text" placeholder="Search clues or answers...">
      <div id="search-results" class="search-results"></div>
    </div>
    <nav>
      <a href="/">Today</a>
      <a href="/answers">All Answers</a>
      <a href="/archive">Archive</a>
    </nav>
  </header>
  <main>
{body}
  </main>
  <footer>Answers are extracted with AI assistance and reviewed daily.</footer>
  <script>
    const input = document.getElementById('search-input');
    const box = document.getElementById('search-results');
    let timer = null;
    input.addEventListener('input', () => {{
      clearTimeout(timer);
      timer = setTimeout(async () => {{
        const q = input.value.trim();
        if (q.length < 2) {{ box.style.display = 'none'; return; }}
        const resp = await fetch('/api/search?q=' + encodeURIComponent(q));
        const data = await resp.json();
        box.innerHTML = data.results.map(r =>
          `<a href="/answer/${{r.slug}}"><strong>${{r.answer}}</strong> (${{r.position}}) &middot; ${{r.clue}}</a>`
        ).join('');
        box.style.display = data.results.length ? 'block' : 'none';
      }}, 200);
    }});
  </script>
</body>
</html>
"#,
        title = title,
        description = description,
        canonical_tag = canonical_tag,
        site_name = SITE_NAME,
        body = body,
    )
}

/// 管理页面内容（登录 + 上传表单）
const UPLOAD_PAGE_BODY: &str = r#"<h1>Admin Upload</h1>
<div class="upload-section">
  <h3>Login</h3>
  <input id="password" type="password" placeholder="Admin password">
  <button class="button" onclick="login()">Login</button>
  <div id="login-status" class="upload-status"></div>
</div>
<div class="upload-section">
  <h3>Manual Answers (no AI)</h3>
  <p>One answer per line, e.g. <code>1A: FASTEN</code> or <code>• Sew quickly (1A): FASTEN</code></p>
  <textarea id="manual-text"></textarea>
  <button class="button" onclick="uploadJson('/api/upload-answers', 'manual-text', 'manual-status')">Upload</button>
  <div id="manual-status" class="upload-status"></div>
</div>
<div class="upload-section">
  <h3>Puzzle Text (AI extraction)</h3>
  <textarea id="ai-text"></textarea>
  <button class="button" onclick="uploadJson('/api/upload-text', 'ai-text', 'text-status')">Upload</button>
  <div id="text-status" class="upload-status"></div>
</div>
<div class="upload-section">
  <h3>Puzzle Image</h3>
  <input id="image-file" type="file" accept="image/*">
  <button class="button" onclick="uploadFile('/api/upload-image', 'image-file', null, 'image-status')">Upload</button>
  <div id="image-status" class="upload-status"></div>
</div>
<div class="upload-section">
  <h3>Solved Puzzle Image</h3>
  <input id="solved-file" type="file" accept="image/*">
  <input id="solved-date" type="date">
  <button class="button" onclick="uploadFile('/api/upload-solved', 'solved-file', 'solved-date', 'solved-status')">Upload</button>
  <div id="solved-status" class="upload-status"></div>
</div>
<div class="upload-section">
  <h3>Puzzle PDF</h3>
  <input id="pdf-file" type="file" accept="application/pdf">
  <button class="button" onclick="uploadFile('/api/upload-crossword', 'pdf-file', null, 'pdf-status')">Upload</button>
  <div id="pdf-status" class="upload-status"></div>
</div>
<script>
async function login() {
  const resp = await fetch('/api/auth', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ password: document.getElementById('password').value }),
  });
  const data = await resp.json();
  document.getElementById('login-status').textContent =
    resp.ok ? 'Logged in.' : (data.error || 'Login failed');
}
async function uploadJson(url, textId, statusId) {
  const resp = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ text: document.getElementById(textId).value }),
  });
  showResult(resp, statusId);
}
async function uploadFile(url, fileId, dateId, statusId) {
  const form = new FormData();
  const file = document.getElementById(fileId).files[0];
  if (!file) { document.getElementById(statusId).textContent = 'Pick a file first.'; return; }
  form.append('file', file);
  if (dateId) {
    const date = document.getElementById(dateId).value;
    if (date) form.append('date', date);
  }
  const resp = await fetch(url, { method: 'POST', body: form });
  showResult(resp, statusId);
}
async function showResult(resp, statusId) {
  const data = await resp.json();
  document.getElementById(statusId).textContent = resp.ok
    ? `Saved ${data.total} answers for ${data.date}.`
    : (data.error || 'Upload failed');
}
</script>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display_date() {
        assert_eq!(format_display_date("2025-01-15"), "Wednesday, January 15, 2025");
        // 解析失败原样返回
        assert_eq!(format_display_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn test_adjacent_dates_in_descending_list() {
        let dates: Vec<String> = ["2025-01-16", "2025-01-15", "2025-01-14"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (prev, next) = adjacent_dates(&dates, "2025-01-15");
        assert_eq!(prev.as_deref(), Some("2025-01-14"));
        assert_eq!(next.as_deref(), Some("2025-01-16"));

        let (prev, next) = adjacent_dates(&dates, "2025-01-16");
        assert_eq!(prev.as_deref(), Some("2025-01-15"));
        assert!(next.is_none());

        let (prev, next) = adjacent_dates(&dates, "2020-01-01");
        assert!(prev.is_none() && next.is_none());
    }

    #[test]
    fn test_group_dates_by_month() {
        let dates: Vec<String> = ["2025-01-15", "2025-01-02", "2024-12-31", "bad-date"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let grouped = group_dates_by_month(&dates);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&2025][&1].len(), 2);
        assert_eq!(grouped[&2024][&12].len(), 1);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<b>"A&B"</b>"#), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_answer_cards_link_by_slug() {
        let answers = vec![AnswerRecord::manual(Some("Sew quickly!"), "1A", "FASTEN")];
        let html = render_answer_cards(&answers);
        assert!(html.contains("/answer/sew-quickly"));
        assert!(html.contains("FASTEN"));
    }
}
