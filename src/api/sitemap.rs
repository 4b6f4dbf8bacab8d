//! sitemap.xml 生成
//!
//! 静态页（首页 / 归档）加上每个日期页各一条

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::AppState;
use crate::workflow::upload_ctx::today;

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let dates = state.store.get_all_dates().await;
    let base_url = state.config.base_url.trim_end_matches('/');
    let xml = render_sitemap(base_url, &dates, &today());

    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

/// 渲染 sitemap XML
fn render_sitemap(base_url: &str, dates: &[String], last_modified: &str) -> String {
    let mut entries = String::new();

    entries.push_str(&url_entry(base_url, last_modified, "daily", "1.0"));
    entries.push_str(&url_entry(
        &format!("{}/archive", base_url),
        last_modified,
        "weekly",
        "0.8",
    ));

    for date in dates {
        entries.push_str(&url_entry(
            &format!("{}/{}", base_url, date),
            last_modified,
            "monthly",
            "0.6",
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}</urlset>
"#,
        entries
    )
}

fn url_entry(loc: &str, lastmod: &str, changefreq: &str, priority: &str) -> String {
    format!(
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
        loc, lastmod, changefreq, priority
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_contains_static_and_date_pages() {
        let dates = vec!["2025-01-15".to_string(), "2025-01-14".to_string()];
        let xml = render_sitemap("https://example.com", &dates, "2025-01-16");

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://example.com</loc>"));
        assert!(xml.contains("<loc>https://example.com/archive</loc>"));
        assert!(xml.contains("<loc>https://example.com/2025-01-15</loc>"));
        assert!(xml.contains("<loc>https://example.com/2025-01-14</loc>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
    }

    #[test]
    fn test_sitemap_empty_store() {
        let xml = render_sitemap("https://example.com", &[], "2025-01-16");
        // 只有首页和归档两条
        assert_eq!(xml.matches("<url>").count(), 2);
    }
}
