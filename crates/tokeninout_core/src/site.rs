//! Home page data: the resource list and the newest articles.

use crate::articles::ArticleService;
use crate::constants::HOME_ARTICLE_LIMIT;
use crate::mirror::LocalMirror;
use crate::models::home::{HomeFeed, Resource};

/// Load the resource list from the local mirror.
///
/// # Returns
/// The resources, or an empty list (logged) when the file is missing or
/// malformed.
pub async fn load_resources(mirror: &LocalMirror, path: &str) -> Vec<Resource> {
    match mirror.read_json(path).await {
        Ok(resources) => resources,
        Err(err) => {
            tracing::error!(operation = "load_resources", path = %path, error = %err, "Failed to load resources");
            Vec::new()
        }
    }
}

/// Assemble the home feed.
pub async fn home_feed(articles: &ArticleService, resources_path: &str) -> HomeFeed {
    let (resources, articles) = tokio::join!(
        load_resources(articles.mirror(), resources_path),
        articles.latest(HOME_ARTICLE_LIMIT)
    );
    HomeFeed {
        resources,
        articles,
    }
}

#[cfg(test)]
mod tests {
    use super::{home_feed, load_resources};
    use crate::articles::{ArticleService, ArticleSettings};
    use crate::mirror::LocalMirror;
    use crate::store::MemoryStore;
    use crate::test_support::{index_json, record};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_resources_file_yields_empty_list() {
        let temp = TempDir::new().expect("temp dir");
        let mirror = LocalMirror::new(temp.path());
        assert!(load_resources(&mirror, "data/json/resources.json").await.is_empty());
    }

    #[tokio::test]
    async fn home_feed_limits_and_orders_articles_newest_first() {
        let temp = TempDir::new().expect("temp dir");
        let json_dir = temp.path().join("data/json");
        std::fs::create_dir_all(&json_dir).expect("mkdir");
        std::fs::write(
            json_dir.join("resources.json"),
            r#"[{"name":"Binance","description":"exchange","url":"https://binance.com"}]"#,
        )
        .expect("write resources");

        let store = Arc::new(MemoryStore::new());
        let records: Vec<_> = (1..=8)
            .map(|month| record(&format!("m{}", month), &format!("2024-{:02}-01", month)))
            .collect();
        store.insert("data/json/articles.json", &index_json(&records));

        let service = ArticleService::new(
            store,
            LocalMirror::new(temp.path()),
            ArticleSettings::default(),
        );
        let feed = home_feed(&service, "data/json/resources.json").await;

        assert_eq!(feed.resources.len(), 1);
        assert_eq!(feed.resources[0].name, "Binance");
        let titles: Vec<&str> = feed
            .articles
            .iter()
            .filter_map(|entry| entry["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["m8", "m7", "m6", "m5", "m4", "m3"]);
    }
}
