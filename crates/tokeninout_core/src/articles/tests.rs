//! Article service tests over the in-memory store.

use super::{update::upsert_record, ArticleService, ArticleSettings};
use crate::frontmatter;
use crate::mirror::LocalMirror;
use crate::models::article::{ArticleRecord, ArticleUpdate, IndexEntry};
use crate::store::{ContentStore, DirEntry, FileWrite, MemoryStore, RemoteFile};
use crate::test_support::{article_markdown, index_json, record, service, service_with};
use crate::AppError;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const INDEX: &str = "data/json/articles.json";

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_with_commit(
        "data/md/a.md",
        &article_markdown("A", "first", "2024-01-01", "Alpha body\n"),
        "2024-01-05T10:00:00Z",
    );
    store.insert_with_commit(
        "data/md/b.md",
        &article_markdown("B", "second", "2024-02-01", "Beta body\n"),
        "2024-02-05T10:00:00Z",
    );
    store.insert(INDEX, "[]");
    store
}

fn update_for(path: &str, title: &str) -> ArticleUpdate {
    ArticleUpdate {
        path: path.to_string(),
        title: title.to_string(),
        description: "edited".to_string(),
        content: "New body\n".to_string(),
    }
}

fn stored_index(store: &MemoryStore) -> Vec<ArticleRecord> {
    let raw = store.content(INDEX).expect("index exists");
    serde_json::from_str(&raw).expect("index parses")
}

fn entries(records: &[ArticleRecord]) -> Vec<IndexEntry> {
    records.iter().map(ArticleRecord::to_index_entry).collect()
}

fn write_mirror_file(root: &TempDir, relative: &str, content: &str) {
    let path = root.path().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, content).expect("write mirror file");
}

#[tokio::test]
async fn sync_builds_one_record_per_markdown_file_in_listing_order() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    store.insert("data/md/README.txt", "not an article");
    store.insert("data/md/drafts/c.md", &article_markdown("C", "draft", "2024-03-01", ""));

    let records = service(&store, temp.path()).sync_index().await.expect("sync");

    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["data/md/a.md", "data/md/b.md"]);
    assert_eq!(records[0].title, "A");
    assert_eq!(records[0].date, "2024-01-01");
    assert_eq!(records[1].title, "B");
    assert_eq!(records[1].date, "2024-02-01");
    assert_eq!(records[0].last_modified, "2024-01-05T10:00:00Z");
    assert_eq!(stored_index(&store), records);
    assert_eq!(store.commits().last().map(|c| c.message.as_str()), Some("Sync articles"));
}

#[tokio::test]
async fn sync_falls_back_to_sha_without_commit_history() {
    let temp = TempDir::new().expect("temp dir");
    let store = Arc::new(MemoryStore::new());
    let sha = store.insert(
        "data/md/fresh.md",
        &article_markdown("Fresh", "no history", "2024-05-01", "body"),
    );

    let records = service(&store, temp.path()).sync_index().await.expect("sync");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].last_modified, sha);
}

#[tokio::test]
async fn sync_creates_missing_index_and_respects_concurrency_of_one() {
    let temp = TempDir::new().expect("temp dir");
    let store = Arc::new(MemoryStore::new());
    for index in 0..5 {
        store.insert(
            &format!("data/md/{}.md", index),
            &article_markdown(&format!("T{}", index), "d", "2024-01-01", ""),
        );
    }
    let settings = ArticleSettings {
        sync_concurrency: 1,
        ..ArticleSettings::default()
    };

    let records = service_with(&store, temp.path(), settings)
        .sync_index()
        .await
        .expect("sync");
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["T0", "T1", "T2", "T3", "T4"]);
    assert_eq!(stored_index(&store).len(), 5);
}

#[tokio::test]
async fn sync_aborts_without_writing_when_any_article_is_malformed() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    store.insert("data/md/c.md", "---\ntitle: C\n---\nmissing description and date");
    let before = store.content(INDEX);

    let err = service(&store, temp.path()).sync_index().await.expect_err("malformed");
    assert!(matches!(err, AppError::Decode(_)));
    assert_eq!(store.content(INDEX), before);
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn sync_of_missing_folder_is_not_found() {
    let temp = TempDir::new().expect("temp dir");
    let store = Arc::new(MemoryStore::new());
    let err = service(&store, temp.path()).sync_index().await.expect_err("no folder");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn index_write_with_stale_token_is_a_conflict() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let service = service(&store, temp.path());
    let stale = store.sha(INDEX).expect("index sha");
    store.insert(INDEX, "[{\"title\":\"concurrent\",\"path\":\"x.md\"}]");

    let err = service
        .write_index(&[record("a", "2024-01-01")], Some(stale), "late write".to_string())
        .await
        .expect_err("stale token");
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(store.content(INDEX).expect("index").contains("concurrent"));
}

#[tokio::test]
async fn update_rewrites_front_matter_and_merges_index_record() {
    let temp = TempDir::new().expect("temp dir");
    let store = Arc::new(MemoryStore::new());
    store.insert(
        "data/md/a.md",
        "---\ntitle: A\nauthor: gefei\ndescription: first\ndate: 2024-01-01\n---\nOld body\n",
    );
    store.insert(
        INDEX,
        &index_json(&[record("z", "2023-12-01"), record("a", "2024-01-01")]),
    );

    let updated = service(&store, temp.path())
        .update_article(&update_for("data/md/a.md", "A2"))
        .await
        .expect("update");

    let document = frontmatter::parse(&store.content("data/md/a.md").expect("doc")).expect("parse");
    assert_eq!(document.body, "New body\n");
    assert_eq!(document.front_matter.get_string("title").as_deref(), Some("A2"));
    assert_eq!(document.front_matter.get_string("description").as_deref(), Some("edited"));
    assert_eq!(document.front_matter.get_string("author").as_deref(), Some("gefei"));
    assert_eq!(document.front_matter.get_string("date").as_deref(), Some("2024-01-01"));
    let stamp = document.front_matter.get_string("lastModified").expect("stamp");
    assert!(stamp.ends_with('Z') && stamp.contains('.'), "stamp: {}", stamp);

    let index = stored_index(&store);
    assert_eq!(index.len(), 2);
    assert_eq!(index[0].title, "z");
    assert_eq!(index[1], updated);
    assert_eq!(updated.title, "A2");

    let messages: Vec<String> = store.commits().into_iter().map(|c| c.message).collect();
    assert_eq!(messages, vec!["Update article: A2", "Update index for data/md/a.md"]);
}

#[tokio::test]
async fn repeated_update_keeps_same_intent() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let service = service(&store, temp.path());
    let update = update_for("data/md/a.md", "Same");

    service.update_article(&update).await.expect("first update");
    let first = frontmatter::parse(&store.content("data/md/a.md").expect("doc")).expect("parse");
    service.update_article(&update).await.expect("second update");
    let second = frontmatter::parse(&store.content("data/md/a.md").expect("doc")).expect("parse");

    for key in ["title", "description", "date"] {
        assert_eq!(
            first.front_matter.get_string(key),
            second.front_matter.get_string(key),
            "key: {}",
            key
        );
    }
    assert_eq!(first.body, second.body);
    assert_eq!(stored_index(&store).len(), 1);
}

#[tokio::test]
async fn update_of_missing_article_is_not_found_and_writes_nothing() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let err = service(&store, temp.path())
        .update_article(&update_for("data/md/missing.md", "X"))
        .await
        .expect_err("missing");
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn update_rejects_article_without_date_before_writing() {
    let temp = TempDir::new().expect("temp dir");
    let store = Arc::new(MemoryStore::new());
    store.insert("data/md/a.md", "---\ntitle: A\n---\nbody");
    let err = service(&store, temp.path())
        .update_article(&update_for("data/md/a.md", "A"))
        .await
        .expect_err("no date");
    assert!(matches!(err, AppError::Decode(_)));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn update_with_full_resync_rebuilds_whole_index() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let settings = ArticleSettings {
        full_resync_on_update: true,
        ..ArticleSettings::default()
    };

    let updated = service_with(&store, temp.path(), settings)
        .update_article(&update_for("data/md/b.md", "B2"))
        .await
        .expect("update");

    let index = stored_index(&store);
    let titles: Vec<&str> = index.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B2"]);
    assert_eq!(updated.path, "data/md/b.md");
    assert_eq!(store.commits().last().map(|c| c.message.as_str()), Some("Sync articles"));
}

#[tokio::test]
async fn update_outside_articles_folder_leaves_index_alone() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    store.insert("pages/about.md", &article_markdown("About", "site", "2024-01-01", ""));

    service(&store, temp.path())
        .update_article(&update_for("pages/about.md", "About us"))
        .await
        .expect("update");
    assert_eq!(store.content(INDEX).as_deref(), Some("[]"));
}

/// Store that lets another writer change a file right after it is read.
struct RacingStore {
    inner: Arc<MemoryStore>,
    raced: AtomicBool,
}

#[async_trait]
impl ContentStore for RacingStore {
    async fn get_file(&self, path: &str) -> Result<RemoteFile, AppError> {
        let file = self.inner.get_file(path).await?;
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.insert(path, "---\ntitle: concurrent\n---\n");
        }
        Ok(file)
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, AppError> {
        self.inner.list_dir(path).await
    }

    async fn last_commit_date(&self, path: &str) -> Result<Option<String>, AppError> {
        self.inner.last_commit_date(path).await
    }

    async fn put_file(&self, write: FileWrite) -> Result<String, AppError> {
        self.inner.put_file(write).await
    }
}

#[tokio::test]
async fn concurrent_edit_between_read_and_write_is_a_conflict() {
    let temp = TempDir::new().expect("temp dir");
    let inner = seeded_store();
    let racing = Arc::new(RacingStore {
        inner: inner.clone(),
        raced: AtomicBool::new(false),
    });
    let service = ArticleService::new(racing, LocalMirror::new(temp.path()), ArticleSettings::default());

    let err = service
        .update_article(&update_for("data/md/a.md", "Mine"))
        .await
        .expect_err("conflict");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(
        inner.content("data/md/a.md").as_deref(),
        Some("---\ntitle: concurrent\n---\n")
    );
}

#[tokio::test]
async fn read_article_prefers_remote_then_mirror_then_fails() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    write_mirror_file(
        &temp,
        "data/md/a.md",
        &article_markdown("Local A", "mirror", "2024-01-01", "Local body"),
    );
    let service = service(&store, temp.path());

    let remote = service.read_article("data/md/a.md").await.expect("remote");
    assert_eq!(remote.front_matter.get_string("title").as_deref(), Some("A"));
    assert_eq!(remote.content, "Alpha body\n");

    store.set_offline(true);
    let local = service.read_article("data/md/a.md").await.expect("mirror");
    assert_eq!(local.front_matter.get_string("title").as_deref(), Some("Local A"));
    assert_eq!(local.path, "data/md/a.md");

    let err = service.read_article("data/md/b.md").await.expect_err("both fail");
    assert!(matches!(err, AppError::FetchFailed(_)));

    let escape = service.read_article("../etc/passwd").await.expect_err("escape");
    assert!(matches!(escape, AppError::FetchFailed(_)));
}

#[tokio::test]
async fn read_index_degrades_from_remote_to_mirror_to_empty() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let remote_records = vec![record("remote", "2024-04-01")];
    store.insert(INDEX, &index_json(&remote_records));
    let local_records = vec![record("local", "2024-03-01"), record("older", "2023-01-01")];
    write_mirror_file(&temp, INDEX, &index_json(&local_records));
    let service = service(&store, temp.path());

    assert_eq!(service.read_index(false).await, entries(&remote_records));

    store.set_offline(true);
    assert_eq!(service.read_index(false).await, entries(&local_records));

    std::fs::remove_file(temp.path().join(INDEX)).expect("remove mirror index");
    assert!(service.read_index(false).await.is_empty());
}

#[tokio::test]
async fn read_index_with_sync_returns_rebuilt_records() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let service = service(&store, temp.path());

    let records = service.read_index(true).await;
    assert_eq!(records.len(), 2);
    assert_eq!(entries(&stored_index(&store)), records);
}

#[tokio::test]
async fn read_index_with_failed_sync_serves_stored_index() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let stored = vec![record("kept", "2024-01-01")];
    store.insert(INDEX, &index_json(&stored));
    store.insert("data/md/broken.md", "---\n: [\n---\n");

    assert_eq!(
        service(&store, temp.path()).read_index(true).await,
        entries(&stored)
    );
}

#[test]
fn upsert_replaces_matching_path_or_appends() {
    let mut index = vec![
        json!({ "title": "a", "path": "data/md/a.md", "tags": ["usdt"] }),
        json!({ "description": "untitled", "path": "data/md/b.md" }),
    ];
    let mut replacement = record("a", "2024-05-01");
    replacement.title = "A!".to_string();
    upsert_record(&mut index, &replacement);
    upsert_record(&mut index, &record("c", "2024-03-01"));

    assert_eq!(index.len(), 3);
    assert_eq!(index[0]["title"], "A!");
    assert_eq!(index[0]["date"], "2024-05-01");
    assert_eq!(index[0]["tags"], json!(["usdt"]));
    assert_eq!(index[1], json!({ "description": "untitled", "path": "data/md/b.md" }));
    assert_eq!(index[2], record("c", "2024-03-01").to_index_entry());
}

#[tokio::test]
async fn read_index_serves_stored_elements_unchanged() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let stored = json!([
        { "title": "A", "description": "a", "date": "2024-01-01", "path": "data/md/a.md", "tags": ["usdt"] },
        { "description": "d", "date": "2024-02-01", "lastModified": "sha", "path": "data/md/b.md" }
    ]);
    let raw = serde_json::to_string_pretty(&stored).expect("json");
    store.insert(INDEX, &raw);
    write_mirror_file(&temp, INDEX, &raw);
    let service = service(&store, temp.path());

    assert_eq!(json!(service.read_index(false).await), stored);

    store.set_offline(true);
    assert_eq!(json!(service.read_index(false).await), stored);

    let latest = service.latest(6).await;
    assert_eq!(latest[0]["path"], "data/md/b.md");
    assert_eq!(latest[1]["tags"], json!(["usdt"]));
}

#[tokio::test]
async fn merge_keeps_foreign_index_elements() {
    let temp = TempDir::new().expect("temp dir");
    let store = seeded_store();
    let stored = json!([
        { "description": "no title", "path": "data/md/legacy.md" },
        { "title": "A", "description": "first", "date": "2024-01-01", "path": "data/md/a.md", "views": 3 }
    ]);
    store.insert(INDEX, &stored.to_string());

    service(&store, temp.path())
        .update_article(&update_for("data/md/a.md", "A2"))
        .await
        .expect("update");

    let index: serde_json::Value =
        serde_json::from_str(&store.content(INDEX).expect("index")).expect("json");
    assert_eq!(index[0], stored[0]);
    assert_eq!(index[1]["title"], "A2");
    assert_eq!(index[1]["views"], 3);
    let article_commit = store.commits().into_iter().next().expect("article commit");
    assert_eq!(index[1]["lastModified"], article_commit.date);
}
