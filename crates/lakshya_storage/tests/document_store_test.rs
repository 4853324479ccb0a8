//! Behavior shared by every document store backend.

use lakshya_interface::{DocumentPath, DocumentStore, Filter, FilterOp};
use lakshya_storage::{FileDocumentStore, InMemoryDocumentStore};
use serde_json::json;
use tempfile::TempDir;

async fn seed_colleges(store: &dyn DocumentStore) -> anyhow::Result<()> {
    let colleges = [
        ("coep", json!({"name": "COEP", "city": "Pune", "fees": 90000, "courses": ["B.Tech", "M.Tech"]})),
        ("iit-bombay", json!({"name": "IIT Bombay", "city": "Mumbai", "fees": 220000, "courses": ["B.Tech"]})),
        ("fergusson", json!({"name": "Fergusson College", "city": "Pune", "fees": 30000, "courses": ["B.Sc", "B.A"]})),
        ("vjti", json!({"name": "VJTI", "city": "Mumbai", "fees": 85000, "courses": ["B.Tech"]})),
    ];
    for (id, data) in colleges {
        store
            .set_record(&DocumentPath::new("colleges", id), data)
            .await?;
    }
    Ok(())
}

async fn exercise_store(store: &dyn DocumentStore) -> anyhow::Result<()> {
    seed_colleges(store).await?;

    // Filters combine, results ordered by id
    let pune_btech = store
        .query(
            "colleges",
            &[
                Filter::equals("city", "Pune"),
                Filter::new("courses", FilterOp::Contains, "B.Tech"),
            ],
            None,
        )
        .await?;
    assert_eq!(pune_btech.len(), 1);
    assert_eq!(pune_btech[0].path.id, "coep");

    let affordable = store
        .query(
            "colleges",
            &[Filter::new("fees", FilterOp::Le, 90000)],
            None,
        )
        .await?;
    let ids: Vec<_> = affordable.iter().map(|r| r.path.id.as_str()).collect();
    assert_eq!(ids, vec!["coep", "fergusson", "vjti"]);

    let limited = store.query("colleges", &[], Some(2)).await?;
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].path.id, "coep");

    // Unknown collection is empty, not an error
    assert!(store.query("scholarships", &[], None).await?.is_empty());

    // Overwrite is idempotent
    let path = DocumentPath::new("colleges", "coep");
    store
        .set_record(&path, json!({"name": "COEP Tech", "city": "Pune"}))
        .await?;
    store
        .set_record(&path, json!({"name": "COEP Tech", "city": "Pune"}))
        .await?;
    let record = store.get_record(&path).await?.expect("record");
    assert_eq!(record.data["name"], "COEP Tech");
    assert_eq!(store.query("colleges", &[], None).await?.len(), 4);

    // Generated ids
    let added = store
        .add_record("chat_sessions", json!({"messages": []}))
        .await?;
    assert_eq!(added.collection, "chat_sessions");
    assert!(store.get_record(&added).await?.is_some());

    // Delete, then delete again
    store.delete_record(&added).await?;
    assert!(store.get_record(&added).await?.is_none());
    store.delete_record(&added).await?;

    // Unsafe paths are rejected
    assert!(
        store
            .set_record(&DocumentPath::new("colleges", "../escape"), json!({}))
            .await
            .is_err()
    );
    assert!(store.query("..", &[], None).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_in_memory_store() -> anyhow::Result<()> {
    let store = InMemoryDocumentStore::new();
    exercise_store(&store).await?;
    assert_eq!(store.count("colleges").await, 4);
    Ok(())
}

#[tokio::test]
async fn test_file_store() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileDocumentStore::new(temp_dir.path())?;
    exercise_store(&store).await?;

    assert!(temp_dir.path().join("colleges").join("coep.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_file_store_survives_reopen() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = DocumentPath::new("chat_sessions", "session-1");

    {
        let store = FileDocumentStore::new(temp_dir.path())?;
        store
            .set_record(&path, json!({"messages": [{"role": "user"}]}))
            .await?;
    }

    let reopened = FileDocumentStore::new(temp_dir.path())?;
    let record = reopened.get_record(&path).await?.expect("persisted record");
    assert_eq!(record.data["messages"][0]["role"], "user");
    Ok(())
}

#[tokio::test]
async fn test_file_store_reports_corrupt_documents() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileDocumentStore::new(temp_dir.path())?;
    std::fs::create_dir_all(temp_dir.path().join("careers"))?;
    std::fs::write(temp_dir.path().join("careers").join("broken.json"), "{not json")?;

    let result = store
        .get_record(&DocumentPath::new("careers", "broken"))
        .await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_writes_to_distinct_documents() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = std::sync::Arc::new(FileDocumentStore::new(temp_dir.path())?);

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .set_record(
                    &DocumentPath::new("chat_sessions", format!("s{:02}", i)),
                    json!({"turn": i}),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let all = store.query("chat_sessions", &[], None).await?;
    assert_eq!(all.len(), 16);
    assert_eq!(all[0].path.id, "s00");
    Ok(())
}
