//! Integration Tests against a live MongoDB server
//!
//! Run with `--ignored`; each test uses a fresh collection in the
//! `nosql_basics_test` database and drops it afterwards.

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use nosql_basics::documents::{self, connect_collection};
use nosql_basics::Config;

async fn fresh_collection() -> Collection<Document> {
    let config = Config::from_env();
    let name = format!("test_{}", uuid::Uuid::new_v4().simple());
    connect_collection(&config.mongo_url, "nosql_basics_test", &name)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn test_school_helpers() {
    let collection = fresh_collection().await;

    let id = documents::insert_school(&collection, doc! { "name": "Holberton", "topics": ["C"] })
        .await
        .unwrap();
    documents::insert_school(&collection, doc! { "name": "UCSF", "topics": ["Python"] })
        .await
        .unwrap();

    let all: Vec<Document> = documents::list_all(&collection).await.unwrap().try_collect().await.unwrap();
    assert_eq!(all.len(), 2);

    let modified = documents::update_topics(&collection, "Holberton", vec!["Python".to_string()])
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let python: Vec<Document> = documents::schools_by_topic(&collection, "Python")
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(python.len(), 2);
    assert!(python.iter().any(|school| school.get("_id") == Some(&id)));

    collection.drop().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn test_top_students_sorted_by_average() {
    let collection = fresh_collection().await;
    collection
        .insert_many([
            doc! { "name": "Low", "topics": [ { "score": 2 }, { "score": 4 } ] },
            doc! { "name": "High", "topics": [ { "score": 10 }, { "score": 20 } ] },
            doc! { "name": "Empty", "topics": [] },
        ])
        .await
        .unwrap();

    let ranked: Vec<Document> = documents::top_students(&collection)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ranked[0].get_str("name").unwrap(), "High");
    assert_eq!(ranked[0].get_f64("averageScore").unwrap(), 15.0);
    assert_eq!(ranked[1].get_f64("averageScore").unwrap(), 3.0);
    let empty = ranked.iter().find(|d| d.get_str("name").ok() == Some("Empty")).unwrap();
    assert!(empty.get("averageScore").is_none());

    collection.drop().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn test_log_stats_counts() {
    let collection = fresh_collection().await;
    collection
        .insert_many([
            doc! { "ip": "1.1.1.1", "method": "GET", "path": "/status" },
            doc! { "ip": "1.1.1.1", "method": "GET", "path": "/" },
            doc! { "ip": "2.2.2.2", "method": "POST", "path": "/" },
        ])
        .await
        .unwrap();

    let stats = documents::log_stats(&collection, true).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.methods[0].count, 2);
    assert_eq!(stats.methods[1].count, 1);
    assert_eq!(stats.status_checks, 1);

    let top_ips = stats.top_ips.unwrap();
    assert_eq!(top_ips[0].ip, "1.1.1.1");
    assert_eq!(top_ips[0].count, 2);

    collection.drop().await.unwrap();
}
