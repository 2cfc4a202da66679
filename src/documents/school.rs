//! School collection helpers.

use mongodb::bson::{doc, Bson, Document};
use mongodb::{Collection, Cursor};
use tracing::debug;

use crate::error::Result;

/// Cursor over every document in the collection.
pub async fn list_all(collection: &Collection<Document>) -> Result<Cursor<Document>> {
    Ok(collection.find(doc! {}).await?)
}

/// Cursor over the documents whose `topics` contain `topic`.
pub async fn schools_by_topic(
    collection: &Collection<Document>,
    topic: &str,
) -> Result<Cursor<Document>> {
    Ok(collection.find(doc! { "topics": topic }).await?)
}

/// Inserts `fields` as a new document and returns its generated `_id`.
///
/// # Arguments
/// * `collection` - Target collection
/// * `fields` - Document body; an `_id` is added by the server if missing
pub async fn insert_school(collection: &Collection<Document>, fields: Document) -> Result<Bson> {
    let result = collection.insert_one(fields).await?;
    debug!("Inserted document {}", result.inserted_id);
    Ok(result.inserted_id)
}

/// Replaces `topics` on every document named `name`, returning how many changed.
pub async fn update_topics(
    collection: &Collection<Document>,
    name: &str,
    topics: Vec<String>,
) -> Result<u64> {
    let result = collection
        .update_many(doc! { "name": name }, doc! { "$set": { "topics": topics } })
        .await?;
    debug!(
        "update_topics({}): matched {}, modified {}",
        name, result.matched_count, result.modified_count
    );
    Ok(result.modified_count)
}
