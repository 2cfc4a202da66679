//! Student score averages.

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Collection, Cursor};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Field the computed average is written to.
pub const AVERAGE_FIELD: &str = "averageScore";

/// Mean of `topics[].score`, or `None` when the topic list is empty.
///
/// Fails when the document has no `topics` array or a topic has no
/// numeric `score`.
pub fn average_score(document: &Document) -> Result<Option<f64>> {
    let topics = document
        .get_array("topics")
        .map_err(|_| StoreError::MissingField("topics".to_string()))?;

    let mut sum = 0.0;
    for topic in topics {
        sum += topic
            .as_document()
            .and_then(|topic| topic.get("score"))
            .and_then(as_number)
            .ok_or_else(|| StoreError::MissingField("score".to_string()))?;
    }

    if topics.is_empty() {
        Ok(None)
    } else {
        Ok(Some(sum / topics.len() as f64))
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(x) => Some(*x),
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        _ => None,
    }
}

/// Writes each document's average score back to it, then returns the whole
/// collection sorted by that average, highest first.
///
/// Documents with an empty topic list are left without an average.
pub async fn top_students(collection: &Collection<Document>) -> Result<Cursor<Document>> {
    let mut students = collection.find(doc! {}).await?;

    while let Some(student) = students.try_next().await? {
        let Some(average) = average_score(&student)? else {
            continue;
        };
        let id = student
            .get("_id")
            .cloned()
            .ok_or_else(|| StoreError::MissingField("_id".to_string()))?;

        collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "averageScore": average } })
            .await?;
        debug!("Stored {} {} for {:?}", AVERAGE_FIELD, average, student.get("name"));
    }

    Ok(collection
        .find(doc! {})
        .sort(doc! { "averageScore": -1 })
        .await?)
}
