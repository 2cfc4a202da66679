//! Document Store Module
//!
//! Stateless helpers over MongoDB collections: school records, student
//! score averages and nginx log statistics.

mod log_stats;
mod school;
mod students;

pub use log_stats::{log_stats, top_ips_pipeline, IpCount, LogStats, MethodCount, METHODS, TOP_IP_LIMIT};
pub use school::{insert_school, list_all, schools_by_topic, update_topics};
pub use students::{average_score, top_students, AVERAGE_FIELD};

use mongodb::bson::Document;
use mongodb::{Client, Collection};
use tracing::info;

use crate::error::Result;

/// Opens a handle on `database.collection` at `url`.
pub async fn connect_collection(
    url: &str,
    database: &str,
    collection: &str,
) -> Result<Collection<Document>> {
    let client = Client::with_uri_str(url).await?;
    info!("Using MongoDB collection {}.{}", database, collection);
    Ok(client.database(database).collection(collection))
}
