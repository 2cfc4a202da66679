//! Nginx Log Statistics
//!
//! Counts over a collection of nginx access log documents.

use std::fmt;

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Collection;
use serde::Serialize;

use crate::error::Result;

/// HTTP methods reported, in display order.
pub const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Number of client IPs listed in the top-IP section.
pub const TOP_IP_LIMIT: i64 = 10;

/// Log count for one HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodCount {
    pub method: String,
    pub count: u64,
}

/// Log count for one client IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpCount {
    pub ip: String,
    pub count: i64,
}

impl IpCount {
    /// Reads one `{ _id: <ip>, count: <n> }` group row.
    fn from_group(row: &Document) -> Self {
        let ip = match row.get("_id") {
            Some(Bson::String(ip)) => ip.clone(),
            Some(Bson::Null) | None => "None".to_string(),
            Some(other) => other.to_string(),
        };
        let count = match row.get("count") {
            Some(Bson::Int32(n)) => i64::from(*n),
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Double(x)) => *x as i64,
            _ => 0,
        };
        Self { ip, count }
    }
}

// == Log Stats ==
/// Summary of the nginx log collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogStats {
    /// Total number of log documents
    pub total: u64,
    /// Count per method, in [`METHODS`] order
    pub methods: Vec<MethodCount>,
    /// GET requests to `/status`
    pub status_checks: u64,
    /// Most frequent client IPs, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_ips: Option<Vec<IpCount>>,
}

/// Aggregation grouping logs by IP, most frequent first.
pub fn top_ips_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$ip", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": limit },
    ]
}

/// Collects the statistics, including the top IPs when `include_top_ips` is set.
///
/// # Returns
/// - `Ok(stats)` with `top_ips` set only when requested
/// - `Err` if any count or the aggregation fails
pub async fn log_stats(collection: &Collection<Document>, include_top_ips: bool) -> Result<LogStats> {
    let total = collection.count_documents(doc! {}).await?;

    let mut methods = Vec::with_capacity(METHODS.len());
    for method in METHODS {
        let count = collection.count_documents(doc! { "method": method }).await?;
        methods.push(MethodCount {
            method: method.to_string(),
            count,
        });
    }

    let status_checks = collection
        .count_documents(doc! { "method": "GET", "path": "/status" })
        .await?;

    let top_ips = if include_top_ips {
        let rows: Vec<Document> = collection
            .aggregate(top_ips_pipeline(TOP_IP_LIMIT))
            .await?
            .try_collect()
            .await?;
        Some(rows.iter().map(IpCount::from_group).collect())
    } else {
        None
    };

    Ok(LogStats {
        total,
        methods,
        status_checks,
        top_ips,
    })
}

impl fmt::Display for LogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} logs", self.total)?;
        writeln!(f, "Methods:")?;
        for entry in &self.methods {
            writeln!(f, "\tmethod {}: {}", entry.method, entry.count)?;
        }
        writeln!(f, "{} status check", self.status_checks)?;

        if let Some(top_ips) = &self.top_ips {
            writeln!(f, "IPs:")?;
            for entry in top_ips {
                writeln!(f, "\t{}: {}", entry.ip, entry.count)?;
            }
        }
        Ok(())
    }
}
