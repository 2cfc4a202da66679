//! NoSQL Basics - command line entry point
//!
//! Each subcommand is one direct call into the cache wrapper, the page
//! cache or a document helper, printing the result to stdout.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::Cursor;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nosql_basics::cache::{decode_utf8, replay, Cache, CacheValue};
use nosql_basics::documents::{self, connect_collection};
use nosql_basics::store::{KeyValueStore, RedisStore};
use nosql_basics::web::{HttpFetcher, PageCache};
use nosql_basics::{Config, StoreError};

/// Basic operations against Redis and MongoDB
#[derive(Parser, Debug)]
#[command(name = "nosql_basics")]
#[command(about = "Basic operations against a key-value cache and a document store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a value under a generated key and print the key
    Store {
        value: String,
        /// How to interpret VALUE
        #[arg(long = "as", value_enum, default_value_t = ValueKind::Str)]
        kind: ValueKind,
    },
    /// Print the value stored under KEY
    Get {
        key: String,
        /// How to decode the stored bytes
        #[arg(long = "as", value_enum, default_value_t = ValueKind::Str)]
        kind: ValueKind,
    },
    /// Print the call history of the store operation
    Replay {
        #[arg(long)]
        json: bool,
    },
    /// Fetch a page through the TTL cache
    Page { url: String },
    /// List every document in a collection
    ListAll {
        #[arg(long, default_value = "school")]
        collection: String,
    },
    /// List schools teaching TOPIC
    SchoolsByTopic {
        topic: String,
        #[arg(long, default_value = "school")]
        collection: String,
    },
    /// Insert a school from key=value fields and print its id
    InsertSchool {
        #[arg(required = true, value_parser = parse_field)]
        fields: Vec<(String, String)>,
        #[arg(long, default_value = "school")]
        collection: String,
    },
    /// Replace the topics of every school named NAME
    UpdateTopics {
        name: String,
        topics: Vec<String>,
        #[arg(long, default_value = "school")]
        collection: String,
    },
    /// Compute average scores and list students best first
    TopStudents {
        #[arg(long, default_value = "students")]
        collection: String,
    },
    /// Print statistics about the nginx log collection
    LogStats {
        /// Include the ten most frequent client IPs
        #[arg(long)]
        ips: bool,
        #[arg(long)]
        json: bool,
        #[arg(long, default_value = "nginx")]
        collection: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Str,
    Raw,
    Int,
    Float,
}

fn parse_field(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nosql_basics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    info!(
        "Configuration loaded: redis={}, mongo={}, page_ttl={}s, flush_on_start={}",
        config.redis_url, config.mongo_url, config.page_ttl, config.flush_on_start
    );

    match cli.command {
        Command::Store { value, kind } => {
            let cache = open_cache(&config).await?;
            let value = match kind {
                ValueKind::Str => CacheValue::Text(value),
                ValueKind::Raw => CacheValue::Bytes(value.into_bytes()),
                ValueKind::Int => CacheValue::Int(value.parse().context("VALUE is not an integer")?),
                ValueKind::Float => CacheValue::Float(value.parse().context("VALUE is not a float")?),
            };
            println!("{}", cache.store(value).await?);
        }
        Command::Get { key, kind } => {
            let cache = open_cache(&config).await?;
            let rendered = match kind {
                ValueKind::Str => cache.get_str(&key).await?,
                ValueKind::Raw => cache
                    .get(&key)
                    .await?
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
                ValueKind::Int => cache.get_int(&key).await?.map(|n| n.to_string()),
                ValueKind::Float => cache
                    .get_with(&key, |bytes| {
                        let text = decode_utf8(bytes)?;
                        text.trim()
                            .parse::<f64>()
                            .map_err(|e| StoreError::Decode(e.to_string()))
                    })
                    .await?
                    .map(|x| x.to_string()),
            };
            println!("{}", rendered.as_deref().unwrap_or("None"));
        }
        Command::Replay { json } => {
            let cache = open_cache(&config).await?;
            let op = cache.store_operation();
            if json {
                println!("{}", serde_json::to_string_pretty(&op.history().await?)?);
            } else {
                replay(&op, &mut io::stdout().lock()).await?;
            }
        }
        Command::Page { url } => {
            let store: Arc<dyn KeyValueStore> = Arc::new(RedisStore::connect(&config.redis_url).await?);
            let pages = PageCache::with_ttl(store, HttpFetcher::new(), config.page_ttl);
            print!("{}", pages.get_page(&url).await?);
        }
        Command::ListAll { collection } => {
            let collection = school_collection(&config, &collection).await?;
            print_documents(documents::list_all(&collection).await?).await?;
        }
        Command::SchoolsByTopic { topic, collection } => {
            let collection = school_collection(&config, &collection).await?;
            print_documents(documents::schools_by_topic(&collection, &topic).await?).await?;
        }
        Command::InsertSchool { fields, collection } => {
            let collection = school_collection(&config, &collection).await?;
            let mut document = Document::new();
            for (key, value) in fields {
                document.insert(key, value);
            }
            println!("{}", documents::insert_school(&collection, document).await?);
        }
        Command::UpdateTopics {
            name,
            topics,
            collection,
        } => {
            let collection = school_collection(&config, &collection).await?;
            let modified = documents::update_topics(&collection, &name, topics).await?;
            info!("Updated topics on {} documents", modified);
        }
        Command::TopStudents { collection } => {
            let collection = school_collection(&config, &collection).await?;
            print_documents(documents::top_students(&collection).await?).await?;
        }
        Command::LogStats {
            ips,
            json,
            collection,
        } => {
            let collection =
                connect_collection(&config.mongo_url, &config.logs_database, &collection).await?;
            let stats = documents::log_stats(&collection, ips).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", stats);
            }
        }
    }

    Ok(())
}

/// Cache wrapper over Redis, flushed first when configured to.
async fn open_cache(config: &Config) -> anyhow::Result<Cache> {
    let store: Arc<dyn KeyValueStore> = Arc::new(RedisStore::connect(&config.redis_url).await?);
    let cache = if config.flush_on_start {
        Cache::flushed(store).await?
    } else {
        Cache::new(store)
    };
    Ok(cache)
}

async fn school_collection(
    config: &Config,
    collection: &str,
) -> anyhow::Result<mongodb::Collection<Document>> {
    Ok(connect_collection(&config.mongo_url, &config.mongo_database, collection).await?)
}

async fn print_documents(mut cursor: Cursor<Document>) -> anyhow::Result<()> {
    while let Some(document) = cursor.try_next().await? {
        println!("{}", document);
    }
    Ok(())
}
