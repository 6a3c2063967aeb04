use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::UpsertResult;

/// Common error type for timeseries operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid db URI: \"{uri}\": {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("Connection error: {0}")]
    Connect(#[source] mongodb::error::Error),
    #[error("Connection string names no default database")]
    NoDefaultDatabase,
    #[error("Failed to ensure timeseries index on {namespace}: {source}")]
    Index {
        namespace: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("Error querying {field} within range({start}, {finish}): {source}")]
    Query {
        field: String,
        start: DateTime<Utc>,
        finish: DateTime<Utc>,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("Error running {op} for {field} on {namespace}: {source}")]
    Operation {
        op: &'static str,
        namespace: String,
        field: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("No records found for {field}")]
    NotFound { field: String },
    #[error("Bulk upsert reported {} write error(s){} (matched {}, modified {})",
        .errors.len(),
        write_concern_suffix(.write_concern),
        .result.matched,
        .result.modified)]
    BulkWrite {
        result: UpsertResult,
        errors: Vec<WriteFailure>,
        write_concern: Option<WriteConcernFailure>,
    },
    #[error("Encode error: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

/// One per-document failure from a batched upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// Position of the failed record in the submitted batch.
    pub index: usize,
    pub code: i32,
    pub message: String,
}

/// The batch was applied but could not be acknowledged at the requested
/// write concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteConcernFailure {
    pub code: i32,
    pub message: String,
}

fn write_concern_suffix(wc: &Option<WriteConcernFailure>) -> String {
    match wc {
        Some(wc) => format!(" and write concern error {}: {}", wc.code, wc.message),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
