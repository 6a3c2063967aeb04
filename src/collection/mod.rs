//! Timeseries view over a single MongoDB collection

use bson::Document;
use mongodb::sync::{Collection as MongoCollection, Database};

use crate::schema::Schema;

mod query;
mod upsert;

#[cfg(test)]
pub(crate) use upsert::{MAX_BATCH_BYTES, MAX_WRITE_BATCH_SIZE, UpdateReply, parse_update_reply, split_batches};

/// A timeseries collection in a mongo database.
///
/// Obtained from [`Session::c`](crate::Session::c), which guarantees the unique
/// `(type, timestamp)` index exists before the handle is returned.
#[derive(Clone, Debug)]
pub struct Collection {
    db: Database,
    inner: MongoCollection<Document>,
    schema: Schema,
}

impl Collection {
    pub(crate) fn new(db: Database, inner: MongoCollection<Document>, schema: Schema) -> Self {
        Self { db, inner, schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// `db.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.db.name(), self.inner.name())
    }
}
