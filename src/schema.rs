//! Storage layout of timeseries documents and the query documents built from it.
//!
//! Every filter, sort and index specification is derived from a [`Schema`]
//! value so that the code writing documents and the code reading them always
//! agree on field names.

use bson::{Bson, Document, doc};
use std::collections::HashMap;

use chrono::{DateTime, Timelike, Utc};
use mongodb::IndexModel;
use mongodb::options::{IndexOptions, WriteConcern};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::{Error, Result};
use crate::record::Record;

/// How finely records of one series are keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// Timestamps are stored as given (millisecond resolution).
    #[default]
    Exact,
    /// Timestamps are truncated to the top of their UTC hour.
    Hour,
}

/// Field names and keying policy of a timeseries collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    pub type_field: &'static str,
    pub timestamp_field: &'static str,
    pub value_field: &'static str,
    pub precision: Precision,
}

impl Default for Schema {
    fn default() -> Self {
        Self::exact()
    }
}

impl Schema {
    pub const fn exact() -> Self {
        Self {
            type_field: "type",
            timestamp_field: "timestamp",
            value_field: "value",
            precision: Precision::Exact,
        }
    }

    pub const fn hourly() -> Self {
        Self {
            type_field: "type",
            timestamp_field: "timestamp_hour",
            value_field: "value",
            precision: Precision::Hour,
        }
    }

    /// The timestamp a record is keyed and stored under.
    pub fn key_timestamp(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self.precision {
            Precision::Exact => ts,
            Precision::Hour => truncate_to_hour(ts),
        }
    }

    pub fn index_name(&self) -> String {
        format!("{}_1_{}_1", self.type_field, self.timestamp_field)
    }

    /// Unique compound index on `(type, timestamp)`.
    pub fn index_model(&self) -> IndexModel {
        let options = IndexOptions::builder()
            .name(self.index_name())
            .unique(true)
            .sparse(true)
            .build();
        IndexModel::builder()
            .keys(doc! { self.type_field: 1, self.timestamp_field: 1 })
            .options(options)
            .build()
    }

    pub fn series_filter(&self, field: &str) -> Document {
        doc! { self.type_field: field }
    }

    pub fn key_filter(&self, field: &str, ts: DateTime<Utc>) -> Document {
        doc! {
            self.type_field: field,
            self.timestamp_field: bson::DateTime::from_chrono(self.key_timestamp(ts)),
        }
    }

    /// Closed interval `[start, finish]` over one series.
    ///
    /// Under hour precision `start` is truncated as well, so the bucket holding
    /// `start` is part of the result.
    pub fn interval_filter(&self, field: &str, start: DateTime<Utc>, finish: DateTime<Utc>) -> Document {
        doc! {
            self.type_field: field,
            self.timestamp_field: {
                "$gte": bson::DateTime::from_chrono(self.key_timestamp(start)),
                "$lte": bson::DateTime::from_chrono(finish),
            },
        }
    }

    pub fn sort(&self, descending: bool) -> Document {
        doc! { self.timestamp_field: if descending { -1 } else { 1 } }
    }

    /// Full replacement document stored for `record`.
    pub fn document<V: Serialize>(&self, field: &str, record: &Record<V>) -> Result<Document> {
        Ok(doc! {
            self.type_field: field,
            self.timestamp_field: bson::DateTime::from_chrono(self.key_timestamp(record.timestamp)),
            self.value_field: bson::to_bson(&record.value)?,
        })
    }

    pub fn decode<V: DeserializeOwned>(&self, mut doc: Document) -> Result<Record<V>> {
        let timestamp = doc
            .get_datetime(self.timestamp_field)
            .map_err(|e| Error::MalformedDocument(format!("{}: {}", self.timestamp_field, e)))?
            .to_chrono();
        let value = doc.remove(self.value_field).unwrap_or(Bson::Null);
        Ok(Record {
            timestamp,
            value: bson::from_bson(value)?,
        })
    }

    /// One upsert statement per distinct key, paired with the position of the
    /// record it was built from.
    ///
    /// Records sharing a key within one batch collapse onto the statement of the
    /// later record, so the later write wins regardless of how the server
    /// schedules an unordered batch.
    pub fn upsert_statements<V: Serialize>(
        &self,
        field: &str,
        records: &[Record<V>],
    ) -> Result<Vec<(usize, Document)>> {
        let mut slots: HashMap<i64, usize> = HashMap::with_capacity(records.len());
        let mut statements: Vec<(usize, Document)> = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let statement = doc! {
                "q": self.key_filter(field, record.timestamp),
                "u": self.document(field, record)?,
                "upsert": true,
                "multi": false,
            };
            let key = bson::DateTime::from_chrono(self.key_timestamp(record.timestamp)).timestamp_millis();
            match slots.get(&key) {
                Some(&slot) => statements[slot] = (index, statement),
                None => {
                    slots.insert(key, statements.len());
                    statements.push((index, statement));
                }
            }
        }
        Ok(statements)
    }

    /// An `update` command carrying `statements`, acknowledged at
    /// `write_concern` when one is set.
    pub fn upsert_command(
        &self,
        collection: &str,
        statements: &[Document],
        write_concern: Option<&WriteConcern>,
    ) -> Result<Document> {
        let updates: Vec<Bson> = statements.iter().cloned().map(Bson::Document).collect();
        let mut command = doc! {
            "update": collection,
            "updates": updates,
            "ordered": false,
        };
        if let Some(wc) = write_concern {
            let wc: Document = bson::to_document(wc)?
                .into_iter()
                .filter(|(_, v)| *v != Bson::Null)
                .collect();
            if !wc.is_empty() {
                command.insert("writeConcern", wc);
            }
        }
        Ok(command)
    }
}

pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .unwrap_or(ts)
}
