use bson::Document;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;

use super::Collection;
use crate::errors::{Error, Result};
use crate::record::Record;

impl Collection {
    /// Fetches all records of `field` within the closed interval `[start, finish]`,
    /// oldest first. Bounds in any time zone are compared in UTC.
    ///
    /// An empty series or range yields an empty vector.
    pub fn interval<V, Tz1, Tz2>(
        &self,
        field: &str,
        start: DateTime<Tz1>,
        finish: DateTime<Tz2>,
    ) -> Result<Vec<Record<V>>>
    where
        V: DeserializeOwned,
        Tz1: TimeZone,
        Tz2: TimeZone,
    {
        self.scan(field, start.with_timezone(&Utc), finish.with_timezone(&Utc), false)
    }

    /// Same as [`interval`](Self::interval) but newest first.
    pub fn interval_desc<V, Tz1, Tz2>(
        &self,
        field: &str,
        start: DateTime<Tz1>,
        finish: DateTime<Tz2>,
    ) -> Result<Vec<Record<V>>>
    where
        V: DeserializeOwned,
        Tz1: TimeZone,
        Tz2: TimeZone,
    {
        self.scan(field, start.with_timezone(&Utc), finish.with_timezone(&Utc), true)
    }

    fn scan<V: DeserializeOwned>(
        &self,
        field: &str,
        start: DateTime<Utc>,
        finish: DateTime<Utc>,
        descending: bool,
    ) -> Result<Vec<Record<V>>> {
        let query_err = |source: mongodb::error::Error| Error::Query {
            field: field.to_string(),
            start,
            finish,
            source,
        };

        let cursor = self
            .inner
            .find(self.schema.interval_filter(field, start, finish))
            .sort(self.schema.sort(descending))
            .run()
            .map_err(query_err)?;

        let mut records = Vec::new();
        for doc in cursor {
            let doc: Document = doc.map_err(query_err)?;
            records.push(self.schema.decode(doc)?);
        }
        log::debug!(
            "Interval {} [{}, {}] on {} returned {} record(s)",
            field,
            start,
            finish,
            self.namespace(),
            records.len()
        );
        Ok(records)
    }

    /// Returns the record of `field` with the greatest timestamp.
    pub fn last<V: DeserializeOwned>(&self, field: &str) -> Result<Record<V>> {
        let doc = self
            .inner
            .find_one(self.schema.series_filter(field))
            .sort(self.schema.sort(true))
            .run()
            .map_err(|source| Error::Operation {
                op: "last",
                namespace: self.namespace(),
                field: field.to_string(),
                source,
            })?
            .ok_or_else(|| Error::NotFound {
                field: field.to_string(),
            })?;
        self.schema.decode(doc)
    }
}
