use bson::{Bson, Document};
use serde::Serialize;

use super::Collection;
use crate::errors::{Error, Result, WriteConcernFailure, WriteFailure};
use crate::record::{Record, UpsertResult};

/// Largest number of statements the server accepts in one write command.
pub(crate) const MAX_WRITE_BATCH_SIZE: usize = 100_000;

/// Statement bytes per command, kept below the 16 MiB message limit to leave
/// room for the command envelope.
pub(crate) const MAX_BATCH_BYTES: usize = 16 * 1024 * 1024 - 16 * 1024;

impl Collection {
    /// Bulk-inserts the given records into the series `field`, replacing any
    /// record already stored under the same key.
    ///
    /// Records travel in as few `update` commands as the server's batch limits
    /// allow. Per-document failures do not abort the rest of the batch; they are
    /// returned as [`Error::BulkWrite`] together with the counts of the writes
    /// that went through, as is a write concern the server could not satisfy.
    pub fn upsert<V: Serialize>(&self, field: &str, records: &[Record<V>]) -> Result<UpsertResult> {
        if records.is_empty() {
            return Ok(UpsertResult::default());
        }

        let statements = self.schema.upsert_statements(field, records)?;
        let chunks = split_batches(&statements, MAX_WRITE_BATCH_SIZE, MAX_BATCH_BYTES)?;
        log::debug!(
            "Upserting {} record(s) into {} for {} in {} command(s)",
            records.len(),
            self.namespace(),
            field,
            chunks.len()
        );

        let mut total = UpsertResult::default();
        let mut errors = Vec::new();
        let mut write_concern = None;

        for chunk in chunks {
            let docs: Vec<Document> = chunk.iter().map(|(_, doc)| doc.clone()).collect();
            let command = self
                .schema
                .upsert_command(self.inner.name(), &docs, self.inner.write_concern())?;
            let reply = self.db.run_command(command).run().map_err(|source| Error::Operation {
                op: "upsert",
                namespace: self.namespace(),
                field: field.to_string(),
                source,
            })?;

            let parsed = parse_update_reply(&reply)?;
            total.matched += parsed.result.matched;
            total.modified += parsed.result.modified;
            total.upserted += parsed.result.upserted;
            for mut failure in parsed.errors {
                // Server indexes are relative to the chunk.
                failure.index = chunk.get(failure.index).map(|(i, _)| *i).unwrap_or(failure.index);
                errors.push(failure);
            }
            if parsed.write_concern.is_some() {
                write_concern = parsed.write_concern;
            }
        }

        if !errors.is_empty() || write_concern.is_some() {
            log::warn!(
                "Upsert into {} for {} had {} write error(s), write concern error: {:?}",
                self.namespace(),
                field,
                errors.len(),
                write_concern
            );
            return Err(Error::BulkWrite {
                result: total,
                errors,
                write_concern,
            });
        }
        Ok(total)
    }
}

/// Splits statements into runs no longer than `max_count` statements and no
/// larger than `max_bytes` encoded. A single oversized statement travels alone
/// and is left for the server to reject.
pub(crate) fn split_batches<T>(
    statements: &[(T, Document)],
    max_count: usize,
    max_bytes: usize,
) -> Result<Vec<&[(T, Document)]>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut bytes = 0;

    for (i, (_, doc)) in statements.iter().enumerate() {
        let size = bson::to_vec(doc)?.len();
        let count = i - start;
        if count > 0 && (count >= max_count || bytes + size > max_bytes) {
            chunks.push(&statements[start..i]);
            start = i;
            bytes = 0;
        }
        bytes += size;
    }
    if start < statements.len() {
        chunks.push(&statements[start..]);
    }
    Ok(chunks)
}

/// Counts and failures carried by an `update` command reply.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct UpdateReply {
    pub result: UpsertResult,
    pub errors: Vec<WriteFailure>,
    pub write_concern: Option<WriteConcernFailure>,
}

pub(crate) fn parse_update_reply(reply: &Document) -> Result<UpdateReply> {
    let upserted = match reply.get("upserted") {
        Some(Bson::Array(ids)) => ids.len() as u64,
        _ => 0,
    };
    let result = UpsertResult {
        matched: count(reply, "n")?,
        modified: count(reply, "nModified")?,
        upserted,
    };

    let mut errors = Vec::new();
    if let Some(Bson::Array(entries)) = reply.get("writeErrors") {
        for entry in entries {
            let Bson::Document(entry) = entry else {
                return Err(Error::MalformedDocument("writeErrors entry is not a document".into()));
            };
            let index = usize::try_from(count(entry, "index")?)
                .map_err(|_| Error::MalformedDocument("writeErrors index out of range".into()))?;
            errors.push(WriteFailure {
                index,
                code: code(entry)?,
                message: entry.get_str("errmsg").unwrap_or_default().to_string(),
            });
        }
    }

    let write_concern = match reply.get("writeConcernError") {
        None => None,
        Some(Bson::Document(wce)) => Some(WriteConcernFailure {
            code: code(wce)?,
            message: wce.get_str("errmsg").unwrap_or_default().to_string(),
        }),
        Some(other) => {
            return Err(Error::MalformedDocument(format!("writeConcernError is not a document: {}", other)));
        }
    };

    Ok(UpdateReply {
        result,
        errors,
        write_concern,
    })
}

fn count(doc: &Document, key: &str) -> Result<u64> {
    let malformed = || Error::MalformedDocument(format!("{} is not a count: {:?}", key, doc.get(key)));
    match doc.get(key) {
        None => Ok(0),
        Some(Bson::Int32(n)) => u64::try_from(*n).map_err(|_| malformed()),
        Some(Bson::Int64(n)) => u64::try_from(*n).map_err(|_| malformed()),
        Some(Bson::Double(n)) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64 => {
            Ok(*n as u64)
        }
        Some(_) => Err(malformed()),
    }
}

fn code(doc: &Document) -> Result<i32> {
    let malformed = || Error::MalformedDocument(format!("code is not an i32: {:?}", doc.get("code")));
    match doc.get("code") {
        None => Ok(0),
        Some(Bson::Int32(n)) => Ok(*n),
        Some(Bson::Int64(n)) => i32::try_from(*n).map_err(|_| malformed()),
        Some(_) => Err(malformed()),
    }
}
