//! Timeseries records stored in MongoDB.
//!
//! A record is a `(timestamp, value)` pair filed under a series tag. Each
//! collection carries a unique index on `(type, timestamp)`, so writing a record
//! twice for the same instant replaces the earlier value.
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use tsmongo::{Record, Session};
//!
//! # fn main() -> tsmongo::Result<()> {
//! let session = Session::dial("mongodb://localhost:27017/metrics")?;
//! let cpu = session.c_default("samples")?;
//!
//! let t1 = Utc::now();
//! let t2 = t1 + Duration::seconds(10);
//! cpu.upsert("cpu", &[Record::new(t1, 1), Record::new(t2, 2)])?;
//!
//! let last: Record<i32> = cpu.last("cpu")?;
//! assert_eq!(last.value, 2);
//!
//! let records: Vec<Record<i32>> = cpu.interval("cpu", t1, t2)?;
//! assert_eq!(records.len(), 2);
//! session.close();
//! # Ok(())
//! # }
//! ```

mod collection;
mod errors;
mod record;
mod schema;
mod session;

#[cfg(test)]
mod tests;

pub use bson::Bson;
pub use collection::Collection;
pub use errors::{Error, Result, WriteConcernFailure, WriteFailure};
pub use record::{Record, UpsertResult, sort_inverse_chronological};
pub use schema::{Precision, Schema, truncate_to_hour};
pub use session::{Session, SessionConfig, URI_ENV};
