pub mod hourly;
pub mod records;

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{Collection, Schema, Session};

/// Store-backed tests run only when this points at a disposable deployment.
pub const TEST_URI_ENV: &str = "TSMONGO_TEST_URI";

pub const COL_NAME: &str = "col";
pub const TYPE1: &str = "type";

/// A randomly named database dropped again when the test finishes.
pub struct TestDb {
    pub session: Session,
    pub name: String,
}

impl TestDb {
    pub fn open() -> Self {
        let uri = std::env::var(TEST_URI_ENV)
            .unwrap_or_else(|_| panic!("{} must point at a disposable deployment", TEST_URI_ENV));
        let session = Session::dial(&uri).unwrap();
        Self {
            session,
            name: format!("tsmongo_test_{}", generate_random_string(10)),
        }
    }

    pub fn c(&self) -> Collection {
        self.session.c(&self.name, COL_NAME).unwrap()
    }

    pub fn c_with_schema(&self, schema: Schema) -> Collection {
        self.session.c_with_schema(&self.name, COL_NAME, schema).unwrap()
    }

    /// Raw documents of one series, bypassing the timeseries layer.
    pub fn raw(&self, schema: &Schema, field: &str) -> Vec<bson::Document> {
        self.session
            .client()
            .database(&self.name)
            .collection::<bson::Document>(COL_NAME)
            .find(schema.series_filter(field))
            .sort(schema.sort(false))
            .run()
            .unwrap()
            .map(|d| d.unwrap())
            .collect()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = self.session.client().database(&self.name).drop().run();
    }
}

/// A session whose server selection fails fast: nothing listens on port 1.
pub fn unreachable_session() -> Session {
    Session::dial("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200").unwrap()
}

/// A collection handle on `unreachable_session`, built without the index round trip.
pub fn unreachable_collection(session: &Session) -> Collection {
    let db = session.client().database("tsmongo_test");
    let inner = db.collection::<bson::Document>(COL_NAME);
    Collection::new(db, inner, Schema::exact())
}

pub fn ts(secs: i64, millis: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
}

/// Current time cut to the millisecond resolution BSON stores.
pub fn now_millis() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
}

fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
