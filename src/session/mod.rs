//! Connections to a timeseries mongo database

use bson::Document;
use mongodb::options::ClientOptions;
use mongodb::sync::{Client, Collection as MongoCollection};

use crate::collection::Collection;
use crate::errors::{Error, Result};
use crate::schema::Schema;

mod config;

pub use config::{SessionConfig, URI_ENV};

/// A connection to a mongo deployment holding timeseries collections.
///
/// The driver client is pooled and internally synchronized; this type adds no
/// locking of its own.
#[derive(Clone, Debug)]
pub struct Session {
    client: Client,
}

impl Session {
    /// Wraps an already configured driver client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sets up a connection to the deployment named by `uri`.
    pub fn dial(uri: &str) -> Result<Self> {
        Self::dial_with_config(&SessionConfig::new(uri))
    }

    /// Malformed URIs are rejected before any connection is attempted.
    pub fn dial_with_config(config: &SessionConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .run()
            .map_err(|source| Error::InvalidUri {
                uri: config.uri.clone(),
                source,
            })?;

        if options.app_name.is_none() {
            options.app_name = config.app_name.clone();
        }
        if options.connect_timeout.is_none() {
            options.connect_timeout = config.connect_timeout;
        }
        if options.server_selection_timeout.is_none() {
            options.server_selection_timeout = config.server_selection_timeout;
        }

        log::debug!("Dialing {:?} (default database: {:?})", options.hosts, options.default_database);
        let client = Client::with_options(options).map_err(Error::Connect)?;
        Ok(Self::new(client))
    }

    /// A new session over the same deployment, keeping credentials and
    /// session options of `self`.
    pub fn copy(&self) -> Self {
        Self::new(self.client.clone())
    }

    /// Database named in the connection string, if any.
    pub fn default_database(&self) -> Option<String> {
        self.client.default_database().map(|db| db.name().to_string())
    }

    /// Timeseries collection `db.coll` with exact timestamps.
    pub fn c(&self, db: &str, coll: &str) -> Result<Collection> {
        self.c_with_schema(db, coll, Schema::exact())
    }

    /// Timeseries collection `coll` in the connection string's database.
    pub fn c_default(&self, coll: &str) -> Result<Collection> {
        let db = self.default_database().ok_or(Error::NoDefaultDatabase)?;
        self.c(&db, coll)
    }

    /// Timeseries collection `db.coll` laid out by `schema`.
    ///
    /// Creates the unique `(type, timestamp)` index when it is missing; an
    /// existing identical index is left untouched.
    pub fn c_with_schema(&self, db: &str, coll: &str, schema: Schema) -> Result<Collection> {
        let database = self.client.database(db);
        let inner: MongoCollection<Document> = database.collection(coll);

        inner
            .create_index(schema.index_model())
            .run()
            .map_err(|source| Error::Index {
                namespace: format!("{}.{}", db, coll),
                source,
            })?;
        log::debug!("Ensured index {} on {}.{}", schema.index_name(), db, coll);

        Ok(Collection::new(database, inner, schema))
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Releases this session's handle on the connection pool. The pool itself
    /// closes once every copy has been closed or dropped.
    pub fn close(self) {
        log::debug!("Closing timeseries session");
        drop(self.client);
    }
}
