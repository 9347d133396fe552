//! MongoDB-backed [`UserStore`], enabled by the `mongodb` cargo feature.

use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use sm_domain::config::MongoConfig;
use sm_domain::error::{Error, Result};

use crate::users::{UserAccount, UserStore};

/// Server error code for a unique-index violation.
const DUPLICATE_KEY: i32 = 11000;

pub struct MongoUserStore {
    users: Collection<UserAccount>,
}

impl MongoUserStore {
    /// Connect and ensure the unique index on `username` exists.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| Error::Persistence(format!("connecting to mongodb: {e}")))?;
        let users = client
            .database(&config.database)
            .collection::<UserAccount>(&config.collection);

        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users
            .create_index(index, None)
            .await
            .map_err(|e| Error::Persistence(format!("creating username index: {e}")))?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "mongodb user store connected"
        );
        Ok(Self { users })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait::async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        self.users
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    async fn insert(&self, account: UserAccount) -> Result<()> {
        let username = account.username.clone();
        match self.users.insert_one(account, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(Error::DuplicateUsername(username)),
            Err(e) => Err(Error::Persistence(e.to_string())),
        }
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
