use anyhow::Result;
use deadpool::managed::{self, Metrics, Pool, RecycleResult};
use libsql::{Connection, Database, Error as LibsqlError};

/// deadpool manager handing out libsql connections.
pub struct LibsqlManager {
    database: Database,
}

impl LibsqlManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl managed::Manager for LibsqlManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        self.database.connect()
    }

    async fn recycle(&self, conn: &mut Self::Type, _: &Metrics) -> RecycleResult<Self::Error> {
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }
}

pub type LibsqlPool = Pool<LibsqlManager>;

/// Open (or create) the local database at `path` and wrap it in a pool.
pub async fn connect_pool(path: &str) -> Result<LibsqlPool> {
    let database = libsql::Builder::new_local(path).build().await?;
    let pool = Pool::builder(LibsqlManager::new(database))
        .config(managed::PoolConfig::default())
        .build()?;
    Ok(pool)
}
