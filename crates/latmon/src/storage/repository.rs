use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Value, params};
use uuid::Uuid;

use super::models::{LatencySample, NewSample, SampleFilter, Target};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Datastore seen by the scheduler and the read path.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Every configured probing target.
    async fn list_targets(&self) -> Result<Vec<Target>>;

    /// Register a target address; returns the existing target if the
    /// address is already known.
    async fn insert_target(&self, address: &str) -> Result<Target>;

    /// Persist a batch of successful measurements in one bulk insert.
    async fn insert_samples(&self, samples: &[NewSample]) -> Result<()>;

    /// Samples matching the filter, ordered most-recent-first.
    async fn query_samples(&self, filter: &SampleFilter) -> Result<Vec<LatencySample>>;

    /// Delete samples created at or before the cutoff; returns the count.
    async fn delete_samples(&self, before: DateTime<Utc>) -> Result<u64>;
}

/// libsql-backed storage implementation.
pub struct LibsqlStorage {
    pool: LibsqlPool,
}

impl LibsqlStorage {
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Storage for LibsqlStorage {
    async fn list_targets(&self) -> Result<Vec<Target>> {
        let conn = self.get_conn().await?;
        let mut stmt =
            conn.prepare("SELECT id, address FROM targets ORDER BY created_at").await?;

        let mut rows = stmt.query(()).await?;
        let mut targets = Vec::new();

        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            targets.push(Target { id: Uuid::parse_str(&id)?, address: row.get(1)? });
        }

        Ok(targets)
    }

    async fn insert_target(&self, address: &str) -> Result<Target> {
        let conn = self.get_conn().await?;

        let mut rows = conn
            .query("SELECT id, address FROM targets WHERE address = ?", params![address])
            .await?;
        if let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            return Ok(Target { id: Uuid::parse_str(&id)?, address: row.get(1)? });
        }

        let target = Target { id: Uuid::new_v4(), address: address.to_string() };
        conn.execute(
            "INSERT INTO targets (id, address, created_at) VALUES (?, ?, ?)",
            params![target.id.to_string(), target.address.clone(), Utc::now().timestamp()],
        )
        .await?;

        Ok(target)
    }

    async fn insert_samples(&self, samples: &[NewSample]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let conn = self.get_conn().await?;
        let created_at = Utc::now().timestamp();

        let placeholders = vec!["(?, ?, ?, ?)"; samples.len()].join(", ");
        let sql = format!(
            "INSERT INTO latency_records (target_id, address, latency_ms, created_at) \
             VALUES {placeholders}"
        );

        let mut args: Vec<Value> = Vec::with_capacity(samples.len() * 4);
        for sample in samples {
            args.push(sample.target_id.to_string().into());
            args.push(sample.address.clone().into());
            args.push(sample.latency_ms.into());
            args.push(created_at.into());
        }

        conn.execute(&sql, args).await?;
        Ok(())
    }

    async fn query_samples(&self, filter: &SampleFilter) -> Result<Vec<LatencySample>> {
        let conn = self.get_conn().await?;

        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();
        if let Some(after) = filter.after {
            clauses.push("created_at >= ?");
            args.push(after.timestamp().into());
        }
        if let Some(before) = filter.before {
            clauses.push("created_at <= ?");
            args.push(before.timestamp().into());
        }
        if let Some(address) = &filter.address {
            clauses.push("address = ?");
            args.push(address.clone().into());
        }

        let mut sql = String::from(
            "SELECT id, target_id, address, latency_ms, created_at FROM latency_records",
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = conn.prepare(&sql).await?;
        let mut rows = stmt.query(args).await?;
        let mut samples = Vec::new();

        while let Some(row) = rows.next().await? {
            let target_id: String = row.get(1)?;
            let created_at: i64 = row.get(4)?;

            samples.push(LatencySample {
                id: Some(row.get(0)?),
                target_id: Uuid::parse_str(&target_id)?,
                address: row.get(2)?,
                latency_ms: row.get(3)?,
                created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
            });
        }

        Ok(samples)
    }

    async fn delete_samples(&self, before: DateTime<Utc>) -> Result<u64> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM latency_records WHERE created_at <= ?",
                params![before.timestamp()],
            )
            .await?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    /// On-disk fixture database with the schema applied.
    async fn test_storage() -> (LibsqlStorage, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = crate::pool::connect_pool(&db_path.to_string_lossy()).await.unwrap();

        let conn = pool.get().await.unwrap();
        crate::storage::initialize_database(&conn).await.unwrap();
        drop(conn);

        (LibsqlStorage::new_from_pool(pool), temp_dir)
    }

    fn new_sample(target: &Target, latency_ms: f64) -> NewSample {
        NewSample { target_id: target.id, address: target.address.clone(), latency_ms }
    }

    #[tokio::test]
    async fn insert_target_is_idempotent_per_address() {
        let (storage, _dir) = test_storage().await;

        let first = storage.insert_target("192.168.0.1").await.unwrap();
        let second = storage.insert_target("192.168.0.1").await.unwrap();
        storage.insert_target("192.168.0.2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(storage.list_targets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bulk_insert_then_query_round_trips() {
        let (storage, _dir) = test_storage().await;
        let target = storage.insert_target("1.1.1.1").await.unwrap();

        storage
            .insert_samples(&[new_sample(&target, 12.5), new_sample(&target, 31.0)])
            .await
            .unwrap();

        let samples = storage.query_samples(&SampleFilter::default()).await.unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.address == "1.1.1.1"));
        assert!(samples.iter().all(|s| s.target_id == target.id));
    }

    #[tokio::test]
    async fn query_orders_most_recent_first() {
        let (storage, _dir) = test_storage().await;
        let a = storage.insert_target("1.1.1.1").await.unwrap();
        let b = storage.insert_target("2.2.2.2").await.unwrap();

        storage.insert_samples(&[new_sample(&a, 10.0)]).await.unwrap();
        storage.insert_samples(&[new_sample(&b, 20.0)]).await.unwrap();

        // Same-second inserts fall back to id ordering, still latest-first.
        let samples = storage.query_samples(&SampleFilter::default()).await.unwrap();
        assert_eq!(samples[0].address, "2.2.2.2");
        assert_eq!(samples[1].address, "1.1.1.1");
    }

    #[tokio::test]
    async fn window_filter_bounds_are_inclusive() {
        let (storage, _dir) = test_storage().await;
        let target = storage.insert_target("1.1.1.1").await.unwrap();
        storage.insert_samples(&[new_sample(&target, 15.0)]).await.unwrap();

        let now = Utc::now();
        let hour = ChronoDuration::hours(1);

        let inside = SampleFilter {
            after: Some(now - hour),
            before: Some(now + hour),
            address: None,
        };
        assert_eq!(storage.query_samples(&inside).await.unwrap().len(), 1);

        let past = SampleFilter {
            after: Some(now - hour * 3),
            before: Some(now - hour * 2),
            address: None,
        };
        assert!(storage.query_samples(&past).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn address_filter_selects_one_group() {
        let (storage, _dir) = test_storage().await;
        let a = storage.insert_target("1.1.1.1").await.unwrap();
        let b = storage.insert_target("2.2.2.2").await.unwrap();
        storage
            .insert_samples(&[new_sample(&a, 10.0), new_sample(&b, 20.0)])
            .await
            .unwrap();

        let filter = SampleFilter { address: Some("2.2.2.2".into()), ..Default::default() };
        let samples = storage.query_samples(&filter).await.unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].latency_ms, 20.0);
    }

    #[tokio::test]
    async fn delete_before_cutoff_reports_count() {
        let (storage, _dir) = test_storage().await;
        let target = storage.insert_target("1.1.1.1").await.unwrap();
        storage
            .insert_samples(&[new_sample(&target, 10.0), new_sample(&target, 11.0)])
            .await
            .unwrap();

        let deleted = storage.delete_samples(Utc::now() + ChronoDuration::hours(1)).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(storage.query_samples(&SampleFilter::default()).await.unwrap().is_empty());

        let deleted_again =
            storage.delete_samples(Utc::now() + ChronoDuration::hours(1)).await.unwrap();
        assert_eq!(deleted_again, 0);
    }
}
