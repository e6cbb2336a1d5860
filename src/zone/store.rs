//! Transactional store for domains and records
//!
//! Every mutation runs inside a single transaction so a concurrent reader
//! never observes a record change without its serial bump, or a domain
//! without its SOA. Uniqueness is enforced by the schema's UNIQUE
//! constraints; any in-application existence check is an advisory fast path
//! only.

use crate::config::ZoneConfig;
use crate::error::{Result, ZoneError};
use crate::model::{Domain, NewRecord, Record, RecordPatch, RecordType};
use crate::policy::RecordPolicy;
use crate::zone::soa::SoaContent;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Store for managing domains and their records
pub struct ZoneStore {
    pool: Pool<Sqlite>,
    config: ZoneConfig,
    policy: RecordPolicy,
}

impl ZoneStore {
    /// Open the database and run migrations
    pub async fn connect(config: &ZoneConfig) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Avoid transient "database is locked" errors under concurrent access
            .busy_timeout(Duration::from_secs(5));

        // SQLite permits limited write concurrency; a single connection keeps
        // transactions serialized.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            config: config.clone(),
            policy: config.record_policy(),
        };
        store.migrate().await?;

        Ok(store)
    }

    /// Create the schema. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS domains (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                type TEXT NOT NULL,
                ttl INTEGER NOT NULL,
                priority INTEGER,
                UNIQUE (domain_id, name, type)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_domain ON records(domain_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create a new domain together with its SOA record (serial 1)
    pub async fn create_domain(&self, name: &str) -> Result<Domain> {
        let mut tx = self.pool.begin().await?;

        let id = match sqlx::query("INSERT INTO domains (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await
        {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ZoneError::Conflict(format!("domain {}", name)));
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query(
            "INSERT INTO records (domain_id, name, content, type, ttl, priority)
             VALUES (?1, ?2, ?3, 'SOA', ?4, NULL)",
        )
        .bind(id)
        .bind(name)
        .bind(self.config.initial_soa_content())
        .bind(self.config.soa_ttl)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(domain = name, id, "domain created");

        Ok(Domain {
            id,
            name: name.to_string(),
        })
    }

    /// Delete a domain and all its records
    pub async fn delete_domain(&self, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM records WHERE domain_id = (SELECT id FROM domains WHERE name = ?1)",
        )
        .bind(name)
        .execute(&mut *tx)
        .await?;

        // Existence is decided by the delete's affected-row count, not a
        // prior read, so a concurrent delete cannot slip between check and
        // write.
        let done = sqlx::query("DELETE FROM domains WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(ZoneError::NotFound(format!("domain {}", name)));
        }

        tx.commit().await?;
        info!(domain = name, "domain deleted");
        Ok(())
    }

    /// Snapshot of all registered domains. Namespace visibility filtering is
    /// the API layer's responsibility.
    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM domains ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Domain { id, name })
            .collect())
    }

    /// All records of a domain, annotated with whether the caller may edit
    /// them
    pub async fn list_records(&self, domain: &str) -> Result<Vec<Record>> {
        let mut tx = self.pool.begin().await?;
        let domain_id = Self::domain_id(&mut tx, domain).await?;

        let rows = sqlx::query_as::<_, (i64, String, String, String, u32, Option<u32>)>(
            "SELECT id, name, content, type, ttl, priority FROM records
             WHERE domain_id = ?1 ORDER BY id",
        )
        .bind(domain_id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, content, rtype, ttl, priority)| {
                let can_edit = RecordType::from_name(&rtype)
                    .map(|t| !self.policy.is_locked(t))
                    .unwrap_or(false);
                Record {
                    id,
                    domain: domain.to_string(),
                    name,
                    content,
                    rtype,
                    ttl,
                    priority,
                    can_edit,
                }
            })
            .collect())
    }

    /// Create a record and bump the zone serial in one transaction
    pub async fn create_record(&self, domain: &str, new: &NewRecord) -> Result<Record> {
        let mut tx = self.pool.begin().await?;
        let domain_id = Self::domain_id(&mut tx, domain).await?;

        if new.name != domain && !new.name.ends_with(&format!(".{}", domain)) {
            return Err(ZoneError::InvalidInput(
                "record name must be part of the domain".to_string(),
            ));
        }

        let rtype = RecordType::from_name(&new.rtype)
            .filter(|t| self.policy.can_create(*t))
            .ok_or_else(|| {
                ZoneError::PolicyViolation(format!(
                    "record type is not allowed (must be one of {})",
                    self.policy.allowed_names().join(", ")
                ))
            })?;

        // Advisory fast path; the UNIQUE constraint below is authoritative.
        let existing = sqlx::query_as::<_, (i64,)>(
            "SELECT id FROM records WHERE domain_id = ?1 AND name = ?2 AND type = ?3",
        )
        .bind(domain_id)
        .bind(&new.name)
        .bind(rtype.name())
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((id,)) = existing {
            return Err(ZoneError::Conflict(format!("record {}", id)));
        }

        let ttl = new.ttl.unwrap_or(self.config.default_ttl);
        let id = match sqlx::query(
            "INSERT INTO records (domain_id, name, content, type, ttl, priority)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(domain_id)
        .bind(&new.name)
        .bind(&new.content)
        .bind(rtype.name())
        .bind(ttl)
        .bind(new.priority)
        .execute(&mut *tx)
        .await
        {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(ZoneError::Conflict("record".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.bump_serial(&mut tx, domain_id).await?;
        tx.commit().await?;
        debug!(domain, record = id, rtype = rtype.name(), "record created");

        Ok(Record {
            id,
            domain: domain.to_string(),
            name: new.name.clone(),
            content: new.content.clone(),
            rtype: rtype.name().to_string(),
            ttl,
            priority: new.priority,
            can_edit: !self.policy.is_locked(rtype),
        })
    }

    /// Apply a partial update to a record and bump the zone serial.
    ///
    /// Provided fields overwrite the stored values, including explicit
    /// empty/zero values; absent fields are left unchanged. An explicit null
    /// priority clears it.
    pub async fn update_record(
        &self,
        domain: &str,
        record_id: i64,
        patch: &RecordPatch,
    ) -> Result<Record> {
        let mut tx = self.pool.begin().await?;
        let domain_id = Self::domain_id(&mut tx, domain).await?;

        let row = sqlx::query_as::<_, (String, String, String, u32, Option<u32>)>(
            "SELECT name, content, type, ttl, priority FROM records
             WHERE domain_id = ?1 AND id = ?2",
        )
        .bind(domain_id)
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (name, content, rtype, ttl, priority) =
            row.ok_or_else(|| ZoneError::NotFound(format!("record {}", record_id)))?;

        self.ensure_unlocked(&rtype, "edited")?;

        let content = patch.content.clone().unwrap_or(content);
        let ttl = patch.ttl.unwrap_or(ttl);
        let priority = match patch.priority {
            Some(p) => p,
            None => priority,
        };

        sqlx::query("UPDATE records SET content = ?1, ttl = ?2, priority = ?3 WHERE id = ?4")
            .bind(&content)
            .bind(ttl)
            .bind(priority)
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        self.bump_serial(&mut tx, domain_id).await?;
        tx.commit().await?;
        debug!(domain, record = record_id, "record updated");

        Ok(Record {
            id: record_id,
            domain: domain.to_string(),
            name,
            content,
            rtype,
            ttl,
            priority,
            can_edit: true,
        })
    }

    /// Delete a record and bump the zone serial
    pub async fn delete_record(&self, domain: &str, record_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let domain_id = Self::domain_id(&mut tx, domain).await?;

        let row = sqlx::query_as::<_, (String,)>(
            "SELECT type FROM records WHERE domain_id = ?1 AND id = ?2",
        )
        .bind(domain_id)
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (rtype,) = row.ok_or_else(|| ZoneError::NotFound(format!("record {}", record_id)))?;

        self.ensure_unlocked(&rtype, "deleted")?;

        sqlx::query("DELETE FROM records WHERE id = ?1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        self.bump_serial(&mut tx, domain_id).await?;
        tx.commit().await?;
        debug!(domain, record = record_id, "record deleted");
        Ok(())
    }

    /// Increment the domain's SOA serial inside the caller's transaction
    async fn bump_serial(&self, tx: &mut Transaction<'_, Sqlite>, domain_id: i64) -> Result<()> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, content FROM records WHERE domain_id = ?1 AND type = 'SOA'",
        )
        .bind(domain_id)
        .fetch_optional(&mut **tx)
        .await?;
        let (soa_id, content) = row.ok_or_else(|| {
            ZoneError::CorruptState(format!("domain {} has no SOA record", domain_id))
        })?;

        let mut soa = SoaContent::parse(&content)?;
        soa.bump();

        sqlx::query("UPDATE records SET content = ?1 WHERE id = ?2")
            .bind(soa.to_string())
            .bind(soa_id)
            .execute(&mut **tx)
            .await?;

        debug!(domain_id, serial = soa.serial, "zone serial bumped");
        Ok(())
    }

    async fn domain_id(tx: &mut Transaction<'_, Sqlite>, name: &str) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT id FROM domains WHERE name = ?1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?;
        row.map(|(id,)| id)
            .ok_or_else(|| ZoneError::NotFound(format!("domain {}", name)))
    }

    fn ensure_unlocked(&self, rtype: &str, action: &str) -> Result<()> {
        let parsed = RecordType::from_name(rtype).ok_or_else(|| {
            ZoneError::CorruptState(format!("unrecognized record type: {}", rtype))
        })?;
        if self.policy.is_locked(parsed) {
            return Err(ZoneError::PolicyViolation(format!(
                "record cannot be {}",
                action
            )));
        }
        Ok(())
    }
}
