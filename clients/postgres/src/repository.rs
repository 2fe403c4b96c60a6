//! Subject repository backed by a single `subjects` table.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;

use domain::{Subject, SubjectStore};

/// Runs the embedded migrations against `pool`.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;
    info!("database migrated");
    Ok(())
}

/// Stored form of a subject.
///
/// The interval keeps its full precision (`{"secs", "nanos"}`), so any
/// interval accepted by [`Subject::new`] reads back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SubjectPayload {
    telegram_user_id: i64,
    wallets: Vec<String>,
    check_interval: Duration,
}

impl From<&Subject> for SubjectPayload {
    fn from(subject: &Subject) -> Self {
        Self {
            telegram_user_id: subject.telegram_user_id,
            wallets: subject.wallets.clone(),
            check_interval: subject.check_interval,
        }
    }
}

impl TryFrom<SubjectPayload> for Subject {
    type Error = anyhow::Error;

    fn try_from(payload: SubjectPayload) -> Result<Self> {
        let subject = Subject::new(
            payload.telegram_user_id,
            payload.wallets,
            payload.check_interval,
        )?;
        Ok(subject)
    }
}

fn subject_from_row(row: &PgRow) -> Result<Subject> {
    let telegram_user_id: i64 = row.try_get("telegram_user_id")?;
    let Json(payload): Json<SubjectPayload> = row
        .try_get("payload")
        .with_context(|| format!("decode payload of subject {telegram_user_id}"))?;
    Subject::try_from(payload)
}

/// Repository for subject upserts and listing.
#[derive(Clone)]
pub struct SubjectRepository {
    pool: Arc<PgPool>,
}

impl SubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl SubjectStore for SubjectRepository {
    async fn get_all(&self) -> Result<Vec<Subject>> {
        let rows = sqlx::query("SELECT telegram_user_id, payload FROM subjects ORDER BY telegram_user_id")
            .fetch_all(self.pool.as_ref())
            .await
            .context("select subjects")?;
        rows.iter().map(subject_from_row).collect()
    }

    async fn add(&self, subject: &Subject) -> Result<()> {
        subject.validate()?;
        sqlx::query(
            r#"
            INSERT INTO subjects (telegram_user_id, payload)
            VALUES ($1, $2)
            ON CONFLICT (telegram_user_id) DO UPDATE SET
                payload = EXCLUDED.payload
            "#,
        )
        .bind(subject.telegram_user_id)
        .bind(Json(SubjectPayload::from(subject)))
        .execute(self.pool.as_ref())
        .await
        .context("upsert subject")?;
        Ok(())
    }
}
