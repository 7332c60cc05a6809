use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::services::{MachineStore, OpdbMachine};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Machine {
    pub id: i64,
    pub opdb_id: String,
    pub name: String,
    pub year: Option<i32>,
    pub ipdb_id: Option<i32>,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub is_pinball: bool,
    pub is_group: bool,
    pub is_alias: bool,
    pub created_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

/// Column values written on every sync.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineRecord {
    pub opdb_id: String,
    pub name: String,
    pub year: Option<i32>,
    pub ipdb_id: Option<i32>,
    pub machine_type: String,
    pub is_pinball: bool,
    pub is_group: bool,
    pub is_alias: bool,
    pub last_synced_at: DateTime<Utc>,
}

impl MachineRecord {
    /// Keyed by the id that was asked for, not the one echoed by OPDB, so a
    /// lookup key never ends up with two rows.
    pub fn from_remote(opdb_id: &str, remote: OpdbMachine, synced_at: DateTime<Utc>) -> Self {
        Self {
            opdb_id: opdb_id.to_string(),
            name: remote.name,
            year: remote.year,
            ipdb_id: remote.ipdb_id,
            machine_type: remote.machine_type.unwrap_or_default(),
            is_pinball: remote.is_pinball,
            is_group: remote.is_group,
            is_alias: remote.is_alias,
            last_synced_at: synced_at,
        }
    }
}

const MACHINE_COLUMNS: &str = "id, opdb_id, name, year, ipdb_id, machine_type, is_pinball, \
                               is_group, is_alias, created_at, last_synced_at";

/// Postgres-backed machine table.
#[derive(Debug, Clone)]
pub struct PgMachineStore {
    pool: PgPool,
}

impl PgMachineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MachineStore for PgMachineStore {
    async fn find(&self, opdb_id: &str) -> Result<Option<Machine>, sqlx::Error> {
        sqlx::query_as::<_, Machine>(&format!(
            "SELECT {MACHINE_COLUMNS} FROM machines WHERE opdb_id = $1"
        ))
        .bind(opdb_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn upsert(&self, record: &MachineRecord) -> Result<Machine, sqlx::Error> {
        sqlx::query_as::<_, Machine>(&format!(
            r#"
            INSERT INTO machines (
                opdb_id, name, year, ipdb_id, machine_type,
                is_pinball, is_group, is_alias, last_synced_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (opdb_id) DO UPDATE SET
                name = EXCLUDED.name,
                year = EXCLUDED.year,
                ipdb_id = EXCLUDED.ipdb_id,
                machine_type = EXCLUDED.machine_type,
                is_pinball = EXCLUDED.is_pinball,
                is_group = EXCLUDED.is_group,
                is_alias = EXCLUDED.is_alias,
                last_synced_at = EXCLUDED.last_synced_at
            RETURNING {MACHINE_COLUMNS}
            "#
        ))
        .bind(&record.opdb_id)
        .bind(&record.name)
        .bind(record.year)
        .bind(record.ipdb_id)
        .bind(&record.machine_type)
        .bind(record.is_pinball)
        .bind(record.is_group)
        .bind(record.is_alias)
        .bind(record.last_synced_at)
        .fetch_one(&self.pool)
        .await
    }
}
