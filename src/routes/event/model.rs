use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeedingMethod {
    #[default]
    Average,
    Rank,
    Random,
    IfpaRank,
}

impl SeedingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedingMethod::Average => "AVERAGE",
            SeedingMethod::Rank => "RANK",
            SeedingMethod::Random => "RANDOM",
            SeedingMethod::IfpaRank => "IFPA_RANK",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupOrdering {
    #[default]
    Seeded,
    Random,
}

impl GroupOrdering {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupOrdering::Seeded => "SEEDED",
            GroupOrdering::Random => "RANDOM",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "seasonID")]
    pub season_id: i64,
    pub is_finals: bool,
    pub is_complete: bool,
    pub has_winners_group: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub seeding_method: String,
    pub group_ordering: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    /// RFC 3339 timestamp.
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_finals: bool,
    #[serde(default)]
    pub has_winners_group: bool,
    #[serde(default)]
    pub seeding_method: SeedingMethod,
    #[serde(default)]
    pub group_ordering: GroupOrdering,
}

const EVENT_COLUMNS: &str = "id, name, date, season_id, is_finals, is_complete, has_winners_group, \
                             completed_at, seeding_method, group_ordering, created_at, updated_at";

impl Event {
    /// Inserts the event and bumps the season's event count in one transaction.
    pub async fn create(
        pool: &PgPool,
        season_id: i64,
        req: &CreateEventRequest,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                name, date, season_id, is_finals, is_complete,
                has_winners_group, seeding_method, group_ordering
            )
            VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(req.name.trim())
        .bind(req.date)
        .bind(season_id)
        .bind(req.is_finals)
        .bind(req.has_winners_group)
        .bind(req.seeding_method.as_str())
        .bind(req.group_ordering.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE seasons SET event_count = event_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(season_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    pub async fn list_for_season(pool: &PgPool, season_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE season_id = $1 ORDER BY date, id"
        ))
        .bind(season_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_in_season(
        pool: &PgPool,
        season_id: i64,
        event_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND season_id = $2"
        ))
        .bind(event_id)
        .bind(season_id)
        .fetch_optional(pool)
        .await
    }
}
