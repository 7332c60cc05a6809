use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, types::Json};

/// Points per finishing position, keyed by group size ("3", "4", ...).
pub type PointDistribution = BTreeMap<String, Vec<i32>>;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: i64,
    pub name: String,
    pub date_created: DateTime<Utc>,
    #[serde(rename = "leagueID")]
    pub league_id: i64,
    pub counting_games: i32,
    pub event_count: i32,
    pub has_finals: bool,
    #[sqlx(json)]
    pub point_distribution: PointDistribution,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeasonRequest {
    pub name: String,
    pub counting_games: i32,
    #[serde(default)]
    pub has_finals: bool,
    #[serde(default)]
    pub point_distribution: PointDistribution,
}

const SEASON_COLUMNS: &str = "id, name, date_created, league_id, counting_games, event_count, \
                              has_finals, point_distribution, created_at, updated_at";

impl Season {
    pub async fn create(
        pool: &PgPool,
        league_id: i64,
        req: &CreateSeasonRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            r#"
            INSERT INTO seasons (name, league_id, counting_games, event_count, has_finals, point_distribution)
            VALUES ($1, $2, $3, 0, $4, $5)
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(req.name.trim())
        .bind(league_id)
        .bind(req.counting_games)
        .bind(req.has_finals)
        .bind(Json(&req.point_distribution))
        .fetch_one(pool)
        .await
    }

    pub async fn list_for_league(pool: &PgPool, league_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE league_id = $1 ORDER BY id"
        ))
        .bind(league_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_in_league(
        pool: &PgPool,
        league_id: i64,
        season_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE id = $1 AND league_id = $2"
        ))
        .bind(season_id)
        .bind(league_id)
        .fetch_optional(pool)
        .await
    }
}
