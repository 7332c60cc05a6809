use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::user::UserProfile;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub date_created: DateTime<Utc>,
    #[serde(rename = "ownerID")]
    pub owner_id: i64,
    pub owner: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// League joined with its owner's public columns.
#[derive(Debug, FromRow)]
struct LeagueRow {
    id: i64,
    name: String,
    location: String,
    date_created: DateTime<Utc>,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_email: String,
    owner_first_name: String,
    owner_last_name: String,
}

impl From<LeagueRow> for League {
    fn from(row: LeagueRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            location: row.location,
            date_created: row.date_created,
            owner_id: row.owner_id,
            owner: UserProfile {
                id: row.owner_id,
                email: row.owner_email,
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLeagueRequest {
    pub name: String,
    pub location: String,
}

const LEAGUE_SELECT: &str = r#"
    SELECT l.id, l.name, l.location, l.date_created, l.owner_id, l.created_at, l.updated_at,
           u.email AS owner_email, u.first_name AS owner_first_name, u.last_name AS owner_last_name
    FROM leagues l
    JOIN users u ON u.id = l.owner_id
"#;

impl League {
    pub async fn create(
        pool: &PgPool,
        req: &CreateLeagueRequest,
        owner_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO leagues (name, location, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(req.name.trim())
        .bind(req.location.trim())
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LeagueRow>(&format!("{LEAGUE_SELECT} ORDER BY l.id"))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(League::from).collect())
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, LeagueRow>(&format!("{LEAGUE_SELECT} WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(League::from))
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM leagues WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
