use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub name: String,
    #[serde(rename = "leagueID")]
    pub league_id: i64,
    pub ifpa_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayersByIfpaRequest {
    pub ifpa_numbers: Vec<i64>,
}

impl AddPlayersByIfpaRequest {
    /// Positive numbers in request order, duplicates removed.
    pub fn numbers(&self) -> Result<Vec<i64>, i64> {
        let mut seen = Vec::with_capacity(self.ifpa_numbers.len());
        for &number in &self.ifpa_numbers {
            if number <= 0 {
                return Err(number);
            }
            if !seen.contains(&number) {
                seen.push(number);
            }
        }
        Ok(seen)
    }
}

const PLAYER_COLUMNS: &str = "id, name, league_id, ifpa_number, created_at, updated_at";

impl Player {
    pub async fn list_for_league(pool: &PgPool, league_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Player>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE league_id = $1 ORDER BY name, id"
        ))
        .bind(league_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_ifpa(
        pool: &PgPool,
        league_id: i64,
        ifpa_number: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Player>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE league_id = $1 AND ifpa_number = $2"
        ))
        .bind(league_id)
        .bind(ifpa_number.to_string())
        .fetch_optional(pool)
        .await
    }

    /// Inserts the player, or returns the row another request stored first.
    pub async fn insert_ifpa(
        pool: &PgPool,
        league_id: i64,
        ifpa_number: i64,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Player>(&format!(
            r#"
            INSERT INTO players (name, league_id, ifpa_number)
            VALUES ($1, $2, $3)
            ON CONFLICT (league_id, ifpa_number)
            DO UPDATE SET updated_at = players.updated_at
            RETURNING {PLAYER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(league_id)
        .bind(ifpa_number.to_string())
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(numbers: &[i64]) -> AddPlayersByIfpaRequest {
        AddPlayersByIfpaRequest {
            ifpa_numbers: numbers.to_vec(),
        }
    }

    #[test]
    fn duplicate_numbers_collapse_in_order() {
        assert_eq!(request(&[8, 3, 8, 12, 3]).numbers(), Ok(vec![8, 3, 12]));
    }

    #[test]
    fn non_positive_numbers_are_reported() {
        assert_eq!(request(&[5, 0, 7]).numbers(), Err(0));
        assert_eq!(request(&[-4]).numbers(), Err(-4));
    }

    #[test]
    fn request_uses_camel_case() {
        let req: AddPlayersByIfpaRequest =
            serde_json::from_str(r#"{"ifpaNumbers":[1234,5678]}"#).unwrap();
        assert_eq!(req.ifpa_numbers, vec![1234, 5678]);
    }
}
