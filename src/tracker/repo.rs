use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::journal::FoodEntry;

/// A persisted row of the nutrition log. The schema has no unit column, so
/// every reload falls back to grams (see DESIGN.md).
#[derive(Debug, Clone, FromRow)]
pub struct LogRow {
    pub id: Uuid,
    pub food_item: String,
    pub amount: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub date: OffsetDateTime,
}

impl LogRow {
    /// Calendar date the row belongs to, in UTC.
    pub fn day(&self) -> Date {
        self.date.date()
    }

    pub fn into_entry(self) -> FoodEntry {
        FoodEntry {
            id: self.id,
            name: self.food_item,
            amount: self.amount.trim().parse().unwrap_or(0.0),
            unit: "g".to_string(),
            calories: self.calories,
            protein: Some(self.protein),
            carbs: Some(self.carbs),
            fat: Some(self.fat),
            timestamp: self.date,
        }
    }
}

pub struct NewLogRow<'a> {
    pub food_item: &'a str,
    pub amount: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub date: OffsetDateTime,
}

pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<LogRow>> {
    sqlx::query_as::<_, LogRow>(
        r#"
        SELECT id, food_item, amount, calories, protein, carbs, fat, date
        FROM nutrition_log
        ORDER BY date DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn insert(db: &PgPool, row: NewLogRow<'_>) -> sqlx::Result<LogRow> {
    sqlx::query_as::<_, LogRow>(
        r#"
        INSERT INTO nutrition_log (food_item, amount, calories, protein, carbs, fat, date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, food_item, amount, calories, protein, carbs, fat, date
        "#,
    )
    .bind(row.food_item)
    .bind(row.amount.to_string())
    .bind(row.calories)
    .bind(row.protein)
    .bind(row.carbs)
    .bind(row.fat)
    .bind(row.date)
    .fetch_one(db)
    .await
}

pub async fn delete_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM nutrition_log WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row(amount: &str) -> LogRow {
        LogRow {
            id: Uuid::new_v4(),
            food_item: "chicken breast".to_string(),
            amount: amount.to_string(),
            calories: 330.0,
            protein: 62.0,
            carbs: 0.0,
            fat: 7.0,
            date: datetime!(2024-05-01 18:30 UTC),
        }
    }

    #[test]
    fn into_entry_defaults_the_unit() {
        let entry = row("200").into_entry();
        assert_eq!(entry.unit, "g");
        assert_eq!(entry.amount, 200.0);
        assert_eq!(entry.calories, 330.0);
        assert_eq!(entry.protein, Some(62.0));
    }

    #[test]
    fn into_entry_tolerates_unparsable_amounts() {
        let entry = row("about two").into_entry();
        assert_eq!(entry.amount, 0.0);
    }

    #[test]
    fn day_is_the_utc_calendar_date() {
        let r = row("150.5");
        assert_eq!(r.day(), time::macros::date!(2024 - 05 - 01));
        assert_eq!(r.into_entry().amount, 150.5);
    }
}
