use time::{Date, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::config::GoalDefaults;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{KvStore, JOURNAL_KEY};

use super::dto::NewEntryRequest;
use super::journal::{DayLog, FoodEntry, Journal};
use super::repo::{self, LogRow, NewLogRow};

/// The aggregation model plus its loading flag. Lives behind a write lock in
/// the shared state, so mutations against the day collection are serialized.
pub struct Tracker {
    pub journal: Journal,
    pub is_loading: bool,
}

impl Tracker {
    pub fn new(current_date: Date, defaults: GoalDefaults) -> Self {
        Self {
            journal: Journal::new(current_date, defaults),
            is_loading: true,
        }
    }
}

/// Fetch the full nutrition log and rebuild the in-memory journal. On a
/// remote failure the journal is repopulated best-effort from the local
/// snapshot and the load error is still reported to the caller.
pub async fn load(state: &AppState) -> Result<(), AppError> {
    {
        state.tracker.write().await.is_loading = true;
    }
    let result = repo::list_all(&state.db).await;
    apply_load_result(state, result).await
}

pub(crate) async fn apply_load_result(
    state: &AppState,
    result: sqlx::Result<Vec<LogRow>>,
) -> Result<(), AppError> {
    let mut tracker = state.tracker.write().await;
    let outcome = match result {
        Ok(rows) => {
            let entries = rows.into_iter().map(|r| (r.day(), r.into_entry())).collect();
            tracker.journal.rebuild(entries);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "loading the nutrition log failed, falling back to the local snapshot");
            restore_from_snapshot(&mut tracker.journal, state.store.as_ref()).await;
            Err(AppError::Load(e))
        }
    };
    tracker.is_loading = false;
    outcome
}

async fn restore_from_snapshot(journal: &mut Journal, store: &dyn KvStore) {
    match store.get(JOURNAL_KEY).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<DayLog>>(&raw) {
            Ok(days) => journal.restore(days),
            Err(e) => warn!(error = %e, "local snapshot is unreadable, starting empty"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "local snapshot read failed"),
    }
}

/// Two-phase add: the row is committed remotely first; the journal only
/// changes once the insert confirms.
pub async fn add_entry(state: &AppState, req: NewEntryRequest) -> Result<FoodEntry, AppError> {
    let now = OffsetDateTime::now_utc();
    let row = repo::insert(
        &state.db,
        NewLogRow {
            food_item: &req.name,
            amount: req.amount,
            calories: req.calories,
            protein: req.protein.unwrap_or(0.0),
            carbs: req.carbs.unwrap_or(0.0),
            fat: req.fat.unwrap_or(0.0),
            date: now,
        },
    )
    .await
    .map_err(AppError::Add)?;

    let mut tracker = state.tracker.write().await;
    let entry = FoodEntry {
        id: row.id,
        name: req.name,
        amount: req.amount,
        unit: req.unit,
        calories: req.calories,
        protein: Some(req.protein.unwrap_or(0.0)),
        carbs: Some(req.carbs.unwrap_or(0.0)),
        fat: Some(req.fat.unwrap_or(0.0)),
        timestamp: now,
    };
    tracker.journal.add_entry(entry.clone());
    mirror_snapshot(state, &tracker.journal).await;
    Ok(entry)
}

/// Two-phase remove: remote delete first, then the local bucket. An id the
/// journal does not know is a no-op after the remote delete.
pub async fn remove_entry(state: &AppState, id: Uuid) -> Result<(), AppError> {
    repo::delete_by_id(&state.db, id)
        .await
        .map_err(AppError::Remove)?;

    let mut tracker = state.tracker.write().await;
    tracker.journal.remove_entry(id);
    mirror_snapshot(state, &tracker.journal).await;
    Ok(())
}

/// Local-only: goals never touch the remote log.
pub async fn set_calorie_goal(state: &AppState, goal: i32) -> Result<DayLog, AppError> {
    let mut tracker = state.tracker.write().await;
    tracker.journal.set_calorie_goal(goal)?;
    mirror_snapshot(state, &tracker.journal).await;
    Ok(tracker.journal.current())
}

pub async fn set_macro_goals(
    state: &AppState,
    protein: i32,
    carbs: i32,
    fat: i32,
) -> Result<DayLog, AppError> {
    let mut tracker = state.tracker.write().await;
    tracker.journal.set_macro_goals(protein, carbs, fat)?;
    mirror_snapshot(state, &tracker.journal).await;
    Ok(tracker.journal.current())
}

pub async fn set_current_date(state: &AppState, date: Date) -> DayLog {
    let mut tracker = state.tracker.write().await;
    tracker.journal.set_current_date(date);
    tracker.journal.current()
}

/// Mirror the day collection into the local store. Best effort: failures are
/// logged and the mutation that triggered the mirror still succeeds. An
/// empty collection is never written, matching the original behavior.
async fn mirror_snapshot(state: &AppState, journal: &Journal) {
    if journal.is_empty() {
        return;
    }
    match serde_json::to_string(journal.days()) {
        Ok(raw) => {
            if let Err(e) = state.store.put(JOURNAL_KEY, &raw).await {
                warn!(error = %e, "mirroring the journal snapshot failed");
            }
        }
        Err(e) => warn!(error = %e, "serializing the journal snapshot failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn snapshot_day() -> DayLog {
        let mut journal = Journal::new(date!(2024 - 04 - 30), GoalDefaults::default());
        journal.add_entry(FoodEntry {
            id: Uuid::new_v4(),
            name: "lasagna".to_string(),
            amount: 250.0,
            unit: "g".to_string(),
            calories: 500.0,
            protein: Some(22.0),
            carbs: Some(45.0),
            fat: Some(25.0),
            timestamp: datetime!(2024-04-30 19:00 UTC),
        });
        journal.current()
    }

    #[tokio::test]
    async fn failed_load_falls_back_to_snapshot() {
        let state = AppState::fake();
        let raw = serde_json::to_string(&vec![snapshot_day()]).expect("serialize snapshot");
        state.store.put(JOURNAL_KEY, &raw).await.expect("seed store");

        let result = apply_load_result(&state, Err(sqlx::Error::PoolTimedOut)).await;
        assert!(matches!(result, Err(AppError::Load(_))));

        let tracker = state.tracker.read().await;
        assert!(!tracker.is_loading);
        let day = tracker.journal.day(date!(2024 - 04 - 30));
        assert_eq!(day.total_calories, 500.0);
        assert_eq!(day.entries.len(), 1);
    }

    #[tokio::test]
    async fn failed_load_with_unreadable_snapshot_starts_empty() {
        let state = AppState::fake();
        state
            .store
            .put(JOURNAL_KEY, "{not json")
            .await
            .expect("seed store");

        let result = apply_load_result(&state, Err(sqlx::Error::PoolTimedOut)).await;
        assert!(result.is_err());

        let tracker = state.tracker.read().await;
        assert!(!tracker.is_loading);
        assert!(tracker.journal.is_empty());
    }

    #[tokio::test]
    async fn successful_load_rebuilds_from_rows() {
        let state = AppState::fake();
        let rows = vec![LogRow {
            id: Uuid::new_v4(),
            food_item: "chicken breast".to_string(),
            amount: "200".to_string(),
            calories: 330.0,
            protein: 62.0,
            carbs: 0.0,
            fat: 7.0,
            date: datetime!(2024-05-01 13:00 UTC),
        }];

        apply_load_result(&state, Ok(rows)).await.expect("load");

        let tracker = state.tracker.read().await;
        assert!(!tracker.is_loading);
        let day = tracker.journal.day(date!(2024 - 05 - 01));
        assert_eq!(day.total_calories, 330.0);
        assert_eq!(day.total_protein, 62.0);
        assert_eq!(day.entries[0].unit, "g");
    }

    #[tokio::test]
    async fn mirror_skips_an_empty_collection() {
        let state = AppState::fake();
        {
            let tracker = state.tracker.read().await;
            mirror_snapshot(&state, &tracker.journal).await;
        }
        let stored = state.store.get(JOURNAL_KEY).await.expect("get");
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn mirror_writes_a_restorable_snapshot() {
        let state = AppState::fake();
        {
            let mut tracker = state.tracker.write().await;
            tracker.journal.set_current_date(date!(2024 - 04 - 30));
            tracker
                .journal
                .set_calorie_goal(1750)
                .expect("valid goal");
            mirror_snapshot(&state, &tracker.journal).await;
        }

        let raw = state
            .store
            .get(JOURNAL_KEY)
            .await
            .expect("get")
            .expect("snapshot written");
        let days: Vec<DayLog> = serde_json::from_str(&raw).expect("snapshot parses");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].calorie_goal, 1750);
    }

    #[tokio::test]
    async fn set_current_date_retargets_without_creating_buckets() {
        let state = AppState::fake();
        let day = set_current_date(&state, date!(2024 - 01 - 15)).await;
        assert_eq!(day.date, date!(2024 - 01 - 15));
        assert!(day.entries.is_empty());

        let tracker = state.tracker.read().await;
        assert_eq!(tracker.journal.current_date(), date!(2024 - 01 - 15));
        assert!(tracker.journal.is_empty());
    }
}
