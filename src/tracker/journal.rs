use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::config::GoalDefaults;
use crate::error::AppError;

/// A single logged food item. Immutable once created; removed as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub timestamp: OffsetDateTime,
}

impl FoodEntry {
    fn protein_g(&self) -> f64 {
        self.protein.unwrap_or(0.0)
    }

    fn carbs_g(&self) -> f64 {
        self.carbs.unwrap_or(0.0)
    }

    fn fat_g(&self) -> f64 {
        self.fat.unwrap_or(0.0)
    }
}

/// All entries and goals for one calendar date. Totals always equal the sum
/// over `entries`; goals are independent user preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayLog {
    pub date: Date,
    pub entries: Vec<FoodEntry>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    #[serde(default)]
    pub calorie_goal: i32,
    #[serde(default)]
    pub protein_goal: i32,
    #[serde(default)]
    pub carbs_goal: i32,
    #[serde(default)]
    pub fat_goal: i32,
}

impl DayLog {
    fn empty(date: Date, defaults: GoalDefaults) -> Self {
        Self {
            date,
            entries: Vec::new(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            calorie_goal: defaults.calories,
            protein_goal: defaults.protein,
            carbs_goal: defaults.carbs,
            fat_goal: defaults.fat,
        }
    }

    fn recompute_totals(&mut self) {
        self.total_calories = self.entries.iter().map(|e| e.calories).sum();
        self.total_protein = self.entries.iter().map(FoodEntry::protein_g).sum();
        self.total_carbs = self.entries.iter().map(FoodEntry::carbs_g).sum();
        self.total_fat = self.entries.iter().map(FoodEntry::fat_g).sum();
    }
}

/// The in-memory day collection: unique per date, kept sorted descending,
/// with one current date the mutations resolve against.
#[derive(Debug, Clone)]
pub struct Journal {
    days: Vec<DayLog>,
    current_date: Date,
    defaults: GoalDefaults,
}

impl Journal {
    pub fn new(current_date: Date, defaults: GoalDefaults) -> Self {
        Self {
            days: Vec::new(),
            current_date,
            defaults,
        }
    }

    pub fn days(&self) -> &[DayLog] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn current_date(&self) -> Date {
        self.current_date
    }

    pub fn set_current_date(&mut self, date: Date) {
        self.current_date = date;
    }

    /// The bucket for `date`, or a synthesized empty one with default goals.
    /// Never inserts into the collection.
    pub fn day(&self, date: Date) -> DayLog {
        self.days
            .iter()
            .find(|d| d.date == date)
            .cloned()
            .unwrap_or_else(|| DayLog::empty(date, self.defaults))
    }

    pub fn current(&self) -> DayLog {
        self.day(self.current_date)
    }

    /// Replace the whole collection from persisted rows, grouping by the
    /// calendar date each entry was stored under. Goals come from defaults;
    /// the remote schema does not carry them.
    pub fn rebuild(&mut self, entries: Vec<(Date, FoodEntry)>) {
        let mut days: Vec<DayLog> = Vec::new();
        for (date, entry) in entries {
            match days.iter_mut().find(|d| d.date == date) {
                Some(day) => day.entries.push(entry),
                None => {
                    let mut day = DayLog::empty(date, self.defaults);
                    day.entries.push(entry);
                    days.push(day);
                }
            }
        }
        for day in &mut days {
            day.recompute_totals();
        }
        self.days = days;
        self.sort();
    }

    /// Replace the collection from a cache snapshot. Goal fields that come
    /// back as 0 (older snapshots) fall back to the defaults.
    pub fn restore(&mut self, mut days: Vec<DayLog>) {
        for day in &mut days {
            if day.calorie_goal <= 0 {
                day.calorie_goal = self.defaults.calories;
            }
            if day.protein_goal <= 0 {
                day.protein_goal = self.defaults.protein;
            }
            if day.carbs_goal <= 0 {
                day.carbs_goal = self.defaults.carbs;
            }
            if day.fat_goal <= 0 {
                day.fat_goal = self.defaults.fat;
            }
        }
        self.days = days;
        self.sort();
    }

    /// Append a confirmed entry to the current date's bucket, folding its
    /// contributions into the running totals.
    pub fn add_entry(&mut self, entry: FoodEntry) {
        let mut day = self.current();
        day.total_calories += entry.calories;
        day.total_protein += entry.protein_g();
        day.total_carbs += entry.carbs_g();
        day.total_fat += entry.fat_g();
        day.entries.push(entry);
        self.upsert(day);
    }

    /// Remove an entry from the current date's bucket. Unknown ids leave the
    /// collection untouched.
    pub fn remove_entry(&mut self, id: Uuid) -> Option<FoodEntry> {
        let mut day = self.current();
        let index = day.entries.iter().position(|e| e.id == id)?;
        let entry = day.entries.remove(index);
        day.total_calories -= entry.calories;
        day.total_protein -= entry.protein_g();
        day.total_carbs -= entry.carbs_g();
        day.total_fat -= entry.fat_g();
        self.upsert(day);
        Some(entry)
    }

    pub fn set_calorie_goal(&mut self, goal: i32) -> Result<(), AppError> {
        if goal <= 0 {
            return Err(AppError::InvalidGoal(
                "calorie goal must be a positive integer".into(),
            ));
        }
        let mut day = self.current();
        day.calorie_goal = goal;
        self.upsert(day);
        Ok(())
    }

    pub fn set_macro_goals(&mut self, protein: i32, carbs: i32, fat: i32) -> Result<(), AppError> {
        if protein < 0 || carbs < 0 || fat < 0 {
            return Err(AppError::InvalidGoal(
                "macro goals must be non-negative integers".into(),
            ));
        }
        let mut day = self.current();
        day.protein_goal = protein;
        day.carbs_goal = carbs;
        day.fat_goal = fat;
        self.upsert(day);
        Ok(())
    }

    /// Swap in the updated bucket, leaving every other bucket untouched, and
    /// re-derive the date-descending order.
    fn upsert(&mut self, day: DayLog) {
        self.days.retain(|d| d.date != day.date);
        self.days.push(day);
        self.sort();
    }

    fn sort(&mut self) {
        self.days.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
