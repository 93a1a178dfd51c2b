use serde::{Deserialize, Serialize};
use time::Date;

use super::journal::DayLog;

#[derive(Debug, Deserialize)]
pub struct NewEntryRequest {
    pub name: String,
    pub amount: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

fn default_unit() -> String {
    "g".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SetDateRequest {
    pub date: Date,
}

#[derive(Debug, Deserialize)]
pub struct CalorieGoalRequest {
    pub goal: i32,
}

#[derive(Debug, Deserialize)]
pub struct MacroGoalsRequest {
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
}

#[derive(Debug, Serialize)]
pub struct DaysResponse {
    pub is_loading: bool,
    pub days: Vec<DayLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_response_serialization() {
        let response = DaysResponse {
            is_loading: false,
            days: Vec::new(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("is_loading"));
        assert!(json.contains("days"));
    }

    #[test]
    fn new_entry_request_defaults_the_unit() {
        let body = r#"{"name":"chicken breast","amount":200,"calories":330}"#;
        let req: NewEntryRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.unit, "g");
        assert_eq!(req.protein, None);
    }
}
