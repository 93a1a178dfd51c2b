use std::path::PathBuf;

use serde::Deserialize;

/// Daily targets used whenever a day has no goals of its own.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GoalDefaults {
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
}

impl Default for GoalDefaults {
    fn default() -> Self {
        Self {
            calories: 2000,
            protein: 50,
            carbs: 275,
            fat: 65,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Directory the local key/value mirror writes into.
    pub data_dir: PathBuf,
    pub goals: GoalDefaults,
    pub analysis: AnalysisConfig,
    pub barcode_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "./data".into())
            .into();
        let goals = GoalDefaults {
            calories: env_i32("GOAL_CALORIES", 2000),
            protein: env_i32("GOAL_PROTEIN", 50),
            carbs: env_i32("GOAL_CARBS", 275),
            fat: env_i32("GOAL_FAT", 65),
        };
        let analysis = AnalysisConfig {
            base_url: std::env::var("ANALYSIS_BASE_URL")
                .unwrap_or_else(|_| "https://api.perplexity.ai".into()),
            model: std::env::var("ANALYSIS_MODEL")
                .unwrap_or_else(|_| "llama-3.1-sonar-small-128k-online".into()),
        };
        let barcode_base_url = std::env::var("BARCODE_BASE_URL")
            .unwrap_or_else(|_| "https://world.openfoodfacts.org".into());

        Ok(Self {
            database_url,
            data_dir,
            goals,
            analysis,
            barcode_base_url,
        })
    }
}

fn env_i32(key: &str, default: i32) -> i32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(default)
}
