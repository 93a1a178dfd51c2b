use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::AnalysisConfig;
use crate::error::AppError;

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = r#"
You are a calorie tracking assistant. Your task is to analyze food descriptions and return structured data.
When the user describes food they've eaten, extract the food name, amount, unit, and calculate calories.
Always respond with a valid JSON object containing:
{
  "food": {
    "name": "food name",
    "amount": number,
    "unit": "g/ml/piece/etc",
    "calories": number
  },
  "message": "A human-friendly confirmation message"
}

For example, if the user says "I ate 200g of chicken breast", respond with:
{
  "food": {
    "name": "chicken breast",
    "amount": 200,
    "unit": "g",
    "calories": 330
  },
  "message": "Added 200g of chicken breast (330 calories)"
}

Be precise with calorie calculations, and if a measurement unit isn't specified, use an appropriate default.
"#;

/// The structured food guess extracted from free text. Ephemeral: it only
/// becomes a journal entry once the client posts it back as one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub food: ProposedFood,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedFood {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarcodeProduct {
    pub name: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub image_url: Option<String>,
}

pub struct NutritionClient {
    http: Client,
    analysis: AnalysisConfig,
    barcode_base_url: String,
}

impl NutritionClient {
    pub fn new(analysis: AnalysisConfig, barcode_base_url: String) -> Self {
        Self {
            http: Client::new(),
            analysis,
            barcode_base_url,
        }
    }

    /// Ask the analysis service to turn a free-text food description into a
    /// structured guess. The message content must itself be the nutrition
    /// JSON object; anything else is an analysis failure.
    pub async fn analyze(&self, text: &str, api_key: &str) -> Result<Analysis, AppError> {
        let payload = json!({
            "model": self.analysis.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.analysis.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Analysis(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Analysis(format!(
                "analysis service returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Analysis(e.to_string()))?;
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Analysis("response carried no message content".into()))?;

        parse_analysis(content)
    }

    pub async fn lookup_barcode(&self, code: &str) -> Result<BarcodeProduct, AppError> {
        let url = format!("{}/api/v2/product/{}.json", self.barcode_base_url, code);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Lookup(format!(
                "product service returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Lookup(e.to_string()))?;
        product_from_payload(&body)
    }
}

pub(crate) fn parse_analysis(content: &str) -> Result<Analysis, AppError> {
    serde_json::from_str(content)
        .map_err(|_| AppError::Analysis("response was not the expected nutrition object".into()))
}

/// Pull the product fields out of the lookup payload. The upstream schema is
/// loose: numbers arrive as strings, most fields are optional, and a product
/// without a usable name cannot become an entry.
pub(crate) fn product_from_payload(body: &Value) -> Result<BarcodeProduct, AppError> {
    if body.get("status").and_then(Value::as_i64) == Some(0) {
        return Err(AppError::NotFound);
    }
    let product = body.get("product").ok_or(AppError::NotFound)?;

    let name = product
        .get("product_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::NotFound)?;

    let nutriment = |key: &str| {
        product
            .pointer(&format!("/nutriments/{key}"))
            .and_then(as_number)
    };

    Ok(BarcodeProduct {
        name: name.to_string(),
        calories: nutriment("energy-kcal_100g").unwrap_or(0.0),
        protein: nutriment("proteins_100g"),
        carbs: nutriment("carbohydrates_100g"),
        fat: nutriment("fat_100g"),
        serving_size: product
            .get("serving_quantity")
            .and_then(as_number)
            .unwrap_or(100.0),
        serving_unit: product
            .get("serving_unit")
            .and_then(Value::as_str)
            .unwrap_or("g")
            .to_string(),
        image_url: product
            .get("image_url")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
