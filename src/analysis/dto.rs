use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_response_serialization() {
        let response = ApiKeyResponse {
            api_key: Some("pplx-123".to_string()),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("pplx-123"));
        assert!(json.contains("api_key"));
    }
}
