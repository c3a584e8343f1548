use super::{ChatTurn, ModelClient, ModelError};

/// Development fallback — returns a fixed benign assessment without
/// touching the network.
pub struct StubModelClient;

impl ModelClient for StubModelClient {
    fn analyze(&self, _text: &str, _context: &[ChatTurn]) -> Result<String, ModelError> {
        Ok(serde_json::json!({
            "stress": 0.3,
            "anxiety": 0.3,
            "depression": 0.2,
            "risk_level": "low",
            "summary": "Stub output for development.",
            "supportive_message": "Thanks for sharing. Tell me a bit more about what's been on your mind.",
            "recommendations": [
                "Take a short breathing break.",
                "Write down one next step you can take today.",
                "Consider speaking with someone you trust if it helps.",
            ],
        })
        .to_string())
    }
}

/// Test double — returns a configurable response or error.
pub struct MockModelClient {
    response: Result<String, fn() -> ModelError>,
}

impl MockModelClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    pub fn failing(make_error: fn() -> ModelError) -> Self {
        Self {
            response: Err(make_error),
        }
    }
}

impl ModelClient for MockModelClient {
    fn analyze(&self, _text: &str, _context: &[ChatTurn]) -> Result<String, ModelError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}
