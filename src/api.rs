// Pizza API client
// Typed access to the protected menu endpoint

use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::http_client::ApiClient;

/// Menu entry returned by the pizza service
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Pizza {
    pub id: u32,
    pub name: String,
}

/// Client for the pizza service's protected endpoints
///
/// Every call goes through `ApiClient`, so it carries the bearer header and
/// participates in the 401 recovery.
pub struct PizzaApi {
    http: Arc<ApiClient>,
    base_url: String,
}

impl PizzaApi {
    pub fn new(http: Arc<ApiClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the menu; requires the `api.read` scope server-side
    pub async fn list(&self) -> Result<Vec<Pizza>, ApiError> {
        let url = format!("{}/api/pizzas", self.base_url.trim_end_matches('/'));

        let request = self
            .http
            .client()
            .get(&url)
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build request: {}", e)))?;

        let response = self.http.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::PizzaApiError {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| {
            ApiError::Internal(anyhow::anyhow!("Failed to parse pizza list: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pizza_deserialization() {
        let json = r#"[
            {"id": 1, "name": "Pepperoni"},
            {"id": 2, "name": "Margherita"},
            {"id": 3, "name": "Veggie"}
        ]"#;

        let pizzas: Vec<Pizza> = serde_json::from_str(json).unwrap();
        assert_eq!(pizzas.len(), 3);
        assert_eq!(
            pizzas[0],
            Pizza {
                id: 1,
                name: "Pepperoni".to_string()
            }
        );
    }
}
