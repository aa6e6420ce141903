//! Query-string shapes and response envelopes.
//!
//! Bodies deserialize straight into the rule inputs (`UserInput`,
//! `NewProduct`, `ProductChanges`); query parameters arrive as raw strings so
//! malformed values can be answered with the API's own error body.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use stockroom_core::UserId;
use stockroom_products::ProductSearch;

use crate::app::errors;

/// JSON request body whose rejections use the API's error shape
/// (400 `invalid_input`) instead of axum's plain-text response.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_input",
                rejection.body_text(),
            )),
        }
    }
}

/// Collection responses are wrapped so the shape can grow.
#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub entry_date: Option<String>,
    pub user_id: Option<String>,
    pub product_name: Option<String>,
}

impl SearchParams {
    /// Empty parameters count as absent.
    pub fn into_search(self) -> Result<ProductSearch, axum::response::Response> {
        let entry_date = match non_empty(self.entry_date) {
            Some(raw) => Some(raw.trim().parse::<NaiveDate>().map_err(|_| {
                errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_input",
                    "entry_date must be formatted as YYYY-MM-DD",
                )
            })?),
            None => None,
        };
        let user_id = match non_empty(self.user_id) {
            Some(raw) => Some(errors::parse_id::<UserId>(&raw, "user")?),
            None => None,
        };

        Ok(ProductSearch {
            entry_date,
            user_id,
            product_name: self.product_name,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteProductParams {
    pub requesting_user_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
