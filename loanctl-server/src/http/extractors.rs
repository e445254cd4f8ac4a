//! Custom Axum extractors

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use loanctl_core::CreditFilter;

use super::error::ApiError;

/// Dataset id and credit-history selection from the query string.
///
/// `credit_history` may repeat (`?credit_history=0&credit_history=1`, as sent
/// by checkboxes) or hold a comma-separated list (`?credit_history=0,1`).
/// Only literal commas separate values; `%2C` stays inside a value.
/// When neither `credit_history` nor the `filter` marker is present, the
/// selection is `None` and the caller selects every option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub dataset: Option<Uuid>,
    pub selection: Option<Vec<String>>,
}

impl DashboardQuery {
    pub fn parse(query: &str) -> Result<Self, ApiError> {
        let mut parsed = Self::default();
        for (raw_key, raw_value) in raw_pairs(query) {
            match decode(raw_key).as_str() {
                "dataset" => {
                    let value = decode(raw_value);
                    if value.is_empty() {
                        continue;
                    }
                    let id = Uuid::parse_str(&value)
                        .map_err(|_| ApiError::validation("dataset: invalid UUID format"))?;
                    parsed.dataset = Some(id);
                }
                "credit_history" => {
                    parsed
                        .selection
                        .get_or_insert_with(Vec::new)
                        .extend(split_selection(raw_value));
                }
                "filter" => {
                    parsed.selection.get_or_insert_with(Vec::new);
                }
                _ => {}
            }
        }
        Ok(parsed)
    }

    /// Explicit selection, if the user made one.
    pub fn credit_filter(&self) -> Option<CreditFilter> {
        self.selection.as_ref().map(CreditFilter::from_raw)
    }

    /// Query string that reproduces this selection, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = self.dataset {
            parts.push(format!("dataset={}", id));
        }
        if let Some(selection) = &self.selection {
            parts.push("filter=1".to_string());
            for value in selection {
                parts.push(format!("credit_history={}", urlencoding::encode(value)));
            }
        }
        parts.join("&")
    }
}

impl<S> FromRequestParts<S> for DashboardQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts.uri.query().unwrap_or_default())
    }
}

/// JSON body whose rejection is reported as an `ApiError`.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query parameters whose rejection is reported as an `ApiError`.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Split `application/x-www-form-urlencoded` input into still-encoded pairs.
fn raw_pairs(input: &str) -> impl Iterator<Item = (&str, &str)> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// Split an encoded, comma-separated selection and decode each value.
pub fn split_selection(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|v| decode(v).trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Percent-decode one form component, treating `+` as a space.
pub fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
