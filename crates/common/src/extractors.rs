//! Request extractors shared by the Chatline routers

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::{Validate, ValidationErrors};

use crate::Error;

/// Largest page a list endpoint returns; also the default
pub const PAGE_SIZE: i64 = 50;

/// `?offset=&limit=` query for list endpoints.
///
/// Extracts itself from the query string; a malformed value such as
/// `?limit=abc` rejects with `Error::Validation`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Rows to skip; negative values count as zero
    pub fn offset(&self) -> i64 {
        self.offset.map_or(0, |o| o.max(0))
    }

    /// Rows to return, within `1..=PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.limit.map_or(PAGE_SIZE, |l| l.clamp(1, PAGE_SIZE))
    }
}

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(page) = Query::<Pagination>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;
        Ok(page)
    }
}

/// JSON body that has passed its `validator` rules.
///
/// Both decoding and rule failures reject with `Error::Validation`, so the
/// client gets a 400 with the usual error body. A failing rule's own
/// message is used verbatim when it has one. A body over the size limit
/// keeps its 413 as `Error::PayloadTooLarge`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        value
            .validate()
            .map_err(|errors| Error::Validation(first_rule_message(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> Error {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(rejection.body_text())
    } else {
        Error::Validation(rejection.body_text())
    }
}

/// Message of the alphabetically first failing field, or the whole report
fn first_rule_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| format!("Validation failed: {}", errors))
}
