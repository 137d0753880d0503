//! Query Routes
//!
//! Count and popularity endpoints, both keyed by a date prefix in the path.
//!
//! - GET /1/queries/count/:date - Distinct queries under the prefix
//! - GET /1/queries/popular/:date?size=N - Top N queries under the prefix
//!
//! Paths with more segments after the date are rejected as badly formatted.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CountResponse, PopularParams, PopularResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::prefix::DatePrefix;

/// GET /1/queries/count/:date
pub async fn count(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<CountResponse>> {
    let search = DatePrefix::parse(&date)?.to_search(0);
    let count = state.tree.count(&search);

    tracing::debug!(date = %search, count, "Count query");
    Ok(Json(CountResponse { count }))
}

/// GET /1/queries/popular/:date?size=N
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<PopularResponse>> {
    let prefix = DatePrefix::parse(&date)?;
    let size = parse_size(params.size.as_deref())?;

    let search = prefix.to_search(size);
    let ranking = state.tree.popular(&search);

    tracing::debug!(date = %search, size, returned = ranking.len(), "Popular query");
    Ok(Json(PopularResponse::from_ranking(ranking)))
}

/// GET /1/queries/count/ and /1/queries/popular/
pub async fn missing_date() -> ApiError {
    ApiError::Validation("no date specified in url".to_string())
}

/// GET /1/queries/{count,popular}/:date/...
pub async fn bad_url() -> ApiError {
    ApiError::Validation("url badly formatted".to_string())
}

/// Validate the `size` query parameter
fn parse_size(raw: Option<&str>) -> ApiResult<usize> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("missing size parameter".to_string()))?;

    let size: i64 = raw
        .parse()
        .map_err(|e| ApiError::Validation(format!("size parameter invalid: {}", e)))?;

    if size < 0 {
        return Err(ApiError::Validation(
            "size parameter cannot be negative".to_string(),
        ));
    }

    Ok(usize::try_from(size).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size(Some("10")).unwrap(), 10);
        assert_eq!(parse_size(Some("0")).unwrap(), 0);
        assert_eq!(parse_size(Some(" 3 ")).unwrap(), 3);
    }

    #[test]
    fn test_parse_size_errors() {
        let message = |raw| parse_size(raw).unwrap_err().to_string();

        assert!(message(None).contains("missing size parameter"));
        assert!(message(Some("")).contains("missing size parameter"));
        assert!(message(Some("lol")).contains("size parameter invalid"));
        assert!(message(Some("-1")).contains("size parameter cannot be negative"));
    }
}
