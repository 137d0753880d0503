//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::tree::Popularity;

// ============================================
// QUERY DTOs
// ============================================

/// Response of the count route
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    /// Distinct queries under the requested date prefix
    pub count: usize,
}

/// Query parameters of the popular route
///
/// `size` is kept raw so that a missing, malformed or negative value can each be
/// reported with its own message.
#[derive(Debug, Default, Deserialize)]
pub struct PopularParams {
    pub size: Option<String>,
}

/// Response of the popular route
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopularResponse {
    /// Most frequent queries, most popular first
    pub queries: Vec<QueryCount>,
}

/// One ranked query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryCount {
    pub query: String,
    pub count: u64,
}

impl From<&Popularity> for QueryCount {
    fn from(p: &Popularity) -> Self {
        Self {
            query: p.query.to_string(),
            count: p.count,
        }
    }
}

impl PopularResponse {
    pub fn from_ranking(ranking: &[Popularity]) -> Self {
        Self {
            queries: ranking.iter().map(QueryCount::from).collect(),
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy or empty
    pub status: String,
    /// Events indexed at startup
    pub total_events: u64,
    /// Distinct query strings indexed
    pub distinct_queries: usize,
    /// Years holding at least one event
    pub years: Vec<i32>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
