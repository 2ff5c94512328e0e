use axum::{
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_state::AppState;
use crate::error::Result;
use crate::events::{HookType, SIGNATURE_HEADER, SignatureContext};
use crate::models::{EventRecord, SearchCriteria};

pub const RECEIVED_MESSAGE: &str = "Event received and logged successfully";

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiveResponse {
    pub message: String,
    pub hook_id: String,
    pub org_id: String,
    pub hook_type: HookType,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub network_id: Option<String>,
    pub user_id: Option<String>,
    pub member_id: Option<String>,
}

impl SearchParams {
    /// Empty parameters are treated as absent.
    ///
    /// `user_id` filters on the stored member id, not the user id column.
    /// Existing clients depend on this, so it stays; use
    /// [`SearchCriteria::with_user_id`] for a real user id filter.
    pub fn into_criteria(self) -> SearchCriteria {
        let mut criteria = SearchCriteria::new();

        if let Some(network_id) = present(self.network_id) {
            criteria = criteria.with_network_id(network_id);
        }
        if let Some(user_id) = present(self.user_id) {
            criteria = criteria.with_member_id(user_id);
        }
        if let Some(member_id) = present(self.member_id) {
            criteria = criteria.with_member_id(member_id);
        }

        criteria
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub events: Vec<EventRecord>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Receive a ZeroTier Central webhook delivery
/// POST /events/receive
///
/// Body rejections (over the size limit, unreadable stream) are reported
/// through [`crate::error::ApiError`] like any other failure.
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<ReceiveResponse>> {
    let body = body?;

    // a non UTF-8 header is kept so that it fails verification instead of bypassing it
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    let secret = state.config.signature_mode.secret().map(str::to_string);

    let base = state
        .processor
        .process(&body, SignatureContext::new(signature, secret))
        .await?;

    Ok(Json(ReceiveResponse {
        message: RECEIVED_MESSAGE.to_string(),
        hook_id: base.hook_id,
        org_id: base.org_id,
        hook_type: base.hook_type,
    }))
}

/// Search stored events
/// GET /events/search?network_id=&user_id=&member_id=
pub async fn search_events(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(params) = params?;
    let criteria = params.into_criteria();
    let events = state.store.search(&criteria).await?;

    debug!(
        predicates = criteria.predicates().len(),
        results = events.len(),
        "Event search served"
    );

    Ok(Json(SearchResponse { events }))
}
