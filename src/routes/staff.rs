use std::sync::Arc;

use crate::{
    app::AppState,
    domain::{
        authz,
        codes,
        errors::{ApiError, DatabaseError},
        events::{AppEvent, CodeIssuedEvent},
        fields::{ReferralCode, Staff},
        share::{self, ShareLink},
    },
    repository::{
        fetch_staff, get_staff_by_id, last_code_for_prefix, set_referral_code, StaffSearchQuery,
    },
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lost races re-read the latest code and try again this many times before
/// the conflict surfaces to the operator.
const MAX_ISSUE_ATTEMPTS: usize = 3;

#[derive(Deserialize)]
pub struct QueryParams {
    name: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    has_next: bool,
    has_prev: bool,
    current_page: i64,
    total_pages: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStaffResponse {
    staff: Vec<Staff>,
    #[serde(flatten)]
    pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCodeResponse {
    staff_id: Uuid,
    referral_code: ReferralCode,
}

pub async fn get_staff(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
    Extension(operator): Extension<Staff>,
) -> Result<Json<GetStaffResponse>, ApiError> {
    if !authz::can_manage_referrals(operator.category) {
        return Err(ApiError::AccessDenied);
    }

    let pool = state.get_pool();
    let (page, limit, skip) = page_window(query.page, query.limit);

    let query = StaffSearchQuery {
        name: query.name,
        limit,
        skip,
    };

    let (staff, count) = fetch_staff(&pool, query).await?;

    Ok(Json(GetStaffResponse {
        staff,
        pagination: paginate(count, page, limit),
    }))
}

/// Clamps raw query parameters to a sane window. Zero or negative values
/// would otherwise reach SQL `LIMIT`/`OFFSET` and the page math below.
fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).max(1);
    (page, limit, (page - 1) * limit)
}

fn paginate(count: i64, page: i64, limit: i64) -> Pagination {
    // ceiling division; an empty directory is still one (empty) page
    let total_pages = ((count + limit - 1) / limit).max(1);
    Pagination {
        has_next: page < total_pages,
        has_prev: page > 1,
        current_page: page,
        total_pages,
    }
}

/// Issues a referral code to one staff member. Codes are permanent, so
/// repeating the request for someone who already holds one returns the
/// existing code unchanged.
pub async fn issue_referral_code(
    State(state): State<Arc<AppState>>,
    Path(staff_id): Path<Uuid>,
    Extension(operator): Extension<Staff>,
) -> Result<Json<IssueCodeResponse>, ApiError> {
    if !authz::can_manage_referrals(operator.category) {
        return Err(ApiError::AccessDenied);
    }

    let pool = state.get_pool();
    let staff = get_staff_by_id(&pool, staff_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(code) = staff.referral_code {
        return Ok(Json(IssueCodeResponse {
            staff_id,
            referral_code: code,
        }));
    }

    if !authz::code_eligible(staff.category) {
        return Err(ApiError::IneligibleCategory);
    }
    let prefix = codes::prefix_for(staff.category).ok_or(ApiError::IneligibleCategory)?;

    for _ in 0..MAX_ISSUE_ATTEMPTS {
        let last = last_code_for_prefix(&pool, prefix).await?;
        let code = codes::next_code(prefix, last.as_deref());

        match set_referral_code(&pool, staff_id, &code).await {
            Ok(()) => {
                tracing::info!("referral code issued >>> {} to {}", code, staff_id);
                let _ = state.get_sender().send(AppEvent::CodeIssued(CodeIssuedEvent {
                    staff_id,
                    staff_name: staff.name.clone(),
                    referral_code: code.clone(),
                }));

                return Ok(Json(IssueCodeResponse {
                    staff_id,
                    referral_code: code,
                }));
            }
            Err(DatabaseError::Conflict) => {
                // A lost race means either the candidate code collided or a
                // concurrent issuance already assigned this staff member's
                // code. Codes are permanent, so hand back the winner's.
                let refetched = get_staff_by_id(&pool, staff_id).await?;
                if let Some(existing) = code_issued_meanwhile(refetched) {
                    return Ok(Json(IssueCodeResponse {
                        staff_id,
                        referral_code: existing,
                    }));
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::error!("referral code issuance exhausted retries >>> {}", staff_id);
    Err(ApiError::CodeConflict)
}

/// After a lost assignment race, the re-read row tells the two cases apart:
/// a code on the row means a concurrent issuance won and its code stands; no
/// code means the candidate merely collided and the sequence is re-read.
fn code_issued_meanwhile(refetched: Option<Staff>) -> Option<ReferralCode> {
    refetched.and_then(|staff| staff.referral_code)
}


/// Share handles for an already-issued code: the landing link and its QR
/// image reference.
pub async fn get_referral_link(
    State(state): State<Arc<AppState>>,
    Path(staff_id): Path<Uuid>,
    Extension(operator): Extension<Staff>,
) -> Result<Json<ShareLink>, ApiError> {
    if !authz::can_manage_referrals(operator.category) {
        return Err(ApiError::AccessDenied);
    }

    let pool = state.get_pool();
    let staff = get_staff_by_id(&pool, staff_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let code = staff.referral_code.ok_or(ApiError::NotFound)?;

    let base = state.config.event.landing_base().map_err(|e| {
        tracing::error!("landing base url misconfigured >>> {}", e);
        ApiError::ServerError
    })?;
    let qr_endpoint = state.config.event.qr_endpoint().map_err(|e| {
        tracing::error!("qr endpoint misconfigured >>> {}", e);
        ApiError::ServerError
    })?;

    let link = share::build(&base, &qr_endpoint, code.as_ref()).map_err(|e| {
        tracing::error!("stored referral code failed format check >>> {}", e);
        ApiError::ServerError
    })?;

    Ok(Json(link))
}
