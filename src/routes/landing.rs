use std::sync::Arc;

use crate::{
    app::AppState,
    domain::{
        application::{ApplicationForm, EventApplication},
        errors::ApiError,
        events::{AppEvent, ApplicationReceivedEvent},
        fields::{ReferralCode, Referrer, Staff},
        gate::{self, GateState, GrantedVisit},
        share,
    },
    repository::{get_staff_by_referral_code, insert_application},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Deserialize)]
pub struct LandingQuery {
    #[serde(rename = "ref")]
    referral: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    status: &'static str,
    #[serde(flatten)]
    visit: GrantedVisit,
    share_url: String,
}

/// The access gate. The page is reachable only through
/// `<base-path>?ref=<code>`; anything else gets the fixed denied rendering.
pub async fn visit_landing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LandingQuery>,
) -> Result<Json<LandingResponse>, ApiError> {
    let pool = state.get_pool();

    let code = match GateState::begin().present(query.referral.as_deref()) {
        Ok(code) => code,
        Err(_denied) => return Err(ApiError::AccessDenied),
    };

    let referrer = resolve_referrer(&pool, &code).await;
    match gate::settle(code, referrer) {
        GateState::Granted(visit) => {
            let base = state.config.event.landing_base().map_err(|e| {
                tracing::error!("landing base url misconfigured >>> {}", e);
                ApiError::ServerError
            })?;
            let share_url = share::share_url(&base, &visit.referral_code).to_string();

            Ok(Json(LandingResponse {
                status: "granted",
                visit,
                share_url,
            }))
        }
        _ => Err(ApiError::AccessDenied),
    }
}

/// The application flow's write path: full local validation, then the
/// authoritative existence re-check for any presented code, then a single
/// append-only insert.
pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ApplicationForm>,
) -> Result<(StatusCode, Json<EventApplication>), ApiError> {
    let pool = state.get_pool();

    let application = payload.validate().map_err(ApiError::Validation)?;

    let referrer = match &application.referral_code {
        Some(code) => match resolve_referrer(&pool, code).await {
            Some(staff) => Some(Referrer::from(staff)),
            // The code was valid at page load but is not resolvable now:
            // abort and persist nothing rather than dropping the referrer.
            None => return Err(ApiError::InvalidReferrer),
        },
        None => None,
    };

    let record = insert_application(&pool, &application, referrer.as_ref().map(|r| r.id)).await?;
    let record = EventApplication::from(record);
    tracing::info!("event application received >>> {}", record.id);

    let _ = state
        .get_sender()
        .send(AppEvent::ApplicationReceived(ApplicationReceivedEvent {
            application_id: record.id,
            parent_name: record.parent_name.clone(),
            referrer,
        }));

    Ok((StatusCode::CREATED, Json(record)))
}

/// Existence check, fail-closed: lookup errors and "not found" are
/// indistinguishable to callers. The repository has already logged the
/// developer-facing detail.
async fn resolve_referrer(pool: &PgPool, code: &ReferralCode) -> Option<Staff> {
    get_staff_by_referral_code(pool, code).await.ok().flatten()
}
