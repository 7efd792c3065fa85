use crate::{
    app::{AppState, Db},
    config::Config,
    domain::{authz, errors::ApiError},
    repository::get_staff_by_id,
    utils::jwt::{decode_auth_token, generate_auth_token},
};
use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json, TypedHeader,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    staff_id: Uuid,
}

#[derive(Serialize)]
pub struct AuthenticateResponse {
    token: String,
}

impl From<String> for AuthenticateResponse {
    fn from(token: String) -> Self {
        Self { token }
    }
}

/// Operator token exchange. Only categories that can manage referrals get a
/// token; everyone else sees the same authentication failure.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthenticateRequest>,
) -> Result<Json<AuthenticateResponse>, ApiError> {
    let pool = state.get_pool();
    tracing::info!("authenticating operator >>> {}", payload.staff_id);

    let staff = get_staff_by_id(&pool, payload.staff_id)
        .await?
        .ok_or(ApiError::AuthenticationError)?;

    if !authz::can_manage_referrals(staff.category) {
        return Err(ApiError::AuthenticationError);
    }

    let token = generate_auth_token(staff.id, &state.config.jwt)?;
    Ok(Json(token.into()))
}

pub async fn check_auth<B>(
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let config = match request.extensions().get::<Config>() {
        Some(c) => c,
        None => return (StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    };

    let token = decode_auth_token(auth.token(), &config.jwt);

    let db = match request.extensions().get::<Db>() {
        Some(s) => s,
        None => return (StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    };

    if let Ok(claims) = token {
        if let Ok(staff_id) = claims.sub.parse::<Uuid>() {
            if let Ok(Some(staff)) = get_staff_by_id(&db.inner(), staff_id).await {
                request.extensions_mut().insert(staff);
                let response = next.run(request).await;
                return response;
            }
        }
    }

    (StatusCode::UNAUTHORIZED).into_response()
}
