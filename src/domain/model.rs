use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Serialize, Deserialize, FromRow)]
pub struct DbStaff {
    pub id: Uuid,
    pub(crate) name: String,
    pub(crate) branch: String,
    pub(crate) category: String,
    pub(crate) referral_code: Option<String>,
    pub(crate) created_on: OffsetDateTime,
}

#[derive(Serialize, Deserialize, FromRow)]
pub struct DbApplication {
    pub id: Uuid,
    pub(crate) parent_name: String,
    pub(crate) phone: String,
    pub(crate) child_gender: String,
    pub(crate) child_age: i16,
    pub(crate) inquiry: Option<String>,
    pub(crate) referral_code: Option<String>,
    pub(crate) referrer_id: Option<Uuid>,
    pub(crate) privacy_consent: bool,
    pub(crate) marketing_consent: bool,
    pub(crate) created_on: OffsetDateTime,
}
