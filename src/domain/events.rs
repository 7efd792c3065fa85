use super::fields::{ReferralCode, Referrer};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssuedEvent {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub referral_code: ReferralCode,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReceivedEvent {
    pub application_id: Uuid,
    pub parent_name: String,
    pub referrer: Option<Referrer>,
}

#[derive(Serialize, Clone)]
#[serde(tag = "type", content = "data")]
pub enum AppEvent {
    CodeIssued(CodeIssuedEvent),
    ApplicationReceived(ApplicationReceivedEvent),
}
