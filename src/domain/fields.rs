use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use super::{
    codes::{AGENT_PREFIX, STAFF_PREFIX},
    errors::DatabaseError,
    model::DbStaff,
};

/// A staff referral code: a fixed category prefix followed by digits,
/// e.g. `S0042`. Codes are issued at most once per staff member and are
/// never recycled.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReferralCode(String);

impl ReferralCode {
    const PREFIXES: [&'static str; 2] = [STAFF_PREFIX, AGENT_PREFIX];

    /// Pure format check over untrusted input. Normalizes (trim, uppercase)
    /// before matching the `<prefix><digits>` grammar. No I/O; safe to run on
    /// every edit.
    pub fn parse(raw: &str) -> Result<Self, CodeFormatError> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(CodeFormatError::Empty);
        }

        let prefix = Self::PREFIXES
            .iter()
            .find(|p| code.starts_with(**p))
            .ok_or(CodeFormatError::UnknownPrefix)?;

        let suffix = &code[prefix.len()..];
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeFormatError::BadSuffix);
        }

        Ok(Self(code))
    }

    pub fn inner(&self) -> String {
        self.0.to_owned()
    }
}

// Codes coming back out of the directory were validated at issuance.
impl From<String> for ReferralCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ReferralCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeFormatError {
    Empty,
    UnknownPrefix,
    BadSuffix,
}

impl Display for CodeFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Empty => "referral code is empty",
            Self::UnknownPrefix => "referral code does not start with a known prefix",
            Self::BadSuffix => "referral code must be a prefix followed by digits only",
        };
        write!(f, "{}", reason)
    }
}

/// Phone number in digits-only canonical form, exactly 11 digits.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Phone(String);

impl Phone {
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        (digits.len() == 11).then_some(Self(digits))
    }

    pub fn inner(&self) -> String {
        self.0.to_owned()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildAge(u8);

impl ChildAge {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 20;

    pub fn new(age: i64) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&age).then_some(Self(age as u8))
    }

    pub fn inner(&self) -> i16 {
        self.0 as i16
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChildGender {
    Male,
    Female,
}

impl ChildGender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Closed set of staff categories. The category decides referral-code
/// eligibility and operator capability; both maps are exhaustive matches so a
/// new category fails compilation until every table is updated.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffCategory {
    Owner,
    StoreManager,
    BranchAdmin,
    SystemAdmin,
    MonitoringAgent,
    ContractWorker,
}

impl StaffCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::StoreManager => "store_manager",
            Self::BranchAdmin => "branch_admin",
            Self::SystemAdmin => "system_admin",
            Self::MonitoringAgent => "monitoring_agent",
            Self::ContractWorker => "contract_worker",
        }
    }
}

impl FromStr for StaffCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "store_manager" => Ok(Self::StoreManager),
            "branch_admin" => Ok(Self::BranchAdmin),
            "system_admin" => Ok(Self::SystemAdmin),
            "monitoring_agent" => Ok(Self::MonitoringAgent),
            "contract_worker" => Ok(Self::ContractWorker),
            other => Err(format!("unknown staff category: {}", other)),
        }
    }
}

impl Display for StaffCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub branch: String,
    pub category: StaffCategory,
    pub referral_code: Option<ReferralCode>,
}

impl TryFrom<DbStaff> for Staff {
    type Error = DatabaseError;

    fn try_from(value: DbStaff) -> Result<Self, Self::Error> {
        let category = value.category.parse::<StaffCategory>().map_err(|e| {
            tracing::error!("directory row rejected >>> {}", e);
            DatabaseError::ServerError
        })?;

        Ok(Self {
            id: value.id,
            name: value.name,
            branch: value.branch,
            category,
            referral_code: value.referral_code.map(ReferralCode::from),
        })
    }
}

/// The resolved identity behind a referral code, as shown to visitors and
/// stamped on applications.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Referrer {
    pub id: Uuid,
    pub name: String,
    pub branch: String,
}

impl From<Staff> for Referrer {
    fn from(value: Staff) -> Self {
        Self {
            id: value.id,
            name: value.name,
            branch: value.branch,
        }
    }
}

/// JWT claims for operator sessions.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_parse_accepts_prefix_and_digits() {
        assert_eq!(ReferralCode::parse("S0001").unwrap().inner(), "S0001");
        assert_eq!(ReferralCode::parse("M0420").unwrap().inner(), "M0420");
    }

    #[test]
    fn code_parse_normalizes_case_and_whitespace() {
        assert_eq!(ReferralCode::parse("  s0007 ").unwrap().inner(), "S0007");
    }

    #[test]
    fn code_parse_rejects_empty() {
        assert_eq!(ReferralCode::parse("   "), Err(CodeFormatError::Empty));
    }

    #[test]
    fn code_parse_rejects_unknown_prefix() {
        assert_eq!(
            ReferralCode::parse("GARBAGE"),
            Err(CodeFormatError::UnknownPrefix)
        );
        assert_eq!(ReferralCode::parse("X0001"), Err(CodeFormatError::UnknownPrefix));
    }

    #[test]
    fn code_parse_rejects_non_numeric_suffix() {
        assert_eq!(ReferralCode::parse("S00A1"), Err(CodeFormatError::BadSuffix));
        assert_eq!(ReferralCode::parse("S"), Err(CodeFormatError::BadSuffix));
        assert_eq!(ReferralCode::parse("S 123"), Err(CodeFormatError::BadSuffix));
    }

    #[test]
    fn phone_normalizes_to_digits() {
        assert_eq!(Phone::parse("010-1234-5678").unwrap().inner(), "01012345678");
        assert_eq!(Phone::parse("01012345678").unwrap().inner(), "01012345678");
    }

    #[test]
    fn phone_rejects_wrong_length() {
        assert!(Phone::parse("123").is_none());
        assert!(Phone::parse("010-1234-56789").is_none());
        assert!(Phone::parse("").is_none());
    }

    #[test]
    fn child_age_bounds_are_inclusive() {
        assert!(ChildAge::new(1).is_some());
        assert!(ChildAge::new(20).is_some());
        assert!(ChildAge::new(0).is_none());
        assert!(ChildAge::new(21).is_none());
        assert!(ChildAge::new(-3).is_none());
    }

    #[test]
    fn gender_parses_only_known_values() {
        assert_eq!(ChildGender::parse("male"), Some(ChildGender::Male));
        assert_eq!(ChildGender::parse("female"), Some(ChildGender::Female));
        assert_eq!(ChildGender::parse("other"), None);
        assert_eq!(ChildGender::parse(""), None);
    }

    #[test]
    fn category_round_trips_through_db_text() {
        for category in [
            StaffCategory::Owner,
            StaffCategory::StoreManager,
            StaffCategory::BranchAdmin,
            StaffCategory::SystemAdmin,
            StaffCategory::MonitoringAgent,
            StaffCategory::ContractWorker,
        ] {
            assert_eq!(category.as_str().parse::<StaffCategory>(), Ok(category));
        }
        assert!("intern".parse::<StaffCategory>().is_err());
    }
}
