use serde::Serialize;

use super::fields::{ReferralCode, Referrer, Staff};

/// Landing-page access gate. Every visit starts in `Validating`; the visit
/// settles to `Granted` or `Denied` and `Denied` is terminal — the only
/// recovery is arriving with a fresh valid link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Validating,
    Granted(GrantedVisit),
    Denied,
}

/// Carried for the rest of a granted visit: the form pre-fills the code and
/// keeps it read-only, so the visitor cannot swap referrers after arriving.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrantedVisit {
    pub referral_code: ReferralCode,
    pub referrer: Referrer,
}

impl GateState {
    /// Initial state for every page load.
    pub fn begin() -> Self {
        Self::Validating
    }

    /// First transition: inspect the `ref` query parameter. A missing
    /// parameter or one that fails the format check denies immediately,
    /// without a directory round trip. Outside `Validating` the state stands
    /// as-is; in particular `Denied` is terminal, so re-presenting the same
    /// code does not reopen the visit.
    pub fn present(self, param: Option<&str>) -> Result<ReferralCode, GateState> {
        match self {
            Self::Validating => param
                .and_then(|raw| ReferralCode::parse(raw).ok())
                .ok_or(Self::Denied),
            settled => Err(settled),
        }
    }
}

/// Settles the visit from the existence-check result. Lookup failures reach
/// here as `None`, so outages and unknown codes both deny (fail-closed). A
/// directory row with a blank display name is treated as unresolvable too.
pub fn settle(code: ReferralCode, referrer: Option<Staff>) -> GateState {
    match referrer {
        Some(staff) if !staff.name.trim().is_empty() => GateState::Granted(GrantedVisit {
            referral_code: code,
            referrer: staff.into(),
        }),
        _ => GateState::Denied,
    }
}
