use super::fields::{ReferralCode, StaffCategory};

/// Prefix shared by store staff (owners, store managers, contract workers).
pub const STAFF_PREFIX: &str = "S";
/// Prefix for monitoring agents; keeps their numbering independent of staff.
pub const AGENT_PREFIX: &str = "M";

pub const SUFFIX_WIDTH: usize = 4;

/// Category → code prefix. Admin categories are never issued codes.
pub fn prefix_for(category: StaffCategory) -> Option<&'static str> {
    match category {
        StaffCategory::Owner | StaffCategory::StoreManager | StaffCategory::ContractWorker => {
            Some(STAFF_PREFIX)
        }
        StaffCategory::MonitoringAgent => Some(AGENT_PREFIX),
        StaffCategory::BranchAdmin | StaffCategory::SystemAdmin => None,
    }
}

/// Derives the next code in a prefix's sequence from the lexicographically
/// greatest code issued so far. A missing or malformed suffix falls back to
/// the start of the sequence instead of failing.
///
/// Callers must treat the returned code as a candidate only: assignment races
/// are settled by the directory's uniqueness constraint, after which the
/// caller re-reads the last code and tries again.
pub fn next_code(prefix: &str, last: Option<&str>) -> ReferralCode {
    let next = last
        .and_then(|code| code.strip_prefix(prefix))
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map_or(1, |n| n + 1);

    ReferralCode::from(format!("{}{:0width$}", prefix, next, width = SUFFIX_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_categories_are_ineligible() {
        assert_eq!(prefix_for(StaffCategory::BranchAdmin), None);
        assert_eq!(prefix_for(StaffCategory::SystemAdmin), None);
    }

    #[test]
    fn staff_and_agent_categories_get_distinct_prefixes() {
        assert_eq!(prefix_for(StaffCategory::Owner), Some(STAFF_PREFIX));
        assert_eq!(prefix_for(StaffCategory::StoreManager), Some(STAFF_PREFIX));
        assert_eq!(prefix_for(StaffCategory::ContractWorker), Some(STAFF_PREFIX));
        assert_eq!(prefix_for(StaffCategory::MonitoringAgent), Some(AGENT_PREFIX));
    }

    #[test]
    fn first_code_starts_the_sequence() {
        assert_eq!(next_code(STAFF_PREFIX, None).inner(), "S0001");
        assert_eq!(next_code(AGENT_PREFIX, None).inner(), "M0001");
    }

    #[test]
    fn next_code_increments_the_suffix() {
        assert_eq!(next_code(STAFF_PREFIX, Some("S0007")).inner(), "S0008");
        assert_eq!(next_code(AGENT_PREFIX, Some("M0099")).inner(), "M0100");
    }

    #[test]
    fn sequences_are_gapless_within_a_prefix() {
        let mut last: Option<String> = None;
        for expected in 1..=25u32 {
            let code = next_code(STAFF_PREFIX, last.as_deref());
            assert_eq!(code.inner(), format!("S{:04}", expected));
            last = Some(code.inner());
        }
    }

    #[test]
    fn malformed_last_code_falls_back_to_sequence_start() {
        assert_eq!(next_code(STAFF_PREFIX, Some("SABCD")).inner(), "S0001");
        assert_eq!(next_code(STAFF_PREFIX, Some("S")).inner(), "S0001");
        // a different prefix's code never feeds this prefix's numbering
        assert_eq!(next_code(STAFF_PREFIX, Some("M0042")).inner(), "S0001");
    }

    #[test]
    fn generated_codes_pass_the_format_check() {
        let code = next_code(STAFF_PREFIX, Some("S0123"));
        assert!(ReferralCode::parse(&code.inner()).is_ok());
        let code = next_code(AGENT_PREFIX, None);
        assert!(ReferralCode::parse(&code.inner()).is_ok());
    }
}
