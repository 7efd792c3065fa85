//! The single place where staff categories turn into capabilities. Handlers
//! call these predicates instead of comparing category labels themselves.

use super::{codes, fields::StaffCategory};

/// Operator capability: directory listing, code issuance, share links, and
/// the event stream.
pub fn can_manage_referrals(category: StaffCategory) -> bool {
    match category {
        StaffCategory::BranchAdmin | StaffCategory::SystemAdmin => true,
        StaffCategory::Owner
        | StaffCategory::StoreManager
        | StaffCategory::MonitoringAgent
        | StaffCategory::ContractWorker => false,
    }
}

/// Whether the category is ever issued a referral code.
pub fn code_eligible(category: StaffCategory) -> bool {
    codes::prefix_for(category).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_manage_referrals() {
        assert!(can_manage_referrals(StaffCategory::BranchAdmin));
        assert!(can_manage_referrals(StaffCategory::SystemAdmin));
        assert!(!can_manage_referrals(StaffCategory::Owner));
        assert!(!can_manage_referrals(StaffCategory::StoreManager));
        assert!(!can_manage_referrals(StaffCategory::MonitoringAgent));
        assert!(!can_manage_referrals(StaffCategory::ContractWorker));
    }

    #[test]
    fn eligibility_is_the_inverse_of_admin_status() {
        for category in [
            StaffCategory::Owner,
            StaffCategory::StoreManager,
            StaffCategory::BranchAdmin,
            StaffCategory::SystemAdmin,
            StaffCategory::MonitoringAgent,
            StaffCategory::ContractWorker,
        ] {
            assert_eq!(code_eligible(category), !can_manage_referrals(category));
        }
    }
}
