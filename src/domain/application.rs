use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    fields::{ChildAge, ChildGender, Phone, ReferralCode},
    model::DbApplication,
};

/// Raw submission payload from the landing form. Everything here is
/// untrusted; `validate` is the only way to a persistable application.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub parent_name: String,
    pub phone: String,
    pub child_gender: String,
    pub child_age: i64,
    pub inquiry: Option<String>,
    pub referral_code: Option<String>,
    #[serde(default)]
    pub privacy_consent: bool,
    #[serde(default)]
    pub marketing_consent: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ApplicationForm {
    /// Local validation, run in full before any network call. Collects every
    /// field error in one pass so the form can show them all at once.
    pub fn validate(&self) -> Result<ValidApplication, Vec<FieldError>> {
        let mut errors = Vec::new();

        let parent_name = self.parent_name.trim();
        if parent_name.is_empty() {
            errors.push(FieldError::new("parentName", "parent name is required"));
        }

        let phone = Phone::parse(&self.phone);
        if phone.is_none() {
            errors.push(FieldError::new(
                "phone",
                "phone number must contain exactly 11 digits",
            ));
        }

        let child_gender = ChildGender::parse(&self.child_gender);
        if child_gender.is_none() {
            errors.push(FieldError::new(
                "childGender",
                "child gender must be male or female",
            ));
        }

        let child_age = ChildAge::new(self.child_age);
        if child_age.is_none() {
            errors.push(FieldError::new(
                "childAge",
                format!(
                    "child age must be between {} and {}",
                    ChildAge::MIN,
                    ChildAge::MAX
                ),
            ));
        }

        if !self.privacy_consent {
            errors.push(FieldError::new(
                "privacyConsent",
                "privacy consent is required",
            ));
        }

        // Marketing consent never gates submission.

        let referral_code = match self
            .referral_code
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
        {
            Some(raw) => match ReferralCode::parse(raw) {
                Ok(code) => Some(code),
                Err(e) => {
                    errors.push(FieldError::new("referralCode", e.to_string()));
                    None
                }
            },
            None => None,
        };

        let inquiry = self
            .inquiry
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        if let (true, Some(phone), Some(child_gender), Some(child_age)) =
            (errors.is_empty(), phone, child_gender, child_age)
        {
            Ok(ValidApplication {
                parent_name: parent_name.to_owned(),
                phone,
                child_gender,
                child_age,
                inquiry,
                referral_code,
                marketing_consent: self.marketing_consent,
            })
        } else {
            Err(errors)
        }
    }
}

/// A form that passed local validation. Privacy consent is implied: the form
/// cannot validate without it.
#[derive(Debug, Clone)]
pub struct ValidApplication {
    pub parent_name: String,
    pub phone: Phone,
    pub child_gender: ChildGender,
    pub child_age: ChildAge,
    pub inquiry: Option<String>,
    pub referral_code: Option<ReferralCode>,
    pub marketing_consent: bool,
}

/// A persisted application, as returned to the submitter.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventApplication {
    pub id: Uuid,
    pub parent_name: String,
    pub phone: String,
    pub child_gender: String,
    pub child_age: i16,
    pub inquiry: Option<String>,
    pub referral_code: Option<String>,
    pub referrer_id: Option<Uuid>,
    pub privacy_consent: bool,
    pub marketing_consent: bool,
    pub created_on: OffsetDateTime,
}

impl From<DbApplication> for EventApplication {
    fn from(value: DbApplication) -> Self {
        Self {
            id: value.id,
            parent_name: value.parent_name,
            phone: value.phone,
            child_gender: value.child_gender,
            child_age: value.child_age,
            inquiry: value.inquiry,
            referral_code: value.referral_code,
            referrer_id: value.referrer_id,
            privacy_consent: value.privacy_consent,
            marketing_consent: value.marketing_consent,
            created_on: value.created_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ApplicationForm {
        ApplicationForm {
            parent_name: "Lee Jiyoung".to_owned(),
            phone: "010-1234-5678".to_owned(),
            child_gender: "female".to_owned(),
            child_age: 7,
            inquiry: Some("What time are classes?".to_owned()),
            referral_code: Some("S0042".to_owned()),
            privacy_consent: true,
            marketing_consent: false,
        }
    }

    fn field_names(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn fully_valid_form_passes() {
        let valid = valid_form().validate().unwrap();
        assert_eq!(valid.parent_name, "Lee Jiyoung");
        assert_eq!(valid.phone.inner(), "01012345678");
        assert_eq!(valid.child_gender, ChildGender::Female);
        assert_eq!(valid.child_age.inner(), 7);
        assert_eq!(valid.referral_code.unwrap().inner(), "S0042");
        assert!(!valid.marketing_consent);
    }

    #[test]
    fn form_without_referral_code_is_fine() {
        let mut form = valid_form();
        form.referral_code = None;
        assert!(form.validate().unwrap().referral_code.is_none());

        let mut form = valid_form();
        form.referral_code = Some("   ".to_owned());
        assert!(form.validate().unwrap().referral_code.is_none());
    }

    #[test]
    fn empty_parent_name_fails() {
        let mut form = valid_form();
        form.parent_name = "  ".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["parentName"]);
    }

    #[test]
    fn short_phone_fails() {
        let mut form = valid_form();
        form.phone = "123".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["phone"]);
    }

    #[test]
    fn age_out_of_bounds_fails_and_boundaries_pass() {
        for bad in [0, 21, -1] {
            let mut form = valid_form();
            form.child_age = bad;
            assert_eq!(field_names(&form.validate().unwrap_err()), vec!["childAge"]);
        }
        for good in [1, 20] {
            let mut form = valid_form();
            form.child_age = good;
            assert!(form.validate().is_ok());
        }
    }

    #[test]
    fn non_numeric_age_is_rejected_at_the_boundary() {
        let payload = r#"{
            "parentName": "Lee Jiyoung",
            "phone": "01012345678",
            "childGender": "female",
            "childAge": "seven",
            "privacyConsent": true
        }"#;
        assert!(serde_json::from_str::<ApplicationForm>(payload).is_err());
    }

    #[test]
    fn missing_privacy_consent_fails() {
        let mut form = valid_form();
        form.privacy_consent = false;
        let errors = form.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["privacyConsent"]);
    }

    #[test]
    fn marketing_consent_never_gates() {
        let mut form = valid_form();
        form.marketing_consent = true;
        assert!(form.validate().is_ok());
        form.marketing_consent = false;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn malformed_referral_code_fails_before_any_lookup() {
        let mut form = valid_form();
        form.referral_code = Some("XYZ!".to_owned());
        let errors = form.validate().unwrap_err();
        assert_eq!(field_names(&errors), vec!["referralCode"]);
    }

    #[test]
    fn all_errors_are_collected_in_one_pass() {
        let form = ApplicationForm {
            parent_name: "".to_owned(),
            phone: "12".to_owned(),
            child_gender: "robot".to_owned(),
            child_age: 99,
            inquiry: None,
            referral_code: Some("??".to_owned()),
            privacy_consent: false,
            marketing_consent: false,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            field_names(&errors),
            vec![
                "parentName",
                "phone",
                "childGender",
                "childAge",
                "privacyConsent",
                "referralCode"
            ]
        );
    }

    #[test]
    fn blank_inquiry_collapses_to_none() {
        let mut form = valid_form();
        form.inquiry = Some("   ".to_owned());
        assert!(form.validate().unwrap().inquiry.is_none());
    }
}
