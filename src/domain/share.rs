use serde::Serialize;
use url::Url;

use super::fields::{CodeFormatError, ReferralCode};

/// Shareable handles for one referral code: the landing link itself and a QR
/// image rendering of it.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub share_url: String,
    pub qr_image_url: String,
}

/// Canonical landing link: the base path with the code as the `ref` query
/// parameter.
pub fn share_url(base: &Url, code: &ReferralCode) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("ref", code.as_ref());
    url
}

/// QR image reference: the external image endpoint with the target link
/// percent-encoded into its `data` parameter. The response is an opaque
/// image blob; nothing here fetches it.
pub fn qr_image_url(endpoint: &Url, target: &Url) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("data", target.as_str());
    url
}

/// Builds both handles from a raw code, refusing anything that fails the
/// format check.
pub fn build(base: &Url, qr_endpoint: &Url, raw_code: &str) -> Result<ShareLink, CodeFormatError> {
    let code = ReferralCode::parse(raw_code)?;
    let link = share_url(base, &code);
    let qr = qr_image_url(qr_endpoint, &link);

    Ok(ShareLink {
        share_url: link.to_string(),
        qr_image_url: qr.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://mathletter.example.com/event").unwrap()
    }

    fn qr() -> Url {
        Url::parse("https://api.qrserver.com/v1/create-qr-code/").unwrap()
    }

    #[test]
    fn share_url_appends_ref_parameter() {
        let code = ReferralCode::parse("S0042").unwrap();
        let url = share_url(&base(), &code);
        assert_eq!(
            url.as_str(),
            "https://mathletter.example.com/event?ref=S0042"
        );
    }

    #[test]
    fn qr_url_percent_encodes_the_target() {
        let code = ReferralCode::parse("S0042").unwrap();
        let target = share_url(&base(), &code);
        let url = qr_image_url(&qr(), &target);
        assert!(url
            .as_str()
            .contains("data=https%3A%2F%2Fmathletter.example.com%2Fevent%3Fref%3DS0042"));
    }

    #[test]
    fn build_rejects_malformed_codes_with_the_format_error() {
        assert_eq!(
            build(&base(), &qr(), "GARBAGE"),
            Err(CodeFormatError::UnknownPrefix)
        );
        assert_eq!(build(&base(), &qr(), ""), Err(CodeFormatError::Empty));
    }

    #[test]
    fn build_normalizes_before_linking() {
        let link = build(&base(), &qr(), " s0042 ").unwrap();
        assert!(link.share_url.ends_with("?ref=S0042"));
        assert!(link.qr_image_url.starts_with("https://api.qrserver.com/"));
    }
}
