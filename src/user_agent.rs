//! User-Agent string sent with every search and asset request.
//!
//! The upstream API asks bots to identify themselves with a contact point, so
//! the product token, a mailbox, and a project URL all travel in one header.

/// Product token and version for User-Agent identification.
const PRODUCT: &str = "DCBot/1.0";

/// Mailbox the upstream operators can use to reach the bot owner.
const CONTACT_EMAIL: &str = "dcbot@bip.filippo.io";

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/FiloSottile/mostly-harmless/tree/master/dcbot";

/// Default User-Agent for both search and asset requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    format!("{PRODUCT} <{CONTACT_EMAIL}> ({PROJECT_UA_URL})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_starts_with_product_token() {
        let ua = default_user_agent();
        assert!(ua.starts_with("DCBot/1.0 "), "unexpected UA: {ua}");
    }

    #[test]
    fn test_user_agent_carries_contact_point() {
        let ua = default_user_agent();
        assert!(
            ua.contains(&format!("<{CONTACT_EMAIL}>")),
            "UA must contain contact mailbox: {ua}"
        );
        assert!(ua.contains(PROJECT_UA_URL), "UA must contain project URL: {ua}");
    }

    #[test]
    fn test_user_agent_is_valid_header_value() {
        let ua = default_user_agent();
        assert!(reqwest::header::HeaderValue::from_str(&ua).is_ok());
    }
}
