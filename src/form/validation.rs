//! Field validation for the company form

/// Inline message shown next to a malformed email
pub const INVALID_EMAIL: &str = "Неправильный email";

const LOCAL_PART_SYMBOLS: &str = ".!#$%&'*+/=?^_`{|}~-";

/// Structural email check.
///
/// Accepts `local@domain` where the local part uses letters, digits and
/// `.!#$%&'*+/=?^_`{|}~-`, and the domain is one or more non-empty labels of
/// letters, digits and `-` separated by dots.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SYMBOLS.contains(c));

    let domain_ok = domain
        .split('.')
        .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));

    local_ok && domain_ok
}

/// Error message for an email input, if any. Blank inputs are not flagged.
pub fn email_error(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() || is_valid_email(value) {
        None
    } else {
        Some(INVALID_EMAIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@mail.example-host.ru"));
        assert!(is_valid_email("root@localhost"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@b..co"));
        assert!(!is_valid_email("a@b.co."));
        assert!(!is_valid_email("a@b@c"));
        assert!(!is_valid_email("иван@почта.рф"));
    }

    #[test]
    fn test_email_error_message() {
        assert_eq!(email_error("not-an-email"), Some(INVALID_EMAIL));
        assert_eq!(email_error("a@b.co"), None);
        assert_eq!(email_error(""), None);
    }
}
