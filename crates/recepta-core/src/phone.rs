//! Sender identifier normalization.
//!
//! Webhook providers report the same contact as bare digits, `+`-prefixed
//! digits, or a chat JID such as `5531999999999@c.us`. Everything is folded
//! into one canonical `+digits` form used for outbound addressing.

/// Minimum length of a canonical phone, `+` included.
/// Anything shorter is rejected by callers as noise.
pub const MIN_CANONICAL_LEN: usize = 12;

/// Canonicalize a raw sender identifier into `+digits`.
///
/// Strips everything at and after the first `@`, then keeps only ASCII
/// digits and prepends `+`. Returns an empty string when no digits remain,
/// which callers treat as "no sender found". Idempotent.
pub fn normalize(raw: &str) -> String {
    let head = raw.trim();
    let head = match head.find('@') {
        Some(at) => &head[..at],
        None => head,
    };

    let digits: String = head.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    format!("+{digits}")
}

/// Sanity check on a canonical phone before it is used for delivery.
pub fn is_plausible(canonical: &str) -> bool {
    canonical.starts_with('+') && canonical.len() >= MIN_CANONICAL_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_digits_get_plus() {
        assert_eq!(normalize("5531999999999"), "+5531999999999");
    }

    #[test]
    fn test_plus_prefixed_unchanged() {
        assert_eq!(normalize("+5531999999999"), "+5531999999999");
    }

    #[test]
    fn test_chat_suffix_stripped() {
        assert_eq!(normalize("5531999999999@c.us"), "+5531999999999");
        assert_eq!(normalize("5531999999999@s.whatsapp.net"), "+5531999999999");
    }

    #[test]
    fn test_punctuation_stripped() {
        assert_eq!(normalize("+55 (31) 99999-9999"), "+5531999999999");
        assert_eq!(normalize("55 31 9 9999 9999"), "+5531999999999");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["5531999999999", "+5531999999999", "5531999999999@c.us"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_empty_and_digitless_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("@c.us"), "");
        assert_eq!(normalize("abc"), "");
        assert_eq!(normalize("+"), "");
    }

    #[test]
    fn test_plausibility_floor() {
        assert!(is_plausible("+5531999999999"));
        assert!(is_plausible("+55319999999")); // exactly 12 chars
        assert!(!is_plausible("+5531999999")); // 11 chars
        assert!(!is_plausible(""));
        assert!(!is_plausible("5531999999999")); // missing +
    }
}
