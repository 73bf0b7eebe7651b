//! Email canonicalization.

/// Canonicalize an address before storage or lookup.
///
/// Surrounding whitespace is dropped and the domain part (after the last
/// `@`) is lowercased. The local part is left as typed since mailbox names
/// may be case-sensitive. Input without an `@` is only trimmed.
///
/// ```
/// use studybud_accounts::normalize_email;
///
/// assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "Jane.Doe@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    let trimmed = email.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_lowercased() {
        assert_eq!(normalize_email("user@EXAMPLE.org"), "user@example.org");
        assert_eq!(normalize_email("MixedCase@Host.Io"), "MixedCase@host.io");
    }

    #[test]
    fn test_last_at_splits_domain() {
        assert_eq!(normalize_email("\"a@b\"@Quoted.NET"), "\"a@b\"@quoted.net");
    }

    #[test]
    fn test_whitespace_and_missing_at() {
        assert_eq!(normalize_email("\tuser@Example.com\n"), "user@example.com");
        assert_eq!(normalize_email("  NoDomain  "), "NoDomain");
        assert_eq!(normalize_email("   "), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_email(" Person@Mail.Example ");
        assert_eq!(normalize_email(&once), once);
    }
}
