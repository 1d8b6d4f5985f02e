//! URL slugs for blog posts and legal pages.

pub const MAX_SLUG_LENGTH: usize = 255;

/// Lowercase ASCII slug: alphanumerics kept, every other run of characters
/// collapsed to a single `-`, no leading or trailing dash.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Append a numeric suffix used when a slug is already taken.
pub fn with_suffix(slug: &str, n: u32) -> String {
    format!("{slug}-{n}")
}

/// Slug shape accepted from clients.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Buying Your First Home"), "buying-your-first-home");
        assert_eq!(slugify("  5 Tips: Kathmandu & Pokhara!  "), "5-tips-kathmandu-pokhara");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn slugify_output_is_valid() {
        let slug = slugify("Privacy Policy (2025)");
        assert_eq!(slug, "privacy-policy-2025");
        assert!(is_valid_slug(&slug));
        assert!(is_valid_slug(&with_suffix(&slug, 2)));
    }

    #[test]
    fn invalid_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Has Caps"));
        assert!(!is_valid_slug("-leading"));
    }

    #[test]
    fn long_input_truncated() {
        let slug = slugify(&"ab ".repeat(200));
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }
}
