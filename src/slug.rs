pub const MAX_SLUG_LEN: usize = 200;
pub const FALLBACK_SLUG: &str = "course";

/// Lower-cases `input`, keeps ASCII alphanumerics, `_` and `-`, collapses runs of
/// whitespace and hyphens into one `-`, and trims leading/trailing `-` and `_`.
/// Returns an empty string when nothing survives.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        }
    }

    let trimmed = slug.trim_matches(|c| c == '-' || c == '_');
    truncate(trimmed, MAX_SLUG_LEN).to_string()
}

/// Slug derived from a course title, never empty.
pub fn base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// The `n`-th candidate for `base`: `base` itself for 1, then `base-2`, `base-3`, ...
/// The result stays within the column limit.
pub fn candidate(base: &str, n: u32) -> String {
    if n <= 1 {
        return base.to_string();
    }
    let suffix = format!("-{}", n);
    let head = truncate(base, MAX_SLUG_LEN - suffix.len()).trim_end_matches('-');
    format!("{}{}", head, suffix)
}

fn truncate(s: &str, max: usize) -> &str {
    // slugs are ASCII, so byte and char boundaries agree
    if s.len() <= max { s } else { &s[..max] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("AWS Solutions Architect"), "aws-solutions-architect");
        assert_eq!(slugify("  Linux -- Admin  "), "linux-admin");
        assert_eq!(slugify("C# & .NET: 101!"), "c-net-101");
        assert_eq!(slugify("snake_case_title"), "snake_case_title");
        assert_eq!(slugify("_-edge-_"), "edge");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_base_slug_never_empty() {
        assert_eq!(base_slug("???"), "course");
        assert_eq!(base_slug("DevOps"), "devops");
    }

    #[test]
    fn test_candidates() {
        assert_eq!(candidate("devops", 1), "devops");
        assert_eq!(candidate("devops", 2), "devops-2");
        assert_eq!(candidate("devops", 13), "devops-13");

        let long = "a".repeat(MAX_SLUG_LEN);
        let c = candidate(&long, 2);
        assert_eq!(c.len(), MAX_SLUG_LEN);
        assert!(c.ends_with("-2"));
    }
}
