use chrono::DateTime;
use regex::Regex;

pub fn slugify(input: &str) -> String {
    let strip = Regex::new(r"[^\w\s-]").unwrap();
    let s = strip.replace_all(&input.to_lowercase(), "").into_owned();

    let collapse = Regex::new(r"[\s_-]+").unwrap();
    let s = collapse.replace_all(&s, "-").into_owned();

    s.trim_matches('-').to_string()
}

/// `2026-02-26T15:00:00Z` becomes `Feb 26, 2026`.
pub fn display_date(verified_at: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(verified_at)
        .ok()
        .map(|date| date.format("%b %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::{display_date, slugify};

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Caboose Commons"), "caboose-commons");
        assert_eq!(slugify("Misha's Coffee"), "mishas-coffee");
        assert_eq!(slugify("3DEN Tysons Corner"), "3den-tysons-corner");
    }

    #[test]
    fn test_separators() {
        assert_eq!(slugify("  the_perch -- tysons  "), "the-perch-tysons");
        assert_eq!(slugify("-leading and trailing-"), "leading-and-trailing");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(slugify("Café & Co."), "café-co");
        assert_eq!(slugify("!@#$%^&*()"), "");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2026-02-26T15:00:00Z").as_deref(), Some("Feb 26, 2026"));
        assert_eq!(display_date("2026-03-05T09:30:00-05:00").as_deref(), Some("Mar 5, 2026"));
        assert_eq!(display_date("last week"), None);
    }
}
