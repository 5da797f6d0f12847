//! Show title canonicalization.
//!
//! Market labels arrive in forms like "Stranger Things: Season 5" or
//! "Wednesday 2" while every data provider wants the bare show name. The
//! canonical title is the join key for the whole pipeline, so the rules here
//! must match what the rendering layer does with the same labels.

/// Normalizes a raw market label into a canonical show title.
///
/// Rules, applied in order:
/// 1. Truncate at a case-insensitive `": Season"` marker (any spacing between
///    the colon and the word), keeping the prefix.
/// 2. Strip trailing whitespace-delimited integers ("Wednesday 2" -> "Wednesday").
/// 3. Trim surrounding whitespace.
///
/// Total and idempotent: empty input yields an empty output (callers discard
/// those), and re-canonicalizing a canonical title is a no-op.
pub fn canonical_show_title(raw: &str) -> String {
    let mut name = raw;

    if let Some(idx) = season_marker_index(name) {
        name = &name[..idx];
    }

    let mut name = name.trim();
    // Strip every trailing integer token, not just the last one, so the
    // function stays idempotent on labels like "Show 5 5".
    while let Some((head, tail)) = name.rsplit_once(char::is_whitespace) {
        if tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
            break;
        }
        name = head.trim_end();
    }

    name.trim().to_string()
}

/// Finds the byte offset of a `":<spaces>Season"` marker, case-insensitively.
fn season_marker_index(name: &str) -> Option<usize> {
    for (idx, ch) in name.char_indices() {
        if ch != ':' {
            continue;
        }
        let rest = name[idx + 1..].trim_start();
        if rest
            .get(..6)
            .is_some_and(|word| word.eq_ignore_ascii_case("season"))
        {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_season_suffix() {
        assert_eq!(
            canonical_show_title("Stranger Things: Season 5"),
            "Stranger Things"
        );
        assert_eq!(canonical_show_title("The Crown: season 6"), "The Crown");
        assert_eq!(canonical_show_title("Dark:Season 3"), "Dark");
    }

    #[test]
    fn strips_trailing_number() {
        assert_eq!(canonical_show_title("Wednesday 2"), "Wednesday");
        assert_eq!(canonical_show_title("Stranger Things 5"), "Stranger Things");
    }

    #[test]
    fn keeps_numeric_titles() {
        // A title that is nothing but digits has no whitespace-delimited
        // suffix to strip.
        assert_eq!(canonical_show_title("1899"), "1899");
    }

    #[test]
    fn keeps_interior_numbers() {
        assert_eq!(canonical_show_title("9-1-1: Lone Star"), "9-1-1: Lone Star");
    }

    #[test]
    fn total_on_empty_and_whitespace() {
        assert_eq!(canonical_show_title(""), "");
        assert_eq!(canonical_show_title("   "), "");
    }

    #[test]
    fn idempotent() {
        let labels = [
            "Stranger Things: Season 5",
            "Wednesday 2",
            "Show 5 5",
            "1899",
            "",
            "  The Witcher  ",
        ];
        for label in labels {
            let once = canonical_show_title(label);
            assert_eq!(
                canonical_show_title(&once),
                once,
                "not idempotent for {label:?}"
            );
        }
    }

    #[test]
    fn colon_without_season_is_kept() {
        assert_eq!(
            canonical_show_title("Love: Death and Robots"),
            "Love: Death and Robots"
        );
    }
}
