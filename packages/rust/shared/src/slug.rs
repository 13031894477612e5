//! Slug derivation and small text metrics.
//!
//! Slugs are derived deterministically from titles: lowercase, German
//! umlauts transliterated, remaining diacritics folded to their base
//! letter, every other non-alphanumeric run collapsed to a single hyphen,
//! trimmed, and truncated to 60 characters.

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 60;

/// Derive a URL-safe slug from free text.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_hyphen = true; // suppress a leading hyphen

    for ch in text.chars() {
        let mapped: &str = match ch {
            'ä' | 'Ä' => "ae",
            'ö' | 'Ö' => "oe",
            'ü' | 'Ü' => "ue",
            'ß' => "ss",
            _ => {
                let folded = fold_diacritic(ch);
                if let Some(base) = folded {
                    if out.len() < MAX_SLUG_LEN {
                        out.push(base);
                        last_hyphen = false;
                    }
                    continue;
                }
                if ch.is_ascii_alphanumeric() {
                    if out.len() < MAX_SLUG_LEN {
                        out.push(ch.to_ascii_lowercase());
                        last_hyphen = false;
                    }
                    continue;
                }
                // Any other character starts/extends a separator run.
                if !last_hyphen && out.len() < MAX_SLUG_LEN {
                    out.push('-');
                    last_hyphen = true;
                }
                continue;
            }
        };
        if out.len() + mapped.len() <= MAX_SLUG_LEN {
            out.push_str(mapped);
            last_hyphen = false;
        }
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Fold a single accented Latin letter to its unaccented lowercase base.
fn fold_diacritic(ch: char) -> Option<char> {
    let lower = ch.to_lowercase().next().unwrap_or(ch);
    let base = match lower {
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        'š' | 'ś' => 's',
        _ => return None,
    };
    Some(base)
}

/// Make `slug` unique against `existing` by appending `-2`, `-3`, … while
/// keeping the result within [`MAX_SLUG_LEN`].
pub fn dedupe_slug(slug: &str, existing: &[String]) -> String {
    if !existing.iter().any(|s| s == slug) {
        return slug.to_string();
    }
    for n in 2u32.. {
        let suffix = format!("-{n}");
        let keep = MAX_SLUG_LEN.saturating_sub(suffix.len()).min(slug.len());
        let mut candidate = slug[..keep].trim_end_matches('-').to_string();
        candidate.push_str(&suffix);
        if !existing.iter().any(|s| *s == candidate) {
            return candidate;
        }
    }
    unreachable!("u32 suffix space exhausted");
}

/// Estimated read time in minutes at 200 words per minute, at least 1.
pub fn read_time_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    std::cmp::max(1, words.div_ceil(200)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_umlauts_and_spaces() {
        assert_eq!(slugify("Ankern lernen"), "ankern-lernen");
        assert_eq!(slugify("Segeln für Anfänger"), "segeln-fuer-anfaenger");
        assert_eq!(slugify("Größe & Gewicht"), "groesse-gewicht");
    }

    #[test]
    fn slug_has_no_edge_hyphens() {
        assert_eq!(slugify("  Hallo Welt!  "), "hallo-welt");
        assert_eq!(slugify("---x---"), "x");
    }

    #[test]
    fn slug_folds_non_german_diacritics() {
        assert_eq!(slugify("Côte d'Azur Törn"), "cote-d-azur-toern");
        assert_eq!(slugify("São Paulo"), "sao-paulo");
    }

    #[test]
    fn slug_is_bounded() {
        let long = "Segeln ".repeat(30);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(!slug.is_empty());
    }

    #[test]
    fn slug_charset_is_clean() {
        let slug = slugify("Wind: 5 Bft — Kurs 270°!");
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }

    #[test]
    fn dedupe_appends_numeric_suffix() {
        let existing = vec!["ankern-lernen".to_string()];
        assert_eq!(dedupe_slug("ankern-lernen", &existing), "ankern-lernen-2");

        let existing = vec!["ankern-lernen".to_string(), "ankern-lernen-2".to_string()];
        assert_eq!(dedupe_slug("ankern-lernen", &existing), "ankern-lernen-3");
    }

    #[test]
    fn dedupe_is_noop_without_collision() {
        assert_eq!(dedupe_slug("ankern-lernen", &[]), "ankern-lernen");
    }

    #[test]
    fn dedupe_respects_length_bound() {
        let base = "a".repeat(MAX_SLUG_LEN);
        let existing = vec![base.clone()];
        let result = dedupe_slug(&base, &existing);
        assert!(result.len() <= MAX_SLUG_LEN);
        assert!(result.ends_with("-2"));
    }

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(read_time_minutes("kurz"), 1);
        let words = vec!["wort"; 401].join(" ");
        assert_eq!(read_time_minutes(&words), 3);
    }
}
