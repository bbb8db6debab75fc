//! Title to slug derivation.
//!
//! Cyrillic text is transliterated into Latin letters, separators collapse into single
//! hyphens, and anything else that is not URL-safe is dropped. The output only ever
//! contains `[a-z0-9-]`.

/// Upper bound on a slug, matching the `notes.slug` column.
pub const SLUG_MAX_LENGTH: usize = 100;

/// Derives a URL-safe slug from `title`.
///
/// ```
/// assert_eq!(newsnotes::slug::slugify("Заголовок"), "zagolovok");
/// assert_eq!(newsnotes::slug::slugify("Новый заголовок"), "novyij-zagolovok");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title
        .to_lowercase()
        .replace("&amp;", " and ")
        .replace('&', " and ");

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;
    for ch in lowered.chars() {
        if ch == '-' || ch.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if pending_separator {
            slug.push('-');
            pending_separator = false;
        }
        match ch {
            'a'..='z' | '0'..='9' => slug.push(ch),
            _ => slug.push_str(transliterate(ch)),
        }
    }
    if pending_separator {
        slug.push('-');
    }

    slug.chars().take(SLUG_MAX_LENGTH).collect()
}

/// Latin replacement for a lowercased non-ASCII character; empty when it is dropped.
fn transliterate(ch: char) -> &'static str {
    match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ы' => "yi",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Hard and soft signs have no Latin counterpart.
        'ъ' | 'ь' => "",
        // Typographic dashes are mapped after separators have collapsed.
        '–' | '—' | '‒' | '−' => "-",
        _ => "",
    }
}
