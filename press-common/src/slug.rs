//! URL slug normalisation
//!
//! Slugs are lowercase ASCII words joined by single hyphens. Common Latin
//! diacritics are transliterated, `&` reads as "and", separators
//! (whitespace, hyphen, underscore, slash) collapse to one hyphen and any
//! other punctuation is dropped. Characters with no ASCII spelling vanish,
//! so a slug can come out empty.

use url::Url;

/// Build a slug from free text, a title, or a permalink
///
/// Absolute http(s) URLs are reduced to their last non-empty path segment
/// first, so `https://example.com/2020/01/hello-world/` gives `hello-world`.
pub fn create_slug(text: &str) -> String {
    let source = permalink_segment(text).unwrap_or_else(|| text.to_string());

    let mut slug = String::with_capacity(source.len());
    let mut pending_separator = false;

    for ch in source.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            push_word(&mut slug, &mut pending_separator, ch.encode_utf8(&mut [0; 4]));
        } else if is_separator(ch) {
            pending_separator = true;
        } else if let Some(ascii) = transliterate(ch) {
            push_word(&mut slug, &mut pending_separator, ascii);
        }
    }

    slug
}

fn push_word(slug: &mut String, pending_separator: &mut bool, word: &str) {
    // "&" spells a whole word
    let standalone = word == "and";
    if (*pending_separator || standalone) && !slug.is_empty() && !slug.ends_with('-') {
        slug.push('-');
    }
    slug.push_str(word);
    *pending_separator = standalone;
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '-' | '_' | '/' | '\\' | '|')
}

/// Last non-empty path segment of an absolute http(s) URL
fn permalink_segment(text: &str) -> Option<String> {
    let url = Url::parse(text.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let segment = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?
        .to_string();

    Some(segment)
}

fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        '&' => "and",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}
