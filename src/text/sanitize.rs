//! Text normalization applied before tokenization
//!
//! Collected posts carry markup leftovers, tracking links and non-ASCII
//! letters. Each step here removes one kind of noise; [`normalize`] chains
//! them into the lowercase ASCII form the tokenizer splits on.

use regex::Regex;
use std::sync::LazyLock;

// Only tag-shaped spans; "<3" or "under <20 ... >" in plain posts stay text
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)</?[a-zA-Z][a-zA-Z0-9]*(?:\s[^<>]{0,200})?/?>|<!--.*?-->").unwrap()
});

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:[a-z][a-z0-9+.\-]*://|www\.)\S+").unwrap());

static TRACKING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[?&]?\b(?:utm_[a-z]+|fbclid|gclid|igshid|mc_cid|mc_eid|ref_src|si)=\S*")
        .unwrap()
});

static ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&(?:#x?[0-9a-f]{1,6}|[a-z][a-z0-9]{1,7});").unwrap());

static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#@/\\|_]").unwrap());

static NON_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\-\s]").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize raw document text into lowercase ASCII words separated by single spaces
///
/// Steps, in order:
/// 1. Remove zero-width characters
/// 2. Strip HTML tags and decode/strip HTML entities
/// 3. Transliterate to ASCII and lowercase
/// 4. Strip URLs and tracking-parameter fragments
/// 5. Replace separators and punctuation with whitespace
/// 6. Collapse whitespace
///
/// # Examples
///
/// ```
/// use trendline::text::sanitize::normalize;
///
/// let clean = normalize("Café &amp; Crème: see https://x.co/a?utm_source=feed");
/// assert_eq!(clean, "cafe creme see");
/// ```
pub fn normalize(text: &str) -> String {
    let mut result = remove_zero_width(text);
    result = strip_html_tags(&result);
    result = decode_html_entities(&result);
    result = strip_entity_remnants(&result);
    result = transliterate(&result);
    result = strip_urls(&result);
    result = strip_tracking_params(&result);

    let result = SEPARATOR_REGEX.replace_all(&result, " ");
    let result = NON_TOKEN_REGEX.replace_all(&result, " ");
    WHITESPACE_REGEX.replace_all(&result, " ").trim().to_string()
}

/// Remove zero-width spaces and similar invisible characters
///
/// # Examples
///
/// ```
/// use trendline::text::sanitize::remove_zero_width;
///
/// assert_eq!(remove_zero_width("air\u{200B}fryer\u{FEFF}"), "airfryer");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2028}'..='\u{202F}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Replace HTML tags with a space so adjacent words stay apart
pub fn strip_html_tags(text: &str) -> String {
    TAG_REGEX.replace_all(text, " ").into_owned()
}

/// Decode common HTML entities to plain text
pub fn decode_html_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#xa0;", " ")
        .replace("&#160;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
}

/// Remove any entity left after decoding (`&hellip;`, `&#8217;`, ...)
pub fn strip_entity_remnants(text: &str) -> String {
    ENTITY_REGEX.replace_all(text, " ").into_owned()
}

/// Transliterate to the closest ASCII spelling and lowercase
///
/// # Examples
///
/// ```
/// use trendline::text::sanitize::transliterate;
///
/// assert_eq!(transliterate("Jalapeño Crème BRÛLÉE"), "jalapeno creme brulee");
/// ```
pub fn transliterate(text: &str) -> String {
    deunicode::deunicode(text).to_lowercase()
}

/// Remove URL-like substrings
pub fn strip_urls(text: &str) -> String {
    URL_REGEX.replace_all(text, " ").into_owned()
}

/// Remove query-string tracking fragments that survive outside URLs
pub fn strip_tracking_params(text: &str) -> String {
    TRACKING_REGEX.replace_all(text, " ").into_owned()
}
