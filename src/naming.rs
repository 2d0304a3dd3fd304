//! Keyword handling and derivative file naming.
//!
//! Every washed image is named after a keyword plus a short random suffix:
//!
//! ```text
//! winter-heating_k3x9.jpg
//! ^ keyword      ^ 4 chars of [a-z0-9]
//! ```
//!
//! Keywords are assigned round-robin by unit index, so a batch of 10 over
//! three keywords yields `a b c a b c a b c a`. The same keyword feeds the
//! suggested ALT text in the manifest.

use crate::imaging::RandomSource;

/// Characters used for the random filename suffix.
pub const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Suffix length used for derivative filenames.
pub const SUFFIX_LEN: usize = 4;

/// Keyword used when the caller supplies none.
pub const DEFAULT_KEYWORD: &str = "default";

/// Split a comma-separated keyword list, trimming blanks.
///
/// Falls back to `["default"]` when nothing usable remains.
pub fn parse_keywords(input: &str) -> Vec<String> {
    normalize_keywords(input.split(','))
}

/// Trim each keyword and drop the blank ones.
///
/// Falls back to `["default"]` when nothing usable remains.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keywords: Vec<String> = keywords
        .into_iter()
        .filter_map(|k| {
            let k = k.as_ref().trim();
            (!k.is_empty()).then(|| k.to_string())
        })
        .collect();
    if keywords.is_empty() {
        vec![DEFAULT_KEYWORD.to_string()]
    } else {
        keywords
    }
}

/// Keyword for unit `index`, cycling through the list.
pub fn keyword_for(keywords: &[String], index: usize) -> &str {
    if keywords.is_empty() {
        DEFAULT_KEYWORD
    } else {
        &keywords[index % keywords.len()]
    }
}

/// Random `[a-z0-9]` string of `len` characters.
pub fn random_suffix(rng: &mut impl RandomSource, len: usize) -> String {
    let last = (SUFFIX_ALPHABET.len() - 1) as u32;
    (0..len)
        .map(|_| SUFFIX_ALPHABET[rng.uniform_int(0, last) as usize] as char)
        .collect()
}

/// Make a keyword safe to use as a filename stem.
///
/// Path separators and control characters become `-`; everything else,
/// including non-ASCII text, is kept.
pub fn file_stem(keyword: &str) -> String {
    keyword
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// `{keyword}_{suffix}.jpg`
pub fn output_filename(keyword: &str, suffix: &str) -> String {
    format!("{}_{}.jpg", file_stem(keyword), suffix)
}

/// Fill `{keyword}` placeholders in an ALT text template.
pub fn alt_text(template: &str, keyword: &str) -> String {
    template.replace("{keyword}", keyword)
}
