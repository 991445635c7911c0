//! Human readable, unique document identifiers.
//!
//! A slug is a transliterated title followed by a time based suffix:
//!
//! ```text
//! hello-world-5-12-811      first attempt
//! hello-world-5-12-811-2    second attempt, after a conflict
//! ```
//!
//! The suffix is `month-day-bits`, where `bits` packs the current minute and
//! second into ten bits. Uniqueness is decided by the store: the allocator
//! only proposes candidates and reacts to conflicts.

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::options::{DEFAULT_MAX_SLUG_ATTEMPTS, DEFAULT_SLUG_MAX_LEN};

static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("separator pattern is valid"));

/// Outcome of a single insert attempt reported by a store
#[derive(Debug, Error)]
pub enum InsertError {
    /// The identifier is already taken
    #[error("identifier already taken")]
    Conflict,

    /// Any other store failure; not retried
    #[error("store failure: {0}")]
    Store(#[source] Box<dyn Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("no free slug after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("store failure: {0}")]
    Store(#[source] Box<dyn Error + Send + Sync>),
}

/// ASCII spelling of a character, for characters outside ASCII
fn transliteration(c: char) -> Option<&'static str> {
    let ascii = match c {
        // Cyrillic
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' | 'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' | 'ў' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shh",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",

        // Latin with diacritics
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        _ => return None,
    };
    Some(ascii)
}

fn push_capitalized(ascii: &str, out: &mut String) {
    let mut chars = ascii.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.push_str(chars.as_str());
    }
}

/// Transliterate text to ASCII words joined by `-`.
///
/// ASCII letters are kept. Known letters are spelled in ASCII,
/// keeping an uppercase initial. Whitespace, `_` and `-` separate words, and
/// everything else is dropped.
///
/// ```rust
/// use telegraphy::transliterate;
///
/// assert_eq!(transliterate("Привет, мир"), "Privet-mir");
/// assert_eq!(transliterate("  Héllo  World! "), "Hello-World");
/// ```
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            out.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            out.push('-');
        } else {
            let lower = c.to_lowercase().next().unwrap_or(c);
            match transliteration(lower) {
                Some(ascii) if c.is_uppercase() => push_capitalized(ascii, &mut out),
                Some(ascii) => out.push_str(ascii),
                None => {}
            }
        }
    }

    SEPARATOR_RUNS
        .replace_all(&out, "-")
        .trim_matches('-')
        .to_string()
}

/// Lowercase transliterated title, the human readable part of a slug
pub fn slug_prefix(title: &str) -> String {
    transliterate(title).to_ascii_lowercase()
}

/// Time based suffix for the given attempt, counting from 1.
///
/// The attempt number is appended from the second attempt on.
pub fn slug_suffix(now: &DateTime<Utc>, attempt: u32) -> String {
    let bits = ((now.second() & 0b11_1111) + (now.minute() << 6)) & 0b11_1111_1111;
    let suffix = format!("{}-{}-{}", now.month(), now.day(), bits);
    if attempt > 1 {
        format!("{suffix}-{attempt}")
    } else {
        suffix
    }
}

/// Proposes slug candidates until a store accepts one
pub struct SlugAllocator {
    max_len: usize,
    max_attempts: u32,
    clock: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl fmt::Debug for SlugAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlugAllocator")
            .field("max_len", &self.max_len)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Default for SlugAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_SLUG_MAX_LEN, DEFAULT_MAX_SLUG_ATTEMPTS)
    }

    pub fn with_limits(max_len: usize, max_attempts: u32) -> Self {
        Self {
            max_len,
            max_attempts,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the time source used for suffixes
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Build the candidate for one attempt.
    ///
    /// The prefix is cut so that the whole slug fits in `max_len`; an empty
    /// prefix yields the bare suffix.
    pub fn candidate(&self, prefix: &str, now: &DateTime<Utc>, attempt: u32) -> String {
        let suffix = slug_suffix(now, attempt);
        let keep = self.max_len.saturating_sub(suffix.len() + 1);
        // prefixes are ASCII, any index is a char boundary
        let head = prefix.get(..keep).unwrap_or(prefix).trim_end_matches('-');
        if head.is_empty() {
            suffix
        } else {
            format!("{head}-{suffix}")
        }
    }

    /// Allocate a slug for `title`, calling `persist` with each candidate.
    ///
    /// A [`InsertError::Conflict`] moves on to the next attempt; any other
    /// failure is returned as is. The returned slug is the one `persist`
    /// accepted.
    pub fn allocate<F>(&self, title: &str, mut persist: F) -> Result<String, AllocationError>
    where
        F: FnMut(&str) -> Result<(), InsertError>,
    {
        let prefix = slug_prefix(title);

        for attempt in 1..=self.max_attempts {
            let now = (self.clock)();
            let candidate = self.candidate(&prefix, &now, attempt);
            tracing::debug!(slug = %candidate, attempt, "trying slug");

            match persist(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(InsertError::Conflict) => {
                    tracing::warn!(slug = %candidate, attempt, "slug already taken");
                }
                Err(InsertError::Store(source)) => return Err(AllocationError::Store(source)),
            }
        }

        tracing::warn!(
            prefix = %prefix,
            attempts = self.max_attempts,
            "slug allocation exhausted"
        );
        Err(AllocationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Allocate a slug with the default limits and the system clock
pub fn allocate_slug<F>(title: &str, persist: F) -> Result<String, AllocationError>
where
    F: FnMut(&str) -> Result<(), InsertError>,
{
    SlugAllocator::new().allocate(title, persist)
}
