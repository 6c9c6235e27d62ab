//! Collision-free file name allocation.
//!
//! A desired name that is already taken gets a numeric suffix one past the
//! highest suffix in use for the same prefix and extension:
//!
//! ```text
//! Section0001.xhtml + {Section0001.xhtml, Section0099.xhtml} -> Section0100.xhtml
//! chapter.xhtml     + {chapter.xhtml}                        -> chapter0001.xhtml
//! ```
//!
//! The zero-padding width is copied from the winning suffix, so a book that
//! numbers its sections `Section0001` keeps doing so.

use regex::RegexBuilder;

/// Width used when no existing name carries a numeric suffix
const DEFAULT_SUFFIX_WIDTH: usize = 4;

/// Return `desired` unchanged if no name in `existing` matches it
/// case-insensitively, otherwise the next free suffixed variant.
///
/// The result is only unique with respect to `existing`; callers sharing
/// the name space across threads must allocate and insert under one lock.
pub fn unique_filename<S: AsRef<str>>(
    desired: &str,
    existing: &[S],
) -> Result<String, regex::Error> {
    let taken = |name: &str| {
        existing
            .iter()
            .any(|e| e.as_ref().to_lowercase() == name.to_lowercase())
    };

    if !taken(desired) {
        return Ok(desired.to_string());
    }

    let (base, extension) = match desired.split_once('.') {
        Some((base, extension)) => (base, Some(extension)),
        None => (desired, None),
    };
    let prefix = base.trim_end_matches(|c: char| c.is_ascii_digit());

    let pattern = match extension {
        Some(ext) => format!(
            "^{}([0-9]*)\\.{}$",
            regex::escape(prefix),
            regex::escape(ext)
        ),
        None => format!("^{}([0-9]*)$", regex::escape(prefix)),
    };
    let search = RegexBuilder::new(&pattern).case_insensitive(true).build()?;

    let mut highest: Option<(u64, usize)> = None;
    for name in existing {
        let Some(captures) = search.captures(name.as_ref()) else {
            continue;
        };
        let Some(digits) = captures.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Ok(value) = digits.parse::<u64>() else {
            continue;
        };
        if highest.map_or(true, |(max, _)| value > max) {
            highest = Some((value, digits.len()));
        }
    }

    let (max, width) = highest.unwrap_or((0, DEFAULT_SUFFIX_WIDTH));
    let suffixed = |n: u64, width: usize| {
        let mut name = format!("{prefix}{n:0width$}");
        if let Some(ext) = extension {
            name.push('.');
            name.push_str(ext);
        }
        name
    };

    if let Some(next) = max.checked_add(1) {
        let name = suffixed(next, width);
        if !taken(&name) {
            return Ok(name);
        }
    }

    // The highest suffix is exhausted; take the lowest free one instead.
    let mut next: u64 = 1;
    loop {
        let name = suffixed(next, DEFAULT_SUFFIX_WIDTH);
        if !taken(&name) {
            return Ok(name);
        }
        next += 1;
    }
}
