//! Target format suffix handling
//!
//! A source URL may end with `@<format>` (e.g. `image.jpg@webp`) to request
//! an output format. The suffix is stripped from the source and merged as a
//! `format` option after all explicit options, so it wins both value and
//! position.

use super::canonical::CanonicalOptionSet;
use super::canonicalizer::Canonicalizer;
use super::registry::FORMAT_KEY;

/// Split a trailing `@<format>` suffix off a source URL
///
/// The suffix must be non-empty ASCII alphanumerics and sit after the last
/// `/`, so `user@host` authorities are left alone.
pub fn split_target_format(source: &str) -> (&str, Option<&str>) {
    let Some((base, format)) = source.rsplit_once('@') else {
        return (source, None);
    };

    let is_format = !format.is_empty() && format.chars().all(|c| c.is_ascii_alphanumeric());

    if is_format && !base.is_empty() {
        (base, Some(format))
    } else {
        (source, None)
    }
}

/// Strip the format suffix from `source` and fold it into `set`
///
/// Returns the source URL without its suffix.
pub fn extract_target_format<'s>(
    canonicalizer: &Canonicalizer<'_>,
    set: &mut CanonicalOptionSet,
    source: &'s str,
) -> &'s str {
    let (base, format) = split_target_format(source);
    if let Some(format) = format {
        let token = format!("{}{}{}", FORMAT_KEY, canonicalizer.separator(), format);
        canonicalizer.apply_token(set, &token);
    }
    base
}
