//! Processing option canonicalization
//!
//! Image requests carry their processing options as path segments:
//!
//! ```text
//! /{signature}/resize:fit:300:200/quality:80/plain/https://example.com/image.jpg@webp
//! ```
//!
//! The same request can be spelled many ways (long or short names, repeated
//! options, meta options such as `resize` that bundle several others). This
//! module reduces any spelling to one canonical option sequence so that
//! equivalent requests share a cache key:
//!
//! ```text
//! rt:fit/w:300/h:200/q:80/f:webp
//! ```

pub mod canonical;
pub mod canonicalizer;
pub mod registry;
pub mod target_format;

pub use canonical::CanonicalOptionSet;
pub use canonicalizer::{normalize_args, normalize_bool, Canonicalizer};
pub use registry::{MergeStrategy, OptionDefinition, OptionKind, OptionRegistry, DEFINITIONS};
pub use target_format::{extract_target_format, split_target_format};
