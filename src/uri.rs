//! Request path parsing
//!
//! Splits a processing URL path into its parts:
//!
//! ```text
//! /{signature}/{option}/{option}/.../[plain/|enc/]{source}
//! ```
//!
//! A segment belongs to the option run while it contains the argument
//! separator and is not one of the source markers. Everything after the run
//! (minus an optional marker) is the source URL, kept verbatim.

use std::fmt;

use crate::error::RewriteError;

/// How the source URL is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `plain/` prefix, URL as-is
    Plain,
    /// `enc/` prefix, encrypted URL
    Encrypted,
    /// No prefix, base64url-encoded URL
    Base64,
}

impl SourceKind {
    /// Path prefix emitted before the source URL
    pub fn prefix(&self) -> &'static str {
        match self {
            SourceKind::Plain => "plain/",
            SourceKind::Encrypted => "enc/",
            SourceKind::Base64 => "",
        }
    }

    fn from_marker(segment: &str) -> Option<Self> {
        match segment {
            "plain" => Some(SourceKind::Plain),
            "enc" => Some(SourceKind::Encrypted),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Plain => write!(f, "plain"),
            SourceKind::Encrypted => write!(f, "enc"),
            SourceKind::Base64 => write!(f, "base64"),
        }
    }
}

/// A processing path split into its components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest<'a> {
    /// Signature segment as received
    pub signature: &'a str,
    /// Raw option tokens in request order
    pub options: Vec<&'a str>,
    pub source_kind: SourceKind,
    /// Source URL, without the kind prefix
    pub source: &'a str,
    /// Path remainder after the signature (starting with `/`), the bytes the
    /// signature covers
    pub signed_message: &'a str,
}

/// Parse a request path
///
/// Fails with [`RewriteError::MalformedUri`] when the path does not start
/// with `/` or has nothing after the signature, and with
/// [`RewriteError::MissingSignature`] when the signature segment is empty.
pub fn parse_path(path: &str, separator: char) -> Result<ParsedRequest<'_>, RewriteError> {
    let rest = path.strip_prefix('/').ok_or(RewriteError::MalformedUri)?;

    let (signature, payload) = rest.split_once('/').ok_or(RewriteError::MalformedUri)?;
    if signature.is_empty() {
        return Err(RewriteError::MissingSignature);
    }
    if payload.is_empty() {
        return Err(RewriteError::MalformedUri);
    }

    let signed_message = &rest[signature.len()..];

    let mut options = Vec::new();
    let mut remaining = payload;
    let mut source_kind = SourceKind::Base64;

    while let Some((segment, tail)) = remaining.split_once('/') {
        if let Some(kind) = SourceKind::from_marker(segment) {
            source_kind = kind;
            remaining = tail;
            break;
        }
        if !segment.contains(separator) {
            break;
        }
        options.push(segment);
        remaining = tail;
    }

    if remaining.is_empty() {
        return Err(RewriteError::MalformedUri);
    }

    Ok(ParsedRequest {
        signature,
        options,
        source_kind,
        source: remaining,
        signed_message,
    })
}

/// Assemble the path that follows the signature
///
/// The result starts with `/` and is the message to sign.
pub fn build_unsigned_path(options: &[String], source_kind: SourceKind, source: &str) -> String {
    let mut path = String::with_capacity(
        options.iter().map(|o| o.len() + 1).sum::<usize>() + source.len() + 8,
    );
    for option in options {
        path.push('/');
        path.push_str(option);
    }
    path.push('/');
    path.push_str(source_kind.prefix());
    path.push_str(source);
    path
}
