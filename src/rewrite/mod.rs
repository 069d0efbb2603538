//! Request rewriting
//!
//! Runs one request path through the full pipeline:
//!
//! ```text
//! parse -> verify signature -> canonicalize -> extract @format -> serialize -> sign
//! ```
//!
//! Any failure stops the pipeline with a [`RewriteError`]; the caller answers
//! it with 403 Forbidden.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{LogLevel, SigningConfig};
use crate::error::RewriteError;
use crate::metrics::RewriteMetrics;
use crate::options::{extract_target_format, Canonicalizer, OptionRegistry};
use crate::store::{fetch_signing_config, ConfigStore};
use crate::uri::{build_unsigned_path, parse_path, SourceKind};

/// Level of the per-request "rewrote" event, emitted with `tracing::info!`
const REWRITE_EVENT_LEVEL: LogLevel = LogLevel::Info;

/// Level of the per-request "rejected" event, emitted with `tracing::warn!`
const REJECT_EVENT_LEVEL: LogLevel = LogLevel::Warn;

/// Result of a successful rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Canonical option tokens in output order
    pub options: Vec<String>,
    pub source_kind: SourceKind,
    /// Source URL with any `@format` suffix removed
    pub source: String,
    /// Signature segment of the rewritten path (`unsigned` when signing is off)
    pub signature: String,
    /// Full rewritten path, `/{signature}/...`
    pub path: String,
}

/// Outcome handed to the edge runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResponse {
    /// Forward the request with this path
    Rewrite { path: String },
    /// Reject the request
    Forbidden { status: u16, message: String },
}

impl RewriteResponse {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, RewriteResponse::Forbidden { .. })
    }
}

impl From<RewriteError> for RewriteResponse {
    fn from(err: RewriteError) -> Self {
        RewriteResponse::Forbidden {
            status: err.to_http_status(),
            message: err.to_string(),
        }
    }
}

/// Stateless rewriter sharing one option registry across requests
#[derive(Debug, Clone)]
pub struct Rewriter {
    registry: Arc<OptionRegistry>,
}

impl Rewriter {
    pub fn new(registry: Arc<OptionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    /// Rewrite `path` under the given signing settings
    pub fn rewrite(&self, path: &str, signing: &SigningConfig) -> Result<Rewritten, RewriteError> {
        let separator = signing.arguments_separator;
        let parsed = parse_path(path, separator)?;

        if !signing.verify(parsed.signed_message, parsed.signature) {
            return Err(RewriteError::SignatureInvalid);
        }

        let canonicalizer = Canonicalizer::new(&self.registry, separator);
        let mut set = canonicalizer.canonicalize(parsed.options.iter());
        let source = extract_target_format(&canonicalizer, &mut set, parsed.source);

        let options = set.to_tokens(separator);
        let unsigned_path = build_unsigned_path(&options, parsed.source_kind, source);
        let signature = signing.sign(&unsigned_path);
        let path = format!("/{}{}", signature, unsigned_path);

        Ok(Rewritten {
            options,
            source_kind: parsed.source_kind,
            source: source.to_string(),
            signature,
            path,
        })
    }

    /// Fetch the signing record and rewrite `path`
    ///
    /// Every failure, including a missing or unreadable record, becomes
    /// [`RewriteResponse::Forbidden`].
    pub async fn handle(
        &self,
        store: &dyn ConfigStore,
        config_key: &str,
        path: &str,
    ) -> RewriteResponse {
        let start = Instant::now();
        let metrics = RewriteMetrics::global();

        let signing = match fetch_signing_config(store, config_key).await {
            Ok(signing) => signing,
            Err(e) => {
                tracing::error!(
                    config_key = config_key,
                    error = %e,
                    "Failed to load signing configuration"
                );
                metrics.record_rejected(e.kind(), start.elapsed().as_secs_f64());
                return e.into();
            }
        };

        match self.rewrite(path, &signing) {
            Ok(rewritten) => {
                if signing.log_level.enables(REWRITE_EVENT_LEVEL) {
                    tracing::info!(
                        original = path,
                        rewritten = %rewritten.path,
                        options = rewritten.options.len(),
                        "Rewrote request path"
                    );
                }
                metrics.record_rewritten(start.elapsed().as_secs_f64());
                RewriteResponse::Rewrite {
                    path: rewritten.path,
                }
            }
            Err(e) => {
                if signing.log_level.enables(REJECT_EVENT_LEVEL) {
                    tracing::warn!(path = path, reason = e.kind(), "Rejected request");
                }
                metrics.record_rejected(e.kind(), start.elapsed().as_secs_f64());
                e.into()
            }
        }
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(Arc::new(OptionRegistry::default()))
    }
}
