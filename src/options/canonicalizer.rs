//! Option canonicalization
//!
//! Turns the raw option tokens of a request into a [`CanonicalOptionSet`]:
//! names are resolved through the registry, meta options are expanded into
//! their atomic components, arguments are normalized and repeated options are
//! merged according to their [`MergeStrategy`].
//!
//! Unknown option names are dropped without error so that new or misspelled
//! options never block a request.

use super::canonical::CanonicalOptionSet;
use super::registry::{MergeStrategy, OptionDefinition, OptionKind, OptionRegistry};

/// Boolean argument spellings that normalize to "1"
const TRUTHY: [&str; 3] = ["1", "t", "true"];

/// Merge engine bound to a registry and an argument separator
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer<'a> {
    registry: &'a OptionRegistry,
    separator: char,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(registry: &'a OptionRegistry, separator: char) -> Self {
        Self {
            registry,
            separator,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Canonicalize an ordered run of option tokens
    pub fn canonicalize<I, S>(&self, tokens: I) -> CanonicalOptionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = CanonicalOptionSet::new();
        for token in tokens {
            self.apply_token(&mut set, token.as_ref());
        }
        set
    }

    /// Merge a single raw token (`name<sep>arg<sep>arg...`) into `set`
    pub fn apply_token(&self, set: &mut CanonicalOptionSet, token: &str) {
        let mut fields = token.split(self.separator);
        let name = fields.next().unwrap_or_default();
        let args: Vec<&str> = fields.collect();

        let Some(def) = self.registry.lookup(name) else {
            tracing::debug!(option = name, "Dropping unrecognized option");
            return;
        };

        match def.kind {
            OptionKind::Meta { components } => self.expand_meta(set, def, components, &args),
            OptionKind::Atomic => self.merge_atomic(set, def, &args),
        }
    }

    /// Fan a meta option out into one atomic token per component
    ///
    /// Every component but the last takes a single argument and is skipped
    /// when that argument is empty or missing. The last component takes the
    /// remaining tail verbatim, even when its first field is empty.
    fn expand_meta(
        &self,
        set: &mut CanonicalOptionSet,
        meta: &OptionDefinition,
        components: &[&str],
        args: &[&str],
    ) {
        let last = components.len().saturating_sub(1);

        for (idx, key) in components.iter().enumerate() {
            let Some(component) = self.registry.component(key) else {
                tracing::warn!(meta = meta.key, component = key, "Meta component not in registry");
                continue;
            };

            if idx < last {
                match args.get(idx) {
                    Some(arg) if !arg.is_empty() => self.merge_atomic(set, component, &[*arg]),
                    _ => {}
                }
            } else if idx < args.len() {
                let tail = args[idx..].join(&self.separator.to_string());
                let tail_args: Vec<&str> = tail.split(self.separator).collect();
                self.merge_atomic(set, component, &tail_args);
            }
        }
    }

    fn merge_atomic(
        &self,
        set: &mut CanonicalOptionSet,
        def: &'static OptionDefinition,
        args: &[&str],
    ) {
        let args = normalize_args(def, args);
        match def.merge {
            MergeStrategy::Replace => set.replace(def.key, args),
            MergeStrategy::Concat => set.concat(def.key, args),
            MergeStrategy::Positional => set.merge_positional(def.key, args),
        }
    }
}

/// Normalize boolean slots and case of an atomic option's arguments
///
/// Boolean slots become "1" for `1`, `t` or `true` (any case) and "0" for
/// anything else. Positional options keep empty boolean slots empty, since an
/// empty field there means "leave unchanged".
pub fn normalize_args(def: &OptionDefinition, args: &[&str]) -> Vec<String> {
    args.iter()
        .enumerate()
        .map(|(idx, arg)| {
            if def.boolean_slots.contains(&idx) {
                if arg.is_empty() && def.merge == MergeStrategy::Positional {
                    String::new()
                } else {
                    normalize_bool(arg).to_string()
                }
            } else if def.case_sensitive {
                arg.to_string()
            } else {
                arg.to_lowercase()
            }
        })
        .collect()
}

/// Map boolean argument text to "1" or "0"
pub fn normalize_bool(value: &str) -> &'static str {
    if TRUTHY.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        "1"
    } else {
        "0"
    }
}
