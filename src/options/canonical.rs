//! Ordered canonical option set
//!
//! Maps canonical option keys to their merged arguments while tracking the
//! order in which each key was last touched. Every mutation moves the key to
//! the end, so serialization reflects the most recent write of each option.
//!
//! The order is kept in a slot vector with tombstones: moving a key to the end
//! clears its old slot and pushes a new one, which is O(1). Tombstones are
//! compacted once they outnumber live entries.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionValue {
    /// Plain argument list (replace and concat options)
    Args(Vec<String>),
    /// Sparse slots, empty string meaning unset (positional options)
    Slots(Vec<String>),
}

impl OptionValue {
    /// Flatten to the argument list emitted in the URL
    fn fields(&self) -> &[String] {
        match self {
            OptionValue::Args(args) => args,
            OptionValue::Slots(slots) => {
                let len = slots
                    .iter()
                    .rposition(|slot| !slot.is_empty())
                    .map_or(0, |idx| idx + 1);
                &slots[..len]
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: OptionValue,
    /// Index of this key in `order`
    position: usize,
}

/// Canonical options for a single request
#[derive(Debug, Clone, Default)]
pub struct CanonicalOptionSet {
    entries: HashMap<&'static str, Entry>,
    order: Vec<Option<&'static str>>,
}

impl CanonicalOptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `args`, moving it to the end
    pub fn replace(&mut self, key: &'static str, args: Vec<String>) {
        self.upsert(key, OptionValue::Args(args));
    }

    /// Append `args` to the arguments of `key`, moving it to the end
    pub fn concat(&mut self, key: &'static str, args: Vec<String>) {
        let value = match self.entries.get(key).map(|entry| &entry.value) {
            Some(OptionValue::Args(existing)) | Some(OptionValue::Slots(existing)) => {
                let mut merged = existing.clone();
                merged.extend(args);
                merged
            }
            None => args,
        };
        self.upsert(key, OptionValue::Args(value));
    }

    /// Overlay non-empty `args` onto the slots of `key`, moving it to the end
    ///
    /// Empty arguments leave the existing slot untouched. Slots are never
    /// truncated by a shorter occurrence.
    pub fn merge_positional(&mut self, key: &'static str, args: Vec<String>) {
        let mut slots = match self.entries.get(key).map(|entry| &entry.value) {
            Some(OptionValue::Slots(existing)) | Some(OptionValue::Args(existing)) => {
                existing.clone()
            }
            None => Vec::new(),
        };

        for (idx, arg) in args.into_iter().enumerate() {
            if arg.is_empty() {
                continue;
            }
            if idx >= slots.len() {
                slots.resize(idx + 1, String::new());
            }
            slots[idx] = arg;
        }

        self.upsert(key, OptionValue::Slots(slots));
    }

    fn upsert(&mut self, key: &'static str, value: OptionValue) {
        let position = self.order.len();
        self.order.push(Some(key));

        if let Some(previous) = self.entries.insert(key, Entry { value, position }) {
            self.order[previous.position] = None;
            if self.order.len() > 2 * self.entries.len() + 8 {
                self.compact();
            }
        }
    }

    fn compact(&mut self) {
        self.order.retain(Option::is_some);
        for (position, key) in self.order.iter().enumerate() {
            if let Some(entry) = key.and_then(|key| self.entries.get_mut(key)) {
                entry.position = position;
            }
        }
    }

    /// Keys in serialization order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().flatten().copied()
    }

    /// Merged arguments of `key`, as they will be serialized
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(|entry| entry.value.fields())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to option tokens (`key<sep>arg<sep>arg...`) in order
    ///
    /// An option without arguments is emitted as `key<sep>` so the token
    /// still reads as an option when the path is parsed again.
    pub fn to_tokens(&self, separator: char) -> Vec<String> {
        let sep = separator.to_string();
        self.keys()
            .map(|key| {
                let fields = self.get(key).unwrap_or_default();
                format!("{}{}{}", key, sep, fields.join(&sep))
            })
            .collect()
    }
}
