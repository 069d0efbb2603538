//! Processing option registry
//!
//! A static table of every processing option the proxy understands. Each
//! definition carries the names it can be spelled with, how repeated
//! occurrences merge, which arguments are booleans and whether argument text
//! keeps its case.
//!
//! The table is built once at startup into an [`OptionRegistry`] and shared
//! read-only by every request.

use std::collections::HashMap;

/// How repeated occurrences of the same option combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Last occurrence wins (value and position)
    Replace,
    /// Arguments of every occurrence are appended in order
    Concat,
    /// Sparse slot-indexed accumulation; empty arguments leave slots untouched
    Positional,
}

/// Atomic options merge directly; meta options fan out into their components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Atomic,
    Meta {
        /// Canonical keys of the atomic options, in argument order
        components: &'static [&'static str],
    },
}

/// A single processing option definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDefinition {
    /// Short name emitted in canonical output
    pub key: &'static str,
    /// Long input spelling
    pub full_name: &'static str,
    /// Additional input spelling, if any
    pub alt_name: Option<&'static str>,
    /// Only available with the extended option set
    pub restricted: bool,
    pub kind: OptionKind,
    pub merge: MergeStrategy,
    /// Argument indices normalized to "1"/"0"
    pub boolean_slots: &'static [usize],
    /// Keep argument text as given instead of lowercasing it
    pub case_sensitive: bool,
}

impl OptionDefinition {
    const fn atomic(key: &'static str, full_name: &'static str) -> Self {
        Self {
            key,
            full_name,
            alt_name: None,
            restricted: false,
            kind: OptionKind::Atomic,
            merge: MergeStrategy::Replace,
            boolean_slots: &[],
            case_sensitive: false,
        }
    }

    const fn meta(
        key: &'static str,
        full_name: &'static str,
        components: &'static [&'static str],
    ) -> Self {
        Self {
            kind: OptionKind::Meta { components },
            ..Self::atomic(key, full_name)
        }
    }

    const fn alt(self, alt_name: &'static str) -> Self {
        Self {
            alt_name: Some(alt_name),
            ..self
        }
    }

    const fn concat(self) -> Self {
        Self {
            merge: MergeStrategy::Concat,
            ..self
        }
    }

    const fn positional(self) -> Self {
        Self {
            merge: MergeStrategy::Positional,
            ..self
        }
    }

    const fn booleans(self, boolean_slots: &'static [usize]) -> Self {
        Self {
            boolean_slots,
            ..self
        }
    }

    const fn case_sensitive(self) -> Self {
        Self {
            case_sensitive: true,
            ..self
        }
    }

    const fn restricted(self) -> Self {
        Self {
            restricted: true,
            ..self
        }
    }

    /// Whether this definition expands into other options
    pub fn is_meta(&self) -> bool {
        matches!(self.kind, OptionKind::Meta { .. })
    }

    /// All input spellings of this option
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        let full_name = (self.full_name != self.key).then_some(self.full_name);
        [Some(self.key), full_name, self.alt_name]
            .into_iter()
            .flatten()
    }
}

type Def = OptionDefinition;

/// The full option vocabulary
pub const DEFINITIONS: &[OptionDefinition] = &[
    // === Resize ===
    Def::meta("rs", "resize", &["rt", "w", "h", "el", "ex"]),
    Def::meta("s", "size", &["w", "h", "el", "ex"]),
    Def::atomic("rt", "resizing_type"),
    Def::atomic("ra", "resizing_algorithm").restricted(),
    Def::atomic("w", "width"),
    Def::atomic("h", "height"),
    Def::atomic("mw", "min-width").alt("min_width"),
    Def::atomic("mh", "min-height").alt("min_height"),
    Def::atomic("z", "zoom").positional(),
    Def::atomic("dpr", "dpr"),
    Def::atomic("el", "enlarge").booleans(&[0]),
    Def::atomic("ex", "extend").booleans(&[0]),
    Def::atomic("exar", "extend_aspect_ratio")
        .alt("extend_ar")
        .booleans(&[0]),
    // === Crop ===
    Def::atomic("g", "gravity"),
    Def::atomic("c", "crop"),
    Def::atomic("t", "trim").positional().booleans(&[2, 3]),
    Def::atomic("pd", "padding").positional(),
    Def::atomic("ar", "auto_rotate").booleans(&[0]),
    Def::atomic("rot", "rotate"),
    // === Effects ===
    Def::atomic("bg", "background"),
    Def::atomic("bga", "background_alpha").restricted(),
    Def::meta("a", "adjust", &["br", "co", "sa"]).restricted(),
    Def::atomic("br", "brightness").restricted(),
    Def::atomic("co", "contrast").restricted(),
    Def::atomic("sa", "saturation").restricted(),
    Def::atomic("bl", "blur"),
    Def::atomic("sh", "sharpen"),
    Def::atomic("pix", "pixelate"),
    Def::atomic("ush", "unsharp_masking").positional().restricted(),
    Def::atomic("bd", "blur_detections").restricted(),
    Def::atomic("dd", "draw_detections").booleans(&[0]).restricted(),
    Def::atomic("gr", "gradient").positional().restricted(),
    // === Watermark ===
    Def::atomic("wm", "watermark").positional(),
    Def::atomic("wmu", "watermark_url").case_sensitive().restricted(),
    Def::atomic("wmt", "watermark_text").case_sensitive().restricted(),
    Def::atomic("wms", "watermark_size").positional().restricted(),
    Def::atomic("wmsh", "watermark_shadow").restricted(),
    Def::atomic("st", "style").case_sensitive().restricted(),
    // === Metadata ===
    Def::atomic("sm", "strip_metadata").booleans(&[0]),
    Def::atomic("kcr", "keep_copyright").booleans(&[0]),
    Def::atomic("scp", "strip_color_profile").booleans(&[0]),
    Def::atomic("eth", "enforce_thumbnail").booleans(&[0]),
    // === Output ===
    Def::atomic("q", "quality"),
    Def::atomic("fq", "format_quality").concat(),
    Def::atomic("aq", "autoquality").positional().restricted(),
    Def::atomic("mb", "max_bytes"),
    Def::atomic("jpgo", "jpeg_options")
        .positional()
        .booleans(&[0, 2, 3, 4])
        .restricted(),
    Def::atomic("pngo", "png_options")
        .positional()
        .booleans(&[0])
        .restricted(),
    Def::atomic("webpo", "webp_options").restricted(),
    Def::atomic("f", "format").alt("ext"),
    Def::atomic("pg", "page").restricted(),
    Def::atomic("pgs", "pages").restricted(),
    Def::atomic("da", "disable_animation")
        .booleans(&[0])
        .restricted(),
    Def::atomic("vts", "video_thumbnail_second").restricted(),
    Def::atomic("fiu", "fallback_image_url")
        .case_sensitive()
        .restricted(),
    // === Behaviour ===
    Def::atomic("skp", "skip_processing").concat(),
    Def::atomic("raw", "raw").booleans(&[0]),
    Def::atomic("cb", "cachebuster").case_sensitive(),
    Def::atomic("exp", "expires"),
    Def::atomic("fn", "filename").booleans(&[1]).case_sensitive(),
    Def::atomic("att", "return_attachment").booleans(&[0]),
    Def::atomic("pr", "preset").concat().case_sensitive(),
    Def::atomic("hs", "hashsum").restricted(),
    // === Source limits ===
    Def::atomic("msr", "max_src_resolution"),
    Def::atomic("msfs", "max_src_file_size"),
    Def::atomic("maf", "max_animation_frames"),
    Def::atomic("mafr", "max_animation_frame_resolution"),
    Def::atomic("mrd", "max_result_dimension").restricted(),
];

/// Canonical key of the output format option
pub const FORMAT_KEY: &str = "f";

/// Name-indexed view over [`DEFINITIONS`]
///
/// Restricted definitions are left out of the index entirely unless the
/// extended option set is enabled, so their names are simply unknown.
#[derive(Debug, Clone)]
pub struct OptionRegistry {
    by_name: HashMap<&'static str, &'static OptionDefinition>,
    extended: bool,
}

impl OptionRegistry {
    /// Build the registry from the built-in table
    pub fn new(extended: bool) -> Self {
        Self::from_definitions(DEFINITIONS, extended)
    }

    /// Build a registry over an arbitrary table
    pub fn from_definitions(definitions: &'static [OptionDefinition], extended: bool) -> Self {
        let mut by_name = HashMap::with_capacity(definitions.len() * 2);

        for def in definitions {
            if def.restricted && !extended {
                continue;
            }
            for name in def.names() {
                if by_name.insert(name, def).is_some() {
                    tracing::warn!(name, key = def.key, "Duplicate option name in registry");
                }
            }
        }

        Self { by_name, extended }
    }

    /// Resolve any spelling of an option name
    pub fn lookup(&self, name: &str) -> Option<&'static OptionDefinition> {
        self.by_name.get(name).copied()
    }

    /// Resolve a meta component by canonical key
    ///
    /// Only atomic definitions are returned, so a meta option can never
    /// expand into another meta option.
    pub fn component(&self, key: &str) -> Option<&'static OptionDefinition> {
        self.lookup(key)
            .filter(|def| def.key == key && !def.is_meta())
    }

    /// Whether restricted options are available
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Number of distinct definitions reachable through this registry
    pub fn len(&self) -> usize {
        let mut keys: Vec<&str> = self.by_name.values().map(|def| def.key).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for OptionRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}
