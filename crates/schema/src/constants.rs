//! Key names and limits for the paper/event interchange format.
//!
//! Keys are spelled exactly as they appear in input and exported JSON, including the spaces
//! and slashes some of them carry.

/// Paper key holding the unique paper identifier.
pub const PAPER_CODE_KEY: &str = "paper_code";

/// Optional paper key holding the abstract.
pub const ABSTRACT_KEY: &str = "abstract";

/// Paper key holding the ordered event list.
pub const EVENTS_KEY: &str = "events";

/// Event key holding the immutable source text.
pub const TEXT_KEY: &str = "Text";

/// Event key holding the main action slot.
pub const ACTION_KEY: &str = "Action";

/// Historical spelling of [`ACTION_KEY`].
pub const LEGACY_ACTION_KEY: &str = "Main Action";

/// Event key holding the role mapping.
pub const ARGUMENTS_KEY: &str = "Arguments";

/// Arguments key holding the nested object sub-roles.
pub const OBJECT_KEY: &str = "Object";

/// Event key of the span audit list. Never exported; dropped on load.
pub const ANNOTATIONS_KEY: &str = "annotations";

/// Flat Arguments keys used before objects were nested.
pub const LEGACY_PRIMARY_OBJECT_KEY: &str = "Primary_Object";
pub const LEGACY_SECONDARY_OBJECT_KEY: &str = "Secondary_Object";

/// Object keys of the base/attached object schema.
pub const LEGACY_BASE_OBJECT_KEY: &str = "Base_Object";
pub const LEGACY_ATTACHED_OBJECT_KEY: &str = "Attached_Object";

/// Conventional maximum summary length. Longer summaries are accepted but logged.
pub const SUMMARY_SOFT_LIMIT: usize = 100;

/// Base file name used when the source document had no name.
pub const DEFAULT_EXPORT_BASE_NAME: &str = "annotated_data";

/// Suffix appended to the base name of exported files.
pub const EXPORT_FILE_SUFFIX: &str = "_annotated.json";
