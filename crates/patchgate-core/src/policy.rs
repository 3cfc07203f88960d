//! Project conventions enforced by the gate.
//!
//! These constants pin the guarded repository's layout and the deprecated
//! surfaces new code must not touch. They are process-wide configuration; the
//! rules in [`crate::rules`] read them and nothing else.

/// Pathspec limiting added-line extraction to implementation sources.
pub const SOURCE_GLOB: &str = "*.py";

/// Legacy per-file style manifest; must not grow.
pub const MANIFEST_FILE: &str = "tools/cpep8.manifest";

/// Legacy style blacklist; must not grow.
pub const BLACKLIST_FILE: &str = "tools/cpep8.blacklist";

/// Directory holding radio driver modules.
pub const DRIVERS_DIR: &str = "chirp/drivers/";

/// Directory holding driver test fixtures.
pub const TEST_IMAGES_DIR: &str = "tests/images/";

/// Generated localization directory, regenerated by [`REGEN_COMMAND`].
pub const LOCALE_DIR: &str = "chirp/locale";

/// Command that rebuilds the localization templates in place.
pub const REGEN_COMMAND: [&str; 3] = ["make", "-C", "chirp/locale"];

/// Diff lines matching this marker are benign churn, not real drift.
pub const LOCALE_TIMESTAMP_MARKER: &str = "POT-Creation-Date";
