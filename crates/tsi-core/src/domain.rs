//! # Domain Detection
//!
//! Maps a definition file onto its physics domain via the variable-name
//! prefix convention. Domains group generated schemas into subdirectories
//! and qualify their `$id` URIs. The same variable name may carry a
//! different meaning in a different domain; uniqueness holds only within
//! one file, and the prefix convention keeps the domains apart.

use crate::definition::DefinitionFile;

/// Domain used when no prefix matches.
pub const DEFAULT_DOMAIN: &str = "base";

/// Variable-name prefix → domain, in match order.
const DOMAIN_PREFIXES: &[(&str, &str)] = &[
    ("pf_", "pf_active"),
    ("tf_", "tf_active"),
    ("plasma_", "plasma"),
    ("vessel_", "vessel"),
    ("diag_", "diagnostics"),
    ("eq_", "equilibrium"),
];

/// Detect the physics domain of a definition file from its variable names.
///
/// The first variable whose name matches a known prefix decides; files
/// with no prefixed variables land in [`DEFAULT_DOMAIN`].
pub fn detect_domain(def: &DefinitionFile) -> &'static str {
    for variable in &def.variables {
        for (prefix, domain) in DOMAIN_PREFIXES {
            if variable.name.starts_with(prefix) {
                return domain;
            }
        }
    }
    DEFAULT_DOMAIN
}
