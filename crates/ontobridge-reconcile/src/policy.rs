//! The switches that separate clone mode from merge mode.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Clone,
    Merge,
}

/// One copy engine, two strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub mode: Mode,
    /// Copy super, equivalent and disjoint classes.
    pub copy_structure: bool,
    /// Copy property domains and ranges.
    pub copy_domain_range: bool,
    /// Skip properties carrying the ignore annotation.
    pub honor_ignore: bool,
    /// Resolve class references only to existing counterparts; drop the rest.
    pub drop_unresolved: bool,
    /// Skip restrictions the target class already carries.
    pub dedupe_restrictions: bool,
    /// Pull in every sub-class of a copied class.
    pub eager_sub_classes: bool,
    /// Consult the canonical name map when naming copies.
    pub use_name_map: bool,
    /// Link a source resource to the existing target resource it maps onto.
    pub link_reused: bool,
}

impl Policy {
    pub fn clone_mode() -> Self {
        Self {
            mode: Mode::Clone,
            copy_structure: true,
            copy_domain_range: true,
            honor_ignore: false,
            drop_unresolved: false,
            dedupe_restrictions: false,
            eager_sub_classes: true,
            use_name_map: false,
            link_reused: false,
        }
    }

    pub fn merge_mode() -> Self {
        Self {
            mode: Mode::Merge,
            copy_structure: false,
            copy_domain_range: false,
            honor_ignore: true,
            drop_unresolved: true,
            dedupe_restrictions: true,
            eager_sub_classes: false,
            use_name_map: true,
            link_reused: true,
        }
    }
}
