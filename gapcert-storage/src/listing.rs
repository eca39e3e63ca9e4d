//! ORDER BY / LIMIT / OFFSET construction for the list queries.
//!
//! Sort fields arrive from request input, so they are never interpolated
//! directly: each entity declares a whitelist mapping API field names to
//! columns, and a primary-key ascending tie-break is always appended so
//! every sort is stable regardless of what the caller asked for.

use gapcert_core::types::listing::SortSpec;

/// A caller-supplied sort field that is not in the entity's whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortField {
    pub field: String,
}

/// Per-entity sortable columns: (API field name, column expression).
pub struct SortColumns {
    pub allowed: &'static [(&'static str, &'static str)],
    /// Appended as the final `ASC` key; typically the primary key.
    pub tiebreak: &'static str,
}

impl SortColumns {
    /// Build an ORDER BY clause (without the `ORDER BY` keyword) from the
    /// requested sort specs, ending with the stable tie-break.
    pub fn order_by(&self, specs: &[SortSpec]) -> Result<String, UnknownSortField> {
        let mut keys = Vec::with_capacity(specs.len() + 1);
        for spec in specs {
            let column = self
                .allowed
                .iter()
                .find(|(name, _)| *name == spec.field)
                .map(|(_, column)| *column)
                .ok_or_else(|| UnknownSortField {
                    field: spec.field.clone(),
                })?;
            keys.push(format!("{column} {}", spec.order.as_sql()));
        }
        keys.push(format!("{} ASC", self.tiebreak));
        Ok(keys.join(", "))
    }
}
