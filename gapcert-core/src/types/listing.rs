//! Shared request-shaping types for every list surface:
//! limit/offset paging, single- or multi-field sort, filtered totals.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// Paging + sort portion of a list request. Entity-specific filters ride
/// alongside this in each service's filter struct.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
    /// Applied in array order as successive tie-breakers; when non-empty
    /// it wins over the single `sort_field`/`sort_order` pair.
    pub multi_sort: Vec<SortSpec>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            sort_field: None,
            sort_order: None,
            multi_sort: Vec::new(),
        }
    }
}

impl PageRequest {
    /// The effective sort fields, multi-sort first.
    pub fn sort_specs(&self) -> Vec<SortSpec> {
        if !self.multi_sort.is_empty() {
            return self.multi_sort.clone();
        }
        match &self.sort_field {
            Some(field) => vec![SortSpec {
                field: field.clone(),
                order: self.sort_order.unwrap_or(SortOrder::Asc),
            }],
            None => Vec::new(),
        }
    }

    /// Clamp the caller-supplied limit to the configured ceiling.
    pub fn clamp_limit(&mut self, max_limit: u32) {
        if self.limit == 0 || self.limit > max_limit {
            self.limit = max_limit;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginator {
    pub limit: u32,
    pub offset: u32,
    /// Count of rows matching the filters, not the unfiltered table size.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub paginator: Paginator,
}
