//! Pagination, sorting and filtering options shared by list endpoints.

use crate::error::{EntityApiErrorKind, Error};
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;
pub const DEFAULT_SORT_FIELD: &str = "id";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// How the raw string value of a filter should be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterType {
    Integer,
    Boolean,
    String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    Integer(i64),
    Boolean(bool),
    String(String),
}

/// Options as received from a client. Call `configure` with the sort fields
/// and filters a given list supports before using them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaginationOptions {
    pub page: u64,
    pub per_page: u64,
    pub sort_by: String,
    pub order: SortOrder,
    pub filters: HashMap<String, String>,
    allowed_filters: HashMap<String, FilterType>,
}

impl PaginationOptions {
    pub fn new(
        page: Option<u64>,
        per_page: Option<u64>,
        sort_by: Option<String>,
        order: Option<SortOrder>,
        filters: HashMap<String, String>,
    ) -> Self {
        Self {
            page: page.unwrap_or_default(),
            per_page: per_page.unwrap_or_default(),
            sort_by: sort_by.unwrap_or_default(),
            order: order.unwrap_or_default(),
            filters,
            allowed_filters: HashMap::new(),
        }
    }

    /// Applies defaults, then falls back to the default sort field if `sort_by`
    /// is not allowed and drops every filter that is not allowed.
    pub fn configure(&mut self, allowed_sort_fields: &[&str], allowed_filters: &[(&str, FilterType)]) {
        if self.page == 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.per_page == 0 {
            self.per_page = DEFAULT_PER_PAGE;
        }
        self.per_page = self.per_page.min(MAX_PER_PAGE);

        if !allowed_sort_fields.contains(&self.sort_by.as_str()) {
            if !self.sort_by.is_empty() {
                debug!("Sort field {} not allowed, using {DEFAULT_SORT_FIELD}", self.sort_by);
            }
            self.sort_by = DEFAULT_SORT_FIELD.to_string();
        }

        self.allowed_filters = allowed_filters
            .iter()
            .map(|(column, filter_type)| (column.to_string(), *filter_type))
            .collect();

        let allowed = &self.allowed_filters;
        self.filters.retain(|column, _| allowed.contains_key(column));
    }

    /// Records to skip before the current page. Pages past the addressable
    /// range saturate, which yields an empty page rather than wrapping.
    pub fn offset(&self) -> usize {
        let offset = self.page.saturating_sub(1).saturating_mul(self.per_page);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }

    pub fn limit(&self) -> usize {
        usize::try_from(self.per_page).unwrap_or(usize::MAX)
    }

    /// Parses the filter value for `column` according to its allowed type.
    pub fn convert_filter(&self, column: &str) -> Result<FilterValue, Error> {
        let value = self.filters.get(column).ok_or_else(|| {
            warn!("Invalid filter column: {column}");
            Error::from(EntityApiErrorKind::InvalidQueryTerm)
        })?;

        let filter_type = self.allowed_filters.get(column).ok_or_else(|| {
            warn!("Filter {column} is not allowed");
            Error::from(EntityApiErrorKind::InvalidQueryTerm)
        })?;

        match filter_type {
            FilterType::Integer => value.parse::<i64>().map(FilterValue::Integer).map_err(|err| {
                warn!("Unable to convert filter {column} value {value} to an integer");
                Error {
                    source: Some(Box::new(err)),
                    error_kind: EntityApiErrorKind::InvalidQueryTerm,
                }
            }),
            FilterType::Boolean => Ok(FilterValue::Boolean(!(value == "false" || value == "0"))),
            FilterType::String => Ok(FilterValue::String(value.clone())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub total_count: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub last_page: u64,
    pub first_page: u64,
}

impl PaginationMeta {
    pub fn new(total_count: u64, options: &PaginationOptions) -> Self {
        let per_page = options.per_page.max(1);
        Self {
            total_count,
            current_page: options.page,
            per_page,
            last_page: total_count.div_ceil(per_page).max(1),
            first_page: DEFAULT_PAGE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn configure_applies_defaults() {
        let mut options = PaginationOptions::default();

        options.configure(&["id", "title"], &[]);

        assert_eq!(options.page, 1);
        assert_eq!(options.per_page, 20);
        assert_eq!(options.sort_by, "id");
        assert_eq!(options.order, SortOrder::Asc);
        assert_eq!(options.offset(), 0);
    }

    #[test]
    fn configure_caps_per_page() {
        let mut options = PaginationOptions::new(Some(3), Some(500), None, None, HashMap::new());

        options.configure(&["id"], &[]);

        assert_eq!(options.per_page, MAX_PER_PAGE);
        assert_eq!(options.offset(), 200);
    }

    #[test]
    fn offset_saturates_for_huge_page_numbers() {
        let mut options = PaginationOptions::new(Some(u64::MAX), Some(20), None, None, HashMap::new());

        options.configure(&["id"], &[]);

        assert_eq!(options.offset(), usize::MAX);
        assert_eq!(options.limit(), 20);
    }

    #[test]
    fn configure_replaces_disallowed_sort_field() {
        let mut options = PaginationOptions::new(
            None,
            None,
            Some("password".to_string()),
            Some(SortOrder::Desc),
            HashMap::new(),
        );

        options.configure(&["id", "title"], &[]);

        assert_eq!(options.sort_by, "id");
        assert_eq!(options.order, SortOrder::Desc);
    }

    #[test]
    fn configure_removes_disallowed_filters() {
        let mut options = PaginationOptions::new(
            None,
            None,
            None,
            None,
            filters(&[("id", "1"), ("status", "1"), ("title", "1"), ("pinned", "true")]),
        );

        options.configure(
            &["id"],
            &[("title", FilterType::String), ("pinned", FilterType::Boolean)],
        );

        assert!(!options.filters.contains_key("id"));
        assert!(!options.filters.contains_key("status"));
        assert!(options.filters.contains_key("title"));
        assert!(options.filters.contains_key("pinned"));
    }

    #[test]
    fn convert_filter_parses_by_type() {
        let mut options = PaginationOptions::new(
            None,
            None,
            None,
            None,
            filters(&[
                ("user_id", "7"),
                ("pinned", "0"),
                ("done", "yes"),
                ("title", "groceries"),
                ("bad_int", "seven"),
            ]),
        );
        options.configure(
            &["id"],
            &[
                ("user_id", FilterType::Integer),
                ("pinned", FilterType::Boolean),
                ("done", FilterType::Boolean),
                ("title", FilterType::String),
                ("bad_int", FilterType::Integer),
            ],
        );

        assert_eq!(options.convert_filter("user_id").unwrap(), FilterValue::Integer(7));
        assert_eq!(options.convert_filter("pinned").unwrap(), FilterValue::Boolean(false));
        assert_eq!(options.convert_filter("done").unwrap(), FilterValue::Boolean(true));
        assert_eq!(
            options.convert_filter("title").unwrap(),
            FilterValue::String("groceries".to_string())
        );
        assert_eq!(
            options.convert_filter("bad_int").unwrap_err().error_kind,
            EntityApiErrorKind::InvalidQueryTerm
        );
        assert_eq!(
            options.convert_filter("missing").unwrap_err().error_kind,
            EntityApiErrorKind::InvalidQueryTerm
        );
    }

    #[test]
    fn meta_computes_last_page() {
        let mut options = PaginationOptions::new(Some(2), Some(10), None, None, HashMap::new());
        options.configure(&["id"], &[]);

        let meta = PaginationMeta::new(21, &options);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.first_page, 1);

        let empty = PaginationMeta::new(0, &options);
        assert_eq!(empty.last_page, 1);
    }
}
