use domain::todo::{NewTodo, TodoChanges};
use domain::todo_type::TodoType;
use domain::{PaginationOptions, SortOrder};
use serde::Deserialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "title": "Groceries",
    "type": "checklist",
    "checklist": ["milk", "eggs"]
}))]
pub(crate) struct CreateParams {
    pub(crate) title: String,
    pub(crate) content: Option<String>,
    #[serde(rename = "type", default)]
    pub(crate) todo_type: TodoType,
    /// Item descriptions, only used for checklist to-dos.
    #[serde(default)]
    pub(crate) checklist: Vec<String>,
}

impl From<CreateParams> for NewTodo {
    fn from(params: CreateParams) -> Self {
        NewTodo {
            title: params.title,
            content: params.content,
            todo_type: params.todo_type,
            checklist: params.checklist,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateParams {
    pub(crate) title: String,
    pub(crate) content: Option<String>,
    #[serde(rename = "type", default)]
    pub(crate) todo_type: TodoType,
}

impl From<UpdateParams> for TodoChanges {
    fn from(params: UpdateParams) -> Self {
        TodoChanges {
            title: params.title,
            content: params.content,
            todo_type: params.todo_type,
        }
    }
}

/// Builds list options from raw query parameters such as
/// `?page=2&per_page=10&sort_by=title&order=desc&filters[pinned]=true`.
///
/// Values that don't parse fall back to their defaults rather than rejecting
/// the request; `PaginationOptions::configure` then applies the per-list rules.
pub(crate) fn index_options(query: HashMap<String, String>) -> PaginationOptions {
    let mut page = None;
    let mut per_page = None;
    let mut sort_by = None;
    let mut order = None;
    let mut filters = HashMap::new();

    for (key, value) in query {
        match key.as_str() {
            "page" => page = value.trim().parse::<u64>().ok(),
            "per_page" => per_page = value.trim().parse::<u64>().ok(),
            "sort_by" => sort_by = Some(value),
            "order" => order = Some(sort_order(&value)),
            _ => {
                if let Some(column) = filter_column(&key) {
                    filters.insert(column.to_string(), value);
                }
            }
        }
    }

    PaginationOptions::new(page, per_page, sort_by, order, filters)
}

fn sort_order(value: &str) -> SortOrder {
    if value.trim().eq_ignore_ascii_case("desc") {
        SortOrder::Desc
    } else {
        SortOrder::Asc
    }
}

fn filter_column(key: &str) -> Option<&str> {
    key.strip_prefix("filters[")?
        .strip_suffix(']')
        .filter(|column| !column.is_empty())
}
