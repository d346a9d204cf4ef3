use chrono::{DateTime, Utc};

// Struct representing the request body for creating a new Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateTodoSchema {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

// Struct representing the request body for partially updating a Todo.
// Nullable fields use a double Option so "absent" (leave untouched) and
// "explicit null" (clear the value) stay distinguishable.
#[derive(Debug, serde::Deserialize)]
pub struct UpdateTodoSchema {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    #[serde(default)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

// Query parameters accepted by the todo listing route
#[derive(Debug, serde::Deserialize)]
pub struct ListTodosParams {
    pub completed: Option<bool>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Completed,
    DueDate,
}

impl SortField {
    // Column names are fixed here, never taken from the request string
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Completed => "completed",
            SortField::DueDate => "due_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateUserSchema {
    pub username: String,
    pub password: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginSchema {
    pub username: String,
    pub password: String,
}

// Aggregate counts over one owner's todos
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub overdue: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_with_only_completed_leaves_other_fields_absent() {
        let body: UpdateTodoSchema = serde_json::from_value(json!({ "completed": true })).unwrap();
        assert_eq!(body.completed, Some(true));
        assert!(body.title.is_none());
        assert!(body.description.is_none());
        assert!(body.due_date.is_none());
    }

    #[test]
    fn update_distinguishes_explicit_null_from_absent() {
        let body: UpdateTodoSchema =
            serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(body.description, Some(None));
        assert!(body.due_date.is_none());

        let body: UpdateTodoSchema =
            serde_json::from_value(json!({ "description": "walk the dog" })).unwrap();
        assert_eq!(body.description, Some(Some("walk the dog".to_string())));
    }

    #[test]
    fn list_params_default_to_created_at_descending() {
        let params: ListTodosParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.completed.is_none());
        assert_eq!(params.sort_by, SortField::CreatedAt);
        assert_eq!(params.sort_order, SortOrder::Desc);
    }

    #[test]
    fn list_params_parse_sort_selection() {
        let params: ListTodosParams =
            serde_json::from_value(json!({ "sort_by": "due_date", "sort_order": "asc" })).unwrap();
        assert_eq!(params.sort_by, SortField::DueDate);
        assert_eq!(params.sort_order, SortOrder::Asc);
    }

    #[test]
    fn sort_enums_map_to_fixed_sql_fragments() {
        assert_eq!(SortField::CreatedAt.column(), "created_at");
        assert_eq!(SortField::Completed.column(), "completed");
        assert_eq!(SortField::DueDate.column(), "due_date");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
    }

    #[test]
    fn create_defaults_created_at_when_omitted() {
        let before = Utc::now();
        let body: CreateTodoSchema =
            serde_json::from_value(json!({ "title": "buy milk" })).unwrap();
        assert!(body.created_at >= before);
        assert!(body.description.is_none());
        assert!(body.due_date.is_none());
    }
}
