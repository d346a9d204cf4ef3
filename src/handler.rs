use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::{query, query_as};

use crate::{
    auth,
    model::{CurrentUser, Todo, User},
    schema::{CreateTodoSchema, CreateUserSchema, ListTodosParams, LoginSchema, TodoStats, UpdateTodoSchema},
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Multi-user todo API with Rust, SQLX, Postgres, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

// Handler for listing Todo items with optional completion filter and sorting
pub async fn get_todos(
    Query(params): Query<ListTodosParams>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let mut sql = String::from(
        "SELECT id, title, description, created_at, due_date, completed, owner_id FROM todos",
    );
    if params.completed.is_some() {
        sql.push_str(" WHERE completed = $1");
    }
    // Column and direction come from closed enums, never raw request text
    sql.push_str(&format!(
        " ORDER BY {} {}",
        params.sort_by.column(),
        params.sort_order.keyword()
    ));

    let mut todos_query = query_as::<_, Todo>(&sql);
    if let Some(completed) = params.completed {
        todos_query = todos_query.bind(completed);
    }

    let todos_result = todos_query.fetch_all(&data.db).await;
    if todos_result.is_err() {
        // Handle error response if fetching todos fails
        let error_response = serde_json::json!({
            "status": "fail",
            "message": "Something bad happened while fetching all todo items",
        });
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)));
    }

    // Prepare success response with fetched todos
    let todos = todos_result.unwrap();
    let json_response = serde_json::json!({
        "status": "success",
        "results": todos.len(),
        "todos": todos
    });
    Ok((StatusCode::OK, Json(json_response)))
}

// Handler for creating a new Todo owned by the authenticated caller
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateTodoSchema>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // Insert a new Todo into the database
    let todo_result = query_as::<_, Todo>(
        "INSERT INTO todos (title, description, created_at, due_date, completed, owner_id) \
         VALUES ($1, $2, $3, $4, FALSE, $5) \
         RETURNING id, title, description, created_at, due_date, completed, owner_id",
    )
    .bind(body.title)
    .bind(body.description)
    .bind(body.created_at)
    .bind(body.due_date)
    .bind(user.id)
    .fetch_one(&data.db)
    .await;

    // Handle the result and prepare the response
    match todo_result {
        Ok(todo) => {
            let todo_response = json!({"status": "success","data": json!({
                "todo": todo
            })});

            Ok((StatusCode::CREATED, Json(todo_response)))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error","message": format!("{:?}", e)})),
        )),
    }
}

// Handler for partially updating a Todo by ID
pub async fn update_todo(
    Path(id): Path<i32>,
    State(data): State<Arc<AppState>>,
    Json(body): Json<UpdateTodoSchema>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // Load the current record so unset fields stay untouched
    let existing_result = query_as::<_, Todo>(
        "SELECT id, title, description, created_at, due_date, completed, owner_id \
         FROM todos WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&data.db)
    .await;

    let existing = match existing_result {
        Ok(Some(todo)) => todo,
        Ok(None) => {
            // Handle the case when the Todo with the specified ID is not found
            let error_response = serde_json::json!({
                "status": "fail",
                "message": format!("Todo with ID: {} not found", id)
            });
            return Err((StatusCode::NOT_FOUND, Json(error_response)));
        }
        Err(err) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error","message": format!("{:?}", err)})),
            ));
        }
    };

    let title = body.title.unwrap_or(existing.title);
    let completed = body.completed.unwrap_or(existing.completed);
    // Outer None means the field was absent from the request body
    let description = body.description.unwrap_or(existing.description);
    let due_date = body.due_date.unwrap_or(existing.due_date);

    let todo_result = query_as::<_, Todo>(
        "UPDATE todos SET title = $1, description = $2, due_date = $3, completed = $4 \
         WHERE id = $5 \
         RETURNING id, title, description, created_at, due_date, completed, owner_id",
    )
    .bind(title)
    .bind(description)
    .bind(due_date)
    .bind(completed)
    .bind(id)
    .fetch_one(&data.db)
    .await;

    // Handle the result and prepare the response
    match todo_result {
        Ok(todo) => {
            let todo_response = serde_json::json!({"status": "success","data": serde_json::json!({
                "todo": todo
            })});

            Ok(Json(todo_response))
        }
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error","message": format!("{:?}", err)})),
        )),
    }
}

// Handler for deleting a Todo by ID. Deleting an unknown ID is a
// success acknowledgment, not an error.
pub async fn delete_todo(
    Path(id): Path<i32>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let delete_result = query("DELETE FROM todos WHERE id = $1")
        .bind(id)
        .execute(&data.db)
        .await;

    match delete_result {
        Ok(_) => {
            let json_response = serde_json::json!({
                "status": "success",
                "message": "Todo deleted"
            });
            Ok((StatusCode::OK, Json(json_response)))
        }
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error","message": format!("{:?}", err)})),
        )),
    }
}

// Handler for listing Todos that are past due and still incomplete
pub async fn get_overdue_todos(
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let todos_result = query_as::<_, Todo>(
        "SELECT id, title, description, created_at, due_date, completed, owner_id \
         FROM todos WHERE due_date < $1 AND completed = FALSE",
    )
    .bind(Utc::now())
    .fetch_all(&data.db)
    .await;

    match todos_result {
        Ok(todos) => {
            let json_response = serde_json::json!({
                "status": "success",
                "results": todos.len(),
                "todos": todos
            });
            Ok((StatusCode::OK, Json(json_response)))
        }
        Err(_) => {
            let error_response = serde_json::json!({
                "status": "fail",
                "message": "Something bad happened while fetching overdue todo items",
            });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)))
        }
    }
}

// Handler for registering a new user
pub async fn create_user(
    State(data): State<Arc<AppState>>,
    Json(body): Json<CreateUserSchema>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let hashed = match auth::hash_password(&body.password) {
        Ok(hashed) => hashed,
        Err(err) => {
            tracing::error!("password hashing failed: {:?}", err);
            let error_response = serde_json::json!({
                "status": "error",
                "message": "Something bad happened while registering the user",
            });
            return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)));
        }
    };

    let user_result = query_as::<_, User>(
        "INSERT INTO users (username, hashed_password) VALUES ($1, $2) \
         RETURNING id, username, hashed_password",
    )
    .bind(&body.username)
    .bind(hashed)
    .fetch_one(&data.db)
    .await;

    match user_result {
        Ok(user) => {
            let user_response = json!({"status": "success","data": json!({
                "user": user
            })});

            Ok((StatusCode::CREATED, Json(user_response)))
        }
        Err(e) => {
            // Handle specific error cases and prepare error response
            if e.to_string()
                .contains("duplicate key value violates unique constraint")
            {
                let error_response = serde_json::json!({
                    "status": "fail",
                    "message": "User with that username already exists",
                });
                Err((StatusCode::CONFLICT, Json(error_response)))
            } else {
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "error","message": format!("{:?}", e)})),
                ))
            }
        }
    }
}

// Handler for exchanging username/password for a bearer token. Unknown
// usernames and wrong passwords produce the same response shape.
pub async fn login(
    State(data): State<Arc<AppState>>,
    Json(body): Json<LoginSchema>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let user_result = query_as::<_, User>(
        "SELECT id, username, hashed_password FROM users WHERE username = $1",
    )
    .bind(&body.username)
    .fetch_optional(&data.db)
    .await;

    let user = match user_result {
        Ok(user) => user,
        Err(err) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error","message": format!("{:?}", err)})),
            ));
        }
    };

    let verified = user
        .as_ref()
        .map(|user| auth::verify_password(&body.password, &user.hashed_password))
        .unwrap_or(false);
    if !verified {
        let error_response = serde_json::json!({
            "status": "fail",
            "message": "Invalid credentials"
        });
        return Err((StatusCode::BAD_REQUEST, Json(error_response)));
    }

    let ttl = Duration::minutes(data.config.access_token_expire_minutes);
    let token_result = auth::create_token(&body.username, &data.config.jwt_secret, Some(ttl));
    match token_result {
        Ok(token) => {
            let success_response = serde_json::json!({"status": "success","data": serde_json::json!({
                "access_token": token,
                "token_type": "bearer"
            })});
            Ok((StatusCode::OK, Json(success_response)))
        }
        Err(err) => {
            tracing::error!("token signing failed: {:?}", err);
            let error_response = serde_json::json!({
                "status": "error",
                "message": "Something bad happened while issuing the token",
            });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)))
        }
    }
}

// Handler for aggregate statistics over the caller's own Todos
pub async fn get_todo_stats(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let todos_result = query_as::<_, Todo>(
        "SELECT id, title, description, created_at, due_date, completed, owner_id \
         FROM todos WHERE owner_id = $1",
    )
    .bind(user.id)
    .fetch_all(&data.db)
    .await;

    match todos_result {
        Ok(todos) => {
            let stats = compute_stats(&todos, Utc::now());
            let json_response = serde_json::json!({"status": "success","data": serde_json::json!({
                "stats": stats
            })});
            Ok((StatusCode::OK, Json(json_response)))
        }
        Err(_) => {
            let error_response = serde_json::json!({
                "status": "fail",
                "message": "Something bad happened while computing todo stats",
            });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)))
        }
    }
}

fn compute_stats(todos: &[Todo], now: DateTime<Utc>) -> TodoStats {
    let total = todos.len() as i64;
    let completed = todos.iter().filter(|todo| todo.completed).count() as i64;
    let overdue = todos
        .iter()
        .filter(|todo| !todo.completed && todo.due_date.map_or(false, |due| due < now))
        .count() as i64;

    TodoStats {
        total,
        completed,
        pending: total - completed,
        overdue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i32, completed: bool, due_date: Option<DateTime<Utc>>) -> Todo {
        Todo {
            id,
            title: format!("todo {}", id),
            description: None,
            created_at: Utc::now(),
            due_date,
            completed,
            owner_id: 1,
        }
    }

    #[test]
    fn stats_for_empty_set_are_all_zero() {
        let stats = compute_stats(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.overdue, 0);
    }

    #[test]
    fn stats_counts_are_consistent() {
        let now = Utc::now();
        let past = now - Duration::hours(2);
        let future = now + Duration::hours(2);
        let todos = vec![
            todo(1, false, Some(past)),
            todo(2, false, Some(future)),
            todo(3, true, Some(past)),
            todo(4, false, None),
            todo(5, true, None),
        ];

        let stats = compute_stats(&todos, now);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.total, stats.completed + stats.pending);
        assert!(stats.overdue <= stats.pending);
    }

    #[test]
    fn completed_todos_are_never_overdue() {
        let now = Utc::now();
        let todos = vec![todo(1, true, Some(now - Duration::days(1)))];
        assert_eq!(compute_stats(&todos, now).overdue, 0);
    }

    #[test]
    fn due_exactly_now_is_not_overdue() {
        let now = Utc::now();
        let todos = vec![todo(1, false, Some(now))];
        assert_eq!(compute_stats(&todos, now).overdue, 0);
    }
}
