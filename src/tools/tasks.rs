//! Task MCP Tools

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::error::{AppResult, Validator};
use crate::models::{Task, TaskCreate, TaskStatus, TaskUpdate};
use crate::tools::{optional_date_field, owned, require_user, required_text, DeleteResponse};

/// Response for list_tasks
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    pub total: usize,
}

fn parse_status(v: &mut Validator, value: &str) -> Option<TaskStatus> {
    let status = TaskStatus::from_str(value);
    v.check(status.is_some(), "status", "must be one of PENDING, COMPLETED, ARCHIVED");
    status
}

pub fn create_task(
    db: &Database,
    user_id: i64,
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
) -> AppResult<Task> {
    let mut v = Validator::new();
    let title = required_text(&mut v, "title", title);
    let due_date = optional_date_field(&mut v, "due_date", due_date);
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let data = TaskCreate {
        user_id,
        title,
        description: description.map(String::from),
        status: TaskStatus::Pending,
        due_date,
        created_at: None,
    };
    let task = Task::create(&conn, &data)?;
    tracing::info!(user_id, task_id = task.id, "created task");
    Ok(task)
}

pub fn get_task(db: &Database, user_id: i64, id: i64) -> AppResult<Task> {
    let conn = db.get_conn()?;
    owned(Task::get_by_id(&conn, id)?, user_id, id)
}

pub fn list_tasks(db: &Database, user_id: i64, status: Option<&str>) -> AppResult<ListTasksResponse> {
    let mut v = Validator::new();
    let status = status.and_then(|s| parse_status(&mut v, s));
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    let tasks = Task::list(&conn, user_id, status)?;
    let total = tasks.len();
    Ok(ListTasksResponse { tasks, total })
}

pub fn update_task(
    db: &Database,
    user_id: i64,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    status: Option<&str>,
    due_date: Option<&str>,
) -> AppResult<Task> {
    let mut v = Validator::new();
    let title = title.map(|t| required_text(&mut v, "title", t));
    let status = status.and_then(|s| parse_status(&mut v, s));
    let due_date = optional_date_field(&mut v, "due_date", due_date);
    v.finish()?;

    let conn = db.get_conn()?;
    owned(Task::get_by_id(&conn, id)?, user_id, id)?;

    let data = TaskUpdate {
        title,
        description: description.map(String::from),
        status,
        due_date,
    };
    owned(Task::update(&conn, id, &data)?, user_id, id)
}

/// Mark a task completed at `now`; completing twice keeps the first time
pub fn complete_task(db: &Database, user_id: i64, id: i64, now: DateTime<Utc>) -> AppResult<Task> {
    let conn = db.get_conn()?;
    let task = owned(Task::get_by_id(&conn, id)?, user_id, id)?;
    if task.status == TaskStatus::Completed {
        return Ok(task);
    }

    let task = owned(Task::set_status(&conn, id, TaskStatus::Completed, now)?, user_id, id)?;
    tracing::info!(user_id, task_id = id, "completed task");
    Ok(task)
}

pub fn delete_task(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(Task::get_by_id(&conn, id)?, user_id, id)?;
    Task::delete(&conn, id)?;
    Ok(DeleteResponse::new(id))
}
