/// Task model and database operations
///
/// Tasks live on exactly one board. Assignee and reviewer must be board
/// members when set; that rule is checked by
/// [`check_board_relation`](crate::auth::relations::check_board_relation)
/// before writes reach this module.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to-do', 'in-progress', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'to-do',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Workflow column of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to-do",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Immutable parent board
    pub board_id: Uuid,

    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,

    /// None once the creator's account is gone
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with its assignee, reviewer and comment count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskView {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub assignee_email: Option<String>,
    pub assignee_fullname: Option<String>,
    pub reviewer_id: Option<Uuid>,
    pub reviewer_email: Option<String>,
    pub reviewer_fullname: Option<String>,
    pub comments_count: i64,
}

impl TaskView {
    pub fn assignee(&self) -> Option<UserSummary> {
        summary(self.assignee_id, &self.assignee_email, &self.assignee_fullname)
    }

    pub fn reviewer(&self) -> Option<UserSummary> {
        summary(self.reviewer_id, &self.reviewer_email, &self.reviewer_fullname)
    }
}

fn summary(id: Option<Uuid>, email: &Option<String>, fullname: &Option<String>) -> Option<UserSummary> {
    Some(UserSummary {
        id: id?,
        email: email.clone()?,
        fullname: fullname.clone()?,
    })
}

const TASK_VIEW_SELECT: &str = r#"
    SELECT
        t.id, t.board_id, t.title, t.description, t.status, t.priority, t.due_date,
        t.assignee_id, a.email AS assignee_email, a.fullname AS assignee_fullname,
        t.reviewer_id, r.email AS reviewer_email, r.fullname AS reviewer_fullname,
        (SELECT COUNT(*) FROM task_comments c WHERE c.task_id = t.id) AS comments_count
    FROM tasks t
    LEFT JOIN users a ON a.id = t.assignee_id
    LEFT JOIN users r ON r.id = t.reviewer_id
"#;

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub created_by: Uuid,
}

/// Input for updating a task
///
/// Outer `None` leaves a field alone. For nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub assignee_id: Option<Option<Uuid>>,
    pub reviewer_id: Option<Option<Uuid>>,
}

impl Task {
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (board_id, title, description, status, priority, due_date,
                               assignee_id, reviewer_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, board_id, title, description, status, priority, due_date,
                      assignee_id, reviewer_id, created_by, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.assignee_id)
        .bind(data.reviewer_id)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, status, priority, due_date,
                   assignee_id, reviewer_id, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates the fields present in `data`
    ///
    /// Returns None when the task no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        let mut push = |column: &str, present: bool| {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        };
        push("title", data.title.is_some());
        push("description", data.description.is_some());
        push("status", data.status.is_some());
        push("priority", data.priority.is_some());
        push("due_date", data.due_date.is_some());
        push("assignee_id", data.assignee_id.is_some());
        push("reviewer_id", data.reviewer_id.is_some());

        query.push_str(
            " WHERE id = $1 RETURNING id, board_id, title, description, status, priority, due_date, \
             assignee_id, reviewer_id, created_by, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(reviewer_id) = data.reviewer_id {
            q = q.bind(reviewer_id);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a task. Its comments cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl TaskView {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{} WHERE t.id = $1", TASK_VIEW_SELECT);

        sqlx::query_as::<_, TaskView>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("{} WHERE t.board_id = $1 ORDER BY t.created_at ASC", TASK_VIEW_SELECT);

        sqlx::query_as::<_, TaskView>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks on any board where `user_id` is the assignee
    pub async fn list_assigned_to(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("{} WHERE t.assignee_id = $1 ORDER BY t.created_at ASC", TASK_VIEW_SELECT);

        sqlx::query_as::<_, TaskView>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks on any board where `user_id` is the reviewer
    pub async fn list_reviewed_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("{} WHERE t.reviewer_id = $1 ORDER BY t.created_at ASC", TASK_VIEW_SELECT);

        sqlx::query_as::<_, TaskView>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
