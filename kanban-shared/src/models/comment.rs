/// Task comments
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     content TEXT NOT NULL CHECK (LENGTH(BTRIM(content)) > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment as returned to clients, with the author's name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,

    /// Author's full name, null once the author is deleted
    pub author: Option<String>,

    pub content: String,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub author_id: Uuid,

    /// Trimmed, non-empty content
    pub content: String,
}

impl CommentView {
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, CommentView>(
            r#"
            WITH inserted AS (
                INSERT INTO task_comments (task_id, author_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, content, created_at
            )
            SELECT i.id, i.created_at, u.fullname AS author, i.content
            FROM inserted i
            LEFT JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Comments on a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.created_at, u.fullname AS author, c.content
            FROM task_comments c
            LEFT JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphaned_comment_serializes_null_author() {
        let comment = CommentView {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            author: None,
            content: "still here".to_string(),
        };

        let json = serde_json::to_value(&comment).unwrap();
        assert!(json["author"].is_null());
        assert_eq!(json["content"], "still here");
    }
}
