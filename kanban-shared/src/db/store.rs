/// PostgreSQL-backed [`AccessStore`]
///
/// Each load reads the row and the full board member set fresh. Nothing is
/// cached, so a membership change is visible to the very next decision.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::authorization::AccessStore;
use crate::auth::scope::{BoardScope, CommentScope, TaskScope};
use crate::models::board::Board;

#[derive(sqlx::FromRow)]
struct TaskRefs {
    id: Uuid,
    board_id: Uuid,
    created_by: Option<Uuid>,
    assignee_id: Option<Uuid>,
    reviewer_id: Option<Uuid>,
}

#[derive(sqlx::FromRow)]
struct CommentRefs {
    id: Uuid,
    task_id: Uuid,
    author_id: Option<Uuid>,
}

#[async_trait]
impl AccessStore for PgPool {
    async fn load_board(&self, board_id: Uuid) -> Result<Option<BoardScope>, sqlx::Error> {
        let owner_id: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM boards WHERE id = $1")
            .bind(board_id)
            .fetch_optional(self)
            .await?;

        let Some(owner_id) = owner_id else {
            return Ok(None);
        };

        let members = Board::member_ids(self, board_id).await?;

        Ok(Some(BoardScope::new(board_id, owner_id, members)))
    }

    async fn load_task(&self, task_id: Uuid) -> Result<Option<TaskScope>, sqlx::Error> {
        let refs = sqlx::query_as::<_, TaskRefs>(
            r#"
            SELECT id, board_id, created_by, assignee_id, reviewer_id
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(self)
        .await?;

        let Some(refs) = refs else {
            return Ok(None);
        };

        // A board deleted between the two reads takes the task with it
        let Some(board) = self.load_board(refs.board_id).await? else {
            return Ok(None);
        };

        Ok(Some(TaskScope {
            id: refs.id,
            board,
            creator_id: refs.created_by,
            assignee_id: refs.assignee_id,
            reviewer_id: refs.reviewer_id,
        }))
    }

    async fn load_comment(&self, comment_id: Uuid) -> Result<Option<CommentScope>, sqlx::Error> {
        let refs = sqlx::query_as::<_, CommentRefs>(
            "SELECT id, task_id, author_id FROM task_comments WHERE id = $1",
        )
        .bind(comment_id)
        .fetch_optional(self)
        .await?;

        let Some(refs) = refs else {
            return Ok(None);
        };

        let Some(task) = self.load_task(refs.task_id).await? else {
            return Ok(None);
        };

        Ok(Some(CommentScope {
            id: refs.id,
            task,
            author_id: refs.author_id,
        }))
    }
}
