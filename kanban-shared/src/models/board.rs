/// Board model, membership and list queries
///
/// A board has exactly one owner, fixed at creation, and a member set
/// stored in `board_members`. The owner is not automatically a member.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub title: String,

    /// Immutable after creation
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the board overview
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardListItem {
    pub id: Uuid,
    pub title: String,
    pub member_count: i64,
    pub ticket_count: i64,
    pub tasks_to_do_count: i64,
    pub tasks_high_prio_count: i64,
    pub owner_id: Uuid,
}

const BOARD_LIST_SELECT: &str = r#"
    SELECT
        b.id,
        b.title,
        (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
        (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
        (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.status = 'to-do') AS tasks_to_do_count,
        (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.priority = 'high') AS tasks_high_prio_count,
        b.owner_id
    FROM boards b
"#;

/// Input for creating a board
#[derive(Debug, Clone)]
pub struct CreateBoard {
    pub title: String,
    pub owner_id: Uuid,

    /// Initial members. Duplicates are ignored.
    pub members: Vec<Uuid>,
}

/// Input for updating a board
///
/// `members`, when present, replaces the whole member set.
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    pub title: Option<String>,
    pub members: Option<Vec<Uuid>>,
}

impl Board {
    /// Creates a board and its initial member rows in one transaction
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_members(&mut tx, board.id, &data.members).await?;

        tx.commit().await?;

        Ok(board)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Boards the user owns or is a member of, with task statistics
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<BoardListItem>, sqlx::Error> {
        let query = format!(
            r#"{}
            WHERE b.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM board_members m
                   WHERE m.board_id = b.id AND m.user_id = $1
               )
            ORDER BY b.created_at ASC"#,
            BOARD_LIST_SELECT
        );

        sqlx::query_as::<_, BoardListItem>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Statistics row for a single board
    pub async fn find_list_item(pool: &PgPool, id: Uuid) -> Result<Option<BoardListItem>, sqlx::Error> {
        let query = format!("{} WHERE b.id = $1", BOARD_LIST_SELECT);

        sqlx::query_as::<_, BoardListItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Applies an update in one transaction
    ///
    /// Returns None when the board no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = COALESCE($2, title), updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(board) = board else {
            return Ok(None);
        };

        if let Some(members) = data.members {
            sqlx::query("DELETE FROM board_members WHERE board_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_members(&mut tx, id, &members).await?;
        }

        tx.commit().await?;

        Ok(Some(board))
    }

    /// Deletes a board. Tasks and comments cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Members as public user views, ordered by name
    pub async fn members(pool: &PgPool, board_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.fullname
            FROM board_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.board_id = $1
            ORDER BY u.fullname ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    pub async fn member_ids(pool: &PgPool, board_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM board_members WHERE board_id = $1")
            .bind(board_id)
            .fetch_all(pool)
            .await
    }
}

async fn insert_members(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
    members: &[Uuid],
) -> Result<(), sqlx::Error> {
    if members.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO board_members (board_id, user_id)
        SELECT $1, member_id FROM UNNEST($2::uuid[]) AS member_id
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(board_id)
    .bind(members)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
