/// Resource access gate
///
/// Every API operation on a board, task or comment passes through
/// [`authorize_and_execute`]:
///
/// 1. **Load**: the target is fetched through an [`AccessStore`]. A missing
///    resource stops here with [`AuthzError::ResourceNotFound`].
/// 2. **Decide**: roles are resolved once and evaluated by
///    [`decide`](super::policy::decide).
/// 3. **Execute**: only on Allow is the mutation invoked, receiving the loaded
///    scope so it can run [relation checks](super::relations) before commit.
///
/// Nothing is cached between calls. Each call reads fresh membership.
///
/// # Example
///
/// ```no_run
/// use kanban_shared::auth::authorization::{authorize_and_execute, AuthzError};
/// use kanban_shared::auth::policy::{Actor, Operation};
/// use kanban_shared::auth::scope::{ResourceKind, ResourceRef};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, board_id: Uuid) -> Result<(), AuthzError> {
/// authorize_and_execute(
///     &pool,
///     &Actor::User(user_id),
///     Operation::Delete,
///     ResourceKind::Board,
///     Some(ResourceRef::Board(board_id)),
///     |_scope| async {
///         sqlx::query("DELETE FROM boards WHERE id = $1")
///             .bind(board_id)
///             .execute(&pool)
///             .await?;
///         Ok::<_, AuthzError>(())
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

use std::future::Future;

use async_trait::async_trait;
use uuid::Uuid;

use super::policy::{decide, Actor, DenyReason, Operation};
use super::scope::{BoardScope, CommentScope, ResourceKind, ResourceRef, Scope, TaskScope};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Target resource does not exist
    #[error("{kind} {id} not found")]
    ResourceNotFound { kind: ResourceKind, id: Uuid },

    /// The permission evaluator denied the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(DenyReason),

    /// Assignee or reviewer is not a member of the task's board
    #[error("Invalid {field}: {detail}")]
    InvalidRoleAssignment { field: &'static str, detail: String },

    /// Comment body missing or blank
    #[error("The content must not be empty")]
    EmptyContent,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Loads resource scopes for the gate
///
/// Implemented for [`sqlx::PgPool`] in [`crate::db::store`]. Test suites
/// provide in-memory implementations.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Board with owner and full member set
    async fn load_board(&self, board_id: Uuid) -> Result<Option<BoardScope>, sqlx::Error>;

    /// Task with its role references and parent board
    async fn load_task(&self, task_id: Uuid) -> Result<Option<TaskScope>, sqlx::Error>;

    /// Comment with its author and parent task
    async fn load_comment(&self, comment_id: Uuid) -> Result<Option<CommentScope>, sqlx::Error>;
}

/// Loads the scope named by `target`
///
/// # Errors
///
/// [`AuthzError::ResourceNotFound`] when the resource is absent, or when a
/// comment exists but belongs to a different task than the one named.
pub async fn load_scope<S>(store: &S, target: ResourceRef) -> Result<Scope, AuthzError>
where
    S: AccessStore + ?Sized,
{
    let not_found = AuthzError::ResourceNotFound {
        kind: target.kind(),
        id: target.id(),
    };

    let scope = match target {
        ResourceRef::Board(board_id) => store.load_board(board_id).await?.map(Scope::Board),
        ResourceRef::Task(task_id) => store.load_task(task_id).await?.map(Scope::Task),
        ResourceRef::Comment {
            task_id,
            comment_id,
        } => store
            .load_comment(comment_id)
            .await?
            .filter(|comment| comment.task.id == task_id)
            .map(Scope::Comment),
    };

    scope.ok_or(not_found)
}

/// Loads the target and evaluates the operation against it
///
/// Returns the loaded scope on Allow. `target` is `None` only for operations
/// that have no existing resource to act on, such as creating a board.
///
/// # Errors
///
/// - [`AuthzError::ResourceNotFound`] before any role is resolved
/// - [`AuthzError::PermissionDenied`] with the denying rule
/// - [`AuthzError::DatabaseError`] when loading fails
pub async fn authorize<S>(
    store: &S,
    actor: &Actor,
    operation: Operation,
    kind: ResourceKind,
    target: Option<ResourceRef>,
) -> Result<Option<Scope>, AuthzError>
where
    S: AccessStore + ?Sized,
{
    let scope = match target {
        Some(target) => match load_scope(store, target).await {
            Ok(scope) => Some(scope),
            Err(err) => {
                if let AuthzError::ResourceNotFound { kind, id } = &err {
                    tracing::warn!(
                        resource = %kind,
                        resource_id = %id,
                        operation = %operation,
                        "Authorization target not found"
                    );
                }
                return Err(err);
            }
        },
        None => None,
    };

    let decision = decide(actor, operation, kind, scope.as_ref());

    if let Some(reason) = decision.deny_reason() {
        tracing::warn!(
            actor = ?actor,
            resource = %kind,
            resource_id = ?target.map(|t| t.id()),
            operation = %operation,
            mutation = operation.is_mutation(),
            reason = %reason,
            "Operation denied"
        );
        return Err(AuthzError::PermissionDenied(reason));
    }

    tracing::debug!(
        actor = ?actor,
        resource = %kind,
        operation = %operation,
        mutation = operation.is_mutation(),
        "Operation allowed"
    );
    Ok(scope)
}

/// Authorizes an operation and runs `mutation` only when it is allowed
///
/// The mutation receives the scope loaded during authorization. A denied or
/// missing target returns early and `mutation` is never called.
///
/// # Errors
///
/// Any [`AuthzError`] from [`authorize`], converted into the caller's error
/// type, or whatever `mutation` returns.
pub async fn authorize_and_execute<S, F, Fut, T, E>(
    store: &S,
    actor: &Actor,
    operation: Operation,
    kind: ResourceKind,
    target: Option<ResourceRef>,
    mutation: F,
) -> Result<T, E>
where
    S: AccessStore + ?Sized,
    F: FnOnce(Option<Scope>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<AuthzError>,
{
    let scope = authorize(store, actor, operation, kind, target).await?;
    mutation(scope).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_error_display() {
        let id = Uuid::new_v4();
        let err = AuthzError::ResourceNotFound {
            kind: ResourceKind::Task,
            id,
        };
        assert_eq!(err.to_string(), format!("task {} not found", id));

        let err = AuthzError::PermissionDenied(DenyReason::NotCommentAuthor);
        assert_eq!(err.to_string(), "Permission denied: not comment author");

        let err = AuthzError::EmptyContent;
        assert_eq!(err.to_string(), "The content must not be empty");
    }

    #[test]
    fn test_database_error_converts() {
        let err: AuthzError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AuthzError::DatabaseError(_)));
    }
}
