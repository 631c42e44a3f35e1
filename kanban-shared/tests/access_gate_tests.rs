/// Access gate scenarios against an in-memory store
///
/// No database is needed. The store mirrors the PostgreSQL schema closely
/// enough for the gate: boards with owner and member set, tasks with role
/// references, comments with an author.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use kanban_shared::auth::authorization::{authorize, authorize_and_execute, AccessStore, AuthzError};
use kanban_shared::auth::policy::{Actor, DenyReason, Operation, ReadScope};
use kanban_shared::auth::relations::{check_board_relation, RelationField};
use kanban_shared::auth::scope::{BoardScope, CommentScope, ResourceKind, ResourceRef, Scope, TaskScope};
use uuid::Uuid;

#[derive(Clone)]
struct TaskRow {
    board_id: Uuid,
    creator_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
    reviewer_id: Option<Uuid>,
}

#[derive(Clone)]
struct CommentRow {
    task_id: Uuid,
    author_id: Option<Uuid>,
}

#[derive(Default)]
struct MemoryStore {
    boards: RwLock<HashMap<Uuid, (Uuid, HashSet<Uuid>)>>,
    tasks: RwLock<HashMap<Uuid, TaskRow>>,
    comments: RwLock<HashMap<Uuid, CommentRow>>,
}

impl MemoryStore {
    fn add_board(&self, owner_id: Uuid, members: &[Uuid]) -> Uuid {
        let id = Uuid::new_v4();
        self.boards
            .write()
            .unwrap()
            .insert(id, (owner_id, members.iter().copied().collect()));
        id
    }

    fn add_member(&self, board_id: Uuid, user_id: Uuid) {
        if let Some((_, members)) = self.boards.write().unwrap().get_mut(&board_id) {
            members.insert(user_id);
        }
    }

    fn remove_member(&self, board_id: Uuid, user_id: Uuid) {
        if let Some((_, members)) = self.boards.write().unwrap().get_mut(&board_id) {
            members.remove(&user_id);
        }
    }

    fn add_task(&self, row: TaskRow) -> Uuid {
        let id = Uuid::new_v4();
        self.tasks.write().unwrap().insert(id, row);
        id
    }

    fn add_comment(&self, task_id: Uuid, author_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.comments
            .write()
            .unwrap()
            .insert(id, CommentRow { task_id, author_id });
        id
    }

    fn board_scope(&self, board_id: Uuid) -> Option<BoardScope> {
        let boards = self.boards.read().unwrap();
        let (owner_id, members) = boards.get(&board_id)?;
        Some(BoardScope::new(board_id, *owner_id, members.iter().copied()))
    }

    fn task_scope(&self, task_id: Uuid) -> Option<TaskScope> {
        let row = self.tasks.read().unwrap().get(&task_id).cloned()?;
        Some(TaskScope {
            id: task_id,
            board: self.board_scope(row.board_id)?,
            creator_id: row.creator_id,
            assignee_id: row.assignee_id,
            reviewer_id: row.reviewer_id,
        })
    }
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn load_board(&self, board_id: Uuid) -> Result<Option<BoardScope>, sqlx::Error> {
        Ok(self.board_scope(board_id))
    }

    async fn load_task(&self, task_id: Uuid) -> Result<Option<TaskScope>, sqlx::Error> {
        Ok(self.task_scope(task_id))
    }

    async fn load_comment(&self, comment_id: Uuid) -> Result<Option<CommentScope>, sqlx::Error> {
        let row = self.comments.read().unwrap().get(&comment_id).cloned();
        Ok(row.and_then(|row| {
            Some(CommentScope {
                id: comment_id,
                task: self.task_scope(row.task_id)?,
                author_id: row.author_id,
            })
        }))
    }
}

fn user() -> (Uuid, Actor) {
    let id = Uuid::new_v4();
    (id, Actor::User(id))
}

fn assert_denied(result: Result<impl std::fmt::Debug, AuthzError>, expected: DenyReason) {
    match result {
        Err(AuthzError::PermissionDenied(reason)) => assert_eq!(reason, expected),
        other => panic!("expected denial {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_stranger_cannot_read_board_without_members() {
    let store = MemoryStore::default();
    let (u1, _) = user();
    let (_, u2) = user();
    let board_id = store.add_board(u1, &[]);

    let result = authorize(
        &store,
        &u2,
        Operation::Read(ReadScope::Detail),
        ResourceKind::Board,
        Some(ResourceRef::Board(board_id)),
    )
    .await;

    assert_denied(result, DenyReason::NotBoardOwnerOrMember);
}

#[tokio::test]
async fn test_member_creates_task_and_may_update_it() {
    let store = MemoryStore::default();
    let (u1, _) = user();
    let (u2, actor2) = user();
    let board_id = store.add_board(u1, &[]);
    store.add_member(board_id, u2);

    let task_id = authorize_and_execute(
        &store,
        &actor2,
        Operation::Create,
        ResourceKind::Task,
        Some(ResourceRef::Board(board_id)),
        |_scope| async {
            Ok::<_, AuthzError>(store.add_task(TaskRow {
                board_id,
                creator_id: Some(u2),
                assignee_id: None,
                reviewer_id: None,
            }))
        },
    )
    .await
    .expect("member should create task");

    let scope = authorize(
        &store,
        &actor2,
        Operation::Update,
        ResourceKind::Task,
        Some(ResourceRef::Task(task_id)),
    )
    .await
    .unwrap()
    .and_then(Scope::into_task)
    .unwrap();

    assert_eq!(scope.creator_id, Some(u2));
}

#[tokio::test]
async fn test_non_member_assignee_rejected_before_write() {
    let store = MemoryStore::default();
    let (u1, _) = user();
    let (u2, actor2) = user();
    let (u3, _) = user();
    let board_id = store.add_board(u1, &[u2]);
    let writes = AtomicUsize::new(0);

    let result = authorize_and_execute(
        &store,
        &actor2,
        Operation::Create,
        ResourceKind::Task,
        Some(ResourceRef::Board(board_id)),
        |scope| async {
            let board = scope.and_then(Scope::into_board).unwrap();
            check_board_relation(&board, Some(u3), RelationField::Assignee)?;
            writes.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AuthzError>(())
        },
    )
    .await;

    match result {
        Err(AuthzError::InvalidRoleAssignment { field, .. }) => assert_eq!(field, "assignee"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_only_author_deletes_comment() {
    let store = MemoryStore::default();
    let (u1, actor1) = user();
    let (u2, actor2) = user();
    let board_id = store.add_board(u1, &[u2]);
    let task_id = store.add_task(TaskRow {
        board_id,
        creator_id: Some(u1),
        assignee_id: None,
        reviewer_id: None,
    });
    let comment_id = store.add_comment(task_id, Some(u2));
    let target = Some(ResourceRef::Comment { task_id, comment_id });

    let owner_attempt =
        authorize(&store, &actor1, Operation::Delete, ResourceKind::Comment, target).await;
    assert_denied(owner_attempt, DenyReason::NotCommentAuthor);

    let author_attempt =
        authorize(&store, &actor2, Operation::Delete, ResourceKind::Comment, target).await;
    assert!(author_attempt.is_ok());
}

#[tokio::test]
async fn test_reviewer_outside_board_sees_reviewing_scope_only() {
    let store = MemoryStore::default();
    let (u1, _) = user();
    let (u4, actor4) = user();
    let board_id = store.add_board(u1, &[]);
    let task_id = store.add_task(TaskRow {
        board_id,
        creator_id: Some(u1),
        assignee_id: None,
        reviewer_id: Some(u4),
    });
    let target = Some(ResourceRef::Task(task_id));

    let reviewing = authorize(
        &store,
        &actor4,
        Operation::Read(ReadScope::Reviewing),
        ResourceKind::Task,
        target,
    )
    .await;
    assert!(reviewing.is_ok());

    let assigned = authorize(
        &store,
        &actor4,
        Operation::Read(ReadScope::AssignedToMe),
        ResourceKind::Task,
        target,
    )
    .await;
    assert_denied(assigned, DenyReason::NotTaskAssignee);
}

#[tokio::test]
async fn test_missing_resource_is_not_found_not_denied() {
    let store = MemoryStore::default();
    let (_, stranger) = user();
    let missing = Uuid::new_v4();

    let result = authorize(
        &store,
        &stranger,
        Operation::Delete,
        ResourceKind::Board,
        Some(ResourceRef::Board(missing)),
    )
    .await;

    match result {
        Err(AuthzError::ResourceNotFound { kind, id }) => {
            assert_eq!(kind, ResourceKind::Board);
            assert_eq!(id, missing);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_comment_under_other_task_is_not_found() {
    let store = MemoryStore::default();
    let (u1, actor1) = user();
    let board_id = store.add_board(u1, &[u1]);
    let row = TaskRow {
        board_id,
        creator_id: Some(u1),
        assignee_id: None,
        reviewer_id: None,
    };
    let task_a = store.add_task(row.clone());
    let task_b = store.add_task(row);
    let comment_id = store.add_comment(task_a, Some(u1));

    let result = authorize(
        &store,
        &actor1,
        Operation::Delete,
        ResourceKind::Comment,
        Some(ResourceRef::Comment {
            task_id: task_b,
            comment_id,
        }),
    )
    .await;

    assert!(matches!(result, Err(AuthzError::ResourceNotFound { kind: ResourceKind::Comment, .. })));
}

#[tokio::test]
async fn test_denied_mutation_never_runs() {
    let store = MemoryStore::default();
    let (u1, _) = user();
    let (u2, actor2) = user();
    let board_id = store.add_board(u1, &[u2]);
    let calls = AtomicUsize::new(0);

    let result = authorize_and_execute(
        &store,
        &actor2,
        Operation::Delete,
        ResourceKind::Board,
        Some(ResourceRef::Board(board_id)),
        |_| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AuthzError>(())
        },
    )
    .await;

    assert_denied(result, DenyReason::NotBoardOwner);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_membership_revocation_applies_to_next_call() {
    let store = MemoryStore::default();
    let (u1, _) = user();
    let (u2, actor2) = user();
    let board_id = store.add_board(u1, &[u2]);
    let target = Some(ResourceRef::Board(board_id));

    assert!(authorize(&store, &actor2, Operation::Update, ResourceKind::Board, target)
        .await
        .is_ok());

    store.remove_member(board_id, u2);

    assert_denied(
        authorize(&store, &actor2, Operation::Update, ResourceKind::Board, target).await,
        DenyReason::NotBoardOwnerOrMember,
    );
}

#[tokio::test]
async fn test_anonymous_board_creation_denied() {
    let store = MemoryStore::default();

    let result = authorize(&store, &Actor::Anonymous, Operation::Create, ResourceKind::Board, None).await;
    assert_denied(result, DenyReason::NotAuthenticated);

    let (_, actor) = user();
    let result = authorize(&store, &actor, Operation::Create, ResourceKind::Board, None).await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_decisions_are_consistent() {
    let store = Arc::new(MemoryStore::default());
    let (owner, owner_actor) = user();
    let (member, member_actor) = user();
    let board_id = store.add_board(owner, &[member]);
    let task_id = store.add_task(TaskRow {
        board_id,
        creator_id: Some(member),
        assignee_id: Some(member),
        reviewer_id: None,
    });

    let mut handles = Vec::new();
    for i in 0..64 {
        let store = Arc::clone(&store);
        let actor = if i % 2 == 0 { owner_actor } else { member_actor };
        handles.push(tokio::spawn(async move {
            let update = authorize(
                store.as_ref(),
                &actor,
                Operation::Update,
                ResourceKind::Task,
                Some(ResourceRef::Task(task_id)),
            )
            .await
            .is_ok();
            let delete = authorize(
                store.as_ref(),
                &actor,
                Operation::Delete,
                ResourceKind::Task,
                Some(ResourceRef::Task(task_id)),
            )
            .await
            .is_ok();
            (actor, update, delete)
        }));
    }

    for result in futures::future::join_all(handles).await {
        let (actor, update, delete) = result.unwrap();
        if actor == owner_actor {
            // Owner is not a member, so may delete but not edit
            assert!(!update);
            assert!(delete);
        } else {
            assert!(update);
            assert!(delete);
        }
    }
}
