/// Permission evaluator
///
/// [`decide`] maps an actor, an operation and a loaded resource to
/// [`Decision::Allow`] or [`Decision::Deny`] with a reason. It is a pure
/// function: no I/O, no caching, and evaluating it twice on unchanged inputs
/// gives the same answer.
///
/// # Decision Tables
///
/// Deny is the default. A rule must grant Allow explicitly, and any granting
/// role is enough.
///
/// | Resource | Create | Read | Update | Delete |
/// |----------|--------|------|--------|--------|
/// | Board    | authenticated | owner or member | owner or member | owner |
/// | Task     | member of target board | member; assignee / reviewer for scoped reads | member | creator or board owner |
/// | Comment  | member of the task's board | member of the task's board | never | author |
///
/// Creating targets the parent: a new task is decided against its board and
/// a new comment against its task.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::roles::{resolve_roles, Role, RoleSet};
use super::scope::{ResourceKind, Scope};

/// Who is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(Uuid),
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(*id),
        }
    }
}

impl From<Uuid> for Actor {
    fn from(user_id: Uuid) -> Self {
        Actor::User(user_id)
    }
}

/// Which slice of a resource a read addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadScope {
    /// A single resource
    Detail,

    /// A listing of resources
    List,

    /// Tasks assigned to the actor
    AssignedToMe,

    /// Tasks the actor reviews
    Reviewing,
}

/// Requested operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read(ReadScope),
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read(ReadScope::Detail) => "read",
            Operation::Read(ReadScope::List) => "list",
            Operation::Read(ReadScope::AssignedToMe) => "read_assigned",
            Operation::Read(ReadScope::Reviewing) => "read_reviewing",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Operation::Read(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the rule that denied an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NotAuthenticated,
    NotBoardOwner,
    NotBoardOwnerOrMember,
    NotBoardMember,
    NotTaskCreatorOrBoardOwner,
    NotTaskAssignee,
    NotTaskReviewer,
    NotCommentAuthor,

    /// No rule grants this operation on this resource type
    OperationNotSupported,

    /// The supplied resource does not fit the operation
    ResourceMismatch,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NotAuthenticated => "not authenticated",
            DenyReason::NotBoardOwner => "not board owner",
            DenyReason::NotBoardOwnerOrMember => "not board owner or member",
            DenyReason::NotBoardMember => "not board member",
            DenyReason::NotTaskCreatorOrBoardOwner => "not task creator or board owner",
            DenyReason::NotTaskAssignee => "not task assignee",
            DenyReason::NotTaskReviewer => "not task reviewer",
            DenyReason::NotCommentAuthor => "not comment author",
            DenyReason::OperationNotSupported => "operation not supported",
            DenyReason::ResourceMismatch => "resource does not match operation",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }

    /// Allows when any of `roles` is held, denies with `reason` otherwise
    fn grant_if(held: RoleSet, roles: &[Role], reason: DenyReason) -> Self {
        if held.any(roles) {
            Decision::Allow
        } else {
            Decision::Deny(reason)
        }
    }
}

/// Evaluates an operation against a loaded resource
///
/// `scope` is the resource the operation targets, or its parent for create
/// operations. Board creation takes no scope.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::policy::{decide, Actor, Decision, DenyReason, Operation};
/// use kanban_shared::auth::scope::{BoardScope, ResourceKind, Scope};
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let member = Uuid::new_v4();
/// let board = Scope::Board(BoardScope::new(Uuid::new_v4(), owner, [member]));
///
/// let decision = decide(&Actor::User(member), Operation::Delete, ResourceKind::Board, Some(&board));
/// assert_eq!(decision, Decision::Deny(DenyReason::NotBoardOwner));
///
/// let decision = decide(&Actor::User(owner), Operation::Delete, ResourceKind::Board, Some(&board));
/// assert!(decision.is_allowed());
/// ```
pub fn decide(
    actor: &Actor,
    operation: Operation,
    kind: ResourceKind,
    scope: Option<&Scope>,
) -> Decision {
    let Some(user_id) = actor.user_id() else {
        return Decision::Deny(DenyReason::NotAuthenticated);
    };

    match kind {
        ResourceKind::Board => decide_board(user_id, operation, scope),
        ResourceKind::Task => decide_task(user_id, operation, scope),
        ResourceKind::Comment => decide_comment(user_id, operation, scope),
    }
}

fn decide_board(user_id: Uuid, operation: Operation, scope: Option<&Scope>) -> Decision {
    let scope = match (operation, scope) {
        (Operation::Create, None) => return Decision::Allow,
        (Operation::Create, Some(_)) => return Decision::Deny(DenyReason::ResourceMismatch),
        (_, Some(scope @ Scope::Board(_))) => scope,
        _ => return Decision::Deny(DenyReason::ResourceMismatch),
    };
    let roles = resolve_roles(user_id, scope);

    match operation {
        Operation::Read(ReadScope::Detail | ReadScope::List) | Operation::Update => Decision::grant_if(
            roles,
            &[Role::BoardOwner, Role::BoardMember],
            DenyReason::NotBoardOwnerOrMember,
        ),
        Operation::Delete => {
            Decision::grant_if(roles, &[Role::BoardOwner], DenyReason::NotBoardOwner)
        }
        Operation::Read(ReadScope::AssignedToMe | ReadScope::Reviewing) | Operation::Create => {
            Decision::Deny(DenyReason::OperationNotSupported)
        }
    }
}

fn decide_task(user_id: Uuid, operation: Operation, scope: Option<&Scope>) -> Decision {
    let scope = match (operation, scope) {
        (Operation::Create, Some(scope @ Scope::Board(_))) => scope,
        (Operation::Create, _) => return Decision::Deny(DenyReason::ResourceMismatch),
        (_, Some(scope @ Scope::Task(_))) => scope,
        _ => return Decision::Deny(DenyReason::ResourceMismatch),
    };
    let roles = resolve_roles(user_id, scope);

    match operation {
        Operation::Create | Operation::Read(ReadScope::Detail | ReadScope::List) | Operation::Update => {
            Decision::grant_if(roles, &[Role::BoardMember], DenyReason::NotBoardMember)
        }
        Operation::Read(ReadScope::AssignedToMe) => {
            Decision::grant_if(roles, &[Role::TaskAssignee], DenyReason::NotTaskAssignee)
        }
        Operation::Read(ReadScope::Reviewing) => {
            Decision::grant_if(roles, &[Role::TaskReviewer], DenyReason::NotTaskReviewer)
        }
        Operation::Delete => Decision::grant_if(
            roles,
            &[Role::TaskCreator, Role::BoardOwner],
            DenyReason::NotTaskCreatorOrBoardOwner,
        ),
    }
}

fn decide_comment(user_id: Uuid, operation: Operation, scope: Option<&Scope>) -> Decision {
    let scope = match (operation, scope) {
        (Operation::Update, _) => return Decision::Deny(DenyReason::OperationNotSupported),
        (Operation::Create, Some(scope @ Scope::Task(_))) => scope,
        (Operation::Read(_), Some(scope @ (Scope::Task(_) | Scope::Comment(_)))) => scope,
        (Operation::Delete, Some(scope @ Scope::Comment(_))) => scope,
        _ => return Decision::Deny(DenyReason::ResourceMismatch),
    };
    let roles = resolve_roles(user_id, scope);

    match operation {
        Operation::Create | Operation::Read(ReadScope::Detail | ReadScope::List) => {
            Decision::grant_if(roles, &[Role::BoardMember], DenyReason::NotBoardMember)
        }
        Operation::Delete => {
            Decision::grant_if(roles, &[Role::CommentAuthor], DenyReason::NotCommentAuthor)
        }
        Operation::Read(ReadScope::AssignedToMe | ReadScope::Reviewing) | Operation::Update => {
            Decision::Deny(DenyReason::OperationNotSupported)
        }
    }
}
