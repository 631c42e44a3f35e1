/// Role facts between an actor and a resource
///
/// Every authorization call resolves the actor's relationship to the target
/// exactly once into a [`RoleSet`]. The permission tables in
/// [`policy`](super::policy) are then pure functions over that set.
///
/// # Roles
///
/// - **board owner**: the board's single owner
/// - **board member**: listed in the board's member set
/// - **task assignee / reviewer / creator**: named on the task
/// - **comment author**: wrote the comment
///
/// Owner and member are independent facts. Owning a board does not make the
/// owner a member.

use std::fmt;

use uuid::Uuid;

use super::scope::{BoardScope, Scope, TaskScope};

/// A single role fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    BoardOwner,
    BoardMember,
    TaskAssignee,
    TaskReviewer,
    TaskCreator,
    CommentAuthor,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::BoardOwner,
        Role::BoardMember,
        Role::TaskAssignee,
        Role::TaskReviewer,
        Role::TaskCreator,
        Role::CommentAuthor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::BoardOwner => "board_owner",
            Role::BoardMember => "board_member",
            Role::TaskAssignee => "task_assignee",
            Role::TaskReviewer => "task_reviewer",
            Role::TaskCreator => "task_creator",
            Role::CommentAuthor => "comment_author",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Role::BoardOwner => 1 << 0,
            Role::BoardMember => 1 << 1,
            Role::TaskAssignee => 1 << 2,
            Role::TaskReviewer => 1 << 3,
            Role::TaskCreator => 1 << 4,
            Role::CommentAuthor => 1 << 5,
        }
    }
}

/// Set of role facts held by one actor on one resource
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn with(mut self, role: Role) -> Self {
        self.insert(role);
        self
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// True when any of the given roles is held
    pub fn any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }

    pub fn is_board_owner(&self) -> bool {
        self.contains(Role::BoardOwner)
    }

    pub fn is_board_member(&self) -> bool {
        self.contains(Role::BoardMember)
    }

    pub fn is_task_assignee(&self) -> bool {
        self.contains(Role::TaskAssignee)
    }

    pub fn is_task_reviewer(&self) -> bool {
        self.contains(Role::TaskReviewer)
    }

    pub fn is_task_creator(&self) -> bool {
        self.contains(Role::TaskCreator)
    }

    pub fn is_comment_author(&self) -> bool {
        self.contains(Role::CommentAuthor)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::EMPTY;
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|role| role.as_str())).finish()
    }
}

/// Resolves the roles `actor_id` holds on a loaded resource
///
/// Walks from the resource up to its board, so a comment scope yields author,
/// task and board facts together. Has no side effects and performs no I/O.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::roles::{resolve_roles, Role};
/// use kanban_shared::auth::scope::{BoardScope, Scope};
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let board = BoardScope::new(Uuid::new_v4(), owner, []);
///
/// let roles = resolve_roles(owner, &Scope::Board(board));
/// assert!(roles.contains(Role::BoardOwner));
/// assert!(!roles.contains(Role::BoardMember));
/// ```
pub fn resolve_roles(actor_id: Uuid, scope: &Scope) -> RoleSet {
    match scope {
        Scope::Board(board) => board_roles(actor_id, board),
        Scope::Task(task) => task_roles(actor_id, task),
        Scope::Comment(comment) => {
            let mut roles = task_roles(actor_id, &comment.task);
            if comment.is_author(actor_id) {
                roles.insert(Role::CommentAuthor);
            }
            roles
        }
    }
}

fn board_roles(actor_id: Uuid, board: &BoardScope) -> RoleSet {
    let mut roles = RoleSet::EMPTY;
    if board.is_owner(actor_id) {
        roles.insert(Role::BoardOwner);
    }
    if board.is_member(actor_id) {
        roles.insert(Role::BoardMember);
    }
    roles
}

fn task_roles(actor_id: Uuid, task: &TaskScope) -> RoleSet {
    let mut roles = board_roles(actor_id, &task.board);
    if task.is_assignee(actor_id) {
        roles.insert(Role::TaskAssignee);
    }
    if task.is_reviewer(actor_id) {
        roles.insert(Role::TaskReviewer);
    }
    if task.is_creator(actor_id) {
        roles.insert(Role::TaskCreator);
    }
    roles
}
