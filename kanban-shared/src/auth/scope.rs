/// Resource scopes read by the access-control core
///
/// A scope is the minimal snapshot of a board, task or comment that the
/// permission evaluator needs: ids, the owning board, and the user references
/// that role facts are derived from. Scopes are loaded fresh for every
/// authorization call through an [`AccessStore`](super::authorization::AccessStore)
/// and are never cached.
///
/// Each scope embeds its parents, so a [`CommentScope`] carries the task it
/// belongs to and, through it, the board and its member set.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource types governed by the permission evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Board,
    Task,
    Comment,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Board => "board",
            ResourceKind::Task => "task",
            ResourceKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the resource an operation targets, before it is loaded
///
/// For create operations the reference names the parent: a new task targets
/// its board, a new comment targets its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Board(Uuid),
    Task(Uuid),

    /// A comment addressed through its parent task.
    ///
    /// Resolves as not found when the comment belongs to a different task.
    Comment { task_id: Uuid, comment_id: Uuid },
}

impl ResourceRef {
    /// Kind of the referenced resource
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Board(_) => ResourceKind::Board,
            ResourceRef::Task(_) => ResourceKind::Task,
            ResourceRef::Comment { .. } => ResourceKind::Comment,
        }
    }

    /// Id of the referenced resource itself
    pub fn id(&self) -> Uuid {
        match self {
            ResourceRef::Board(id) | ResourceRef::Task(id) => *id,
            ResourceRef::Comment { comment_id, .. } => *comment_id,
        }
    }
}

/// Board ownership and membership facts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardScope {
    pub id: Uuid,

    /// Exactly one owner, immutable after creation
    pub owner_id: Uuid,

    /// Member ids. The owner is not required to appear here.
    pub members: HashSet<Uuid>,
}

impl BoardScope {
    pub fn new(id: Uuid, owner_id: Uuid, members: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            id,
            owner_id,
            members: members.into_iter().collect(),
        }
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// O(1) membership test over the loaded member set
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

/// Task role references plus the parent board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScope {
    pub id: Uuid,
    pub board: BoardScope,

    /// Weak reference: None once the creator has been removed
    pub creator_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
}

impl TaskScope {
    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.creator_id == Some(user_id)
    }

    pub fn is_assignee(&self, user_id: Uuid) -> bool {
        self.assignee_id == Some(user_id)
    }

    pub fn is_reviewer(&self, user_id: Uuid) -> bool {
        self.reviewer_id == Some(user_id)
    }
}

/// Comment authorship plus the parent task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentScope {
    pub id: Uuid,
    pub task: TaskScope,

    /// Weak reference: None once the author has been removed
    pub author_id: Option<Uuid>,
}

impl CommentScope {
    pub fn is_author(&self, user_id: Uuid) -> bool {
        self.author_id == Some(user_id)
    }
}

/// A loaded resource handed to the evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Board(BoardScope),
    Task(TaskScope),
    Comment(CommentScope),
}

impl Scope {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Scope::Board(_) => ResourceKind::Board,
            Scope::Task(_) => ResourceKind::Task,
            Scope::Comment(_) => ResourceKind::Comment,
        }
    }

    /// The board every resource ultimately belongs to
    pub fn board(&self) -> &BoardScope {
        match self {
            Scope::Board(board) => board,
            Scope::Task(task) => &task.board,
            Scope::Comment(comment) => &comment.task.board,
        }
    }

    /// The task for task and comment scopes
    pub fn task(&self) -> Option<&TaskScope> {
        match self {
            Scope::Board(_) => None,
            Scope::Task(task) => Some(task),
            Scope::Comment(comment) => Some(&comment.task),
        }
    }

    pub fn comment(&self) -> Option<&CommentScope> {
        match self {
            Scope::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn into_board(self) -> Option<BoardScope> {
        match self {
            Scope::Board(board) => Some(board),
            _ => None,
        }
    }

    pub fn into_task(self) -> Option<TaskScope> {
        match self {
            Scope::Task(task) => Some(task),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_not_implicitly_member() {
        let owner = Uuid::new_v4();
        let board = BoardScope::new(Uuid::new_v4(), owner, []);

        assert!(board.is_owner(owner));
        assert!(!board.is_member(owner));
    }

    #[test]
    fn test_scope_board_walks_parents() {
        let board = BoardScope::new(Uuid::new_v4(), Uuid::new_v4(), []);
        let task = TaskScope {
            id: Uuid::new_v4(),
            board: board.clone(),
            creator_id: None,
            assignee_id: None,
            reviewer_id: None,
        };
        let comment = Scope::Comment(CommentScope {
            id: Uuid::new_v4(),
            task: task.clone(),
            author_id: None,
        });

        assert_eq!(comment.board(), &board);
        assert_eq!(comment.task(), Some(&task));
        assert_eq!(comment.kind(), ResourceKind::Comment);
    }

    #[test]
    fn test_weak_references_match_nobody() {
        let task = TaskScope {
            id: Uuid::new_v4(),
            board: BoardScope::new(Uuid::new_v4(), Uuid::new_v4(), []),
            creator_id: None,
            assignee_id: None,
            reviewer_id: None,
        };

        let anyone = Uuid::new_v4();
        assert!(!task.is_creator(anyone));
        assert!(!task.is_assignee(anyone));
        assert!(!task.is_reviewer(anyone));
    }

    #[test]
    fn test_resource_ref_kind_and_id() {
        let task_id = Uuid::new_v4();
        let comment_id = Uuid::new_v4();
        let target = ResourceRef::Comment { task_id, comment_id };

        assert_eq!(target.kind(), ResourceKind::Comment);
        assert_eq!(target.id(), comment_id);
        assert_eq!(ResourceKind::Task.to_string(), "task");
    }
}
