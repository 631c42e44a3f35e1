/// Cross-resource consistency checks run before a mutation commits
///
/// These rejections are about referential integrity, not about who is asking.
/// They are reported as [`AuthzError::InvalidRoleAssignment`] and
/// [`AuthzError::EmptyContent`], separate from permission denials.
///
/// Board membership is checked at the moment of assignment only. A member who
/// later leaves the board stays assigned until someone changes the task.

use std::fmt;

use uuid::Uuid;

use super::authorization::AuthzError;
use super::scope::BoardScope;

/// Task field that references a user who must belong to the task's board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationField {
    Assignee,
    Reviewer,
}

impl RelationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationField::Assignee => "assignee",
            RelationField::Reviewer => "reviewer",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RelationField::Assignee => "Assignee",
            RelationField::Reviewer => "Reviewer",
        }
    }
}

impl fmt::Display for RelationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requires `candidate` to be a current member of `board`
///
/// `None` clears the field and always passes. The check concerns the
/// candidate only; whether the actor may edit the task is decided elsewhere.
///
/// # Errors
///
/// Returns [`AuthzError::InvalidRoleAssignment`] naming the field when the
/// candidate is not in the board's member set.
///
/// # Example
///
/// ```
/// use kanban_shared::auth::relations::{check_board_relation, RelationField};
/// use kanban_shared::auth::scope::BoardScope;
/// use uuid::Uuid;
///
/// let member = Uuid::new_v4();
/// let board = BoardScope::new(Uuid::new_v4(), Uuid::new_v4(), [member]);
///
/// assert!(check_board_relation(&board, Some(member), RelationField::Assignee).is_ok());
/// assert!(check_board_relation(&board, None, RelationField::Reviewer).is_ok());
/// assert!(check_board_relation(&board, Some(Uuid::new_v4()), RelationField::Reviewer).is_err());
/// ```
pub fn check_board_relation(
    board: &BoardScope,
    candidate: Option<Uuid>,
    field: RelationField,
) -> Result<(), AuthzError> {
    match candidate {
        None => Ok(()),
        Some(user_id) if board.is_member(user_id) => Ok(()),
        Some(_) => Err(AuthzError::InvalidRoleAssignment {
            field: field.as_str(),
            detail: format!("{} has to be a member of the board.", field.label()),
        }),
    }
}

/// Requires comment content to be present and non-blank
///
/// Returns the trimmed content on success.
///
/// # Errors
///
/// Returns [`AuthzError::EmptyContent`] for a missing body or content that is
/// empty after trimming whitespace.
pub fn check_comment_content(content: Option<&str>) -> Result<&str, AuthzError> {
    match content.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed),
        _ => Err(AuthzError::EmptyContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearing_never_fails() {
        let board = BoardScope::new(Uuid::new_v4(), Uuid::new_v4(), []);
        assert!(check_board_relation(&board, None, RelationField::Assignee).is_ok());
        assert!(check_board_relation(&board, None, RelationField::Reviewer).is_ok());
    }

    #[test]
    fn test_non_member_rejected_with_field() {
        let owner = Uuid::new_v4();
        let board = BoardScope::new(Uuid::new_v4(), owner, []);

        // The owner is not a member and cannot be assigned
        let err = check_board_relation(&board, Some(owner), RelationField::Assignee).unwrap_err();
        match err {
            AuthzError::InvalidRoleAssignment { field, detail } => {
                assert_eq!(field, "assignee");
                assert_eq!(detail, "Assignee has to be a member of the board.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reviewer_message() {
        let board = BoardScope::new(Uuid::new_v4(), Uuid::new_v4(), []);
        let err = check_board_relation(&board, Some(Uuid::new_v4()), RelationField::Reviewer)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid reviewer: Reviewer has to be a member of the board."
        );
    }

    #[test]
    fn test_member_accepted() {
        let member = Uuid::new_v4();
        let board = BoardScope::new(Uuid::new_v4(), Uuid::new_v4(), [member]);
        assert!(check_board_relation(&board, Some(member), RelationField::Reviewer).is_ok());
    }

    #[test]
    fn test_comment_content() {
        assert_eq!(check_comment_content(Some("  hello ")).unwrap(), "hello");
        assert!(matches!(check_comment_content(Some("   \n\t")), Err(AuthzError::EmptyContent)));
        assert!(matches!(check_comment_content(Some("")), Err(AuthzError::EmptyContent)));
        assert!(matches!(check_comment_content(None), Err(AuthzError::EmptyContent)));
    }
}
