/// Database models for the Kanban backend
///
/// # Models
///
/// - `user`: accounts and the public user summary
/// - `board`: boards, member sets and the board overview
/// - `task`: tasks with status, priority, assignee and reviewer
/// - `comment`: comments on tasks
///
/// Models do no permission checks. Every write goes through the access gate
/// in [`crate::auth::authorization`] first.

pub mod board;
pub mod comment;
pub mod task;
pub mod user;
