/// Authentication and access control
///
/// # Access control
///
/// - [`scope`]: loaded board, task and comment snapshots
/// - [`roles`]: role facts an actor holds on a scope
/// - [`policy`]: the pure permission evaluator
/// - [`relations`]: assignee/reviewer membership and comment content checks
/// - [`authorization`]: the gate that loads, decides, then executes
///
/// # Authentication
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: access and refresh tokens
/// - [`middleware`]: bearer token extraction into an [`AuthContext`](middleware::AuthContext)
///
/// # Example
///
/// ```
/// use kanban_shared::auth::policy::{decide, Actor, Operation};
/// use kanban_shared::auth::scope::{BoardScope, ResourceKind, Scope};
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let board = Scope::Board(BoardScope::new(Uuid::new_v4(), owner, []));
///
/// let stranger = Actor::User(Uuid::new_v4());
/// assert!(!decide(&stranger, Operation::Update, ResourceKind::Board, Some(&board)).is_allowed());
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod relations;
pub mod roles;
pub mod scope;
