/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded sqlx migrations
/// - `store`: the [`AccessStore`](crate::auth::authorization::AccessStore)
///   implementation that loads access scopes from PostgreSQL
///
/// # Example
///
/// ```no_run
/// use kanban_shared::db::migrations::run_migrations;
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod migrations;
pub mod pool;
pub mod store;
