/// Database utilities
///
/// - `pool`: PostgreSQL connection pool construction with a startup
///   health check
/// - `migrations`: sqlx migration runner

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig};
