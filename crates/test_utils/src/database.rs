//! PostgreSQL audit store fixtures
//!
//! Each [`AuditDatabase`] owns a throwaway Postgres container with the
//! scoring audit migrations applied. Docker is required, so tests built on
//! these helpers are `#[ignore]`d by default.

use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

use infra_db::{connect, run_migrations, DatabasePool, PgAuditStore, PoolSettings};

const IMAGE_TAG: &str = "16-alpine";
const CREDENTIALS: (&str, &str) = ("fraud", "fraud");
const DATABASE: &str = "fraud_audit";

/// Tables cleared by [`AuditDatabase::truncate`], children first
const AUDIT_TABLES: [&str; 2] = ["scored_claims", "claimants"];

pub type FixtureResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Connection URL for a containerised database
pub fn postgres_url(host: &str, port: u16) -> String {
    let (user, password) = CREDENTIALS;
    format!("postgres://{user}:{password}@{host}:{port}/{DATABASE}")
}

/// Small pool; tests never need many connections and a slow container
/// start should not trip the acquire timeout
pub fn fixture_pool_settings() -> PoolSettings {
    PoolSettings {
        max_connections: 4,
        min_connections: 1,
        acquire_timeout_ms: 30_000,
        ..PoolSettings::default()
    }
}

/// A migrated audit database living as long as the container
pub struct AuditDatabase {
    _container: ContainerAsync<Postgres>,
    url: String,
    pool: DatabasePool,
}

impl AuditDatabase {
    /// Starts a container and applies the migrations
    pub async fn start() -> FixtureResult<Self> {
        let (user, password) = CREDENTIALS;
        let container = Postgres::default()
            .with_user(user)
            .with_password(password)
            .with_db_name(DATABASE)
            .with_tag(IMAGE_TAG)
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(5432).await?;
        let url = postgres_url(&host, port);

        let pool = connect(&url, &fixture_pool_settings()).await?;
        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            url,
            pool,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// A store sharing this database's pool
    pub fn audit_store(&self) -> PgAuditStore {
        PgAuditStore::new(self.pool.clone())
    }

    /// Empties the audit tables, keeping the schema
    pub async fn truncate(&self) -> FixtureResult<()> {
        for table in AUDIT_TABLES {
            sqlx::query(&format!("TRUNCATE TABLE {table} CASCADE"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Declares a Docker-backed test receiving a fresh [`PgAuditStore`]
///
/// ```ignore
/// db_test!(test_persist, |store| {
///     store.persist(&record).await.unwrap();
/// });
/// ```
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$store:ident| $body:block) => {
        #[tokio::test]
        #[ignore = "requires docker"]
        async fn $name() {
            let db = $crate::database::AuditDatabase::start()
                .await
                .expect("audit database container should start");
            let $store = db.audit_store();
            $body
        }
    };
}
