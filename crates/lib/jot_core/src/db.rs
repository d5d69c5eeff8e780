//! Ephemeral PostgreSQL for integration tests.
//!
//! Spawns a throwaway instance via process spawning (`initdb`, `pg_ctl`,
//! `pg_isready`) with a tempdir data directory that is deleted on drop.
//! Deployed servers never touch this module; they connect to an external
//! database through `DATABASE_URL`.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgPool;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::sleep;

/// Database created inside the ephemeral instance.
const DATABASE_NAME: &str = "jot";

/// Maximum time to wait for PostgreSQL to become ready.
const PG_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval when waiting for PostgreSQL readiness.
const PG_READY_POLL: Duration = Duration::from_millis(200);

/// Errors that can occur while managing the ephemeral instance.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("PostgreSQL command failed: {0}")]
    Command(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pg_config not found on PATH")]
    PgConfigNotFound,

    #[error("PostgreSQL not ready after {0:?}")]
    ReadyTimeout(Duration),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// A temporary PostgreSQL instance on a free ephemeral port.
///
/// Data lives in a tempdir that vanishes when the value is dropped; call
/// [`EphemeralDb::stop`] first so the server process exits cleanly.
pub struct EphemeralDb {
    bin_dir: PathBuf,
    port: u16,
    started: bool,
    tempdir: tempfile::TempDir,
}

impl EphemeralDb {
    /// Discover PG binaries via `pg_config --bindir` and prepare a tempdir.
    pub async fn new() -> Result<Self> {
        let output = Command::new("pg_config")
            .arg("--bindir")
            .output()
            .await
            .map_err(|_| DbError::PgConfigNotFound)?;

        if !output.status.success() {
            return Err(DbError::PgConfigNotFound);
        }

        let bin_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();

        Ok(Self {
            bin_dir: PathBuf::from(bin_dir),
            port: 0,
            started: false,
            tempdir: tempfile::tempdir()?,
        })
    }

    fn data_dir(&self) -> PathBuf {
        self.tempdir.path().join("pgdata")
    }

    /// Initialize the data directory, start the server, and create the
    /// application database.
    pub async fn start(&mut self) -> Result<()> {
        log::info!("Initializing ephemeral PostgreSQL data directory...");
        let initdb = self.bin_dir.join("initdb");
        let output = Command::new(&initdb)
            .arg("-D")
            .arg(self.data_dir())
            .arg("--no-locale")
            .arg("--encoding=UTF8")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("initdb failed: {stderr}")));
        }

        self.port = find_free_port()?;
        log::info!("Starting ephemeral PostgreSQL on port {}...", self.port);

        let pg_ctl = self.bin_dir.join("pg_ctl");
        let port_opt = format!(
            "-p {} -k {} -h localhost",
            self.port,
            self.data_dir().display()
        );
        let logfile = self.data_dir().join("postgresql.log");

        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(self.data_dir())
            .arg("-o")
            .arg(&port_opt)
            .arg("-l")
            .arg(&logfile)
            .arg("start")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl start failed: {stderr}")));
        }

        self.wait_for_ready().await?;
        self.started = true;

        self.create_database().await?;
        log::info!("Database '{DATABASE_NAME}' ready at {}", self.connection_url());
        Ok(())
    }

    /// Stop the PostgreSQL server gracefully.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }

        let pg_ctl = self.bin_dir.join("pg_ctl");
        let output = Command::new(&pg_ctl)
            .arg("-D")
            .arg(self.data_dir())
            .arg("-m")
            .arg("fast")
            .arg("stop")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl stop failed: {stderr}")));
        }

        self.started = false;
        log::info!("Ephemeral PostgreSQL stopped");
        Ok(())
    }

    /// Connection URL for the application database.
    pub fn connection_url(&self) -> String {
        format!("postgresql://localhost:{}/{DATABASE_NAME}", self.port)
    }

    /// Port the server is listening on (0 until started).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for PostgreSQL to become ready, polling `pg_isready`.
    async fn wait_for_ready(&self) -> Result<()> {
        let pg_isready = self.bin_dir.join("pg_isready");
        let deadline = tokio::time::Instant::now() + PG_READY_TIMEOUT;

        loop {
            let output = Command::new(&pg_isready)
                .arg("-p")
                .arg(self.port.to_string())
                .arg("-h")
                .arg("localhost")
                .output()
                .await?;

            if output.status.success() {
                return Ok(());
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(DbError::ReadyTimeout(PG_READY_TIMEOUT));
            }

            sleep(PG_READY_POLL).await;
        }
    }

    /// Create the application database inside the fresh instance.
    async fn create_database(&self) -> Result<()> {
        let maintenance_url = format!("postgresql://localhost:{}/postgres", self.port);
        let pool = PgPool::connect(&maintenance_url).await?;

        // CREATE DATABASE cannot use bind parameters
        let sql = format!("CREATE DATABASE \"{DATABASE_NAME}\"");
        sqlx::query(&sql).execute(&pool).await?;

        pool.close().await;
        Ok(())
    }
}

/// Find a free ephemeral port by binding to port 0.
fn find_free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    Ok(port)
}
