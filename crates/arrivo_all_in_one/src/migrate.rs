use anyhow::{Result, bail};
use std::process::Command;
use tracing::debug;

/// Runs goose migrations against the arrival store.
///
/// Executes `goose -dir {migrations_dir} postgres {dsn} up` by spawning the
/// goose binary as a subprocess.
pub struct MigrationRunner {
    goose_binary_path: String,
    migrations_dir: String,
    dsn: String,
}

impl MigrationRunner {
    pub fn new(goose_binary_path: String, migrations_dir: String, dsn: String) -> Self {
        Self {
            goose_binary_path,
            migrations_dir,
            dsn,
        }
    }

    /// Runs all pending migrations.
    ///
    /// # Errors
    /// Returns an error if the goose binary is not found, the database is
    /// unreachable, or a migration fails.
    pub fn run_migrations(&self) -> Result<()> {
        debug!("running migrations from directory: {}", self.migrations_dir);

        let output = Command::new(&self.goose_binary_path)
            .arg("-dir")
            .arg(&self.migrations_dir)
            .arg("postgres")
            .arg(&self.dsn)
            .arg("up")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            bail!("Migration failed.\nstdout: {}\nstderr: {}", stdout, stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("migrations completed successfully:\n{}", stdout);

        Ok(())
    }
}
