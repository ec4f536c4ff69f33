use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// SQLite database file (created if missing)
    #[arg(long, env = "VGRAPH_DATABASE")]
    pub database: PathBuf,

    #[arg(long, default_value = "pretty", env = "VGRAPH_LOG_FORMAT")]
    pub log_format: String,
}

pub fn execute(args: MigrateArgs) -> anyhow::Result<()> {
    super::init_logging(&args.log_format)?;
    let conn = vgraph_store::db::open_and_migrate(&args.database)
        .with_context(|| format!("migrating {}", args.database.display()))?;
    let applied = vgraph_store::migrations::applied_migrations(&conn)?;
    println!(
        "{}: {} migration(s) applied ({})",
        args.database.display(),
        applied.len(),
        applied.join(", ")
    );
    Ok(())
}
