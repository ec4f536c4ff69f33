use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use vgraph_engine::{EngineConfig, GraphEngine};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long, env = "VGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "127.0.0.1:8080", env = "VGRAPH_BIND")]
    pub bind: SocketAddr,

    /// SQLite database file; overrides `database_path` from the configuration
    #[arg(long, env = "VGRAPH_DATABASE")]
    pub database: Option<PathBuf>,

    /// `pretty` or `json`
    #[arg(long, default_value = "pretty", env = "VGRAPH_LOG_FORMAT")]
    pub log_format: String,
}

pub fn execute(args: ServeArgs) -> anyhow::Result<()> {
    super::init_logging(&args.log_format)?;

    let mut config = EngineConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }
    let engine = GraphEngine::open(config).context("opening engine")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    runtime.block_on(vgraph_server::api::serve(Arc::new(engine), args.bind))
}
