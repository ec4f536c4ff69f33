pub mod migrate;
pub mod serve;

use vgraph_core::logging_facility::{init, Profile};

/// Install the global subscriber for `format` (`pretty` or `json`)
pub fn init_logging(format: &str) -> anyhow::Result<()> {
    let profile = Profile::parse(format)
        .ok_or_else(|| anyhow::anyhow!("unknown log format '{}'", format))?;
    init(profile);
    Ok(())
}
