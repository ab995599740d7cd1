use clap::Parser;
use webapi_pack::cli::{run_cli, Cli};
use webapi_pack::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let _guard = init_logging_with_config(&LogConfig::from_env())?;
    run_cli(Cli::parse())
}
