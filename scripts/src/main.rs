use clap::Parser;
use tracing::error;
use upgrade_scripts::{cli::Cli, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    tracing_subscriber::fmt()
        .pretty()
        .with_writer(std::io::stderr)
        .init();

    let res = Cli::parse().run().await;
    if let Err(e) = &res {
        error!("{e}");
    }

    res
}
