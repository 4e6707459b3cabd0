//! formmail server binary

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use formmail::config::FormMailConfig;

#[derive(Parser)]
#[command(name = "formmail")]
#[command(version)]
#[command(about = "Relay contact form submissions to a mailbox over SMTP", long_about = None)]
struct Cli {
    /// Config file merged after the standard locations
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    formmail::observability::init()?;

    let mut config = FormMailConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    tracing::debug!(?config, "Configuration loaded");
    formmail::server::serve(config).await
}
