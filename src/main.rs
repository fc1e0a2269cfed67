use clap::Parser;
use fiesta::{app, cli, config, paths};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = cli::Args::parse();

    let config_path = paths::config_path()?;
    let cfg = config::Config::load_optional(&config_path)?;
    tracing::debug!(?config_path, ?cfg, "resolved config");

    match args.cmd.take() {
        Some(cli::Command::Serve { bind }) => app::cmd_serve(bind, cfg.as_ref()).await,
        Some(cli::Command::Models) => app::cmd_models(),
        None => app::cmd_ask(args, cfg.as_ref()).await,
    }
}
