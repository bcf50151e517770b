use clap::Parser;
use sefer_cli::Cli;
use sefer_logging::{LogConfig, SeferSubscriberBuilder, SessionContextGuard};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only
    let _log_guard = SeferSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .with_level(&cli.log_level)
        .init();
    let _session = SessionContextGuard::new();

    let span = tracing::info_span!("command", command = ?cli.command);
    let output = span.in_scope(|| sefer_cli::execute(&cli))?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
