use std::process::ExitCode;

use clap::Parser;
use container_info::cli::Args;
use container_info::config::Config;

/// Entry point for the `container-info` tool.
///
/// Exits with `0` on success, including lookups that found nothing, `2` for
/// malformed lookups and `1` for everything else.
///
/// # Examples
///
/// ```bash
/// DEBUG=1 container-info --pid 1
/// container-info --monitor 1234:memory.usage_in_bytes,cpu.shares
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = Config::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    match container_info::run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_user_error() => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
