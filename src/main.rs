//! filecopy-agent: send paths over stdout, read the verdict from stdin.

use anyhow::Result;
use clap::Parser;
use std::fs::File;
use std::io;

use filecopy_agent::cli::{usage_exit_code, Args};
use filecopy_agent::config::FileConfig;
use filecopy_agent::logging::{init_logging, level_for};
use filecopy_agent::notify::{report, FatalNotifier, StderrNotifier};
use filecopy_agent::path::resolve_argument;
use filecopy_agent::streaming::Session;
use filecopy_agent::TransferError;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err));
        }
    };

    let code = match run(&args) {
        Ok(()) => 0,
        Err(err) => match err.downcast_ref::<TransferError>() {
            Some(transfer) => report(transfer, &StderrNotifier),
            None => {
                StderrNotifier.notify(&format!("{err:#}"));
                1
            }
        },
    };
    std::process::exit(code);
}

fn run(args: &Args) -> Result<()> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    init_logging(&level_for(
        args.verbose,
        args.quiet,
        file_config.log_level.as_deref(),
    ))?;
    let config = args.sender_config(&file_config)?;

    let cwd = std::env::current_dir()
        .map_err(|e| TransferError::Internal(format!("failed to get current directory: {e}")))?;
    let stdout = raw_stdout()
        .map_err(|e| TransferError::Internal(format!("failed to get stdout handle: {e}")))?;

    let mut session = Session::new(io::stdin().lock(), stdout, config);
    for arg in &args.paths {
        let root = resolve_argument(&cwd, arg)?;
        session.send_path(&root)?;
    }
    session.finish()?;

    let stats = session.stats();
    tracing::info!(
        dirs = stats.dirs,
        files = stats.files,
        bytes = stats.content_bytes,
        sent = session.bytes_sent(),
        "transfer complete"
    );
    Ok(())
}

/// Unbuffered stdout, so every write reaches the channel when it is made.
#[cfg(unix)]
fn raw_stdout() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdout().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn raw_stdout() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdout().as_handle().try_clone_to_owned()?))
}
