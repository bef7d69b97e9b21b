use std::process::ExitCode;

use env_logger::Env;

fn main() -> ExitCode {
    // Quiet by default; RUST_LOG raises verbosity
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            eprintln!("The installer cannot run without an async runtime.");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(migraine_install::install::install_interactive()) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("install failed: {e:?}");
            migraine_install::install::report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
