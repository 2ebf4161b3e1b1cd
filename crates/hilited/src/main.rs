use std::process::ExitCode;

fn main() -> ExitCode {
    match hilited::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("hilited: {error}");
            ExitCode::from(error.exit_status())
        }
    }
}
