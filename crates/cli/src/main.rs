use std::process::ExitCode;

fn main() -> ExitCode {
    partsdesk_cli::run()
}
