use std::process::ExitCode;

fn main() -> ExitCode {
    intent_cli::run()
}
