use std::process::ExitCode;

fn main() -> ExitCode {
    voicequote_cli::run()
}
