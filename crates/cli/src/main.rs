use std::process::ExitCode;

fn main() -> ExitCode {
    greenswap_cli::init_logging();
    greenswap_cli::run()
}
