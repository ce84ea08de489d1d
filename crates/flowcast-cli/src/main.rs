#![forbid(unsafe_code)]

fn main() {
    flowcast_cli::init_tracing();
    if let Err(error) = flowcast_cli::run_from_env() {
        eprintln!("flowcast: {error}");
        std::process::exit(error.exit_code());
    }
}
