use clap::Parser;
use handoff_cli::{HandoffCli, init_tracing, run};

fn main() {
    let cli = HandoffCli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(handoff_cli::EXIT_INFRASTRUCTURE);
        }
    }
}
