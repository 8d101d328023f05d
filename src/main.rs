//! Command-line driver: reads engine commands from stdin and answers on stdout.

use std::io;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    kibitz::print_engine_info();
    kibitz::print_binary_info();

    let mut engine = kibitz::Engine::new();
    engine.run(&mut io::stdin().lock(), &mut io::stdout().lock())
}
