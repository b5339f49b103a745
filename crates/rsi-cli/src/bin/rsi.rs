use anyhow::Result;
use clap::Parser;
use rsi_cli::args::CliArgs;
use rsi_cli::driver;

const EXIT_UNRESOLVED: i32 = 2;

fn main() -> Result<()> {
    // Initialize tracing if RSI_LOG or RUST_LOG is set (zero cost otherwise).
    rsi_common::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let (report, json) = driver::run(&args)?;
    println!("{json}");

    if args.strict && !report.fully_resolved() {
        std::process::exit(EXIT_UNRESOLVED);
    }
    Ok(())
}
