use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the rsi binary.
#[derive(Parser, Debug)]
#[command(
    name = "rsi",
    version,
    about = "Infer the status codes and payload types an action method actually returns"
)]
pub struct CliArgs {
    /// Analysis session (JSON): symbol table, operation tree and method list.
    pub session: PathBuf,

    /// Inference options (JSON) naming the well-known framework symbols.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Only analyze methods with these names.
    #[arg(short = 'm', long = "method", value_delimiter = ',')]
    pub methods: Vec<String>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,

    /// Exit with a non-zero status when any return path is unresolved.
    #[arg(long)]
    pub strict: bool,
}
