use crate::emit::Dialect;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "botblocks-rs",
    about = "Generate Telegram bot source code from a block project file."
)]
pub struct Args {
    #[arg(value_name = "INPUT", required_unless_present = "list_types")]
    pub input: Option<PathBuf>,

    #[arg(
        value_name = "OUTPUT",
        help = "Output file or directory. Prints to stdout when omitted."
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Dialect::Python, help = "Target dialect.")]
    pub dialect: Dialect,

    #[arg(long, help = "Do not emit per-handler comments.")]
    pub no_comments: bool,

    #[arg(
        long,
        help = "Escape quotes and line breaks in string values instead of inserting them verbatim."
    )]
    pub escape_strings: bool,

    #[arg(
        long,
        help = "Write the loaded block list back out as formatted JSON to this path."
    )]
    pub emit_normalized: Option<PathBuf>,

    #[arg(long, help = "List the available block types and exit.")]
    pub list_types: bool,

    #[arg(short, long, help = "Enable debug logging (overridden by RUST_LOG).")]
    pub verbose: bool,
}
