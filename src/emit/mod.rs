pub mod nodejs;
pub mod python;

use crate::generator::GeneratorOptions;
use crate::model::Block;
use crate::synth::{ActionBody, RenderedHandler};
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use nodejs::NodeJsEmitter;
pub use python::PythonEmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dialect {
    #[value(name = "python", alias = "py")]
    Python,
    #[value(name = "nodejs", alias = "node", alias = "js")]
    NodeJs,
}

impl Dialect {
    pub fn file_extension(self) -> &'static str {
        match self {
            Dialect::Python => "py",
            Dialect::NodeJs => "js",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("telegram_bot.{}", self.file_extension())
    }

    pub fn emitter(self, options: GeneratorOptions) -> Box<dyn Emitter> {
        match self {
            Dialect::Python => Box::new(PythonEmitter::new(options)),
            Dialect::NodeJs => Box::new(NodeJsEmitter::new(options)),
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Python => write!(f, "python"),
            Dialect::NodeJs => write!(f, "nodejs"),
        }
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Dialect::Python),
            "nodejs" | "node" | "js" => Ok(Dialect::NodeJs),
            other => Err(anyhow!(
                "Unknown dialect '{}'. Expected 'python' or 'nodejs'.",
                other
            )),
        }
    }
}

/// Per-dialect rendering of blocks into source text.
///
/// The synthesizer owns traversal and grouping; an emitter only knows how
/// one handler or one action looks in its target language. Adding a dialect
/// means adding an implementation of this trait and a `Dialect` variant.
pub trait Emitter {
    fn dialect(&self) -> Dialect;

    fn options(&self) -> &GeneratorOptions;

    fn comment_prefix(&self) -> &'static str;

    fn header(&self) -> String;

    fn footer(&self, handlers: &[RenderedHandler]) -> String;

    fn start_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String;

    fn command_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String;

    fn message_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String;

    /// Render one action block at `indent`. Types without a template render
    /// as an empty string.
    fn render_action(&self, block: &Block, indent: &str) -> String;

    /// One comment line. Line breaks in `text` are folded into spaces.
    fn comment(&self, text: &str) -> String {
        if !self.options().include_comments {
            return String::new();
        }
        let text = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
        format!("{} {}\n", self.comment_prefix(), text)
    }

    /// Contents of a double-quoted string literal.
    fn literal(&self, value: &str) -> String {
        if self.options().escape_strings {
            escape_literal(value)
        } else {
            value.to_string()
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Delay payload in milliseconds. `unit == "s"` scales by 1000.
pub(crate) fn delay_millis(block: &Block) -> f64 {
    let delay = block.number("delay");
    if block.text("unit") == "s" {
        delay * 1000.0
    } else {
        delay
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}
