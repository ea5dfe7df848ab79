use crate::emit::{Dialect, Emitter};
use crate::model::{Block, BlockModel};
use crate::registry::BlockTypeRegistry;
use crate::synth::synthesize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Interleave one comment per handler naming its trigger.
    pub include_comments: bool,
    /// Escape quotes, backslashes and line breaks in string payloads instead
    /// of splicing them into literals verbatim.
    pub escape_strings: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            escape_strings: false,
        }
    }
}

/// Turns a block list into a complete bot program for one dialect.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    registry: BlockTypeRegistry,
    options: GeneratorOptions,
}

impl CodeGenerator {
    pub fn new(registry: BlockTypeRegistry, options: GeneratorOptions) -> Self {
        Self { registry, options }
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self::new(BlockTypeRegistry::builtin(), options)
    }

    pub fn registry(&self) -> &BlockTypeRegistry {
        &self.registry
    }

    pub fn options(&self) -> GeneratorOptions {
        self.options
    }

    pub fn set_include_comments(&mut self, include: bool) {
        self.options.include_comments = include;
    }

    pub fn generate(&self, blocks: &[Block], dialect: Dialect) -> String {
        let emitter = dialect.emitter(self.options);
        self.generate_with(emitter.as_ref(), blocks)
    }

    pub fn generate_model(&self, model: &BlockModel, dialect: Dialect) -> String {
        self.generate(model.blocks(), dialect)
    }

    /// Assemble header, handlers and footer with an arbitrary emitter.
    pub fn generate_with(&self, emitter: &dyn Emitter, blocks: &[Block]) -> String {
        let handlers = synthesize(emitter, &self.registry, blocks);
        let mut code = emitter.header();
        code.push_str(
            &handlers
                .iter()
                .map(|h| h.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
        );
        code.push_str(&emitter.footer(&handlers));
        tracing::debug!(
            dialect = %emitter.dialect(),
            handlers = handlers.len(),
            bytes = code.len(),
            "generated program"
        );
        code
    }

    pub fn generate_python(&self, blocks: &[Block]) -> String {
        self.generate(blocks, Dialect::Python)
    }

    pub fn generate_nodejs(&self, blocks: &[Block]) -> String {
        self.generate(blocks, Dialect::NodeJs)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::with_options(GeneratorOptions::default())
    }
}
