use crate::emit::Emitter;
use crate::model::Block;
use crate::registry::{is_trigger_type, BlockTypeRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Start,
    Command,
    Message,
}

impl TriggerKind {
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        match type_id {
            "start" => Some(TriggerKind::Start),
            "command" => Some(TriggerKind::Command),
            "message" => Some(TriggerKind::Message),
            _ => None,
        }
    }
}

/// A trigger block plus the contiguous run of blocks after it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerGroup<'a> {
    pub trigger: &'a Block,
    pub actions: Vec<&'a Block>,
}

impl HandlerGroup<'_> {
    pub fn kind(&self) -> Option<TriggerKind> {
        TriggerKind::from_type_id(&self.trigger.block_type)
    }
}

/// Split `blocks` into handler groups in one pass. Blocks ahead of the first
/// trigger belong to no group and are dropped.
pub fn partition(blocks: &[Block]) -> Vec<HandlerGroup<'_>> {
    let mut groups = Vec::new();
    let mut current: Option<HandlerGroup<'_>> = None;
    for block in blocks {
        if is_trigger_type(&block.block_type) {
            if let Some(done) = current.take() {
                groups.push(done);
            }
            current = Some(HandlerGroup {
                trigger: block,
                actions: Vec::new(),
            });
        } else if let Some(open) = current.as_mut() {
            open.actions.push(block);
        }
    }
    if let Some(done) = current {
        groups.push(done);
    }
    groups
}

/// Lazily rendered action list for one handler. Handlers choose the indent,
/// since a guarded body sits one level deeper than a plain one.
pub struct ActionBody<'a> {
    emitter: &'a dyn Emitter,
    registry: &'a BlockTypeRegistry,
    actions: &'a [&'a Block],
}

impl<'a> ActionBody<'a> {
    pub fn new(
        emitter: &'a dyn Emitter,
        registry: &'a BlockTypeRegistry,
        actions: &'a [&'a Block],
    ) -> Self {
        Self {
            emitter,
            registry,
            actions,
        }
    }

    pub fn render(&self, indent: &str) -> String {
        let mut code = String::new();
        for block in self.actions {
            if let Err(err) = self.registry.lookup(&block.block_type) {
                tracing::warn!(id = block.id, %err, "skipping block");
                continue;
            }
            code.push_str(&self.emitter.render_action(block, indent));
        }
        code
    }
}

/// One synthesized handler, with what the footer needs to register it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHandler {
    pub kind: TriggerKind,
    /// Command token without the leading slash. Empty for message handlers.
    pub command: String,
    pub text: String,
}

/// Command token of a start/command trigger with the leading slash removed.
pub fn command_token(trigger: &Block) -> String {
    let command = command_text(trigger);
    command
        .strip_prefix('/')
        .unwrap_or(command.as_str())
        .to_string()
}

/// The trigger's `command` payload; start triggers fall back to `/start`.
pub fn command_text(trigger: &Block) -> String {
    let command = trigger.text("command");
    if command.is_empty() && trigger.block_type == "start" {
        return "/start".to_string();
    }
    command
}

pub fn synthesize(
    emitter: &dyn Emitter,
    registry: &BlockTypeRegistry,
    blocks: &[Block],
) -> Vec<RenderedHandler> {
    let groups = partition(blocks);
    tracing::debug!(
        dialect = %emitter.dialect(),
        groups = groups.len(),
        "partitioned blocks into handler groups"
    );
    let mut handlers = Vec::with_capacity(groups.len());
    for group in &groups {
        let Some(kind) = group.kind() else {
            continue;
        };
        if let Err(err) = registry.lookup(&group.trigger.block_type) {
            tracing::warn!(id = group.trigger.id, %err, "skipping handler group");
            continue;
        }
        let body = ActionBody::new(emitter, registry, &group.actions);
        let text = match kind {
            TriggerKind::Start => emitter.start_handler(group.trigger, &body),
            TriggerKind::Command => emitter.command_handler(group.trigger, &body),
            TriggerKind::Message => emitter.message_handler(group.trigger, &body),
        };
        let command = match kind {
            TriggerKind::Message => String::new(),
            _ => command_token(group.trigger),
        };
        handlers.push(RenderedHandler {
            kind,
            command,
            text,
        });
    }
    handlers
}
