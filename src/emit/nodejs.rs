use super::{delay_millis, format_number, Dialect, Emitter};
use crate::generator::GeneratorOptions;
use crate::model::Block;
use crate::synth::{command_text, ActionBody, RenderedHandler};

const HEADER: &str = r#"/**
 * Telegram Bot
 * Generated with botblocks
 */

const TelegramBot = require('node-telegram-bot-api');
const fs = require('fs');

// Put your bot token here
const BOT_TOKEN = 'YOUR_BOT_TOKEN_HERE';

// Create the bot
const bot = new TelegramBot(BOT_TOKEN, { polling: true });

// In-memory data store
const userData = {};

console.log('Bot is starting...');

"#;

const FOOTER: &str = r#"
// Callback query handler
bot.on('callback_query', async (query) => {
    const chatId = query.message.chat.id;
    const data = query.data;

    // Acknowledge the callback query
    await bot.answerCallbackQuery(query.id);

    // Handle callback_data here
    await bot.sendMessage(chatId, `You selected: ${data}`);
});

// Error handling
bot.on('polling_error', (error) => {
    console.error('Polling error:', error);
});

console.log('Bot started successfully!');
"#;

/// Emits `node-telegram-bot-api` scripts.
#[derive(Debug, Clone, Default)]
pub struct NodeJsEmitter {
    options: GeneratorOptions,
}

impl NodeJsEmitter {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    fn send_buttons(&self, block: &Block, indent: &str) -> String {
        let separator = format!(",\n{}        ", indent);
        let inline = block.text("buttonType") == "inline";
        let rows = block
            .buttons()
            .iter()
            .map(|btn| {
                if inline {
                    format!(
                        "[{{ text: \"{}\", callback_data: \"{}\" }}]",
                        self.literal(&btn.text),
                        self.literal(&btn.callback_data)
                    )
                } else {
                    format!("[\"{}\"]", self.literal(&btn.text))
                }
            })
            .collect::<Vec<_>>()
            .join(&separator);
        let markup = if inline {
            "{ inline_keyboard: keyboard }"
        } else {
            "{ keyboard: keyboard, resize_keyboard: true }"
        };

        let mut code = String::new();
        code.push_str(&format!("{}const keyboard = [\n", indent));
        code.push_str(&format!("{}        {}\n", indent, rows));
        code.push_str(&format!("{}    ];\n", indent));
        code.push_str(&format!(
            "{}await bot.sendMessage(chatId, \"{}\", {{\n",
            indent,
            self.literal(&block.text("text"))
        ));
        code.push_str(&format!("{}    reply_markup: {}\n", indent, markup));
        code.push_str(&format!("{}}});\n", indent));
        code
    }
}

/// Regex body for `bot.onText`, with slashes escaped.
fn command_pattern(command: &str) -> String {
    command.replace('/', "\\/")
}

impl Emitter for NodeJsEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::NodeJs
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn comment_prefix(&self) -> &'static str {
        "//"
    }

    fn header(&self) -> String {
        HEADER.to_string()
    }

    fn footer(&self, _handlers: &[RenderedHandler]) -> String {
        FOOTER.to_string()
    }

    fn start_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String {
        let command = command_text(trigger);
        let mut code = self.comment(&format!("Handler for command {}", command));
        code.push_str(&format!(
            "bot.onText(/{}/, async (msg) => {{\n",
            command_pattern(&command)
        ));
        code.push_str("    const chatId = msg.chat.id;\n");
        code.push_str("    const user = msg.from;\n\n");

        let actions = body.render("    ");
        if actions.is_empty() {
            let mut welcome = trigger.text("welcomeMessage");
            if welcome.is_empty() {
                welcome = "Hello!".to_string();
            }
            code.push_str(&format!(
                "    await bot.sendMessage(chatId, \"{}\");\n",
                self.literal(&welcome)
            ));
        } else {
            code.push_str(&actions);
        }
        code.push_str("});\n");
        code
    }

    fn command_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String {
        let command = command_text(trigger);
        let mut code = self.comment(&format!("Handler for command {}", command));
        code.push_str(&format!(
            "bot.onText(/{}/, async (msg) => {{\n",
            command_pattern(&command)
        ));
        code.push_str("    const chatId = msg.chat.id;\n\n");

        let actions = body.render("    ");
        if actions.is_empty() {
            code.push_str(&format!(
                "    await bot.sendMessage(chatId, \"Command {} executed\");\n",
                self.literal(&command)
            ));
        } else {
            code.push_str(&actions);
        }
        code.push_str("});\n");
        code
    }

    fn message_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String {
        let mut code = self.comment("Text message handler");
        code.push_str("bot.on('message', async (msg) => {\n");
        code.push_str("    const chatId = msg.chat.id;\n");
        code.push_str("    const text = msg.text;\n\n");
        code.push_str("    if (!text || text.startsWith('/')) return;\n\n");

        let pattern = trigger.text("pattern");
        if pattern.is_empty() {
            let actions = body.render("    ");
            if actions.is_empty() {
                code.push_str("    await bot.sendMessage(chatId, \"Received: \" + text);\n");
            } else {
                code.push_str(&actions);
            }
        } else {
            code.push_str("    // Pattern check\n");
            code.push_str(&format!(
                "    if (text.toLowerCase().includes(\"{}\")) {{\n",
                self.literal(&pattern.to_lowercase())
            ));
            let actions = body.render("        ");
            if actions.is_empty() {
                code.push_str("        await bot.sendMessage(chatId, \"Message received\");\n");
            } else {
                code.push_str(&actions);
            }
            code.push_str("    }\n");
        }
        code.push_str("});\n");
        code
    }

    fn render_action(&self, block: &Block, indent: &str) -> String {
        match block.block_type.as_str() {
            "send_text" => {
                let parse_mode = block.text("parseMode");
                let options = if parse_mode.is_empty() {
                    String::new()
                } else {
                    format!(", {{ parse_mode: '{}' }}", self.literal(&parse_mode))
                };
                format!(
                    "{}await bot.sendMessage(chatId, \"{}\"{});\n",
                    indent,
                    self.literal(&block.text("text")),
                    options
                )
            }
            "send_photo" => {
                let caption = block.text("caption");
                let options = if caption.is_empty() {
                    String::new()
                } else {
                    format!(", {{ caption: \"{}\" }}", self.literal(&caption))
                };
                format!(
                    "{}await bot.sendPhoto(chatId, \"{}\"{});\n",
                    indent,
                    self.literal(&block.text("photoUrl")),
                    options
                )
            }
            "send_buttons" => self.send_buttons(block, indent),
            "delay" => format!(
                "{}await new Promise(resolve => setTimeout(resolve, {}));\n",
                indent,
                format_number(delay_millis(block))
            ),
            "variable" => match block.text("operation").as_str() {
                "set" => format!(
                    "{}userData[\"{}\"] = \"{}\";\n",
                    indent,
                    self.literal(&block.text("varName")),
                    self.literal(&block.text("varValue"))
                ),
                "get" => format!(
                    "{}const value = userData[\"{}\"] || \"\";\n",
                    indent,
                    self.literal(&block.text("varName"))
                ),
                _ => String::new(),
            },
            "save_data" => {
                if block.text("storage") == "file" {
                    format!(
                        "{}fs.writeFileSync('bot_data.json', JSON.stringify(userData, null, 2));\n",
                        indent
                    )
                } else {
                    format!(
                        "{}userData[\"{}\"] = \"{}\";\n",
                        indent,
                        self.literal(&block.text("dataKey")),
                        self.literal(&block.text("dataValue"))
                    )
                }
            }
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn block(block_type: &str, payload: Value) -> Block {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Block::new(0, block_type, payload)
    }

    fn emitter() -> NodeJsEmitter {
        NodeJsEmitter::new(GeneratorOptions::default())
    }

    #[test]
    fn send_text_options() {
        let e = emitter();
        assert_eq!(
            e.render_action(&block("send_text", json!({"text": "Hi", "parseMode": "Markdown"})), "    "),
            "    await bot.sendMessage(chatId, \"Hi\", { parse_mode: 'Markdown' });\n"
        );
        assert_eq!(
            e.render_action(&block("send_text", json!({"text": "Hi"})), ""),
            "await bot.sendMessage(chatId, \"Hi\");\n"
        );
    }

    #[test]
    fn send_photo_caption() {
        assert_eq!(
            emitter().render_action(&block("send_photo", json!({"photoUrl": "u", "caption": "c"})), ""),
            "await bot.sendPhoto(chatId, \"u\", { caption: \"c\" });\n"
        );
    }

    #[test]
    fn inline_keyboard_rows() {
        let code = emitter().render_action(
            &block(
                "send_buttons",
                json!({
                    "text": "Pick",
                    "buttonType": "inline",
                    "buttons": [
                        {"text": "A", "callback_data": "a"},
                        {"text": "B", "callback_data": "b"}
                    ]
                }),
            ),
            "",
        );
        let expected = concat!(
            "const keyboard = [\n",
            "        [{ text: \"A\", callback_data: \"a\" }],\n",
            "        [{ text: \"B\", callback_data: \"b\" }]\n",
            "    ];\n",
            "await bot.sendMessage(chatId, \"Pick\", {\n",
            "    reply_markup: { inline_keyboard: keyboard }\n",
            "});\n",
        );
        assert_eq!(code, expected);
    }

    #[test]
    fn reply_keyboard_uses_resize() {
        let code = emitter().render_action(
            &block("send_buttons", json!({"text": "t", "buttonType": "reply", "buttons": [{"text": "X"}]})),
            "",
        );
        assert!(code.contains("        [\"X\"]\n"));
        assert!(code.contains("reply_markup: { keyboard: keyboard, resize_keyboard: true }"));
    }

    #[test]
    fn delay_is_emitted_in_milliseconds() {
        let e = emitter();
        let seconds = e.render_action(&block("delay", json!({"delay": 2, "unit": "s"})), "");
        let millis = e.render_action(&block("delay", json!({"delay": "2000", "unit": "ms"})), "");
        assert_eq!(seconds, "await new Promise(resolve => setTimeout(resolve, 2000));\n");
        assert_eq!(seconds, millis);
    }

    #[test]
    fn storage_templates() {
        let e = emitter();
        assert_eq!(
            e.render_action(&block("save_data", json!({"storage": "file"})), ""),
            "fs.writeFileSync('bot_data.json', JSON.stringify(userData, null, 2));\n"
        );
        assert_eq!(
            e.render_action(&block("variable", json!({"operation": "get", "varName": "x"})), ""),
            "const value = userData[\"x\"] || \"\";\n"
        );
        assert_eq!(e.render_action(&block("load_data", json!({})), ""), "");
    }

    #[test]
    fn command_pattern_escapes_slashes() {
        assert_eq!(command_pattern("/help"), "\\/help");
        assert_eq!(command_pattern("/a/b"), "\\/a\\/b");
    }
}
