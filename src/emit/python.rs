use super::{delay_millis, format_number, Dialect, Emitter};
use crate::generator::GeneratorOptions;
use crate::model::Block;
use crate::synth::{command_text, ActionBody, RenderedHandler, TriggerKind};

const HEADER: &str = r#"#!/usr/bin/env python3
# -*- coding: utf-8 -*-
"""
Telegram Bot
Generated with botblocks
"""

from telegram import Update, InlineKeyboardButton, InlineKeyboardMarkup, ReplyKeyboardMarkup
from telegram.ext import Application, CommandHandler, MessageHandler, CallbackQueryHandler, filters
import logging
import json
import asyncio

# Logging setup
logging.basicConfig(
    format='%(asctime)s - %(name)s - %(levelname)s - %(message)s',
    level=logging.INFO
)
logger = logging.getLogger(__name__)

# In-memory data store
user_data = {}

# Put your bot token here
BOT_TOKEN = "YOUR_BOT_TOKEN_HERE"

"#;

const CALLBACK_HANDLER: &str = r#"
# Callback query handler
async def button_callback(update: Update, context) -> None:
    """Handles inline button presses"""
    query = update.callback_query
    await query.answer()

    # Handle callback_data here
    data = query.data
    await query.edit_message_text(text=f"You selected: {data}")

def main() -> None:
    """Start the bot"""
    # Build the application
    application = Application.builder().token(BOT_TOKEN).build()
"#;

const MAIN_TAIL: &str = r#"
    # Start polling
    logger.info("Bot started!")
    application.run_polling(allowed_updates=Update.ALL_TYPES)

if __name__ == "__main__":
    main()
"#;

/// Emits `python-telegram-bot` (v20+) applications.
#[derive(Debug, Clone, Default)]
pub struct PythonEmitter {
    options: GeneratorOptions,
}

impl PythonEmitter {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    fn reply_text(&self, indent: &str, args: &str) -> String {
        format!(
            "{indent}await update.message.reply_text(\n{indent}    {args}\n{indent})\n",
            indent = indent,
            args = args
        )
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
                        "[InlineKeyboardButton(\"{}\", callback_data=\"{}\")]",
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
            "InlineKeyboardMarkup(keyboard)"
        } else {
            "ReplyKeyboardMarkup(keyboard, resize_keyboard=True)"
        };

        let mut code = String::new();
        code.push_str(&format!("{}keyboard = [\n", indent));
        code.push_str(&format!("{}        {}\n", indent, rows));
        code.push_str(&format!("{}    ]\n", indent));
        code.push_str(&format!("{}reply_markup = {}\n", indent, markup));
        code.push_str(&format!("{}await update.message.reply_text(\n", indent));
        code.push_str(&format!("{}    \"{}\",\n", indent, self.literal(&block.text("text"))));
        code.push_str(&format!("{}    reply_markup=reply_markup\n", indent));
        code.push_str(&format!("{})\n", indent));
        code
    }
}

impl Emitter for PythonEmitter {
    fn dialect(&self) -> Dialect {
        Dialect::Python
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn comment_prefix(&self) -> &'static str {
        "#"
    }

    fn header(&self) -> String {
        HEADER.to_string()
    }

    fn footer(&self, handlers: &[RenderedHandler]) -> String {
        let mut code = String::from(CALLBACK_HANDLER);

        let commands = handlers
            .iter()
            .filter(|h| h.kind != TriggerKind::Message)
            .collect::<Vec<_>>();
        if !commands.is_empty() {
            code.push_str("\n    # Register command handlers\n");
            for handler in commands {
                let function = match handler.kind {
                    TriggerKind::Start => "start_command".to_string(),
                    _ => format!("{}_command", handler.command),
                };
                code.push_str(&format!(
                    "    application.add_handler(CommandHandler(\"{}\", {}))\n",
                    self.literal(&handler.command),
                    function
                ));
            }
        }

        code.push_str("\n    # Callback query handler\n");
        code.push_str("    application.add_handler(CallbackQueryHandler(button_callback))\n");

        if handlers.iter().any(|h| h.kind == TriggerKind::Message) {
            code.push_str("\n    # Text message handler\n");
            code.push_str(
                "    application.add_handler(MessageHandler(filters.TEXT & ~filters.COMMAND, handle_message))\n",
            );
        }

        code.push_str(MAIN_TAIL);
        code
    }

    fn start_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String {
        let command = command_text(trigger);
        let mut code = self.comment(&format!("Handler for command {}", command));
        code.push_str("async def start_command(update: Update, context) -> None:\n");
        code.push_str(&format!(
            "    \"\"\"Handler for command {}\"\"\"\n",
            self.literal(&command)
        ));
        code.push_str("    user = update.effective_user\n");
        code.push_str("    chat_id = update.effective_chat.id\n\n");

        let actions = body.render("    ");
        if actions.is_empty() {
            let mut welcome = trigger.text("welcomeMessage");
            if welcome.is_empty() {
                welcome = "Hello!".to_string();
            }
            code.push_str(&self.reply_text("    ", &format!("\"{}\"", self.literal(&welcome))));
        } else {
            code.push_str(&actions);
        }
        code.push('\n');
        code
    }

    fn command_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String {
        let command = command_text(trigger);
        let name = command.strip_prefix('/').unwrap_or(&command);
        let mut description = self.literal(&trigger.text("description"));
        if description.is_empty() {
            description = format!("Handler for command {}", self.literal(&command));
        }

        let mut code = self.comment(&format!("Handler for command {}", command));
        code.push_str(&format!(
            "async def {}_command(update: Update, context) -> None:\n",
            name
        ));
        code.push_str(&format!("    \"\"\"{}\"\"\"\n", description));
        code.push_str("    chat_id = update.effective_chat.id\n\n");

        let actions = body.render("    ");
        if actions.is_empty() {
            code.push_str(&format!(
                "    await update.message.reply_text(\"Command {} executed\")\n",
                self.literal(&command)
            ));
        } else {
            code.push_str(&actions);
        }
        code.push('\n');
        code
    }

    fn message_handler(&self, trigger: &Block, body: &ActionBody<'_>) -> String {
        let mut code = self.comment("Text message handler");
        code.push_str("async def handle_message(update: Update, context) -> None:\n");
        code.push_str("    \"\"\"Text message handler\"\"\"\n");
        code.push_str("    chat_id = update.effective_chat.id\n");
        code.push_str("    text = update.message.text\n\n");

        let pattern = trigger.text("pattern");
        if pattern.is_empty() {
            let actions = body.render("    ");
            if actions.is_empty() {
                code.push_str("    await update.message.reply_text(\"Received: \" + text)\n");
            } else {
                code.push_str(&actions);
            }
        } else {
            code.push_str("    # Pattern check\n");
            code.push_str(&format!(
                "    if \"{}\" in text.lower():\n",
                self.literal(&pattern.to_lowercase())
            ));
            let actions = body.render("        ");
            if actions.is_empty() {
                code.push_str("        await update.message.reply_text(\"Message received\")\n");
            } else {
                code.push_str(&actions);
            }
        }
        code.push('\n');
        code
    }

    fn render_action(&self, block: &Block, indent: &str) -> String {
        match block.block_type.as_str() {
            "send_text" => {
                let parse_mode = block.text("parseMode");
                let parse_mode = if parse_mode.is_empty() {
                    String::new()
                } else {
                    format!(", parse_mode='{}'", self.literal(&parse_mode))
                };
                self.reply_text(
                    indent,
                    &format!("\"{}\"{}", self.literal(&block.text("text")), parse_mode),
                )
            }
            "send_photo" => {
                let caption = block.text("caption");
                let caption = if caption.is_empty() {
                    String::new()
                } else {
                    format!(", caption=\"{}\"", self.literal(&caption))
                };
                format!(
                    "{indent}await update.message.reply_photo(\n{indent}    photo=\"{url}\"{caption}\n{indent})\n",
                    indent = indent,
                    url = self.literal(&block.text("photoUrl")),
                    caption = caption
                )
            }
            "send_buttons" => self.send_buttons(block, indent),
            "delay" => format!(
                "{}await asyncio.sleep({})\n",
                indent,
                format_number(delay_millis(block) / 1000.0)
            ),
            "variable" => match block.text("operation").as_str() {
                "set" => format!(
                    "{}user_data[\"{}\"] = \"{}\"\n",
                    indent,
                    self.literal(&block.text("varName")),
                    self.literal(&block.text("varValue"))
                ),
                "get" => format!(
                    "{}value = user_data.get(\"{}\", \"\")\n",
                    indent,
                    self.literal(&block.text("varName"))
                ),
                _ => String::new(),
            },
            "save_data" => {
                if block.text("storage") == "file" {
                    format!(
                        "{indent}with open('bot_data.json', 'w') as f:\n{indent}    json.dump(user_data, f)\n",
                        indent = indent
                    )
                } else {
                    format!(
                        "{}user_data[\"{}\"] = \"{}\"\n",
                        indent,
                        self.literal(&block.text("dataKey")),
                        self.literal(&block.text("dataValue"))
                    )
                }
            }
            // condition, load_data and api_request have no template yet.
            _ => String::new(),
        }
    }
}
