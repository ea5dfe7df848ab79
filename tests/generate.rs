use botblocks_core::emit::Dialect;
use botblocks_core::generator::{CodeGenerator, GeneratorOptions};
use botblocks_core::model::{Block, BlockModel};
use botblocks_core::registry::BlockTypeRegistry;
use serde_json::{json, Map, Value};

fn block(id: u64, block_type: &str, payload: Value) -> Block {
    let payload = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Block::new(id, block_type, payload)
}

fn sample_project() -> Vec<Block> {
    vec![
        block(0, "send_text", json!({"text": "orphan", "parseMode": ""})),
        block(1, "start", json!({"command": "/start", "welcomeMessage": "Welcome!"})),
        block(2, "send_text", json!({"text": "first", "parseMode": "HTML"})),
        block(3, "delay", json!({"delay": 2, "unit": "s"})),
        block(4, "command", json!({"command": "/help", "description": "Show help"})),
        block(5, "send_photo", json!({"photoUrl": "https://x/p.png", "caption": ""})),
        block(6, "message", json!({"messageType": "text", "pattern": "Hello"})),
        block(7, "variable", json!({"operation": "set", "varName": "greeted", "varValue": "yes"})),
    ]
}

#[test]
fn generation_is_deterministic() {
    let generator = CodeGenerator::default();
    let blocks = sample_project();
    for dialect in [Dialect::Python, Dialect::NodeJs] {
        assert_eq!(
            generator.generate(&blocks, dialect),
            generator.generate(&blocks, dialect)
        );
    }
}

#[test]
fn blocks_before_first_trigger_produce_nothing() {
    let generator = CodeGenerator::default();
    let blocks = sample_project();
    for dialect in [Dialect::Python, Dialect::NodeJs] {
        assert!(!generator.generate(&blocks, dialect).contains("orphan"));
    }
}

#[test]
fn python_program_layout() {
    let code = CodeGenerator::default().generate(&sample_project(), Dialect::Python);

    let start = code.find("async def start_command").unwrap();
    let help = code.find("async def help_command").unwrap();
    let message = code.find("async def handle_message").unwrap();
    assert!(start < help && help < message);

    let start_body = &code[start..help];
    assert!(start_body.contains("\"first\", parse_mode='HTML'"));
    assert!(start_body.contains("await asyncio.sleep(2)\n"));
    assert!(!start_body.contains("Welcome!"));

    let help_body = &code[help..message];
    assert!(help_body.contains("\"\"\"Show help\"\"\""));
    assert!(help_body.contains("photo=\"https://x/p.png\"\n"));

    let message_body = &code[message..];
    assert!(message_body.contains("    if \"hello\" in text.lower():\n        user_data[\"greeted\"] = \"yes\"\n"));

    assert!(code.contains("    application.add_handler(CommandHandler(\"start\", start_command))\n"));
    assert!(code.contains("    application.add_handler(CommandHandler(\"help\", help_command))\n"));
    assert!(code.contains("MessageHandler(filters.TEXT & ~filters.COMMAND, handle_message)"));
    assert!(code.ends_with("if __name__ == \"__main__\":\n    main()\n"));
}

#[test]
fn nodejs_program_layout() {
    let code = CodeGenerator::default().generate(&sample_project(), Dialect::NodeJs);
    assert!(code.starts_with("/**\n * Telegram Bot"));
    assert!(code.contains(concat!(
        "// Handler for command /start\n",
        "bot.onText(/\\/start/, async (msg) => {\n",
        "    const chatId = msg.chat.id;\n",
        "    const user = msg.from;\n",
        "\n",
        "    await bot.sendMessage(chatId, \"first\", { parse_mode: 'HTML' });\n",
        "    await new Promise(resolve => setTimeout(resolve, 2000));\n",
        "});\n",
        "\n",
        "\n",
        "// Handler for command /help\n",
    )));
    assert!(code.contains(concat!(
        "    if (text.toLowerCase().includes(\"hello\")) {\n",
        "        userData[\"greeted\"] = \"yes\";\n",
        "    }\n",
    )));
    assert!(code.contains("bot.on('polling_error'"));
}

#[test]
fn empty_runs_fall_back() {
    let generator = CodeGenerator::default();
    let blocks = vec![
        block(0, "start", json!({"command": "/start", "welcomeMessage": "Welcome!"})),
        block(1, "command", json!({"command": "/about", "description": ""})),
        block(2, "condition", json!({"conditionType": "text_equals"})),
    ];

    let py = generator.generate(&blocks, Dialect::Python);
    assert!(py.contains("    await update.message.reply_text(\n        \"Welcome!\"\n    )\n"));
    assert!(py.contains("    await update.message.reply_text(\"Command /about executed\")\n"));
    assert!(py.contains("\"\"\"Handler for command /about\"\"\""));

    let js = generator.generate(&blocks, Dialect::NodeJs);
    assert!(js.contains("    await bot.sendMessage(chatId, \"Welcome!\");\n"));
    assert!(js.contains("    await bot.sendMessage(chatId, \"Command /about executed\");\n"));
}

#[test]
fn empty_welcome_message_uses_default_greeting() {
    let code = CodeGenerator::default().generate(
        &[block(0, "start", json!({"welcomeMessage": ""}))],
        Dialect::NodeJs,
    );
    assert!(code.contains("await bot.sendMessage(chatId, \"Hello!\");"));
}

#[test]
fn pattern_guard_only_when_pattern_is_set() {
    let generator = CodeGenerator::default();
    let action = block(1, "send_text", json!({"text": "pong", "parseMode": ""}));
    let guarded = vec![block(0, "message", json!({"pattern": "ping"})), action.clone()];
    let open = vec![block(0, "message", json!({"pattern": ""})), action];

    let py_guarded = generator.generate(&guarded, Dialect::Python);
    assert!(py_guarded.contains(concat!(
        "    if \"ping\" in text.lower():\n",
        "        await update.message.reply_text(\n",
        "            \"pong\"\n",
        "        )\n",
    )));
    let py_open = generator.generate(&open, Dialect::Python);
    assert!(!py_open.contains("text.lower()"));
    assert!(py_open.contains("    await update.message.reply_text(\n        \"pong\"\n    )\n"));

    let js_open = generator.generate(&open, Dialect::NodeJs);
    assert!(!js_open.contains("toLowerCase"));
    assert!(js_open.contains("    await bot.sendMessage(chatId, \"pong\");\n"));

    let fallback = generator.generate(&[block(0, "message", json!({"pattern": "x"}))], Dialect::Python);
    assert!(fallback.contains("        await update.message.reply_text(\"Message received\")\n"));
    let echo = generator.generate(&[block(0, "message", json!({}))], Dialect::NodeJs);
    assert!(echo.contains("    await bot.sendMessage(chatId, \"Received: \" + text);\n"));
}

#[test]
fn unknown_types_contribute_nothing() {
    let generator = CodeGenerator::default();
    let with_unknown = vec![
        block(0, "command", json!({"command": "/x"})),
        block(1, "send_text", json!({"text": "before"})),
        block(2, "teleport", json!({"text": "should not appear"})),
        block(3, "send_text", json!({"text": "after"})),
    ];
    let without: Vec<Block> = with_unknown
        .iter()
        .filter(|b| b.block_type != "teleport")
        .cloned()
        .collect();
    for dialect in [Dialect::Python, Dialect::NodeJs] {
        let code = generator.generate(&with_unknown, dialect);
        assert!(!code.contains("should not appear"));
        assert_eq!(code, generator.generate(&without, dialect));
    }
}

#[test]
fn model_built_in_editor_order_generates() {
    let registry = BlockTypeRegistry::builtin();
    let mut model = BlockModel::new();
    model.add_block(&registry, "start").unwrap();
    let buttons = model.add_block(&registry, "send_buttons").unwrap();
    let stray = model.add_block(&registry, "api_request").unwrap();
    model.remove_block(stray).unwrap();

    let generator = CodeGenerator::new(registry, GeneratorOptions::default());
    let code = generator.generate_model(&model, Dialect::Python);
    assert!(code.contains("[InlineKeyboardButton(\"Button 1\", callback_data=\"btn1\")],"));
    assert!(code.contains("\"Choose an action:\","));

    let mut patch = Map::new();
    patch.insert("buttonType".to_string(), json!("reply"));
    model.update_block_data(buttons, patch).unwrap();
    let code = generator.generate_model(&model, Dialect::NodeJs);
    assert!(code.contains("            [\"Button 1\"],\n            [\"Button 2\"]\n"));
}

#[test]
fn comments_can_be_disabled() {
    let generator = CodeGenerator::with_options(GeneratorOptions {
        include_comments: false,
        ..GeneratorOptions::default()
    });
    let code = generator.generate(&sample_project(), Dialect::Python);
    assert!(!code.contains("# Handler for command"));
    assert!(!code.contains("# Text message handler\nasync def"));
    assert!(code.contains("async def handle_message"));
}

#[test]
fn escaping_reaches_handler_level_strings() {
    let generator = CodeGenerator::with_options(GeneratorOptions {
        escape_strings: true,
        ..GeneratorOptions::default()
    });
    let blocks = vec![
        block(0, "start", json!({"command": "/start", "welcomeMessage": "Say \"hi\""})),
        block(1, "command", json!({"command": "/q\"x", "description": "a\"\"\"b"})),
        block(2, "message", json!({"pattern": "He said \"Yo\""})),
        block(3, "command", json!({"command": "/multi\nline", "description": ""})),
    ];

    let py = generator.generate(&blocks, Dialect::Python);
    assert!(py.contains(r##"        "Say \"hi\"""##));
    assert!(py.contains(r##"    """a\"\"\"b""""##));
    assert!(py.contains(r##"reply_text("Command /q\"x executed")"##));
    assert!(py.contains(r##"CommandHandler("q\"x", "##));
    assert!(py.contains(r##"    if "he said \"yo\"" in text.lower():"##));
    assert!(py.contains("# Handler for command /multi line\n"));
    assert!(py.contains(r##"    """Handler for command /multi\nline""""##));
    assert!(py.contains(r##"CommandHandler("multi\nline", "##));

    let js = generator.generate(&blocks, Dialect::NodeJs);
    assert!(js.contains(r##"await bot.sendMessage(chatId, "Say \"hi\"");"##));
    assert!(js.contains(r##"await bot.sendMessage(chatId, "Command /q\"x executed");"##));
    assert!(js.contains(r##"text.toLowerCase().includes("he said \"yo\"")"##));
    assert!(js.contains("// Handler for command /multi line\n"));
    assert!(js.contains(r##""Command /multi\nline executed""##));
}

#[test]
fn largest_block_id_does_not_stop_generation() {
    let source = format!(
        r#"[{{"id": {}, "type": "start", "data": {{"welcomeMessage": "still here"}}}}]"#,
        u64::MAX
    );
    let code = botblocks_core::generate_source_from_json(
        &source,
        Dialect::Python,
        GeneratorOptions::default(),
    )
    .unwrap();
    assert!(code.contains("\"still here\""));
}
