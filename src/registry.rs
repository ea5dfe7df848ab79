use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Type identifiers that open a new handler group.
pub const TRIGGER_TYPES: [&str; 3] = ["start", "command", "message"];

pub fn is_trigger_type(type_id: &str) -> bool {
    TRIGGER_TYPES.contains(&type_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown block type '{0}'")]
    UnknownBlockType(String),

    #[error("block type '{0}' is registered twice")]
    DuplicateBlockType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    Text,
    Number,
    Textarea,
    Select,
    ButtonList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl PropertyDescriptor {
    fn new(name: &str, kind: PropertyKind, label: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: label.to_string(),
            placeholder: None,
            options: Vec::new(),
        }
    }

    fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    fn options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTypeDescriptor {
    pub type_id: String,
    pub name: String,
    pub icon: String,
    pub category: String,
    pub description: String,
    pub default_payload: Map<String, Value>,
    pub properties: Vec<PropertyDescriptor>,
}

impl BlockTypeDescriptor {
    pub fn new(type_id: &str, name: &str, icon: &str, category: &str, description: &str) -> Self {
        Self {
            type_id: type_id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            default_payload: Map::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(map) = defaults {
            self.default_payload = map;
        }
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn is_trigger(&self) -> bool {
        is_trigger_type(&self.type_id)
    }
}

/// Immutable catalog of block types, keyed by type identifier.
///
/// The catalog keeps insertion order so listings match the palette order of
/// the editor.
#[derive(Debug, Clone)]
pub struct BlockTypeRegistry {
    descriptors: Vec<BlockTypeDescriptor>,
    index: HashMap<String, usize>,
}

impl BlockTypeRegistry {
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = BlockTypeDescriptor>,
    ) -> Result<Self, RegistryError> {
        let descriptors = descriptors.into_iter().collect::<Vec<_>>();
        let mut index = HashMap::with_capacity(descriptors.len());
        for (pos, desc) in descriptors.iter().enumerate() {
            if index.insert(desc.type_id.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateBlockType(desc.type_id.clone()));
            }
        }
        Ok(Self { descriptors, index })
    }

    pub fn builtin() -> Self {
        let descriptors = builtin_descriptors();
        let index = descriptors
            .iter()
            .enumerate()
            .map(|(pos, desc)| (desc.type_id.clone(), pos))
            .collect();
        Self { descriptors, index }
    }

    pub fn lookup(&self, type_id: &str) -> Result<&BlockTypeDescriptor, RegistryError> {
        self.index
            .get(type_id)
            .map(|&pos| &self.descriptors[pos])
            .ok_or_else(|| RegistryError::UnknownBlockType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockTypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a BlockTypeDescriptor> + 'a {
        self.descriptors
            .iter()
            .filter(move |desc| desc.category == category)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for BlockTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const STORAGE_OPTIONS: [(&str, &str); 3] = [
    ("memory", "Memory (temporary)"),
    ("file", "File (JSON)"),
    ("database", "Database"),
];

fn builtin_descriptors() -> Vec<BlockTypeDescriptor> {
    use PropertyKind::*;
    vec![
        BlockTypeDescriptor::new("start", "Bot start", "▶️", "basic", "Handles the /start command")
            .with_defaults(json!({
                "command": "/start",
                "welcomeMessage": "Hello! I am a bot. How can I help?"
            }))
            .with_property(PropertyDescriptor::new("command", Text, "Command").placeholder("/start"))
            .with_property(
                PropertyDescriptor::new("welcomeMessage", Textarea, "Welcome message")
                    .placeholder("Enter the greeting text"),
            ),
        BlockTypeDescriptor::new("command", "Command", "⚡", "basic", "Handles a custom command")
            .with_defaults(json!({
                "command": "/help",
                "description": "Show help"
            }))
            .with_property(PropertyDescriptor::new("command", Text, "Command").placeholder("/help"))
            .with_property(
                PropertyDescriptor::new("description", Textarea, "Command description")
                    .placeholder("What does this command do?"),
            ),
        BlockTypeDescriptor::new("message", "Message", "💬", "basic", "Handles text messages")
            .with_defaults(json!({
                "messageType": "text",
                "pattern": ""
            }))
            .with_property(
                PropertyDescriptor::new("messageType", Select, "Message type").options(&[
                    ("text", "Text"),
                    ("photo", "Photo"),
                    ("video", "Video"),
                    ("document", "Document"),
                ]),
            )
            .with_property(
                PropertyDescriptor::new("pattern", Text, "Pattern (optional)")
                    .placeholder("Regular expression or text"),
            ),
        BlockTypeDescriptor::new("send_text", "Send text", "📤", "response", "Send a text message to the user")
            .with_defaults(json!({
                "text": "Your message here",
                "parseMode": "HTML"
            }))
            .with_property(
                PropertyDescriptor::new("text", Textarea, "Message text")
                    .placeholder("Enter the message text"),
            )
            .with_property(
                PropertyDescriptor::new("parseMode", Select, "Formatting mode").options(&[
                    ("HTML", "HTML"),
                    ("Markdown", "Markdown"),
                    ("", "No formatting"),
                ]),
            ),
        BlockTypeDescriptor::new("send_photo", "Send photo", "🖼️", "response", "Send a photo")
            .with_defaults(json!({
                "photoUrl": "",
                "caption": ""
            }))
            .with_property(
                PropertyDescriptor::new("photoUrl", Text, "Photo URL or file_id")
                    .placeholder("https://example.com/photo.jpg"),
            )
            .with_property(
                PropertyDescriptor::new("caption", Textarea, "Caption (optional)")
                    .placeholder("Photo caption"),
            ),
        BlockTypeDescriptor::new("send_buttons", "Buttons", "🔘", "response", "Send a message with buttons")
            .with_defaults(json!({
                "text": "Choose an action:",
                "buttons": [
                    { "text": "Button 1", "callback_data": "btn1" },
                    { "text": "Button 2", "callback_data": "btn2" }
                ],
                "buttonType": "inline"
            }))
            .with_property(
                PropertyDescriptor::new("text", Textarea, "Message text").placeholder("Enter the text"),
            )
            .with_property(
                PropertyDescriptor::new("buttonType", Select, "Button type").options(&[
                    ("inline", "Inline (under the message)"),
                    ("reply", "Reply (keyboard)"),
                ]),
            )
            .with_property(PropertyDescriptor::new("buttons", ButtonList, "Buttons")),
        BlockTypeDescriptor::new("condition", "Condition", "❓", "logic", "Conditional branch")
            .with_defaults(json!({
                "conditionType": "text_equals",
                "value": "",
                "operator": "=="
            }))
            .with_property(
                PropertyDescriptor::new("conditionType", Select, "Condition type").options(&[
                    ("text_equals", "Text equals"),
                    ("text_contains", "Text contains"),
                    ("callback_data", "Callback data"),
                    ("user_id", "User ID"),
                    ("custom", "Custom condition"),
                ]),
            )
            .with_property(
                PropertyDescriptor::new("value", Text, "Value to compare").placeholder("Enter a value"),
            )
            .with_property(
                PropertyDescriptor::new("operator", Select, "Operator").options(&[
                    ("==", "Equals (==)"),
                    ("!=", "Not equals (!=)"),
                    ("in", "Contains (in)"),
                    (">", "Greater than (>)"),
                    ("<", "Less than (<)"),
                ]),
            ),
        BlockTypeDescriptor::new("variable", "Variable", "📦", "logic", "Store or change a variable")
            .with_defaults(json!({
                "varName": "my_var",
                "varValue": "",
                "operation": "set"
            }))
            .with_property(
                PropertyDescriptor::new("varName", Text, "Variable name").placeholder("my_variable"),
            )
            .with_property(
                PropertyDescriptor::new("operation", Select, "Operation").options(&[
                    ("set", "Set value"),
                    ("get", "Get value"),
                    ("increment", "Increment by 1"),
                    ("decrement", "Decrement by 1"),
                ]),
            )
            .with_property(
                PropertyDescriptor::new("varValue", Text, "Value").placeholder("Variable value"),
            ),
        BlockTypeDescriptor::new("delay", "Delay", "⏱️", "logic", "Wait before the next action")
            .with_defaults(json!({
                "delay": 1000,
                "unit": "ms"
            }))
            .with_property(PropertyDescriptor::new("delay", Number, "Duration").placeholder("1000"))
            .with_property(
                PropertyDescriptor::new("unit", Select, "Unit")
                    .options(&[("ms", "Milliseconds"), ("s", "Seconds")]),
            ),
        BlockTypeDescriptor::new("save_data", "Save data", "💾", "data", "Save data to a store or file")
            .with_defaults(json!({
                "dataKey": "user_data",
                "dataValue": "",
                "storage": "memory"
            }))
            .with_property(PropertyDescriptor::new("storage", Select, "Storage").options(&STORAGE_OPTIONS))
            .with_property(PropertyDescriptor::new("dataKey", Text, "Key").placeholder("user_data"))
            .with_property(
                PropertyDescriptor::new("dataValue", Textarea, "Value").placeholder("Data to save"),
            ),
        BlockTypeDescriptor::new("load_data", "Load data", "📂", "data", "Load data from a store or file")
            .with_defaults(json!({
                "dataKey": "user_data",
                "storage": "memory"
            }))
            .with_property(PropertyDescriptor::new("storage", Select, "Storage").options(&STORAGE_OPTIONS))
            .with_property(PropertyDescriptor::new("dataKey", Text, "Key").placeholder("user_data")),
        BlockTypeDescriptor::new("api_request", "API request", "🔌", "api", "Perform an HTTP request")
            .with_defaults(json!({
                "url": "",
                "method": "GET",
                "headers": "",
                "body": ""
            }))
            .with_property(
                PropertyDescriptor::new("url", Text, "URL").placeholder("https://api.example.com/endpoint"),
            )
            .with_property(
                PropertyDescriptor::new("method", Select, "Method").options(&[
                    ("GET", "GET"),
                    ("POST", "POST"),
                    ("PUT", "PUT"),
                    ("DELETE", "DELETE"),
                ]),
            )
            .with_property(
                PropertyDescriptor::new("headers", Textarea, "Headers (JSON)")
                    .placeholder(r#"{"Content-Type": "application/json"}"#),
            )
            .with_property(
                PropertyDescriptor::new("body", Textarea, "Request body (JSON)")
                    .placeholder(r#"{"key": "value"}"#),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_triggers_and_actions() {
        let registry = BlockTypeRegistry::builtin();
        for type_id in TRIGGER_TYPES {
            assert!(registry.lookup(type_id).unwrap().is_trigger());
        }
        for type_id in [
            "send_text",
            "send_photo",
            "send_buttons",
            "condition",
            "variable",
            "delay",
            "save_data",
            "load_data",
            "api_request",
        ] {
            let desc = registry.lookup(type_id).unwrap();
            assert!(!desc.is_trigger(), "{type_id} should be an action");
        }
        assert_eq!(registry.len(), 12);
    }

    #[test]
    fn lookup_of_unregistered_type_fails() {
        let registry = BlockTypeRegistry::builtin();
        assert_eq!(
            registry.lookup("teleport").unwrap_err(),
            RegistryError::UnknownBlockType("teleport".to_string())
        );
    }

    #[test]
    fn buttons_default_is_list_of_pairs() {
        let registry = BlockTypeRegistry::builtin();
        let desc = registry.lookup("send_buttons").unwrap();
        let buttons = desc.default_payload["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[1]["callback_data"], "btn2");
        assert_eq!(desc.properties[2].kind, PropertyKind::ButtonList);
    }

    #[test]
    fn custom_registry_rejects_duplicates() {
        let err = BlockTypeRegistry::from_descriptors([
            BlockTypeDescriptor::new("start", "a", "", "basic", ""),
            BlockTypeDescriptor::new("start", "b", "", "basic", ""),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateBlockType("start".to_string()));
    }

    #[test]
    fn category_listing_keeps_catalog_order() {
        let registry = BlockTypeRegistry::builtin();
        let ids = registry
            .by_category("data")
            .map(|d| d.type_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["save_data", "load_data"]);
    }
}
