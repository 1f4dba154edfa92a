//! JavaScript commands returned to the client.
//!
//! Controls cannot touch the browser directly. They queue commands here and
//! the embedding application ships them to the client runtime with the
//! response, ordered by [`Priority`].

use serde::Serialize;
use serde_json::Value as JsonValue;

/// When a command runs relative to the rest of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Before any redrawn html is applied.
    High,
    /// In queue order.
    #[default]
    Standard,
    /// After standard commands.
    Low,
    /// After everything else, once the page has settled.
    Final,
}

/// A single command for the client runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsCommand {
    /// Call a widget method on the client object of a control.
    #[serde(rename_all = "camelCase")]
    ControlCommand {
        id: String,
        command: String,
        priority: Priority,
        args: Vec<JsonValue>,
    },
    /// Call a function on every element matching a selector.
    #[serde(rename_all = "camelCase")]
    SelectorFunction {
        selector: String,
        function: String,
        priority: Priority,
        args: Vec<JsonValue>,
    },
    /// Call a global function.
    #[serde(rename_all = "camelCase")]
    JsFunction {
        name: String,
        priority: Priority,
        args: Vec<JsonValue>,
    },
}

impl JsCommand {
    /// Priority of the command.
    pub fn priority(&self) -> Priority {
        match self {
            JsCommand::ControlCommand { priority, .. }
            | JsCommand::SelectorFunction { priority, .. }
            | JsCommand::JsFunction { priority, .. } => *priority,
        }
    }
}

/// Queue of commands produced while handling one request.
#[derive(Debug, Clone, Default)]
pub struct ResponseCommands {
    commands: Vec<JsCommand>,
}

impl ResponseCommands {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for a control's client widget.
    pub fn execute_control_command(
        &mut self,
        id: impl Into<String>,
        command: impl Into<String>,
        priority: Priority,
        args: Vec<JsonValue>,
    ) {
        self.commands.push(JsCommand::ControlCommand {
            id: id.into(),
            command: command.into(),
            priority,
            args,
        });
    }

    /// Queue a function call on every element matching `selector`.
    pub fn execute_selector_function(
        &mut self,
        selector: impl Into<String>,
        function: impl Into<String>,
        priority: Priority,
        args: Vec<JsonValue>,
    ) {
        self.commands.push(JsCommand::SelectorFunction {
            selector: selector.into(),
            function: function.into(),
            priority,
            args,
        });
    }

    /// Queue a global function call.
    pub fn execute_js_function(
        &mut self,
        name: impl Into<String>,
        priority: Priority,
        args: Vec<JsonValue>,
    ) {
        self.commands.push(JsCommand::JsFunction {
            name: name.into(),
            priority,
            args,
        });
    }

    /// Commands in queue order.
    pub fn commands(&self) -> &[JsCommand] {
        &self.commands
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drain the queue, ordered by priority. Equal priorities keep queue order.
    pub fn take(&mut self) -> Vec<JsCommand> {
        let mut commands = std::mem::take(&mut self.commands);
        commands.sort_by_key(JsCommand::priority);
        commands
    }

    /// Render the queue as the JSON array the client runtime consumes.
    pub fn to_json(&self) -> horizon_tabula_core::Result<String> {
        let mut ordered = self.commands.clone();
        ordered.sort_by_key(JsCommand::priority);
        Ok(serde_json::to_string(&ordered)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_ordering() {
        let mut commands = ResponseCommands::new();
        commands.execute_js_function("last", Priority::Final, vec![]);
        commands.execute_control_command("t1", "refresh", Priority::Standard, vec![]);
        commands.execute_selector_function("#t1 input", "click", Priority::High, vec![]);

        let taken = commands.take();
        assert_eq!(taken[0].priority(), Priority::High);
        assert_eq!(taken[2].priority(), Priority::Final);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_to_json() {
        let mut commands = ResponseCommands::new();
        commands.execute_selector_function(
            "#t1 input",
            "prop",
            Priority::Standard,
            vec![json!("checked"), json!(true)],
        );
        let text = commands.to_json().unwrap();
        assert_eq!(
            text,
            r##"[{"type":"selectorFunction","selector":"#t1 input","function":"prop","priority":"standard","args":["checked",true]}]"##
        );
    }
}
