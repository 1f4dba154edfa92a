//! Per-request input.
//!
//! The embedding HTTP layer parses the request and builds a
//! [`RequestContext`]: submitted form values, checkable control values,
//! custom values posted by the client widgets, the request mode, the client
//! timezone and the action (if any) that triggered the request.

use std::collections::{BTreeMap, HashMap};

use horizon_tabula_core::{CancellationToken, Value};

/// Event names shared with the client-side runtime.
pub mod events {
    /// A sort button was clicked. Value: the column ID.
    pub const TABLE_SORT: &str = "TableSort";
    /// A select-table row was clicked. Value: the row's `data-id`.
    pub const ROW_SELECTED: &str = "RowSelected";
    /// A row checkbox was toggled. Value: `{id, checked, row, column}`.
    pub const CHECKBOX_COLUMN_CLICK: &str = "CheckboxColumnClick";
    /// A pager button was clicked. Value: the target page number.
    pub const PAGE_CLICK: &str = "PageClick";
    /// Generic action routed to a table column.
    pub const COLUMN_ACTION: &str = "ColumnAction";
    /// The check-all box of a checkbox column was toggled. Value: the new state.
    pub const ALL_CLICK: &str = "AllClick";
    /// A button in a button column was clicked. Value: the button's `data-value`.
    pub const BUTTON_COLUMN_CLICK: &str = "ButtonColumnClick";
}

/// How the client submitted the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Full form post. Checkbox groups submit the complete set of checked values.
    #[default]
    Server,
    /// Incremental request. Widgets submit only what changed.
    Ajax,
}

/// An action to dispatch to a control after form values are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionParams {
    /// The control the action is addressed to.
    pub control_id: String,
    /// The event name, see [`events`].
    pub action: String,
    /// The event value.
    pub value: Value,
    /// For column actions, the column that should receive the action.
    pub column_id: Option<String>,
}

impl ActionParams {
    /// Create an action without a value.
    pub fn new(control_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            action: action.into(),
            value: Value::Null,
            column_id: None,
        }
    }

    /// Set the event value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Route the action to a column of the target table.
    pub fn with_column(mut self, column_id: impl Into<String>) -> Self {
        self.column_id = Some(column_id.into());
        self
    }

    /// The value as a string, or an empty string for non-string values.
    pub fn value_str(&self) -> String {
        self.value.to_string()
    }
}

/// Everything a control may read from the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    mode: RequestMode,
    post_back: bool,
    form: HashMap<String, Vec<String>>,
    checkables: HashMap<String, Value>,
    custom: HashMap<String, BTreeMap<String, Value>>,
    timezone_offset: i32,
    action: Option<ActionParams>,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Create an empty server-mode request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a server-mode request.
    pub fn server() -> Self {
        Self::new()
    }

    /// Create an Ajax-mode request.
    pub fn ajax() -> Self {
        Self {
            mode: RequestMode::Ajax,
            post_back: true,
            ..Self::default()
        }
    }

    /// Mark this request as a form submission, even without any form values.
    pub fn with_post_back(mut self) -> Self {
        self.post_back = true;
        self
    }

    /// Add a single-valued form field.
    pub fn with_form_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_back = true;
        self.form.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Add a multi-valued form field.
    pub fn with_form_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_back = true;
        self.form
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Set the value of a checkable control.
    pub fn with_checkable(mut self, id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.checkables.insert(id.into(), value.into());
        self
    }

    /// Set a custom value posted by a client widget.
    pub fn with_custom_value(
        mut self,
        id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.custom
            .entry(id.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Set the client timezone offset, in minutes east of UTC.
    pub fn with_timezone_offset(mut self, minutes: i32) -> Self {
        self.timezone_offset = minutes;
        self
    }

    /// Set the action to dispatch.
    pub fn with_action(mut self, action: ActionParams) -> Self {
        self.action = Some(action);
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Request mode.
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Returns `true` if the request carries submitted form data.
    pub fn is_post_back(&self) -> bool {
        self.post_back
    }

    /// First value of a form field.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values of a form field.
    pub fn form_values(&self, name: &str) -> Option<&[String]> {
        self.form.get(name).map(Vec::as_slice)
    }

    /// The value of a checkable control, if submitted.
    pub fn checkable_value(&self, id: &str) -> Option<&Value> {
        self.checkables.get(id)
    }

    /// A custom value posted by a client widget.
    pub fn custom_control_value(&self, id: &str, key: &str) -> Option<&Value> {
        self.custom.get(id).and_then(|values| values.get(key))
    }

    /// Client timezone offset in minutes east of UTC.
    pub fn timezone_offset(&self) -> i32 {
        self.timezone_offset
    }

    /// The action that triggered this request.
    pub fn action(&self) -> Option<&ActionParams> {
        self.action.as_ref()
    }

    /// Cancellation token of this request.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_lookup() {
        let request = RequestContext::server()
            .with_form_value("q", "abc")
            .with_form_values("t1_sel", ["r1", "r3"]);
        assert!(request.is_post_back());
        assert_eq!(request.form_value("q"), Some("abc"));
        assert_eq!(
            request.form_values("t1_sel"),
            Some(&["r1".to_string(), "r3".to_string()][..])
        );
        assert_eq!(request.form_value("missing"), None);
    }

    #[test]
    fn test_custom_values() {
        let request =
            RequestContext::ajax().with_custom_value("t1", "sel", Value::map([("r2", true)]));
        assert_eq!(request.mode(), RequestMode::Ajax);
        let value = request.custom_control_value("t1", "sel").and_then(|v| v.get("r2"));
        assert_eq!(value, Some(Value::Bool(true)));
    }

    #[test]
    fn test_action_params() {
        let action = ActionParams::new("pager1", events::PAGE_CLICK).with_value("3");
        assert_eq!(action.value_str(), "3");
        assert_eq!(action.column_id, None);
    }
}
