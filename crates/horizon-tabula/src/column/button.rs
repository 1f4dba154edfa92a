use std::fmt;

use horizon_tabula_core::{Signal, Value};

use super::ColumnBase;
use crate::html::{Attributes, escape_html, render_tag};

/// A column with one button per row.
///
/// Clicks arrive as a `ButtonColumnClick` action whose value is the
/// button's `data-value`: the row's `value_key` entry, or the row itself
/// when no key is set.
pub struct ButtonColumn {
    label: String,
    value_key: Option<String>,
    /// Emitted with `(column_id, value)` for every click.
    pub clicked: Signal<(String, String)>,
}

impl fmt::Debug for ButtonColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonColumn")
            .field("label", &self.label)
            .field("value_key", &self.value_key)
            .finish_non_exhaustive()
    }
}

impl ButtonColumn {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value_key: None,
            clicked: Signal::new(),
        }
    }

    pub fn with_value_key(mut self, key: impl Into<String>) -> Self {
        self.value_key = Some(key.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value_key(&self) -> Option<&str> {
        self.value_key.as_deref()
    }

    pub(crate) fn cell_value(&self, data: &Value) -> Value {
        match &self.value_key {
            Some(key) => data.get(key).unwrap_or_default(),
            None => data.clone(),
        }
    }

    pub(crate) fn cell_html(&self, data: &Value) -> String {
        let attributes = Attributes::new()
            .with("type", "button")
            .with("data-gr-btn-col", "1")
            .with("data-value", self.cell_value(data).to_string());
        render_tag("button", &attributes, &escape_html(&self.label))
    }

    pub(crate) fn click(&self, base: &ColumnBase, value: String) {
        tracing::debug!(target: "horizon_tabula::column", column = %base.id(), value = %value, "button clicked");
        self.clicked.emit((base.id().to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_cell_html() {
        let button = ButtonColumn::new("Edit <b>").with_value_key("id");
        let row = Value::map([("id", 17)]);
        assert_eq!(
            button.cell_html(&row),
            "<button type=\"button\" data-gr-btn-col=\"1\" data-value=\"17\">Edit &lt;b&gt;</button>"
        );
    }

    #[test]
    fn test_click_emits() {
        let button = ButtonColumn::new("Go");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        button.clicked.connect(move |args: &(String, String)| sink.lock().push(args.clone()));

        let mut base = ColumnBase::new("Go");
        base.id = "go".into();
        button.click(&base, "5".into());
        assert_eq!(*seen.lock(), vec![("go".to_string(), "5".to_string())]);
    }
}
