//! Checkbox columns.
//!
//! A checkbox column shows one checkbox per row and tracks what the user
//! changed relative to what the provider reported. The application reads
//! the diff through [`CheckboxColumn::changes`] and applies it to its own
//! storage; rows never have to be on screen at the same time to be part of
//! one bulk change.
//!
//! Two maps carry the state:
//!
//! * `current`: the checked state the provider reported for every row shown
//!   in the last draw.
//! * `changes`: rows whose submitted state differs from `current`, or from
//!   the provider's universe after a check-all click.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{BoxError, Result, Signal, TabulaError, Value};

use super::texter::Persisted;
use super::ColumnBase;
use crate::control::{PageContext, TypeRegistry};
use crate::html::{Attributes, render_void_tag};
use crate::model::compare_ids;
use crate::request::{RequestContext, RequestMode};
use crate::response::Priority;

/// Supplies the row identity and checked state of a checkbox column.
pub trait CheckboxProvider: Send + Sync + fmt::Debug {
    /// Stable identity of the row, used as the checkbox value.
    fn row_id(&self, data: &Value) -> String;

    fn is_checked(&self, data: &Value) -> bool;

    /// Extra attributes for the row's input tag.
    fn attributes(&self, data: &Value) -> Option<Attributes> {
        let _ = data;
        None
    }

    /// Checked state of every row the provider knows, when that set is
    /// cheap enough to compute. `None` means the universe is unknown and a
    /// check-all click falls back to clicking the visible boxes.
    fn all(
        &self,
        request: &RequestContext,
    ) -> std::result::Result<Option<BTreeMap<String, bool>>, BoxError> {
        let _ = request;
        Ok(None)
    }

    /// Version token of the underlying data. Saved changes are discarded
    /// when it differs on restore.
    fn data_id(&self) -> String {
        String::new()
    }

    fn persisted(&self) -> Option<Persisted> {
        None
    }
}

/// Provider that reads the row ID and checked flag from row keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCheckboxProvider {
    id_key: String,
    checked_key: String,
    #[serde(default)]
    data_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    universe: Option<BTreeMap<String, bool>>,
}

impl KeyCheckboxProvider {
    pub const KIND: &'static str = "keys";

    pub fn new(id_key: impl Into<String>, checked_key: impl Into<String>) -> Self {
        Self {
            id_key: id_key.into(),
            checked_key: checked_key.into(),
            data_id: String::new(),
            universe: None,
        }
    }

    pub fn with_data_id(mut self, data_id: impl Into<String>) -> Self {
        self.data_id = data_id.into();
        self
    }

    /// Make the full set of rows known to check-all clicks.
    pub fn with_universe<I, K>(mut self, universe: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        self.universe = Some(universe.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }
}

impl CheckboxProvider for KeyCheckboxProvider {
    fn row_id(&self, data: &Value) -> String {
        data.get(&self.id_key).map(|v| v.to_string()).unwrap_or_default()
    }

    fn is_checked(&self, data: &Value) -> bool {
        data.get(&self.checked_key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn all(
        &self,
        _request: &RequestContext,
    ) -> std::result::Result<Option<BTreeMap<String, bool>>, BoxError> {
        Ok(self.universe.clone())
    }

    fn data_id(&self) -> String {
        self.data_id.clone()
    }

    fn persisted(&self) -> Option<Persisted> {
        Persisted::of(Self::KIND, self)
    }
}

/// Checkbox state of a column.
pub struct CheckboxColumn {
    provider: Arc<dyn CheckboxProvider>,
    show_check_all: bool,
    current: BTreeMap<String, bool>,
    changes: BTreeMap<String, bool>,
    /// Emitted with `(row_id, checked)` when a row click is applied.
    pub changed: Signal<(String, bool)>,
}

impl fmt::Debug for CheckboxColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckboxColumn")
            .field("provider", &self.provider)
            .field("show_check_all", &self.show_check_all)
            .field("current", &self.current)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

/// Page-state form of a [`CheckboxColumn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxState {
    pub show_check_all: bool,
    pub checkboxer: Persisted,
    pub current: BTreeMap<String, bool>,
    pub changes: BTreeMap<String, bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarshalledChanges {
    changes: BTreeMap<String, bool>,
    data_id: String,
}

fn reconcile(changes: &mut BTreeMap<String, bool>, key: &str, current: bool, new: bool) {
    if new == current {
        changes.remove(key);
    } else {
        changes.insert(key.to_string(), new);
    }
}

impl CheckboxColumn {
    pub fn new(provider: impl CheckboxProvider + 'static) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    pub fn with_provider(provider: Arc<dyn CheckboxProvider>) -> Self {
        Self {
            provider,
            show_check_all: false,
            current: BTreeMap::new(),
            changes: BTreeMap::new(),
            changed: Signal::new(),
        }
    }

    /// Show a check-all box in the header.
    pub fn with_check_all(mut self) -> Self {
        self.show_check_all = true;
        self
    }

    pub fn provider(&self) -> &Arc<dyn CheckboxProvider> {
        &self.provider
    }

    pub fn show_check_all(&self) -> bool {
        self.show_check_all
    }

    /// Checked state of the rows shown in the last draw.
    pub fn current(&self) -> &BTreeMap<String, bool> {
        &self.current
    }

    /// Rows whose state the user changed.
    pub fn changes(&self) -> &BTreeMap<String, bool> {
        &self.changes
    }

    /// Rows changed to checked, in ID order.
    pub fn checked_ids(&self) -> Vec<String> {
        self.changed_ids(true)
    }

    /// Rows changed to unchecked, in ID order.
    pub fn unchecked_ids(&self) -> Vec<String> {
        self.changed_ids(false)
    }

    fn changed_ids(&self, state: bool) -> Vec<String> {
        let mut ids: Vec<String> = self
            .changes
            .iter()
            .filter(|&(_, &checked)| checked == state)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_by(|a, b| compare_ids(a, b));
        ids
    }

    /// Forget all changes, e.g. after the application saved them.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Checked state as the user currently sees it.
    pub fn is_row_checked(&self, row_id: &str) -> Option<bool> {
        self.changes
            .get(row_id)
            .or_else(|| self.current.get(row_id))
            .copied()
    }

    pub(crate) fn pre_render(&mut self) {
        self.current.clear();
    }

    pub(crate) fn cell_html(&mut self, base: &ColumnBase, data: &Value) -> String {
        let row_id = self.provider.row_id(data);
        let checked = self.provider.is_checked(data);
        self.current.insert(row_id.clone(), checked);
        let shown = self.changes.get(&row_id).copied().unwrap_or(checked);

        let name = base.input_name();
        let mut attributes = self.provider.attributes(data).unwrap_or_default();
        attributes
            .set("type", "checkbox")
            .set("id", format!("{name}_{row_id}"))
            .set("name", name)
            .set("value", row_id)
            .set("data-gr-checkcol", "1");
        if shown {
            attributes.set_flag("checked");
        }
        render_void_tag("input", &attributes)
    }

    pub(crate) fn check_all_html(&self, base: &ColumnBase) -> String {
        let attributes = Attributes::new()
            .with("type", "checkbox")
            .with("id", format!("{}_all", base.input_name()))
            .with("data-gr-all", "1");
        render_void_tag("input", &attributes)
    }

    pub(crate) fn update_form_values(&mut self, base: &ColumnBase, request: &RequestContext) {
        match request.mode() {
            RequestMode::Server => {
                if !request.is_post_back() {
                    return;
                }
                let submitted: HashSet<&str> = request
                    .form_values(&base.input_name())
                    .unwrap_or(&[])
                    .iter()
                    .map(String::as_str)
                    .collect();
                for (key, &current) in &self.current {
                    reconcile(&mut self.changes, key, current, submitted.contains(key.as_str()));
                }
            }
            RequestMode::Ajax => {
                let Some(delta) = request
                    .custom_control_value(base.table_id(), base.id())
                    .and_then(Value::as_map)
                else {
                    return;
                };
                for (key, value) in delta {
                    let Some(&current) = self.current.get(key) else {
                        tracing::trace!(target: "horizon_tabula::column", column = %base.id(), row = %key, "toggle for a row that was not shown");
                        continue;
                    };
                    let shown = self.changes.get(key).copied().unwrap_or(current);
                    let new = value.as_bool().unwrap_or(!shown);
                    reconcile(&mut self.changes, key, current, new);
                }
            }
        }
    }

    /// Apply a single row toggle. The value is `{id, checked, row, column}`.
    pub(crate) fn row_click(&mut self, base: &ColumnBase, value: &Value) -> Result<()> {
        let row_id = value
            .get("id")
            .map(|id| id.to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                TabulaError::bad_data(format!("checkbox click on '{}' without a row id", base.id()))
            })?;
        let shown = self.is_row_checked(&row_id).unwrap_or(false);
        let checked = value
            .get("checked")
            .and_then(|c| c.as_bool())
            .unwrap_or(!shown);
        match self.current.get(&row_id).copied() {
            Some(current) => reconcile(&mut self.changes, &row_id, current, checked),
            None => {
                self.changes.insert(row_id.clone(), checked);
            }
        }
        tracing::debug!(target: "horizon_tabula::column", column = %base.id(), row = %row_id, checked, "checkbox toggled");
        self.changed.emit((row_id, checked));
        Ok(())
    }

    /// Apply a click on the check-all box.
    pub(crate) fn all_click(
        &mut self,
        base: &ColumnBase,
        ctx: &mut PageContext<'_>,
        checked: bool,
    ) -> Result<()> {
        let all = self
            .provider
            .all(ctx.request())
            .map_err(|err| {
                TabulaError::provider(format!("{} checkbox provider", base.input_name()), err)
            })?;
        let scope = format!("#{} input[name=\"{}\"]", base.table_id(), base.input_name());

        match all {
            Some(universe) => {
                self.changes = universe
                    .into_iter()
                    .filter(|&(_, state)| state != checked)
                    .map(|(id, _)| (id, checked))
                    .collect();
                tracing::debug!(target: "horizon_tabula::column", column = %base.id(), checked, changes = self.changes.len(), "check-all over known rows");
                ctx.commands_mut().execute_selector_function(
                    scope,
                    "prop",
                    Priority::Standard,
                    vec!["checked".into(), checked.into()],
                );
            }
            None => {
                // The client reports each synthesized click as a row toggle.
                let pseudo = if checked { ":not(:checked)" } else { ":checked" };
                tracing::debug!(target: "horizon_tabula::column", column = %base.id(), checked, "check-all over visible rows");
                ctx.commands_mut().execute_selector_function(
                    format!("{scope}{pseudo}"),
                    "click",
                    Priority::Standard,
                    Vec::new(),
                );
            }
        }
        Ok(())
    }

    pub(crate) fn marshal_state(&self) -> Option<serde_json::Value> {
        if self.changes.is_empty() {
            return None;
        }
        let state = MarshalledChanges {
            changes: self.changes.clone(),
            data_id: self.provider.data_id(),
        };
        serde_json::to_value(state).ok()
    }

    pub(crate) fn unmarshal_state(&mut self, base: &ColumnBase, state: &serde_json::Value) {
        let state: MarshalledChanges = match serde_json::from_value(state.clone()) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(target: "horizon_tabula::state", column = %base.id(), error = %err, "unreadable checkbox state");
                return;
            }
        };
        let data_id = self.provider.data_id();
        if state.data_id == data_id {
            self.changes = state.changes;
        } else {
            tracing::debug!(
                target: "horizon_tabula::state",
                column = %base.id(),
                stored = %state.data_id,
                current = %data_id,
                "discarding checkbox changes for outdated data"
            );
            self.changes.clear();
        }
    }

    pub(crate) fn encode(&self, base: &ColumnBase) -> Result<CheckboxState> {
        let checkboxer = self.provider.persisted().ok_or_else(|| {
            TabulaError::Encoding(<serde_json::Error as serde::ser::Error>::custom(format!(
                "checkbox provider of column '{}' has no persisted form",
                base.id()
            )))
        })?;
        Ok(CheckboxState {
            show_check_all: self.show_check_all,
            checkboxer,
            current: self.current.clone(),
            changes: self.changes.clone(),
        })
    }

    pub(crate) fn decode(state: CheckboxState, registry: &TypeRegistry) -> Result<Self> {
        let provider = registry.decode_checkbox_provider(state.checkboxer)?;
        let mut column = Self::with_provider(provider);
        column.show_check_all = state.show_check_all;
        column.current = state.current;
        column.changes = state.changes;
        Ok(column)
    }
}
