//! Controls and the page that owns them.
//!
//! Every server-side widget implements [`Control`]. Controls live in the
//! [`Page`] arena and refer to each other by ID only; during a request a
//! control is handed a [`PageContext`] through which it reaches the rest of
//! the page, the request and the response.

pub mod debug;
mod page;
mod registry;
mod state;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::Result;

pub use debug::{PageTreeDebug, TreeFormatOptions, TreeStyle};
pub use page::{ControlArena, ControlKey, Page, PageContext};
pub use registry::{ControlDecoder, DecodeContext, TypeRegistry};
pub use state::{ControlRecord, MemoryStateStore, PageState, StateStore};

use crate::column::{CellStyler, CellTexter, HeaderTexter, RowStyler};
use crate::data::DataOwner;
use crate::html::Attributes;
use crate::request::ActionParams;

/// Per-control state saved by [`Page::save_state`].
pub type StateMap = serde_json::Map<String, serde_json::Value>;

/// Identity, attributes and client event bindings shared by all controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlBase {
    id: String,
    #[serde(default)]
    attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<String>,
}

impl ControlBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// The control this one is drawn inside of. Controls with a parent are
    /// not drawn at the top level of the page.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent;
    }

    /// Ask the client runtime to report `event` for this control.
    pub fn on(&mut self, event: &str) {
        if !self.events.iter().any(|e| e == event) {
            self.events.push(event.to_string());
        }
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Attributes of the control's outer tag: id, user attributes, the
    /// `data-grctl` kind tag and the event bindings.
    pub fn drawing_attributes(&self, grctl: &str) -> Attributes {
        let mut user = self.attributes.clone();
        user.remove("id");
        let mut attributes = Attributes::new().with("id", self.id.as_str());
        attributes.merge(&user);
        attributes.set("data-grctl", grctl);
        if !self.events.is_empty() {
            if let Ok(events) = serde_json::to_string(&self.events) {
                attributes.set("data-gr-events", events);
            }
        }
        attributes
    }
}

/// A server-side widget.
///
/// Only [`draw`](Control::draw) and [`serialize`](Control::serialize) are
/// required; the rest of the lifecycle defaults to doing nothing.
pub trait Control: Send + Sync + fmt::Debug + Any {
    fn base(&self) -> &ControlBase;

    fn base_mut(&mut self) -> &mut ControlBase;

    /// Kind tag used in page state and tree dumps.
    fn kind(&self) -> &'static str;

    fn id(&self) -> &str {
        self.base().id()
    }

    /// Called when the control is added to a page.
    fn attach(&mut self, controls: &mut ControlArena) -> Result<()> {
        let _ = controls;
        Ok(())
    }

    /// Read submitted form values. Runs for every control before any action.
    fn update_form_values(&mut self, ctx: &mut PageContext<'_>) {
        let _ = ctx;
    }

    /// Prepare for drawing.
    fn pre_render(&mut self, ctx: &mut PageContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Produce the control's html.
    fn draw(&mut self, ctx: &mut PageContext<'_>) -> Result<String>;

    /// Handle an action addressed to this control.
    fn do_action(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        let _ = ctx;
        tracing::debug!(target: "horizon_tabula::page", control = %self.id(), action = %params.action, "unhandled action");
        Ok(())
    }

    /// Save the state that should survive between requests.
    fn marshal_state(&self, ctx: &PageContext<'_>, state: &mut StateMap) {
        let _ = (ctx, state);
    }

    /// Read back what [`marshal_state`](Control::marshal_state) saved.
    fn unmarshal_state(&mut self, ctx: &mut PageContext<'_>, state: &StateMap) {
        let _ = (ctx, state);
    }

    /// Encode the whole control for page state.
    fn serialize(&self) -> Result<serde_json::Value>;

    /// Re-resolve references to other controls after deserialization.
    fn restore(&mut self, ctx: &PageContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    fn as_data_owner(&self) -> Option<&dyn DataOwner> {
        None
    }

    fn as_data_owner_mut(&mut self) -> Option<&mut dyn DataOwner> {
        None
    }

    fn as_cell_texter(&self) -> Option<&dyn CellTexter> {
        None
    }

    fn as_header_texter(&self) -> Option<&dyn HeaderTexter> {
        None
    }

    fn as_cell_styler(&self) -> Option<&dyn CellStyler> {
        None
    }

    fn as_row_styler(&self) -> Option<&dyn RowStyler> {
        None
    }

    /// Lines describing the control's internal parts, for tree dumps.
    fn debug_children(&self) -> Vec<String> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_attributes() {
        let mut base = ControlBase::new("people");
        base.attributes_mut().set("class", "grid").set("id", "ignored");
        base.on("TableSort");
        base.on("TableSort");
        base.on("RowSelected");

        let attributes = base.drawing_attributes("table");
        assert_eq!(
            attributes.to_string(),
            " id=\"people\" class=\"grid\" data-grctl=\"table\" data-gr-events=\"[&quot;TableSort&quot;,&quot;RowSelected&quot;]\""
        );
    }

    #[test]
    fn test_base_serde_skips_empty() {
        let base = ControlBase::new("pager");
        assert_eq!(
            serde_json::to_string(&base).unwrap(),
            r#"{"id":"pager","attributes":[]}"#
        );
    }
}
