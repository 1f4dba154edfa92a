//! A table whose rows can be selected.

use std::any::Any;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{Result, Signal, TabulaConfig, TabulaError, Value};

use super::{SortDirection, Table, TableState};
use crate::control::{Control, ControlBase, DecodeContext, PageContext, StateMap};
use crate::data::{DataManager, DataOwner, store_paged_rows};
use crate::html::Attributes;
use crate::paging::PagedControl;
use crate::request::{ActionParams, events};

/// A [`Table`] with single row selection.
///
/// Each row carries a `data-id`, taken from the row styler when it sets
/// one, otherwise from the row itself: [`Record::id`], then
/// [`Record::primary_key`], then an `"id"` map entry. Rows without an ID get
/// the `nosel` class and cannot be selected. The selected row has the
/// `selected` class.
///
/// [`Record::id`]: horizon_tabula_core::Record::id
/// [`Record::primary_key`]: horizon_tabula_core::Record::primary_key
#[derive(Debug)]
pub struct SelectTable {
    table: Table,
    paging: Option<PagedControl>,
    selected_id: Option<String>,
    reselectable: bool,

    /// Emitted with the row ID when the user selects a row.
    pub row_selected: Signal<String>,
}

impl SelectTable {
    pub const KIND: &'static str = "selecttable";

    pub fn new(id: impl Into<String>, config: &TabulaConfig) -> Self {
        let mut table = Table::new(id, config);
        table.base_mut().on(events::ROW_SELECTED);
        Self {
            table,
            paging: None,
            selected_id: None,
            reselectable: false,
            row_selected: Signal::new(),
        }
    }

    /// A select table that draws one page of rows at a time, like a
    /// [`PagedTable`](super::PagedTable).
    pub fn paged(id: impl Into<String>, config: &TabulaConfig) -> Self {
        let mut table = Self::new(id, config);
        table.paging = Some(PagedControl::new(config.default_page_size));
        table
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn paging(&self) -> Option<&PagedControl> {
        self.paging.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn set_selected_id(&mut self, id: Option<String>) {
        self.selected_id = id;
    }

    pub fn is_reselectable(&self) -> bool {
        self.reselectable
    }

    /// Whether selecting the selected row again is reported again.
    pub fn set_reselectable(&mut self, reselectable: bool) {
        self.reselectable = reselectable;
    }

    /// Set all rows. On a paged table the total row count follows the
    /// number of rows.
    pub fn set_data(&mut self, rows: Vec<Value>) {
        if let Some(paging) = &mut self.paging {
            paging.set_total_items(rows.len());
        }
        self.table.data_manager_mut().set_data(rows);
    }

    /// The `data-id` of a row, when the row value has an identity.
    pub fn row_data_id(data: &Value) -> Option<String> {
        if let Some(record) = data.as_record() {
            return record
                .id()
                .or_else(|| record.primary_key().map(|key| key.to_string()))
                .filter(|id| !id.is_empty());
        }
        data.as_map()
            .and_then(|map| map.get("id"))
            .filter(|id| !id.is_null())
            .map(Value::to_string)
    }

    fn widget_options(&self) -> Attributes {
        let mut options = Attributes::new();
        if let Some(selected) = &self.selected_id {
            options.set("data-gr-opt-selected-id", selected.as_str());
        }
        if self.reselectable {
            options.set("data-gr-opt-reselect", "1");
        }
        options
    }

    fn select_row(&mut self, ctx: &mut PageContext<'_>, value: &Value) -> Result<()> {
        let row_id = value.to_string();
        if row_id.is_empty() {
            return Err(TabulaError::bad_data(format!(
                "row selection on '{}' without a row ID",
                self.table.id()
            )));
        }
        if self.selected_id.as_deref() == Some(row_id.as_str()) && !self.reselectable {
            return Ok(());
        }
        tracing::debug!(target: "horizon_tabula::table", table = %self.table.id(), row = %row_id, "row selected");
        self.selected_id = Some(row_id.clone());
        ctx.refresh(self.table.id());
        self.row_selected.emit(row_id);
        Ok(())
    }

    pub(crate) fn encode(&self) -> Result<SelectTableState> {
        Ok(SelectTableState {
            table: self.table.encode()?,
            paging: self.paging.clone(),
            selected_id: self.selected_id.clone(),
            reselectable: self.reselectable,
        })
    }

    pub(crate) fn decode(state: SelectTableState, ctx: &DecodeContext<'_>) -> Result<Self> {
        let paging = state.paging.map(|mut paging| {
            paging.set_default_page_size(ctx.config.default_page_size);
            paging
        });
        Ok(Self {
            table: Table::decode(state.table, ctx)?,
            paging,
            selected_id: state.selected_id,
            reselectable: state.reselectable,
            row_selected: Signal::new(),
        })
    }

    pub fn decode_boxed(
        data: serde_json::Value,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn Control>> {
        let state: SelectTableState = serde_json::from_value(data)?;
        Ok(Box::new(Self::decode(state, ctx)?))
    }
}

fn decorate_row(table_id: &str, selected: Option<&str>, attributes: &mut Attributes, data: &Value) {
    let data_id = attributes
        .get("data-id")
        .map(str::to_string)
        .or_else(|| SelectTable::row_data_id(data));
    let Some(data_id) = data_id else {
        attributes.add_class("nosel");
        return;
    };
    attributes
        .set("id", format!("{table_id}_{data_id}"))
        .set("data-id", data_id.as_str());
    if selected == Some(data_id.as_str()) {
        attributes.add_class("selected");
    }
}

impl Deref for SelectTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.table
    }
}

impl DerefMut for SelectTable {
    fn deref_mut(&mut self) -> &mut Table {
        &mut self.table
    }
}

impl DataOwner for SelectTable {
    fn owner_id(&self) -> &str {
        self.table.id()
    }

    fn data_manager(&self) -> &DataManager {
        self.table.data_manager()
    }

    fn data_manager_mut(&mut self) -> &mut DataManager {
        self.table.data_manager_mut()
    }

    fn paged_control(&self) -> Option<&PagedControl> {
        self.paging.as_ref()
    }

    fn paged_control_mut(&mut self) -> Option<&mut PagedControl> {
        self.paging.as_mut()
    }

    fn sort_keys(&self) -> Vec<(String, SortDirection)> {
        self.table.sort_keys()
    }

    fn set_data(&mut self, rows: Vec<Value>) {
        match &mut self.paging {
            Some(paging) => store_paged_rows(self.table.data_manager_mut(), paging, rows),
            None => self.table.data_manager_mut().set_data(rows),
        }
    }
}

impl Control for SelectTable {
    fn base(&self) -> &ControlBase {
        self.table.base()
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        self.table.base_mut()
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn update_form_values(&mut self, ctx: &mut PageContext<'_>) {
        self.table.update_columns(ctx);
    }

    fn draw(&mut self, ctx: &mut PageContext<'_>) -> Result<String> {
        let load_error = Table::load_for_draw(self, ctx)?;
        self.table.load_error = load_error;
        let options = self.widget_options();

        let table_id = self.table.id().to_string();
        let selected = self.selected_id.as_deref();
        let decorate = |_: usize, data: &Value, attributes: &mut Attributes| {
            decorate_row(&table_id, selected, attributes, data);
        };
        self.table
            .render_paged(ctx, "selecttable", self.paging.as_ref(), &options, Some(&decorate))
    }

    fn do_action(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        if params.action == events::ROW_SELECTED {
            return self.select_row(ctx, &params.value);
        }
        if !self.table.handle_action(ctx, params)? {
            tracing::debug!(target: "horizon_tabula::table", table = %self.table.id(), action = %params.action, "unhandled action");
        }
        Ok(())
    }

    fn marshal_state(&self, _ctx: &PageContext<'_>, state: &mut StateMap) {
        self.table.marshal_into(state);
        if let Some(paging) = &self.paging {
            state.insert("pageNum".into(), paging.page_num().into());
        }
        if let Some(selected) = &self.selected_id {
            state.insert("selectedId".into(), selected.as_str().into());
        }
    }

    fn unmarshal_state(&mut self, _ctx: &mut PageContext<'_>, state: &StateMap) {
        self.table.unmarshal_from(state);
        if let (Some(paging), Some(page)) = (
            &mut self.paging,
            state.get("pageNum").and_then(serde_json::Value::as_u64),
        ) {
            paging.set_page_num(page as usize);
        }
        if let Some(selected) = state.get("selectedId").and_then(serde_json::Value::as_str) {
            self.selected_id = Some(selected.to_string());
        }
    }

    fn serialize(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.encode()?)?)
    }

    fn restore(&mut self, ctx: &PageContext<'_>) -> Result<()> {
        self.table.restore_refs(ctx)
    }

    fn as_data_owner(&self) -> Option<&dyn DataOwner> {
        Some(self)
    }

    fn as_data_owner_mut(&mut self) -> Option<&mut dyn DataOwner> {
        Some(self)
    }

    fn debug_children(&self) -> Vec<String> {
        self.table.describe_columns()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Page-state form of a [`SelectTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTableState {
    pub table: TableState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagedControl>,
    #[serde(rename = "selectedID")]
    pub selected_id: Option<String>,
    pub reselectable: bool,
}

static_assertions::assert_impl_all!(SelectTable: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::control::Page;
    use crate::data::binder_fn;
    use crate::request::RequestContext;
    use horizon_tabula_core::Record;

    #[derive(Debug)]
    struct Order(i64);

    impl Record for Order {
        fn get(&self, key: &str) -> Option<Value> {
            (key == "total").then(|| Value::Int(self.0 * 10))
        }

        fn primary_key(&self) -> Option<Value> {
            Some(Value::Int(self.0))
        }
    }

    fn page() -> Page {
        let config = TabulaConfig::default();
        let mut table = SelectTable::new("orders", &config);
        table.add_column(Column::key("total", "Total")).unwrap();
        table.set_data(vec![
            Value::record(Order(7)),
            Value::map([("id", Value::from("x1")), ("total", Value::from(5))]),
            Value::map([("total", 1)]),
        ]);
        let mut page = Page::new("p", config);
        page.add_control(table).unwrap();
        page
    }

    #[test]
    fn test_binder_page_on_paged_select_table() {
        let config = TabulaConfig::default();
        let mut table = SelectTable::paged("orders", &config);
        table.add_column(Column::key("total", "Total")).unwrap();
        table.set_data_provider("orders");
        if let Some(paging) = table.paged_control_mut() {
            paging.set_page_num(2);
        }
        let mut page = Page::new("p", config);
        page.add_control(table).unwrap();
        page.add_binder(
            "orders",
            binder_fn(|_request, owner: &mut dyn DataOwner| {
                owner.set_total_items(40);
                let rows = (11..=20).map(|n| {
                    Value::map([("id", Value::from(format!("o{n}"))), ("total", Value::from(n))])
                });
                owner.set_data(rows.collect());
                Ok(())
            }),
        );

        let html = page.draw(&RequestContext::new()).unwrap();
        assert!(html.contains("<tr id=\"orders_o11\" data-id=\"o11\"><td>11</td></tr>"));
        assert!(html.contains("<tr id=\"orders_o20\" data-id=\"o20\"><td>20</td></tr>"));
        let paging = page.control::<SelectTable>("orders").unwrap().paging().unwrap();
        assert_eq!(paging.total_items(), 40);
        assert_eq!(paging.page_num(), 2);
    }

    #[test]
    fn test_row_identity() {
        assert_eq!(SelectTable::row_data_id(&Value::record(Order(3))), Some("3".into()));
        assert_eq!(SelectTable::row_data_id(&Value::map([("id", 9)])), Some("9".into()));
        assert_eq!(SelectTable::row_data_id(&Value::from("plain")), None);
    }

    #[test]
    fn test_draw_rows() {
        let mut page = page();
        page.control_mut::<SelectTable>("orders")
            .unwrap()
            .set_selected_id(Some("x1".into()));
        let html = page.draw(&RequestContext::new()).unwrap();
        assert!(html.contains("data-grctl=\"selecttable\""));
        assert!(html.contains("data-gr-opt-selected-id=\"x1\""));
        assert!(html.contains("<tr id=\"orders_7\" data-id=\"7\"><td>70</td></tr>"));
        assert!(
            html.contains("<tr id=\"orders_x1\" data-id=\"x1\" class=\"selected\"><td>5</td></tr>")
        );
        assert!(html.contains("<tr class=\"nosel\"><td>1</td></tr>"));
    }

    #[test]
    fn test_row_selected_action() {
        let mut page = page();
        let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        page.control::<SelectTable>("orders")
            .unwrap()
            .row_selected
            .connect(move |id| sink.lock().push(id.clone()));

        let select = |page: &mut Page| {
            let request = RequestContext::ajax().with_action(
                ActionParams::new("orders", events::ROW_SELECTED).with_value("7"),
            );
            page.handle_request(&request).unwrap();
        };
        select(&mut page);
        select(&mut page);

        assert_eq!(page.control::<SelectTable>("orders").unwrap().selected_id(), Some("7"));
        assert_eq!(*seen.lock(), vec!["7".to_string()]);
        assert_eq!(page.refresh_ids(), ["orders"]);
    }

    #[test]
    fn test_state_keys() {
        let table = SelectTable::new("orders", &TabulaConfig::default());
        let json = serde_json::to_value(table.encode().unwrap()).unwrap();
        assert_eq!(json["selectedID"], serde_json::Value::Null);
        assert_eq!(json["reselectable"], false);
        assert!(json.get("paging").is_none());
    }
}
