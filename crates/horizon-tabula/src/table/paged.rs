//! A table with page state.

use std::any::Any;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{Result, TabulaConfig, Value};

use super::{SortDirection, Table, TableState};
use crate::control::{Control, ControlBase, DecodeContext, PageContext, StateMap};
use crate::data::{DataManager, DataOwner, store_paged_rows};
use crate::html::Attributes;
use crate::paging::PagedControl;
use crate::request::ActionParams;

/// A [`Table`] that draws one page of its rows at a time.
///
/// Rows set directly with [`set_data`](PagedTable::set_data) are all kept and
/// the table draws the current page out of them. A data binder should store
/// only the current page: call [`DataOwner::set_total_items`] and then
/// [`DataOwner::set_data`] (or [`DataOwner::set_data_with_offset`]) with the
/// window it queried via [`PagedControl::sql_limits`], or hand the complete
/// set to [`DataOwner::set_paged_rows`].
///
/// Table methods are reachable through `Deref`.
#[derive(Debug)]
pub struct PagedTable {
    table: Table,
    paging: PagedControl,
}

impl PagedTable {
    pub const KIND: &'static str = "pagedtable";

    pub fn new(id: impl Into<String>, config: &TabulaConfig) -> Self {
        Self {
            table: Table::new(id, config),
            paging: PagedControl::new(config.default_page_size),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn paging(&self) -> &PagedControl {
        &self.paging
    }

    pub fn paging_mut(&mut self) -> &mut PagedControl {
        &mut self.paging
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.paging.set_page_size(size);
    }

    pub fn page_num(&self) -> usize {
        self.paging.page_num()
    }

    pub fn set_page_num(&mut self, page: usize) {
        self.paging.set_page_num(page);
    }

    /// Set all rows. The total row count follows the number of rows.
    pub fn set_data(&mut self, rows: Vec<Value>) {
        self.paging.set_total_items(rows.len());
        self.table.data_manager_mut().set_data(rows);
    }

    pub(crate) fn encode(&self) -> Result<PagedTableState> {
        Ok(PagedTableState {
            table: self.table.encode()?,
            paging: self.paging.clone(),
        })
    }

    pub(crate) fn decode(state: PagedTableState, ctx: &DecodeContext<'_>) -> Result<Self> {
        let mut paging = state.paging;
        paging.set_default_page_size(ctx.config.default_page_size);
        Ok(Self {
            table: Table::decode(state.table, ctx)?,
            paging,
        })
    }

    pub fn decode_boxed(
        data: serde_json::Value,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn Control>> {
        let state: PagedTableState = serde_json::from_value(data)?;
        Ok(Box::new(Self::decode(state, ctx)?))
    }
}

impl Deref for PagedTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.table
    }
}

impl DerefMut for PagedTable {
    fn deref_mut(&mut self) -> &mut Table {
        &mut self.table
    }
}

impl DataOwner for PagedTable {
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
        Some(&self.paging)
    }

    fn paged_control_mut(&mut self) -> Option<&mut PagedControl> {
        Some(&mut self.paging)
    }

    fn sort_keys(&self) -> Vec<(String, SortDirection)> {
        self.table.sort_keys()
    }

    fn set_data(&mut self, rows: Vec<Value>) {
        store_paged_rows(self.table.data_manager_mut(), &mut self.paging, rows);
    }
}

impl Control for PagedTable {
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
        self.table
            .render_paged(ctx, "table", Some(&self.paging), &Attributes::new(), None)
    }

    fn do_action(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        if !self.table.handle_action(ctx, params)? {
            tracing::debug!(target: "horizon_tabula::table", table = %self.table.id(), action = %params.action, "unhandled action");
        }
        Ok(())
    }

    fn marshal_state(&self, _ctx: &PageContext<'_>, state: &mut StateMap) {
        self.table.marshal_into(state);
        state.insert("pageNum".into(), self.paging.page_num().into());
    }

    fn unmarshal_state(&mut self, _ctx: &mut PageContext<'_>, state: &StateMap) {
        self.table.unmarshal_from(state);
        if let Some(page) = state.get("pageNum").and_then(serde_json::Value::as_u64) {
            self.paging.set_page_num(page as usize);
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

/// Page-state form of a [`PagedTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedTableState {
    pub table: TableState,
    pub paging: PagedControl,
}

static_assertions::assert_impl_all!(PagedTable: Send, Sync);
