//! Html tables.
//!
//! [`Table`] draws a list of rows through its [`Column`]s. [`PagedTable`]
//! adds page state so that one or more [`DataPager`](crate::pager::DataPager)s
//! can page through a large result set, and [`SelectTable`] adds single row
//! selection on top of that.
//!
//! # Drawing
//!
//! A table draws, in order: an optional `<caption>`, a `<colgroup>` when any
//! column has `<col>` attributes, `header_row_count` header rows in
//! `<thead>`, `footer_row_count` footer rows in `<tfoot>` and one `<tr>` per
//! row in `<tbody>`. Hidden columns are skipped everywhere.
//!
//! Rows come from the table's [`DataManager`]. When the table has a data
//! provider, rows are bound right before drawing; a failing provider leaves
//! the body empty and its message in [`Table::load_error`].

mod paged;
mod select;
pub mod sort;

use std::any::Any;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{Result, Signal, TabulaConfig, TabulaError, Value};

pub use paged::PagedTable;
pub use select::SelectTable;
pub use sort::{SortDirection, SortHistory};

use crate::column::{Column, ColumnState, EncodedRef, ObjectRef, RowStyler};
use crate::control::{Control, ControlBase, DecodeContext, PageContext, StateMap};
use crate::data::{DataManager, DataOwner};
use crate::html::{Attributes, escape_html, render_tag, render_void_tag};
use crate::paging::PagedControl;
use crate::request::{ActionParams, events};

/// Caption of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Caption {
    /// Plain text, escaped when drawn.
    Text(String),
    /// Another control of the page, drawn inside the caption.
    Control(String),
}

/// Per-row hook used by tables that add attributes to their rows.
pub(crate) type RowDecorator<'d> = &'d dyn Fn(usize, &Value, &mut Attributes);

/// A table of rows.
#[derive(Debug)]
pub struct Table {
    base: ControlBase,
    data: DataManager,
    columns: Vec<Column>,
    caption: Option<Caption>,
    header_row_count: usize,
    footer_row_count: usize,
    row_styler: Option<ObjectRef<dyn RowStyler>>,
    header_row_styler: Option<ObjectRef<dyn RowStyler>>,
    footer_row_styler: Option<ObjectRef<dyn RowStyler>>,
    sort_history: SortHistory,
    column_id_counter: usize,
    load_error: Option<String>,

    /// Emitted with the column ID and new direction after a sort click.
    pub sort_changed: Signal<(String, SortDirection)>,
}

impl Table {
    pub const KIND: &'static str = "table";

    pub fn new(id: impl Into<String>, config: &TabulaConfig) -> Self {
        Self {
            base: ControlBase::new(id),
            data: DataManager::new(),
            columns: Vec::new(),
            caption: None,
            header_row_count: 1,
            footer_row_count: 0,
            row_styler: None,
            header_row_styler: None,
            footer_row_styler: None,
            sort_history: SortHistory::new(config.sort_history_limit),
            column_id_counter: 0,
            load_error: None,
            sort_changed: Signal::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }

    pub fn base(&self) -> &ControlBase {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    // Columns

    /// Add a column at the end.
    ///
    /// A column without an ID gets `col{n}` from a counter that never goes
    /// back, so IDs of removed columns are not handed out again.
    pub fn add_column(&mut self, mut column: Column) -> Result<&mut Column> {
        if column.id().is_empty() {
            let id = loop {
                self.column_id_counter += 1;
                let candidate = format!("col{}", self.column_id_counter);
                if self.column(&candidate).is_none() {
                    break candidate;
                }
            };
            column.set_id(id);
        } else if self.column(column.id()).is_some() {
            return Err(TabulaError::bad_id(
                column.id(),
                format!("table '{}' already has a column with this ID", self.base.id()),
            ));
        }
        column.set_table_id(self.base.id());
        column.add_actions(&mut self.base);
        tracing::trace!(target: "horizon_tabula::table", table = %self.base.id(), column = %column.id(), "column added");
        self.columns.push(column);
        let last = self.columns.len() - 1;
        Ok(&mut self.columns[last])
    }

    /// Remove a column. It is also dropped from the sort history.
    pub fn remove_column(&mut self, id: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.id() == id)?;
        self.sort_history.remove(id);
        Some(self.columns.remove(index))
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == id)
    }

    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id() == id)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    // Layout

    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = Some(Caption::Text(caption.into()));
    }

    /// Draw control `id` as the caption. The control should name this table
    /// as its parent so the page does not draw it a second time.
    pub fn set_caption_control(&mut self, id: impl Into<String>) {
        self.caption = Some(Caption::Control(id.into()));
    }

    pub fn clear_caption(&mut self) {
        self.caption = None;
    }

    pub fn header_row_count(&self) -> usize {
        self.header_row_count
    }

    pub fn set_header_row_count(&mut self, count: usize) {
        self.header_row_count = count;
    }

    pub fn footer_row_count(&self) -> usize {
        self.footer_row_count
    }

    pub fn set_footer_row_count(&mut self, count: usize) {
        self.footer_row_count = count;
    }

    pub fn set_row_styler(&mut self, styler: ObjectRef<dyn RowStyler>) {
        self.row_styler = Some(styler);
    }

    pub fn set_header_row_styler(&mut self, styler: ObjectRef<dyn RowStyler>) {
        self.header_row_styler = Some(styler);
    }

    pub fn set_footer_row_styler(&mut self, styler: ObjectRef<dyn RowStyler>) {
        self.footer_row_styler = Some(styler);
    }

    // Data

    pub fn data_manager(&self) -> &DataManager {
        &self.data
    }

    pub fn data_manager_mut(&mut self) -> &mut DataManager {
        &mut self.data
    }

    /// Set the rows to draw.
    pub fn set_data(&mut self, rows: Vec<Value>) {
        self.data.set_data(rows);
    }

    /// Take rows from the binder registered as `provider_id` on the page.
    pub fn set_data_provider(&mut self, provider_id: impl Into<String>) {
        self.data.set_data_provider(provider_id);
    }

    /// Message of the provider failure of the last draw, if any.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    // Sorting

    pub fn sort_history(&self) -> &SortHistory {
        &self.sort_history
    }

    pub fn set_sort_history_limit(&mut self, limit: usize) {
        self.sort_history.set_limit(limit);
    }

    /// Apply a click on the sort button of column `id`. Returns the new
    /// direction, or `None` when the click was ignored.
    pub fn click_sort(&mut self, id: &str) -> Option<SortDirection> {
        let direction = self.sort_history.click(&mut self.columns, id)?;
        tracing::debug!(target: "horizon_tabula::table", table = %self.base.id(), column = id, direction = direction.as_str(), "sort changed");
        self.sort_changed.emit((id.to_string(), direction));
        Some(direction)
    }

    /// Sorted columns, primary first.
    pub fn sort_columns(&self) -> Vec<&Column> {
        self.sort_history
            .ids()
            .iter()
            .filter_map(|id| self.column(id))
            .collect()
    }

    fn sort_keys(&self) -> Vec<(String, SortDirection)> {
        self.sort_columns()
            .into_iter()
            .map(|c| (c.id().to_string(), c.sort_direction()))
            .filter(|(_, direction)| direction.is_sorted())
            .collect()
    }

    // Drawing

    /// Attributes of a body row.
    pub fn row_attributes(
        &self,
        ctx: &PageContext<'_>,
        row: usize,
        data: &Value,
    ) -> Result<Attributes> {
        match &self.row_styler {
            Some(styler) => styler.row_attributes(ctx, self.base.id(), row, data),
            None => Ok(Attributes::new()),
        }
    }

    /// Bind rows for a draw. Provider failures are kept as the load error,
    /// other errors are returned.
    pub(crate) fn load_for_draw(
        owner: &mut dyn DataOwner,
        ctx: &PageContext<'_>,
    ) -> Result<Option<String>> {
        match ctx.load_owner(owner) {
            Ok(()) => Ok(None),
            Err(err) if err.is_provider_failure() => {
                tracing::warn!(target: "horizon_tabula::table", table = %owner.owner_id(), error = %err, "drawing without data");
                Ok(Some(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    /// Draw the table markup.
    ///
    /// `window` limits the body to rows whose absolute index falls in the
    /// half-open range. `options` are added to the `<table>` tag and
    /// `decorate` may add attributes to each body row.
    pub(crate) fn render(
        &mut self,
        ctx: &mut PageContext<'_>,
        grctl: &str,
        window: Option<(usize, usize)>,
        options: &Attributes,
        decorate: Option<RowDecorator<'_>>,
    ) -> Result<String> {
        for column in &mut self.columns {
            column.pre_render();
        }

        let mut html = String::new();
        match &self.caption {
            Some(Caption::Text(text)) => {
                html.push_str(&render_tag("caption", &Attributes::new(), &escape_html(text)));
            }
            Some(Caption::Control(id)) => {
                let inner = ctx.draw_control(id)?;
                html.push_str(&render_tag("caption", &Attributes::new(), &inner));
            }
            None => {}
        }
        html.push_str(&self.render_colgroup());
        html.push_str(&self.render_head(ctx)?);
        html.push_str(&self.render_foot(ctx)?);
        html.push_str(&self.render_body(ctx, window, decorate)?);

        let mut attributes = self.base.drawing_attributes(grctl);
        attributes.merge(options);
        Ok(render_tag("table", &attributes, &html))
    }

    /// [`render`](Self::render) for a table with page state. The window is
    /// applied only when the table holds the complete row set.
    pub(crate) fn render_paged(
        &mut self,
        ctx: &mut PageContext<'_>,
        grctl: &str,
        paging: Option<&PagedControl>,
        options: &Attributes,
        decorate: Option<RowDecorator<'_>>,
    ) -> Result<String> {
        let Some(paging) = paging else {
            return self.render(ctx, grctl, None, options, decorate);
        };
        let window = self.data.page_window(paging);
        let id = self.base.id().to_string();
        ctx.with_lent_paging(&id, paging, |ctx| self.render(ctx, grctl, window, options, decorate))
    }

    fn render_colgroup(&self) -> String {
        let visible = || self.columns.iter().filter(|c| !c.is_hidden());
        if !visible().any(|c| c.span() > 1 || !c.col_tag_attributes().is_empty()) {
            return String::new();
        }
        let cols: String = visible()
            .map(|c| render_void_tag("col", &c.col_tag_attributes()))
            .collect();
        render_tag("colgroup", &Attributes::new(), &cols)
    }

    fn section_row_attributes(
        &self,
        ctx: &PageContext<'_>,
        styler: Option<&ObjectRef<dyn RowStyler>>,
        row: usize,
    ) -> Result<Attributes> {
        match styler {
            Some(styler) => styler.row_attributes(ctx, self.base.id(), row, &Value::Null),
            None => Ok(Attributes::new()),
        }
    }

    fn render_head(&self, ctx: &PageContext<'_>) -> Result<String> {
        if self.header_row_count == 0 {
            return Ok(String::new());
        }
        let mut rows = String::new();
        for row in 0..self.header_row_count {
            let mut cells = String::new();
            for (col, column) in self.columns.iter().filter(|c| !c.is_hidden()).enumerate() {
                let inner = column.header_cell_html(ctx, row, col)?;
                cells.push_str(&render_tag("th", &column.header_attributes(row, col), &inner));
            }
            let attributes =
                self.section_row_attributes(ctx, self.header_row_styler.as_ref(), row)?;
            rows.push_str(&render_tag("tr", &attributes, &cells));
        }
        Ok(render_tag("thead", &Attributes::new(), &rows))
    }

    fn render_foot(&self, ctx: &PageContext<'_>) -> Result<String> {
        if self.footer_row_count == 0 {
            return Ok(String::new());
        }
        let mut rows = String::new();
        for row in 0..self.footer_row_count {
            let mut cells = String::new();
            for (col, column) in self.columns.iter().filter(|c| !c.is_hidden()).enumerate() {
                let inner = column.footer_cell_html(ctx, row, col)?;
                cells.push_str(&render_tag("td", &column.footer_attributes(row, col), &inner));
            }
            let attributes =
                self.section_row_attributes(ctx, self.footer_row_styler.as_ref(), row)?;
            rows.push_str(&render_tag("tr", &attributes, &cells));
        }
        Ok(render_tag("tfoot", &Attributes::new(), &rows))
    }

    fn render_body(
        &mut self,
        ctx: &PageContext<'_>,
        window: Option<(usize, usize)>,
        decorate: Option<RowDecorator<'_>>,
    ) -> Result<String> {
        let Self {
            base,
            data,
            columns,
            row_styler,
            ..
        } = self;

        let mut rows = String::new();
        let mut failure = None;
        data.range_data(|index, row| {
            if let Some((start, end)) = window {
                if index < start {
                    return true;
                }
                if index >= end {
                    return false;
                }
            }
            let drawn = draw_row(
                ctx,
                base.id(),
                columns,
                row_styler.as_ref(),
                decorate,
                index,
                row,
            );
            match drawn {
                Ok(html) => {
                    rows.push_str(&html);
                    true
                }
                Err(err) => {
                    failure = Some(err);
                    false
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(render_tag("tbody", &Attributes::new(), &rows))
    }

    // Requests

    pub(crate) fn update_columns(&mut self, ctx: &PageContext<'_>) {
        for column in &mut self.columns {
            column.update_form_values(ctx.request());
        }
    }

    /// Handle the actions every table understands. Returns `Ok(false)` for
    /// actions it does not know.
    pub(crate) fn handle_action(
        &mut self,
        ctx: &mut PageContext<'_>,
        params: &ActionParams,
    ) -> Result<bool> {
        match params.action.as_str() {
            events::TABLE_SORT => {
                let column_id = params.value_str();
                if self.click_sort(&column_id).is_some() {
                    ctx.refresh(self.base.id());
                }
                Ok(true)
            }
            events::COLUMN_ACTION
            | events::CHECKBOX_COLUMN_CLICK
            | events::ALL_CLICK
            | events::BUTTON_COLUMN_CLICK => {
                let column_id = params
                    .column_id
                    .clone()
                    .or_else(|| params.value.get("column").map(|c| c.to_string()))
                    .ok_or_else(|| {
                        TabulaError::bad_id(
                            self.base.id(),
                            format!("{} action without a column ID", params.action),
                        )
                    })?;
                let table_id = self.base.id().to_string();
                let column = self.column_mut(&column_id).ok_or_else(|| {
                    TabulaError::bad_id(
                        column_id.as_str(),
                        format!("table '{table_id}' has no such column"),
                    )
                })?;
                column.do_action(ctx, params)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    // State

    pub(crate) fn marshal_into(&self, state: &mut StateMap) {
        if !self.sort_history.is_empty() {
            state.insert("sortHistory".into(), serde_json::json!(self.sort_history.ids()));
            if let Some(primary) = self.sort_history.primary().and_then(|id| self.column(id)) {
                if let Ok(direction) = serde_json::to_value(primary.sort_direction()) {
                    state.insert("sortDirection".into(), direction);
                }
            }
        }
        let columns: StateMap = self
            .columns
            .iter()
            .filter_map(|c| c.marshal_state().map(|s| (c.id().to_string(), s)))
            .collect();
        if !columns.is_empty() {
            state.insert("columns".into(), serde_json::Value::Object(columns));
        }
    }

    pub(crate) fn unmarshal_from(&mut self, state: &StateMap) {
        if let Some(ids) = state.get("sortHistory") {
            match serde_json::from_value::<Vec<String>>(ids.clone()) {
                Ok(ids) => {
                    let direction = state
                        .get("sortDirection")
                        .and_then(|d| serde_json::from_value::<SortDirection>(d.clone()).ok())
                        .unwrap_or(SortDirection::Ascending);
                    self.restore_sort(ids, direction);
                }
                Err(err) => {
                    tracing::warn!(target: "horizon_tabula::state", table = %self.base.id(), error = %err, "unreadable sort history");
                }
            }
        }
        if let Some(columns) = state.get("columns").and_then(|c| c.as_object()) {
            for column in &mut self.columns {
                if let Some(column_state) = columns.get(column.id()) {
                    column.unmarshal_state(column_state);
                }
            }
        }
    }

    fn restore_sort(&mut self, ids: Vec<String>, direction: SortDirection) {
        let ids: Vec<String> = ids
            .into_iter()
            .filter(|id| self.column(id).is_some_and(Column::is_sortable))
            .collect();
        for column in self.columns.iter_mut().filter(|c| c.is_sortable()) {
            column.set_sort_direction(SortDirection::NotSorted);
        }
        if let Some(primary) = ids
            .first()
            .and_then(|id| self.columns.iter_mut().find(|c| c.id() == id))
        {
            primary.set_sort_direction(direction);
        }
        self.sort_history.set_ids(ids);
    }

    pub(crate) fn encode(&self) -> Result<TableState> {
        let encode_styler = |styler: &Option<ObjectRef<dyn RowStyler>>| {
            styler.as_ref().map(ObjectRef::encode).transpose()
        };
        Ok(TableState {
            base: self.base.clone(),
            data: self.data.clone(),
            caption: self.caption.clone(),
            header_row_count: self.header_row_count,
            footer_row_count: self.footer_row_count,
            row_styler: encode_styler(&self.row_styler)?,
            header_row_styler: encode_styler(&self.header_row_styler)?,
            footer_row_styler: encode_styler(&self.footer_row_styler)?,
            column_count: self.columns.len(),
            columns: self.columns.iter().map(Column::encode).collect::<Result<_>>()?,
            sort_history: self.sort_history.ids().to_vec(),
            sort_history_limit: self.sort_history.limit(),
            column_id_counter: self.column_id_counter,
        })
    }

    pub(crate) fn decode(state: TableState, ctx: &DecodeContext<'_>) -> Result<Self> {
        if state.columns.len() != state.column_count {
            return Err(TabulaError::bad_data(format!(
                "table '{}' stores {} columns but names {}",
                state.base.id(),
                state.columns.len(),
                state.column_count
            )));
        }
        let registry = ctx.registry;
        let decode_styler =
            |styler: Option<EncodedRef>| -> Result<Option<ObjectRef<dyn RowStyler>>> {
                styler.map(|r| ObjectRef::decode(r, registry)).transpose()
            };

        let table_id = state.base.id().to_string();
        let mut table = Table::new(table_id.as_str(), ctx.config);
        table.base = state.base;
        table.data = state.data;
        table.caption = state.caption;
        table.header_row_count = state.header_row_count;
        table.footer_row_count = state.footer_row_count;
        table.row_styler = decode_styler(state.row_styler)?;
        table.header_row_styler = decode_styler(state.header_row_styler)?;
        table.footer_row_styler = decode_styler(state.footer_row_styler)?;
        table.columns = state
            .columns
            .into_iter()
            .map(|column| Column::decode(column, &table_id, ctx))
            .collect::<Result<_>>()?;
        table.sort_history = SortHistory::new(state.sort_history_limit);
        table.sort_history.set_ids(state.sort_history);
        table.column_id_counter = state.column_id_counter;
        Ok(table)
    }

    /// Check references to other controls of the page.
    pub(crate) fn restore_refs(&self, ctx: &PageContext<'_>) -> Result<()> {
        let id = self.base.id();
        if let Some(Caption::Control(caption)) = &self.caption {
            if !ctx.contains_control(caption) {
                return Err(TabulaError::stale_state(id, caption.as_str()));
            }
        }
        for styler in [&self.row_styler, &self.header_row_styler, &self.footer_row_styler]
            .into_iter()
            .flatten()
        {
            styler.verify(ctx, id)?;
        }
        for column in &self.columns {
            column.restore(ctx)?;
        }
        Ok(())
    }

    pub(crate) fn describe_columns(&self) -> Vec<String> {
        self.columns.iter().map(Column::describe).collect()
    }

    pub fn decode_boxed(
        data: serde_json::Value,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn Control>> {
        let state: TableState = serde_json::from_value(data)?;
        Ok(Box::new(Self::decode(state, ctx)?))
    }
}

fn draw_row(
    ctx: &PageContext<'_>,
    table_id: &str,
    columns: &mut [Column],
    row_styler: Option<&ObjectRef<dyn RowStyler>>,
    decorate: Option<RowDecorator<'_>>,
    index: usize,
    row: &Value,
) -> Result<String> {
    let mut cells = String::new();
    for (col, column) in columns.iter_mut().filter(|c| !c.is_hidden()).enumerate() {
        let text = column.cell_text(ctx, index, col, row)?;
        let attributes = column.cell_attributes(ctx, index, col, row)?;
        let tag = if column.is_header() { "th" } else { "td" };
        cells.push_str(&render_tag(tag, &attributes, &text));
    }
    let mut attributes = match row_styler {
        Some(styler) => styler.row_attributes(ctx, table_id, index, row)?,
        None => Attributes::new(),
    };
    if let Some(decorate) = decorate {
        decorate(index, row, &mut attributes);
    }
    Ok(render_tag("tr", &attributes, &cells))
}

impl DataOwner for Table {
    fn owner_id(&self) -> &str {
        self.base.id()
    }

    fn data_manager(&self) -> &DataManager {
        &self.data
    }

    fn data_manager_mut(&mut self) -> &mut DataManager {
        &mut self.data
    }

    fn sort_keys(&self) -> Vec<(String, SortDirection)> {
        Table::sort_keys(self)
    }
}

impl Control for Table {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn update_form_values(&mut self, ctx: &mut PageContext<'_>) {
        self.update_columns(ctx);
    }

    fn draw(&mut self, ctx: &mut PageContext<'_>) -> Result<String> {
        self.load_error = Table::load_for_draw(self, ctx)?;
        self.render(ctx, "table", None, &Attributes::new(), None)
    }

    fn do_action(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        if !self.handle_action(ctx, params)? {
            tracing::debug!(target: "horizon_tabula::table", table = %self.base.id(), action = %params.action, "unhandled action");
        }
        Ok(())
    }

    fn marshal_state(&self, _ctx: &PageContext<'_>, state: &mut StateMap) {
        self.marshal_into(state);
    }

    fn unmarshal_state(&mut self, _ctx: &mut PageContext<'_>, state: &StateMap) {
        self.unmarshal_from(state);
    }

    fn serialize(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.encode()?)?)
    }

    fn restore(&mut self, ctx: &PageContext<'_>) -> Result<()> {
        self.restore_refs(ctx)
    }

    fn as_data_owner(&self) -> Option<&dyn DataOwner> {
        Some(self)
    }

    fn as_data_owner_mut(&mut self) -> Option<&mut dyn DataOwner> {
        Some(self)
    }

    fn debug_children(&self) -> Vec<String> {
        self.describe_columns()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Page-state form of a [`Table`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub base: ControlBase,
    pub data: DataManager,
    #[serde(rename = "captionRef")]
    pub caption: Option<Caption>,
    pub header_row_count: usize,
    pub footer_row_count: usize,
    pub row_styler: Option<EncodedRef>,
    pub header_row_styler: Option<EncodedRef>,
    pub footer_row_styler: Option<EncodedRef>,
    pub column_count: usize,
    pub columns: Vec<ColumnState>,
    pub sort_history: Vec<String>,
    pub sort_history_limit: usize,
    pub column_id_counter: usize,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::StripedRowStyler;
    use crate::control::Page;
    use crate::request::RequestContext;
    use std::sync::Arc;

    fn people() -> Vec<Value> {
        vec![
            Value::map([("name", Value::from("Ada")), ("age", Value::from(36))]),
            Value::map([("name", Value::from("Grace")), ("age", Value::from(45))]),
        ]
    }

    fn table() -> Table {
        let mut table = Table::new("people", &TabulaConfig::default());
        table.add_column(Column::key("name", "Name").with_id("name").sortable()).unwrap();
        table.add_column(Column::key("age", "Age").with_id("age")).unwrap();
        table.set_data(people());
        table
    }

    #[test]
    fn test_column_ids_never_reused() {
        let mut table = Table::new("t", &TabulaConfig::default());
        let first = table.add_column(Column::key("a", "A")).unwrap().id().to_string();
        let second = table.add_column(Column::key("b", "B")).unwrap().id().to_string();
        assert_eq!((first.as_str(), second.as_str()), ("col1", "col2"));

        table.remove_column("col2");
        let third = table.add_column(Column::key("c", "C")).unwrap();
        assert_eq!(third.id(), "col3");
        assert_eq!(third.base().table_id(), "t");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = table();
        let err = table.add_column(Column::key("x", "X").with_id("name")).unwrap_err();
        assert!(matches!(err, TabulaError::BadId { .. }));
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_draw() {
        let mut page = Page::new("p", TabulaConfig::default());
        let mut table = table();
        table.set_caption("Staff & friends");
        table.set_row_styler(ObjectRef::Inline(Arc::new(StripedRowStyler::new("even", "odd"))));
        page.add_control(table).unwrap();

        let html = page.draw(&RequestContext::new()).unwrap();
        assert!(html.starts_with("<table id=\"people\" data-grctl=\"table\""));
        assert!(html.contains("<caption>Staff &amp; friends</caption>"));
        assert!(html.contains("<thead><tr><th aria-sort=\"none\"><button"));
        assert!(html.contains("<th>Age</th></tr></thead>"));
        assert!(html.contains("<tr class=\"even\"><td>Ada</td><td>36</td></tr>"));
        assert!(html.contains("<tr class=\"odd\"><td>Grace</td><td>45</td></tr>"));
        assert!(!html.contains("<colgroup>"));
        assert!(!html.contains("<tfoot>"));
    }

    #[test]
    fn test_hidden_and_header_columns() {
        let mut page = Page::new("p", TabulaConfig::default());
        let mut table = Table::new("t", &TabulaConfig::default());
        table.add_column(Column::row_number("#").as_header().with_span(2)).unwrap();
        table.add_column(Column::key("name", "Name").hidden()).unwrap();
        table.set_header_row_count(0);
        table.set_data(people());
        page.add_control(table).unwrap();

        let html = page.draw(&RequestContext::new()).unwrap();
        assert!(html.contains("<colgroup><col span=\"2\"></colgroup>"));
        assert!(html.contains("<tbody><tr><th>1</th></tr><tr><th>2</th></tr></tbody>"));
        assert!(!html.contains("Ada"));
        assert!(!html.contains("<thead>"));
    }

    #[test]
    fn test_sort_action_refreshes() {
        let mut page = Page::new("p", TabulaConfig::default());
        page.add_control(table()).unwrap();
        let request = RequestContext::new()
            .with_action(ActionParams::new("people", events::TABLE_SORT).with_value("name"));
        page.handle_request(&request).unwrap();

        assert_eq!(page.refresh_ids(), ["people"]);
        let table = page.control::<Table>("people").unwrap();
        assert_eq!(table.column("name").unwrap().sort_direction(), SortDirection::Ascending);
        assert_eq!(table.sort_keys(), vec![("name".to_string(), SortDirection::Ascending)]);
    }

    #[test]
    fn test_column_action_needs_known_column() {
        let mut page = Page::new("p", TabulaConfig::default());
        page.add_control(table()).unwrap();
        let request = RequestContext::new().with_action(
            ActionParams::new("people", events::COLUMN_ACTION).with_column("ghost"),
        );
        assert!(matches!(page.handle_request(&request), Err(TabulaError::BadId { .. })));
    }

    #[test]
    fn test_marshal_sort_state() {
        let mut source = table();
        source.click_sort("name");
        source.click_sort("name");
        let mut state = StateMap::new();
        source.marshal_into(&mut state);

        let mut target = table();
        target.unmarshal_from(&state);
        assert_eq!(target.sort_history().ids(), ["name"]);
        assert_eq!(target.column("name").unwrap().sort_direction(), SortDirection::Descending);
    }

    #[test]
    fn test_state_field_order() {
        let json = serde_json::to_string(&table().encode().unwrap()).unwrap();
        let keys = [
            "\"base\"",
            "\"captionRef\"",
            "\"headerRowCount\"",
            "\"footerRowCount\"",
            "\"columnCount\"",
            "\"columns\"",
            "\"sortHistory\"",
            "\"sortHistoryLimit\"",
            "\"columnIdCounter\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
