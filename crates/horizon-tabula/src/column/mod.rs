//! Table columns.
//!
//! A [`Column`] pairs the settings every column shares ([`ColumnBase`]) with
//! a [`ColumnKind`] that decides where cell data comes from and how cells
//! are drawn. Tables call the capability methods on `Column` directly.
//!
//! # Example
//!
//! ```
//! use horizon_tabula::column::Column;
//!
//! let name = Column::key("name", "Name").sortable();
//! let price = Column::key("price", "Price").with_format("$%.2f");
//! let row = Column::row_number("#").as_header();
//! assert!(name.is_sortable());
//! assert!(!price.is_sortable());
//! assert!(row.is_header());
//! ```

mod button;
mod checkbox;
mod format;
mod texter;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{Result, TabulaError, Value};

pub use button::ButtonColumn;
pub use checkbox::{CheckboxColumn, CheckboxProvider, KeyCheckboxProvider};
pub use format::{FormatContext, apply_format, sprintf};
pub use texter::{
    CellInfo, CellStyler, CellTexter, EncodedRef, HeaderTexter, InlineObject, ObjectRef, Persisted,
    RowStyler, StripedRowStyler, TemplateTexter,
};

use crate::control::{ControlBase, DecodeContext, PageContext};
use crate::html::{Attributes, escape_html};
use crate::request::{ActionParams, RequestContext, events};
use crate::table::SortDirection;

/// Settings shared by every column kind.
#[derive(Debug, Clone, Default)]
pub struct ColumnBase {
    id: String,
    table_id: String,
    title: String,
    attributes: Attributes,
    header_attributes: Vec<Attributes>,
    footer_attributes: Vec<Attributes>,
    col_tag_attributes: Attributes,
    span: usize,
    as_header: bool,
    is_html: bool,
    is_hidden: bool,
    sort_direction: SortDirection,
    format: Option<String>,
    time_format: Option<String>,
    cell_texter: Option<ObjectRef<dyn CellTexter>>,
    header_texter: Option<ObjectRef<dyn HeaderTexter>>,
    footer_texter: Option<ObjectRef<dyn HeaderTexter>>,
    cell_styler: Option<ObjectRef<dyn CellStyler>>,
}

impl ColumnBase {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            span: 1,
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// ID of the table the column belongs to. Empty until added to a table.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether cell text is emitted without escaping.
    pub fn is_html(&self) -> bool {
        self.is_html
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn time_format(&self) -> Option<&str> {
        self.time_format.as_deref()
    }

    /// Name shared by the column's form inputs.
    pub fn input_name(&self) -> String {
        format!("{}_{}", self.table_id, self.id)
    }

    fn escape(&self, text: String) -> String {
        if self.is_html { text } else { escape_html(&text) }
    }
}

/// Where a column's cells come from.
#[derive(Debug)]
pub enum ColumnKind {
    /// Position in a list row.
    Slice { index: usize },
    /// Key of a map row or field of a record row.
    Key { key: String },
    /// Chain of keys walked through nested maps and records.
    Node { path: Vec<String> },
    /// Named alias value of a record row.
    Alias { alias: String },
    /// 1-based absolute row number.
    RowNumber,
    /// Cells produced entirely by the cell texter.
    Custom,
    Button(ButtonColumn),
    Checkbox(CheckboxColumn),
}

impl ColumnKind {
    fn name(&self) -> &'static str {
        match self {
            ColumnKind::Slice { .. } => "slice",
            ColumnKind::Key { .. } => "key",
            ColumnKind::Node { .. } => "node",
            ColumnKind::Alias { .. } => "alias",
            ColumnKind::RowNumber => "rowNumber",
            ColumnKind::Custom => "custom",
            ColumnKind::Button(_) => "button",
            ColumnKind::Checkbox(_) => "checkbox",
        }
    }
}

/// A table column.
#[derive(Debug)]
pub struct Column {
    base: ColumnBase,
    kind: ColumnKind,
}

impl Column {
    fn with_kind(title: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            base: ColumnBase::new(title),
            kind,
        }
    }

    /// Column showing `row[index]` of list rows.
    pub fn slice(index: usize, title: impl Into<String>) -> Self {
        Self::with_kind(title, ColumnKind::Slice { index })
    }

    /// Column showing a key of map or record rows.
    pub fn key(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_kind(title, ColumnKind::Key { key: key.into() })
    }

    /// Column walking a chain of keys, e.g. `["project", "manager", "name"]`.
    pub fn node<I, S>(path: I, title: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.into_iter().map(Into::into).collect();
        Self::with_kind(title, ColumnKind::Node { path })
    }

    /// Column reading a named alias of record rows.
    pub fn alias(alias: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_kind(title, ColumnKind::Alias { alias: alias.into() })
    }

    pub fn row_number(title: impl Into<String>) -> Self {
        Self::with_kind(title, ColumnKind::RowNumber)
    }

    /// Column whose cells come from an inline texter.
    pub fn custom(title: impl Into<String>, texter: impl CellTexter + 'static) -> Self {
        let mut column = Self::with_kind(title, ColumnKind::Custom);
        column.base.cell_texter = Some(ObjectRef::Inline(Arc::new(texter)));
        column
    }

    /// Column whose cells come from another control of the page.
    pub fn custom_control(title: impl Into<String>, texter_id: impl Into<String>) -> Self {
        let mut column = Self::with_kind(title, ColumnKind::Custom);
        column.base.cell_texter = Some(ObjectRef::Control(texter_id.into()));
        column
    }

    pub fn button(title: impl Into<String>, button: ButtonColumn) -> Self {
        let mut column = Self::with_kind(title, ColumnKind::Button(button));
        column.base.is_html = true;
        column
    }

    pub fn checkbox(title: impl Into<String>, checkbox: CheckboxColumn) -> Self {
        let mut column = Self::with_kind(title, ColumnKind::Checkbox(checkbox));
        column.base.is_html = true;
        column
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.base.id = id.into();
        self
    }

    /// Printf-style format for cell text, e.g. `"%.2f"`.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.base.format = Some(format.into());
        self
    }

    /// Strftime-style format for time values.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.base.time_format = Some(format.into());
        self
    }

    /// Give the column a sort button.
    pub fn sortable(mut self) -> Self {
        self.base.sort_direction = SortDirection::NotSorted;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.base.is_hidden = true;
        self
    }

    /// Draw body cells as `<th>`.
    pub fn as_header(mut self) -> Self {
        self.base.as_header = true;
        self
    }

    /// Emit cell text without escaping.
    pub fn html(mut self) -> Self {
        self.base.is_html = true;
        self
    }

    /// Set the `span` of the column's `<col>` tag.
    pub fn with_span(mut self, span: usize) -> Self {
        self.base.span = span.max(1);
        self
    }

    pub fn with_cell_texter(mut self, texter: ObjectRef<dyn CellTexter>) -> Self {
        self.base.cell_texter = Some(texter);
        self
    }

    pub fn with_header_texter(mut self, texter: ObjectRef<dyn HeaderTexter>) -> Self {
        self.base.header_texter = Some(texter);
        self
    }

    pub fn with_footer_texter(mut self, texter: ObjectRef<dyn HeaderTexter>) -> Self {
        self.base.footer_texter = Some(texter);
        self
    }

    pub fn with_cell_styler(mut self, styler: ObjectRef<dyn CellStyler>) -> Self {
        self.base.cell_styler = Some(styler);
        self
    }

    /// Attribute added to every body cell.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.attributes.set(name, value);
        self
    }

    /// Attribute added to the header cell of header row `row`.
    pub fn with_header_attribute(
        mut self,
        row: usize,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        if self.base.header_attributes.len() <= row {
            self.base.header_attributes.resize_with(row + 1, Attributes::new);
        }
        self.base.header_attributes[row].set(name, value);
        self
    }

    /// Attribute added to the footer cell of footer row `row`.
    pub fn with_footer_attribute(
        mut self,
        row: usize,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        if self.base.footer_attributes.len() <= row {
            self.base.footer_attributes.resize_with(row + 1, Attributes::new);
        }
        self.base.footer_attributes[row].set(name, value);
        self
    }

    /// Attribute of the column's `<col>` tag.
    pub fn with_col_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.col_tag_attributes.set(name, value);
        self
    }

    pub fn base(&self) -> &ColumnBase {
        &self.base
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ColumnKind {
        &mut self.kind
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.base.id = id.into();
    }

    pub(crate) fn set_table_id(&mut self, table_id: impl Into<String>) {
        self.base.table_id = table_id.into();
    }

    pub fn title(&self) -> &str {
        &self.base.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.base.title = title.into();
    }

    pub fn span(&self) -> usize {
        self.base.span
    }

    pub fn is_hidden(&self) -> bool {
        self.base.is_hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.base.is_hidden = hidden;
    }

    pub fn is_header(&self) -> bool {
        self.base.as_header
    }

    /// The checkbox state of a checkbox column.
    pub fn as_checkbox(&self) -> Option<&CheckboxColumn> {
        match &self.kind {
            ColumnKind::Checkbox(checkbox) => Some(checkbox),
            _ => None,
        }
    }

    pub fn as_checkbox_mut(&mut self) -> Option<&mut CheckboxColumn> {
        match &mut self.kind {
            ColumnKind::Checkbox(checkbox) => Some(checkbox),
            _ => None,
        }
    }

    pub fn as_button(&self) -> Option<&ButtonColumn> {
        match &self.kind {
            ColumnKind::Button(button) => Some(button),
            _ => None,
        }
    }

    // Sort

    pub fn is_sortable(&self) -> bool {
        self.base.sort_direction.is_sortable()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.base.sort_direction
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.base.sort_direction = direction;
    }

    /// Wrap `label_html` in the column's sort button.
    pub fn render_sort_button(&self, label_html: &str) -> String {
        let direction = self.base.sort_direction;
        let attributes = Attributes::new()
            .with("type", "button")
            .with("class", format!("gr-sort gr-sort-{}", direction.as_str()))
            .with("data-gr-sort", self.base.id.as_str());
        let indicator = Attributes::new()
            .with("class", "gr-sort-indicator")
            .with("aria-hidden", "true");
        crate::html::render_tag(
            "button",
            &attributes,
            &format!("{label_html}{}", crate::html::render_tag("span", &indicator, "")),
        )
    }

    // Rendering

    /// Format a value with the column's formats.
    pub fn apply_format(&self, value: &Value, ctx: &FormatContext<'_>) -> String {
        apply_format(value, self.base.format(), self.base.time_format(), ctx)
    }

    /// The raw value of a body cell.
    pub fn cell_data(&self, row: usize, data: &Value) -> Value {
        match &self.kind {
            ColumnKind::Slice { index } => data.index(*index).cloned().unwrap_or_default(),
            ColumnKind::Key { key } => data.get(key).unwrap_or_default(),
            ColumnKind::Node { path } => data.get_path(path).unwrap_or_default(),
            ColumnKind::Alias { alias } => data
                .as_record()
                .and_then(|record| record.alias(alias))
                .or_else(|| data.get(alias))
                .unwrap_or_default(),
            ColumnKind::RowNumber => Value::from(row + 1),
            ColumnKind::Custom => Value::Null,
            ColumnKind::Button(button) => button.cell_value(data),
            ColumnKind::Checkbox(checkbox) => Value::Bool(checkbox.provider().is_checked(data)),
        }
    }

    /// The html content of a body cell.
    ///
    /// `row` is the absolute row index and `col` the index among visible
    /// columns.
    pub fn cell_text(
        &mut self,
        ctx: &PageContext<'_>,
        row: usize,
        col: usize,
        data: &Value,
    ) -> Result<String> {
        match &mut self.kind {
            ColumnKind::Checkbox(checkbox) => return Ok(checkbox.cell_html(&self.base, data)),
            ColumnKind::Button(button) => return Ok(button.cell_html(data)),
            _ => {}
        }
        if let Some(texter) = &self.base.cell_texter {
            let info = CellInfo { row, col, data };
            let text = texter.cell_text(ctx, &self.base, &info)?;
            return Ok(self.base.escape(text));
        }
        if matches!(self.kind, ColumnKind::Custom) {
            return Err(TabulaError::misconfigured(
                self.base.id.as_str(),
                "custom column has no cell texter",
            ));
        }
        let value = self.cell_data(row, data);
        Ok(self.base.escape(self.apply_format(&value, &ctx.format_context())))
    }

    /// Attributes of a body cell.
    pub fn cell_attributes(
        &self,
        ctx: &PageContext<'_>,
        row: usize,
        col: usize,
        data: &Value,
    ) -> Result<Attributes> {
        let mut attributes = self.base.attributes.clone();
        if let Some(styler) = &self.base.cell_styler {
            let info = CellInfo { row, col, data };
            attributes.merge(&styler.cell_attributes(ctx, &self.base, &info)?);
        }
        Ok(attributes)
    }

    /// The html content of a header cell.
    pub fn header_cell_html(
        &self,
        ctx: &PageContext<'_>,
        row: usize,
        col: usize,
    ) -> Result<String> {
        if let Some(texter) = &self.base.header_texter {
            let text = texter.header_text(ctx, &self.base, row, col)?;
            return Ok(self.base.escape(text));
        }
        if row > 0 {
            return Ok(String::new());
        }

        // Checkbox and button columns are html for their cells only.
        let html_title = self.base.is_html
            && !matches!(self.kind, ColumnKind::Checkbox(_) | ColumnKind::Button(_));
        let title = if html_title {
            self.base.title.clone()
        } else {
            escape_html(&self.base.title)
        };
        let mut html = if self.is_sortable() {
            self.render_sort_button(&title)
        } else {
            title
        };
        if let ColumnKind::Checkbox(checkbox) = &self.kind {
            if checkbox.show_check_all() {
                html.push_str(&checkbox.check_all_html(&self.base));
            }
        }
        Ok(html)
    }

    /// The html content of a footer cell.
    pub fn footer_cell_html(
        &self,
        ctx: &PageContext<'_>,
        row: usize,
        col: usize,
    ) -> Result<String> {
        match &self.base.footer_texter {
            Some(texter) => Ok(self.base.escape(texter.header_text(ctx, &self.base, row, col)?)),
            None => Ok(String::new()),
        }
    }

    /// Attributes of the header cell in header row `row`.
    pub fn header_attributes(&self, row: usize, _col: usize) -> Attributes {
        let mut attributes = self.base.header_attributes.get(row).cloned().unwrap_or_default();
        if row == 0 {
            if let Some(aria) = self.base.sort_direction.aria_sort() {
                attributes.set("aria-sort", aria);
            }
        }
        attributes
    }

    pub fn footer_attributes(&self, row: usize, _col: usize) -> Attributes {
        self.base.footer_attributes.get(row).cloned().unwrap_or_default()
    }

    /// Attributes of the column's `<col>` tag.
    pub fn col_tag_attributes(&self) -> Attributes {
        let mut attributes = self.base.col_tag_attributes.clone();
        if self.base.span > 1 {
            attributes.set("span", self.base.span.to_string());
        }
        attributes
    }

    // Interaction

    /// Read submitted form values.
    pub fn update_form_values(&mut self, request: &RequestContext) {
        if let ColumnKind::Checkbox(checkbox) = &mut self.kind {
            checkbox.update_form_values(&self.base, request);
        }
    }

    /// Register the client events the column produces on its table.
    pub fn add_actions(&self, table: &mut ControlBase) {
        if self.is_sortable() {
            table.on(events::TABLE_SORT);
        }
        match &self.kind {
            ColumnKind::Checkbox(checkbox) => {
                table.on(events::CHECKBOX_COLUMN_CLICK);
                if checkbox.show_check_all() {
                    table.on(events::ALL_CLICK);
                }
            }
            ColumnKind::Button(_) => {
                table.on(events::BUTTON_COLUMN_CLICK);
            }
            _ => {}
        }
    }

    /// Handle an action routed to this column by its table.
    pub fn do_action(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        match (&mut self.kind, params.action.as_str()) {
            (ColumnKind::Checkbox(checkbox), events::CHECKBOX_COLUMN_CLICK) => {
                checkbox.row_click(&self.base, &params.value)
            }
            (ColumnKind::Checkbox(checkbox), events::ALL_CLICK) => {
                let checked = params.value.as_bool().unwrap_or(true);
                checkbox.all_click(&self.base, ctx, checked)
            }
            (ColumnKind::Button(button), events::BUTTON_COLUMN_CLICK | events::COLUMN_ACTION) => {
                button.click(&self.base, params.value_str());
                Ok(())
            }
            (_, action) => {
                tracing::debug!(target: "horizon_tabula::column", column = %self.base.id, action, "column ignored action");
                Ok(())
            }
        }
    }

    // Lifecycle

    /// Called once per draw pass before any cell is drawn.
    pub fn pre_render(&mut self) {
        if let ColumnKind::Checkbox(checkbox) = &mut self.kind {
            checkbox.pre_render();
        }
    }

    /// State kept between requests by the light-weight state layer.
    pub fn marshal_state(&self) -> Option<serde_json::Value> {
        match &self.kind {
            ColumnKind::Checkbox(checkbox) => checkbox.marshal_state(),
            _ => None,
        }
    }

    pub fn unmarshal_state(&mut self, state: &serde_json::Value) {
        if let ColumnKind::Checkbox(checkbox) = &mut self.kind {
            checkbox.unmarshal_state(&self.base, state);
        }
    }

    /// Serialize the column for page state.
    pub fn encode(&self) -> Result<ColumnState> {
        let base = &self.base;
        let variant = match &self.kind {
            ColumnKind::Slice { index } => VariantState::Slice { index: *index },
            ColumnKind::Key { key } => VariantState::Key { key: key.clone() },
            ColumnKind::Node { path } => VariantState::Node { path: path.clone() },
            ColumnKind::Alias { alias } => VariantState::Alias {
                alias: alias.clone(),
            },
            ColumnKind::RowNumber => VariantState::RowNumber,
            ColumnKind::Custom => VariantState::Custom,
            ColumnKind::Button(button) => VariantState::Button {
                label: button.label().to_string(),
                value_key: button.value_key().map(str::to_string),
            },
            ColumnKind::Checkbox(checkbox) => VariantState::Checkbox(checkbox.encode(base)?),
        };
        Ok(ColumnState {
            id: base.id.clone(),
            title: base.title.clone(),
            attributes: base.attributes.clone(),
            header_attrs: base.header_attributes.clone(),
            footer_attrs: base.footer_attributes.clone(),
            col_tag_attrs: base.col_tag_attributes.clone(),
            span: base.span,
            as_header: base.as_header,
            is_html: base.is_html,
            is_hidden: base.is_hidden,
            sort_direction: base.sort_direction,
            format: base.format.clone(),
            time_format: base.time_format.clone(),
            cell_texter: base.cell_texter.as_ref().map(ObjectRef::encode).transpose()?,
            header_texter: base.header_texter.as_ref().map(ObjectRef::encode).transpose()?,
            footer_texter: base.footer_texter.as_ref().map(ObjectRef::encode).transpose()?,
            cell_styler: base.cell_styler.as_ref().map(ObjectRef::encode).transpose()?,
            variant,
        })
    }

    /// Rebuild a column from page state.
    pub fn decode(state: ColumnState, table_id: &str, ctx: &DecodeContext<'_>) -> Result<Self> {
        let registry = ctx.registry;
        let kind = match state.variant {
            VariantState::Slice { index } => ColumnKind::Slice { index },
            VariantState::Key { key } => ColumnKind::Key { key },
            VariantState::Node { path } => ColumnKind::Node { path },
            VariantState::Alias { alias } => ColumnKind::Alias { alias },
            VariantState::RowNumber => ColumnKind::RowNumber,
            VariantState::Custom => ColumnKind::Custom,
            VariantState::Button { label, value_key } => {
                let mut button = ButtonColumn::new(label);
                if let Some(key) = value_key {
                    button = button.with_value_key(key);
                }
                ColumnKind::Button(button)
            }
            VariantState::Checkbox(checkbox) => {
                ColumnKind::Checkbox(CheckboxColumn::decode(checkbox, registry)?)
            }
        };
        let base = ColumnBase {
            id: state.id,
            table_id: table_id.to_string(),
            title: state.title,
            attributes: state.attributes,
            header_attributes: state.header_attrs,
            footer_attributes: state.footer_attrs,
            col_tag_attributes: state.col_tag_attrs,
            span: state.span.max(1),
            as_header: state.as_header,
            is_html: state.is_html,
            is_hidden: state.is_hidden,
            sort_direction: state.sort_direction,
            format: state.format,
            time_format: state.time_format,
            cell_texter: state
                .cell_texter
                .map(|r| ObjectRef::decode(r, registry))
                .transpose()?,
            header_texter: state
                .header_texter
                .map(|r| ObjectRef::decode(r, registry))
                .transpose()?,
            footer_texter: state
                .footer_texter
                .map(|r| ObjectRef::decode(r, registry))
                .transpose()?,
            cell_styler: state
                .cell_styler
                .map(|r| ObjectRef::decode(r, registry))
                .transpose()?,
        };
        Ok(Self { base, kind })
    }

    /// Check that texters and stylers referenced by ID exist on the page.
    pub fn restore(&self, ctx: &PageContext<'_>) -> Result<()> {
        let owner = format!("{}.{}", self.base.table_id, self.base.id);
        if let Some(r) = &self.base.cell_texter {
            r.verify(ctx, &owner)?;
        }
        if let Some(r) = &self.base.header_texter {
            r.verify(ctx, &owner)?;
        }
        if let Some(r) = &self.base.footer_texter {
            r.verify(ctx, &owner)?;
        }
        if let Some(r) = &self.base.cell_styler {
            r.verify(ctx, &owner)?;
        }
        Ok(())
    }

    /// One-line description for tree dumps.
    pub(crate) fn describe(&self) -> String {
        format!("{} \"{}\" ({})", self.base.id, self.base.title, self.kind.name())
    }
}

/// Page-state form of a [`Column`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub id: String,
    pub title: String,
    pub attributes: Attributes,
    pub header_attrs: Vec<Attributes>,
    pub footer_attrs: Vec<Attributes>,
    pub col_tag_attrs: Attributes,
    pub span: usize,
    pub as_header: bool,
    pub is_html: bool,
    pub is_hidden: bool,
    pub sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    pub cell_texter: Option<EncodedRef>,
    pub header_texter: Option<EncodedRef>,
    pub footer_texter: Option<EncodedRef>,
    pub cell_styler: Option<EncodedRef>,
    pub variant: VariantState,
}

/// Kind-specific part of [`ColumnState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VariantState {
    Slice {
        index: usize,
    },
    Key {
        key: String,
    },
    Node {
        path: Vec<String>,
    },
    Alias {
        alias: String,
    },
    RowNumber,
    Custom,
    #[serde(rename_all = "camelCase")]
    Button {
        label: String,
        value_key: Option<String>,
    },
    Checkbox(checkbox::CheckboxState),
}
