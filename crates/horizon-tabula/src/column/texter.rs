//! Injected cell texters and stylers.
//!
//! A column can hand the rendering of its cells to a texter, and a table can
//! hand row attributes to a styler. The object is either held inline by the
//! column, or is another control of the page referenced by ID. Inline
//! objects are written into page state with a kind tag so that the
//! [`TypeRegistry`](crate::control::TypeRegistry) can rebuild them; control
//! references are stored as the bare ID and re-resolved on restore.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{Result, TabulaError, Value};

use crate::column::ColumnBase;
use crate::control::{PageContext, TypeRegistry};
use crate::html::Attributes;

/// Kind tag plus data of an inline object in page state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persisted {
    pub kind: String,
    pub data: serde_json::Value,
}

impl Persisted {
    /// Encode a serializable object under `kind`.
    pub fn of<T: Serialize>(kind: &str, object: &T) -> Option<Self> {
        match serde_json::to_value(object) {
            Ok(data) => Some(Self {
                kind: kind.to_string(),
                data,
            }),
            Err(err) => {
                tracing::warn!(target: "horizon_tabula::state", kind, error = %err, "inline object could not be encoded");
                None
            }
        }
    }
}

/// Where a body cell is being drawn.
#[derive(Debug, Clone, Copy)]
pub struct CellInfo<'a> {
    /// Absolute row index.
    pub row: usize,
    /// Index among the visible columns.
    pub col: usize,
    /// Row data.
    pub data: &'a Value,
}

/// Produces the content of body cells.
///
/// The result is escaped unless the column is marked as html.
pub trait CellTexter: Send + Sync + fmt::Debug {
    fn cell_text(&self, ctx: &PageContext<'_>, column: &ColumnBase, info: &CellInfo<'_>) -> String;

    /// Kind tag and data for page state. Inline texters that return `None`
    /// cannot be serialized.
    fn persisted(&self) -> Option<Persisted> {
        None
    }
}

/// Produces the content of header or footer cells.
pub trait HeaderTexter: Send + Sync + fmt::Debug {
    fn header_text(&self, ctx: &PageContext<'_>, column: &ColumnBase, row: usize, col: usize)
    -> String;

    fn persisted(&self) -> Option<Persisted> {
        None
    }
}

/// Adds attributes to body cells.
pub trait CellStyler: Send + Sync + fmt::Debug {
    fn cell_attributes(
        &self,
        ctx: &PageContext<'_>,
        column: &ColumnBase,
        info: &CellInfo<'_>,
    ) -> Attributes;

    fn persisted(&self) -> Option<Persisted> {
        None
    }
}

/// Adds attributes to table rows. Header and footer rows receive
/// [`Value::Null`] as data.
pub trait RowStyler: Send + Sync + fmt::Debug {
    fn row_attributes(&self, ctx: &PageContext<'_>, row: usize, data: &Value) -> Attributes;

    fn persisted(&self) -> Option<Persisted> {
        None
    }
}

/// Reference to a texter or styler.
pub enum ObjectRef<T: ?Sized> {
    /// Another control of the page, by ID.
    Control(String),
    /// An object held by the referencing control.
    Inline(Arc<T>),
}

impl<T: ?Sized> Clone for ObjectRef<T> {
    fn clone(&self) -> Self {
        match self {
            ObjectRef::Control(id) => ObjectRef::Control(id.clone()),
            ObjectRef::Inline(object) => ObjectRef::Inline(Arc::clone(object)),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ObjectRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Control(id) => f.debug_tuple("Control").field(id).finish(),
            ObjectRef::Inline(object) => f.debug_tuple("Inline").field(object).finish(),
        }
    }
}

/// Page-state form of an [`ObjectRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ref", rename_all = "camelCase")]
pub enum EncodedRef {
    Control { id: String },
    Inline(Persisted),
}

/// Trait objects that can live inline in an [`ObjectRef`].
pub trait InlineObject {
    /// Human-readable name used in errors.
    const NAME: &'static str;

    fn persisted(&self) -> Option<Persisted>;

    fn decode(registry: &TypeRegistry, persisted: Persisted) -> Result<Arc<Self>>;
}

impl InlineObject for dyn CellTexter {
    const NAME: &'static str = "cell texter";

    fn persisted(&self) -> Option<Persisted> {
        CellTexter::persisted(self)
    }

    fn decode(registry: &TypeRegistry, persisted: Persisted) -> Result<Arc<Self>> {
        registry.decode_cell_texter(persisted)
    }
}

impl InlineObject for dyn HeaderTexter {
    const NAME: &'static str = "header texter";

    fn persisted(&self) -> Option<Persisted> {
        HeaderTexter::persisted(self)
    }

    fn decode(registry: &TypeRegistry, persisted: Persisted) -> Result<Arc<Self>> {
        registry.decode_header_texter(persisted)
    }
}

impl InlineObject for dyn CellStyler {
    const NAME: &'static str = "cell styler";

    fn persisted(&self) -> Option<Persisted> {
        CellStyler::persisted(self)
    }

    fn decode(registry: &TypeRegistry, persisted: Persisted) -> Result<Arc<Self>> {
        registry.decode_cell_styler(persisted)
    }
}

impl InlineObject for dyn RowStyler {
    const NAME: &'static str = "row styler";

    fn persisted(&self) -> Option<Persisted> {
        RowStyler::persisted(self)
    }

    fn decode(registry: &TypeRegistry, persisted: Persisted) -> Result<Arc<Self>> {
        registry.decode_row_styler(persisted)
    }
}

impl<T: ?Sized> ObjectRef<T> {
    /// The referenced control ID, for control references.
    pub fn control_id(&self) -> Option<&str> {
        match self {
            ObjectRef::Control(id) => Some(id),
            ObjectRef::Inline(_) => None,
        }
    }

    /// Check that a control reference still resolves.
    pub fn verify(&self, ctx: &PageContext<'_>, owner: &str) -> Result<()> {
        match self {
            ObjectRef::Control(id) if !ctx.contains_control(id) => {
                Err(TabulaError::stale_state(owner, id.as_str()))
            }
            _ => Ok(()),
        }
    }
}

impl<T: ?Sized + InlineObject> ObjectRef<T> {
    /// Encode for page state.
    pub fn encode(&self) -> Result<EncodedRef> {
        match self {
            ObjectRef::Control(id) => Ok(EncodedRef::Control { id: id.clone() }),
            ObjectRef::Inline(object) => object.persisted().map(EncodedRef::Inline).ok_or_else(|| {
                TabulaError::Encoding(<serde_json::Error as serde::ser::Error>::custom(format!(
                    "inline {} has no persisted form",
                    T::NAME
                )))
            }),
        }
    }

    /// Rebuild from page state.
    pub fn decode(encoded: EncodedRef, registry: &TypeRegistry) -> Result<Self> {
        match encoded {
            EncodedRef::Control { id } => Ok(ObjectRef::Control(id)),
            EncodedRef::Inline(persisted) => T::decode(registry, persisted).map(ObjectRef::Inline),
        }
    }
}

fn unresolved(owner: &str, id: &str, what: &str) -> TabulaError {
    TabulaError::misconfigured(owner, format!("{what} control '{id}' is not on the page"))
}

impl ObjectRef<dyn CellTexter> {
    pub(crate) fn cell_text(
        &self,
        ctx: &PageContext<'_>,
        column: &ColumnBase,
        info: &CellInfo<'_>,
    ) -> Result<String> {
        match self {
            ObjectRef::Inline(texter) => Ok(texter.cell_text(ctx, column, info)),
            ObjectRef::Control(id) => ctx
                .control(id)
                .and_then(|c| c.as_cell_texter())
                .map(|texter| texter.cell_text(ctx, column, info))
                .ok_or_else(|| unresolved(column.id(), id, "cell texter")),
        }
    }
}

impl ObjectRef<dyn HeaderTexter> {
    pub(crate) fn header_text(
        &self,
        ctx: &PageContext<'_>,
        column: &ColumnBase,
        row: usize,
        col: usize,
    ) -> Result<String> {
        match self {
            ObjectRef::Inline(texter) => Ok(texter.header_text(ctx, column, row, col)),
            ObjectRef::Control(id) => ctx
                .control(id)
                .and_then(|c| c.as_header_texter())
                .map(|texter| texter.header_text(ctx, column, row, col))
                .ok_or_else(|| unresolved(column.id(), id, "header texter")),
        }
    }
}

impl ObjectRef<dyn CellStyler> {
    pub(crate) fn cell_attributes(
        &self,
        ctx: &PageContext<'_>,
        column: &ColumnBase,
        info: &CellInfo<'_>,
    ) -> Result<Attributes> {
        match self {
            ObjectRef::Inline(styler) => Ok(styler.cell_attributes(ctx, column, info)),
            ObjectRef::Control(id) => ctx
                .control(id)
                .and_then(|c| c.as_cell_styler())
                .map(|styler| styler.cell_attributes(ctx, column, info))
                .ok_or_else(|| unresolved(column.id(), id, "cell styler")),
        }
    }
}

impl ObjectRef<dyn RowStyler> {
    pub(crate) fn row_attributes(
        &self,
        ctx: &PageContext<'_>,
        table_id: &str,
        row: usize,
        data: &Value,
    ) -> Result<Attributes> {
        match self {
            ObjectRef::Inline(styler) => Ok(styler.row_attributes(ctx, row, data)),
            ObjectRef::Control(id) => ctx
                .control(id)
                .and_then(|c| c.as_row_styler())
                .map(|styler| styler.row_attributes(ctx, row, data))
                .ok_or_else(|| unresolved(table_id, id, "row styler")),
        }
    }
}

/// Fills `{key}` placeholders from the row. `{#}` is the 1-based row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTexter {
    template: String,
}

impl TemplateTexter {
    pub const KIND: &'static str = "template";

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    fn render(&self, row: usize, data: &Value) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    if key == "#" {
                        out.push_str(&(row + 1).to_string());
                    } else if let Some(value) = data.get(key) {
                        out.push_str(&value.to_string());
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl CellTexter for TemplateTexter {
    fn cell_text(
        &self,
        _ctx: &PageContext<'_>,
        _column: &ColumnBase,
        info: &CellInfo<'_>,
    ) -> String {
        self.render(info.row, info.data)
    }

    fn persisted(&self) -> Option<Persisted> {
        Persisted::of(Self::KIND, self)
    }
}

/// Alternating row classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripedRowStyler {
    even_class: String,
    odd_class: String,
}

impl StripedRowStyler {
    pub const KIND: &'static str = "striped";

    pub fn new(even_class: impl Into<String>, odd_class: impl Into<String>) -> Self {
        Self {
            even_class: even_class.into(),
            odd_class: odd_class.into(),
        }
    }
}

impl RowStyler for StripedRowStyler {
    fn row_attributes(&self, _ctx: &PageContext<'_>, row: usize, data: &Value) -> Attributes {
        let mut attributes = Attributes::new();
        if !data.is_null() {
            let class = if row % 2 == 0 { &self.even_class } else { &self.odd_class };
            attributes.add_class(class);
        }
        attributes
    }

    fn persisted(&self) -> Option<Persisted> {
        Persisted::of(Self::KIND, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_render() {
        let texter = TemplateTexter::new("{first} {last} (#{#}) {missing}{");
        let row = Value::map([("first", "Ada"), ("last", "Lovelace")]);
        assert_eq!(texter.render(4, &row), "Ada Lovelace (#5) {");
    }

    #[test]
    fn test_encoded_ref_shape() {
        let encoded = EncodedRef::Control { id: "texter1".into() };
        assert_eq!(
            serde_json::to_string(&encoded).unwrap(),
            r#"{"ref":"control","id":"texter1"}"#
        );

        let inline: ObjectRef<dyn CellTexter> =
            ObjectRef::Inline(Arc::new(TemplateTexter::new("{a}")));
        let encoded = inline.encode().unwrap();
        assert_eq!(
            serde_json::to_string(&encoded).unwrap(),
            r#"{"ref":"inline","kind":"template","data":{"template":"{a}"}}"#
        );
    }

    #[derive(Debug)]
    struct Unpersisted;

    impl CellTexter for Unpersisted {
        fn cell_text(&self, _: &PageContext<'_>, _: &ColumnBase, _: &CellInfo<'_>) -> String {
            String::new()
        }
    }

    #[test]
    fn test_unpersisted_inline_fails_to_encode() {
        let inline: ObjectRef<dyn CellTexter> = ObjectRef::Inline(Arc::new(Unpersisted));
        assert!(matches!(inline.encode(), Err(TabulaError::Encoding(_))));
    }

    #[test]
    fn test_decode_round_trip() {
        let registry = TypeRegistry::default();
        let original: ObjectRef<dyn RowStyler> =
            ObjectRef::Inline(Arc::new(StripedRowStyler::new("even", "odd")));
        let decoded =
            ObjectRef::<dyn RowStyler>::decode(original.encode().unwrap(), &registry).unwrap();
        assert_eq!(decoded.encode().unwrap(), original.encode().unwrap());
    }
}
