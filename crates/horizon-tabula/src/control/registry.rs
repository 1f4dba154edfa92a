//! Kind tag to decoder mapping used when page state is read back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use horizon_tabula_core::{Result, TabulaConfig, TabulaError};

use super::Control;
use crate::column::{
    CellStyler, CellTexter, CheckboxProvider, HeaderTexter, KeyCheckboxProvider, Persisted,
    RowStyler, StripedRowStyler, TemplateTexter,
};
use crate::pager::DataPager;
use crate::table::{PagedTable, SelectTable, Table};

/// What a control decoder gets besides its data.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub registry: &'a TypeRegistry,
    pub config: &'a TabulaConfig,
}

/// Rebuilds a control from its serialized data.
pub type ControlDecoder = fn(serde_json::Value, &DecodeContext<'_>) -> Result<Box<dyn Control>>;

/// Decoders for every kind tag that can appear in page state.
///
/// The built-in controls, texters, stylers and checkbox providers are
/// registered by [`TypeRegistry::new`]. Applications register their own
/// kinds before reading page state back.
pub struct TypeRegistry {
    controls: HashMap<String, ControlDecoder>,
    cell_texters: HashMap<String, fn(serde_json::Value) -> Result<Arc<dyn CellTexter>>>,
    header_texters: HashMap<String, fn(serde_json::Value) -> Result<Arc<dyn HeaderTexter>>>,
    cell_stylers: HashMap<String, fn(serde_json::Value) -> Result<Arc<dyn CellStyler>>>,
    row_stylers: HashMap<String, fn(serde_json::Value) -> Result<Arc<dyn RowStyler>>>,
    checkbox_providers: HashMap<String, fn(serde_json::Value) -> Result<Arc<dyn CheckboxProvider>>>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn kinds<V>(map: &HashMap<String, V>) -> Vec<&str> {
            let mut kinds: Vec<&str> = map.keys().map(String::as_str).collect();
            kinds.sort_unstable();
            kinds
        }
        f.debug_struct("TypeRegistry")
            .field("controls", &kinds(&self.controls))
            .field("cell_texters", &kinds(&self.cell_texters))
            .field("header_texters", &kinds(&self.header_texters))
            .field("cell_stylers", &kinds(&self.cell_stylers))
            .field("row_stylers", &kinds(&self.row_stylers))
            .field("checkbox_providers", &kinds(&self.checkbox_providers))
            .finish()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_texter_from<T>(data: serde_json::Value) -> Result<Arc<dyn CellTexter>>
where
    T: CellTexter + DeserializeOwned + 'static,
{
    let texter: Arc<dyn CellTexter> = Arc::new(serde_json::from_value::<T>(data)?);
    Ok(texter)
}

fn header_texter_from<T>(data: serde_json::Value) -> Result<Arc<dyn HeaderTexter>>
where
    T: HeaderTexter + DeserializeOwned + 'static,
{
    let texter: Arc<dyn HeaderTexter> = Arc::new(serde_json::from_value::<T>(data)?);
    Ok(texter)
}

fn cell_styler_from<T>(data: serde_json::Value) -> Result<Arc<dyn CellStyler>>
where
    T: CellStyler + DeserializeOwned + 'static,
{
    let styler: Arc<dyn CellStyler> = Arc::new(serde_json::from_value::<T>(data)?);
    Ok(styler)
}

fn row_styler_from<T>(data: serde_json::Value) -> Result<Arc<dyn RowStyler>>
where
    T: RowStyler + DeserializeOwned + 'static,
{
    let styler: Arc<dyn RowStyler> = Arc::new(serde_json::from_value::<T>(data)?);
    Ok(styler)
}

fn checkbox_provider_from<T>(data: serde_json::Value) -> Result<Arc<dyn CheckboxProvider>>
where
    T: CheckboxProvider + DeserializeOwned + 'static,
{
    let provider: Arc<dyn CheckboxProvider> = Arc::new(serde_json::from_value::<T>(data)?);
    Ok(provider)
}

fn decode_with<T: ?Sized>(
    decoders: &HashMap<String, fn(serde_json::Value) -> Result<Arc<T>>>,
    what: &str,
    persisted: Persisted,
) -> Result<Arc<T>> {
    let decode = decoders.get(&persisted.kind).ok_or_else(|| {
        TabulaError::bad_data(format!("unknown {what} kind '{}'", persisted.kind))
    })?;
    decode(persisted.data)
}

impl TypeRegistry {
    /// A registry with the built-in kinds.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_control(Table::KIND, Table::decode_boxed);
        registry.register_control(PagedTable::KIND, PagedTable::decode_boxed);
        registry.register_control(SelectTable::KIND, SelectTable::decode_boxed);
        registry.register_control(DataPager::KIND, DataPager::decode_boxed);
        registry.register_cell_texter::<TemplateTexter>(TemplateTexter::KIND);
        registry.register_row_styler::<StripedRowStyler>(StripedRowStyler::KIND);
        registry.register_checkbox_provider::<KeyCheckboxProvider>(KeyCheckboxProvider::KIND);
        registry
    }

    /// A registry without any kinds.
    pub fn empty() -> Self {
        Self {
            controls: HashMap::new(),
            cell_texters: HashMap::new(),
            header_texters: HashMap::new(),
            cell_stylers: HashMap::new(),
            row_stylers: HashMap::new(),
            checkbox_providers: HashMap::new(),
        }
    }

    pub fn register_control(&mut self, kind: &str, decoder: ControlDecoder) {
        self.controls.insert(kind.to_string(), decoder);
    }

    pub fn register_cell_texter<T: CellTexter + DeserializeOwned + 'static>(&mut self, kind: &str) {
        self.cell_texters.insert(kind.to_string(), cell_texter_from::<T>);
    }

    pub fn register_header_texter<T: HeaderTexter + DeserializeOwned + 'static>(
        &mut self,
        kind: &str,
    ) {
        self.header_texters.insert(kind.to_string(), header_texter_from::<T>);
    }

    pub fn register_cell_styler<T: CellStyler + DeserializeOwned + 'static>(&mut self, kind: &str) {
        self.cell_stylers.insert(kind.to_string(), cell_styler_from::<T>);
    }

    pub fn register_row_styler<T: RowStyler + DeserializeOwned + 'static>(&mut self, kind: &str) {
        self.row_stylers.insert(kind.to_string(), row_styler_from::<T>);
    }

    pub fn register_checkbox_provider<T>(&mut self, kind: &str)
    where
        T: CheckboxProvider + DeserializeOwned + 'static,
    {
        self.checkbox_providers
            .insert(kind.to_string(), checkbox_provider_from::<T>);
    }

    pub fn has_control(&self, kind: &str) -> bool {
        self.controls.contains_key(kind)
    }

    pub fn decode_control(
        &self,
        kind: &str,
        data: serde_json::Value,
        ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn Control>> {
        let decode = self
            .controls
            .get(kind)
            .ok_or_else(|| TabulaError::bad_data(format!("unknown control kind '{kind}'")))?;
        tracing::trace!(target: "horizon_tabula::state", kind, "decoding control");
        decode(data, ctx)
    }

    pub fn decode_cell_texter(&self, persisted: Persisted) -> Result<Arc<dyn CellTexter>> {
        decode_with(&self.cell_texters, "cell texter", persisted)
    }

    pub fn decode_header_texter(&self, persisted: Persisted) -> Result<Arc<dyn HeaderTexter>> {
        decode_with(&self.header_texters, "header texter", persisted)
    }

    pub fn decode_cell_styler(&self, persisted: Persisted) -> Result<Arc<dyn CellStyler>> {
        decode_with(&self.cell_stylers, "cell styler", persisted)
    }

    pub fn decode_row_styler(&self, persisted: Persisted) -> Result<Arc<dyn RowStyler>> {
        decode_with(&self.row_stylers, "row styler", persisted)
    }

    pub fn decode_checkbox_provider(
        &self,
        persisted: Persisted,
    ) -> Result<Arc<dyn CheckboxProvider>> {
        decode_with(&self.checkbox_providers, "checkbox provider", persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = TypeRegistry::new();
        for kind in ["table", "pagedtable", "selecttable", "datapager"] {
            assert!(registry.has_control(kind), "{kind}");
        }
        assert!(!TypeRegistry::empty().has_control("table"));
    }

    #[test]
    fn test_unknown_kind() {
        let registry = TypeRegistry::new();
        let persisted = Persisted {
            kind: "sparkline".into(),
            data: serde_json::Value::Null,
        };
        let err = registry.decode_cell_texter(persisted).unwrap_err();
        assert!(matches!(err, TabulaError::BadData(_)));
    }

    #[test]
    fn test_decode_checkbox_provider() {
        let registry = TypeRegistry::new();
        let provider = KeyCheckboxProvider::new("id", "done").with_data_id("7");
        let decoded = registry
            .decode_checkbox_provider(provider.persisted().unwrap())
            .unwrap();
        assert_eq!(decoded.data_id(), "7");
    }
}
