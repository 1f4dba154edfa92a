//! Page state: serialize, deserialize and restore of whole control trees.

use std::any::Any;
use std::sync::Arc;

use horizon_tabula::column::{
    CellInfo, CellTexter, ColumnBase, KeyCheckboxProvider, StripedRowStyler, TemplateTexter,
};
use horizon_tabula::control::{ControlBase, DecodeContext};
use horizon_tabula::{
    ActionParams, CheckboxColumn, Column, Control, DataOwner, DataPager, MemoryStateStore,
    ObjectRef, Page, PageContext, PagedTable, RequestContext, SelectTable, TabulaConfig,
    TabulaError, TypeRegistry, Value, binder_fn, events,
};

fn trace_to_test_output() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("horizon_tabula=debug")
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

fn people() -> Vec<Value> {
    ["Ada", "Grace", "Linus", "Ken", "Barbara", "Edsger", "Donald"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Value::map([
                ("id", Value::from(format!("p{}", i + 1))),
                ("name", Value::from(*name)),
                ("age", Value::from(30 + i)),
                ("picked", Value::Bool(i % 3 == 0)),
            ])
        })
        .collect()
}

fn add_binders(page: &mut Page) {
    page.add_binder(
        "people",
        binder_fn(|_request, owner: &mut dyn DataOwner| {
            owner.set_paged_rows(people());
            Ok(())
        }),
    );
}

fn build_page(config: &TabulaConfig) -> Page {
    let mut page = Page::new("report", config.clone());

    let mut table = PagedTable::new("people", config);
    table.set_caption("Staff & friends");
    table.set_row_styler(ObjectRef::Inline(Arc::new(StripedRowStyler::new("even", "odd"))));
    table.add_column(Column::row_number("#").as_header()).unwrap();
    table.add_column(Column::key("name", "Name").with_id("name").sortable()).unwrap();
    table
        .add_column(Column::key("age", "Age").with_id("age").sortable().with_format("%d yrs"))
        .unwrap();
    table
        .add_column(Column::custom("Card", TemplateTexter::new("{name} ({age})")).with_id("card"))
        .unwrap();
    table
        .add_column(
            Column::checkbox(
                "Pick",
                CheckboxColumn::new(KeyCheckboxProvider::new("id", "picked").with_data_id("v1")),
            )
            .with_id("pick"),
        )
        .unwrap();
    table.set_data_provider("people");
    table.set_page_size(3);
    page.add_control(table).unwrap();
    page.add_control(DataPager::new("pager", "people", config)).unwrap();

    let mut select = SelectTable::new("picker", config);
    select.add_column(Column::key("name", "Name")).unwrap();
    select.set_data_provider("people");
    select.set_selected_id(Some("p2".into()));
    page.add_control(select).unwrap();

    add_binders(&mut page);
    page
}

fn interact(page: &mut Page) {
    let request = |action: ActionParams| RequestContext::ajax().with_action(action);
    page.draw(&RequestContext::new()).unwrap();
    page.handle_request(&request(ActionParams::new("people", events::TABLE_SORT).with_value("age")))
        .unwrap();
    page.handle_request(&request(ActionParams::new("people", events::TABLE_SORT).with_value("age")))
        .unwrap();
    page.handle_request(&request(ActionParams::new("pager", events::PAGE_CLICK).with_value("2")))
        .unwrap();
    page.handle_request(&request(
        ActionParams::new("people", events::CHECKBOX_COLUMN_CLICK)
            .with_column("pick")
            .with_value(Value::map([("id", Value::from("p2")), ("checked", Value::Bool(true))])),
    ))
    .unwrap();
}

#[test]
fn test_round_trip_is_observationally_equal() {
    let _tracing = trace_to_test_output();
    let config = TabulaConfig::default();
    let mut original = build_page(&config);
    interact(&mut original);

    let bytes = original.serialize().unwrap();
    let mut restored = Page::deserialize(&bytes, &TypeRegistry::new(), config.clone()).unwrap();
    add_binders(&mut restored);

    assert_eq!(restored.id(), "report");
    assert_eq!(restored.controls().ids(), original.controls().ids());

    let a = original.control::<PagedTable>("people").unwrap();
    let b = restored.control::<PagedTable>("people").unwrap();
    assert_eq!(a.page_num(), b.page_num());
    assert_eq!(a.paging().total_items(), b.paging().total_items());
    assert_eq!(a.paging().page_size(), 3);
    assert_eq!(b.paging().page_size(), 3);
    assert_eq!(b.paging().data_pager_ids(), ["pager"]);
    assert_eq!(a.sort_history().ids(), b.sort_history().ids());
    assert_eq!(
        a.column("age").unwrap().sort_direction(),
        b.column("age").unwrap().sort_direction()
    );
    assert_eq!(
        a.columns().iter().map(|c| c.id()).collect::<Vec<_>>(),
        b.columns().iter().map(|c| c.id()).collect::<Vec<_>>()
    );
    assert_eq!(
        a.column("pick").unwrap().as_checkbox().unwrap().changes(),
        b.column("pick").unwrap().as_checkbox().unwrap().changes()
    );
    assert_eq!(
        restored.control::<SelectTable>("picker").unwrap().selected_id(),
        Some("p2")
    );

    // A second round trip encodes to the same bytes.
    assert_eq!(restored.serialize().unwrap(), bytes);

    let request = RequestContext::new();
    assert_eq!(original.draw(&request).unwrap(), restored.draw(&request).unwrap());
}

#[test]
fn test_restored_page_keeps_working() {
    let config = TabulaConfig::default();
    let mut original = build_page(&config);
    interact(&mut original);
    let store = MemoryStateStore::new();
    original.save_to(&store).unwrap();

    let mut page = Page::load_from(&store, "report", &TypeRegistry::new(), config)
        .unwrap()
        .unwrap();
    add_binders(&mut page);

    let click = page
        .control::<DataPager>("pager")
        .unwrap()
        .button_proxy()
        .action_for("3");
    page.handle_request(&RequestContext::ajax().with_action(click))
        .unwrap();
    let refreshed = page.draw_refreshed(&RequestContext::ajax()).unwrap();
    assert_eq!(refreshed.len(), 2);
    assert!(refreshed[0].1.contains("<td>Donald</td>"));
    assert!(!refreshed[0].1.contains("<td>Ada</td>"));
}

#[test]
fn test_missing_paged_control_is_stale() {
    let config = TabulaConfig::default();
    let page = build_page(&config);
    let mut state: serde_json::Value = serde_json::from_slice(&page.serialize().unwrap()).unwrap();
    state["controls"]
        .as_array_mut()
        .unwrap()
        .retain(|control| control["id"] != "people");
    let bytes = serde_json::to_vec(&state).unwrap();

    let err = Page::deserialize(&bytes, &TypeRegistry::new(), config).unwrap_err();
    assert!(err.is_stale_state());
    assert!(matches!(
        err,
        TabulaError::StaleState { ref control, ref reference }
            if control == "pager" && reference == "people"
    ));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let config = TabulaConfig::default();
    let page = build_page(&config);
    let mut state: serde_json::Value = serde_json::from_slice(&page.serialize().unwrap()).unwrap();
    state["controls"][2]["kind"] = "mystery".into();
    let bytes = serde_json::to_vec(&state).unwrap();

    let err = Page::deserialize(&bytes, &TypeRegistry::new(), config).unwrap_err();
    assert!(matches!(err, TabulaError::BadData(_)));
}

#[test]
fn test_missing_store_entry() {
    let store = MemoryStateStore::new();
    let page =
        Page::load_from(&store, "nothing", &TypeRegistry::new(), TabulaConfig::default()).unwrap();
    assert!(page.is_none());
}

/// A page control that draws the `name` of each row in bold.
#[derive(Debug)]
struct Badge {
    base: ControlBase,
}

impl Badge {
    fn new(id: &str) -> Self {
        Self {
            base: ControlBase::new(id),
        }
    }

    fn decode(
        data: serde_json::Value,
        _ctx: &DecodeContext<'_>,
    ) -> horizon_tabula::Result<Box<dyn Control>> {
        Ok(Box::new(Self::new(data["id"].as_str().unwrap_or_default())))
    }
}

impl CellTexter for Badge {
    fn cell_text(
        &self,
        _ctx: &PageContext<'_>,
        _column: &ColumnBase,
        info: &CellInfo<'_>,
    ) -> String {
        let name = info.data.get("name").and_then(|v| v.as_str().map(str::to_string));
        format!("<b>{}</b>", name.unwrap_or_default())
    }
}

impl Control for Badge {
    fn base(&self) -> &ControlBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
    fn kind(&self) -> &'static str {
        "badge"
    }
    fn draw(&mut self, _ctx: &mut PageContext<'_>) -> horizon_tabula::Result<String> {
        Ok(String::new())
    }
    fn serialize(&self) -> horizon_tabula::Result<serde_json::Value> {
        Ok(serde_json::json!({ "id": self.base.id() }))
    }
    fn as_cell_texter(&self) -> Option<&dyn CellTexter> {
        Some(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn badge_page(config: &TabulaConfig) -> Page {
    let mut page = Page::new("badges", config.clone());
    page.add_control(Badge::new("badge")).unwrap();
    let mut table = PagedTable::new("t", config);
    table
        .add_column(Column::custom_control("Who", "badge").with_id("col").html())
        .unwrap();
    table.set_data(vec![Value::map([("name", "Ada")]), Value::map([("name", "Grace")])]);
    page.add_control(table).unwrap();
    page
}

fn badge_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register_control("badge", Badge::decode);
    registry
}

#[test]
fn test_control_cell_texter() {
    let config = TabulaConfig::default();
    let mut page = badge_page(&config);
    let html = page.draw_control(&RequestContext::new(), "t").unwrap();
    assert!(html.contains("<td><b>Ada</b></td>"));
    assert!(html.contains("<td><b>Grace</b></td>"));

    let bytes = page.serialize().unwrap();
    let mut restored = Page::deserialize(&bytes, &badge_registry(), config).unwrap();
    let table = restored.control_mut::<PagedTable>("t").unwrap();
    table.set_data(vec![Value::map([("name", "Linus")])]);
    let html = restored.draw_control(&RequestContext::new(), "t").unwrap();
    assert!(html.contains("<td><b>Linus</b></td>"));
}

#[test]
fn test_missing_texter_control_is_stale() {
    let config = TabulaConfig::default();
    let page = badge_page(&config);
    let mut state: serde_json::Value = serde_json::from_slice(&page.serialize().unwrap()).unwrap();
    state["controls"]
        .as_array_mut()
        .unwrap()
        .retain(|control| control["id"] != "badge");
    let bytes = serde_json::to_vec(&state).unwrap();

    let err = Page::deserialize(&bytes, &badge_registry(), config).unwrap_err();
    assert!(matches!(
        err,
        TabulaError::StaleState { ref control, ref reference }
            if control == "t.col" && reference == "badge"
    ));
}
