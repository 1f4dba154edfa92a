//! Pager toolbars for paged controls.
//!
//! A [`DataPager`] draws previous/next buttons around a window of numbered
//! page buttons (the bunch, see [`calc_bunch`]) and drives the page number
//! of the paged control it is attached to. Any number of pagers may be
//! attached to one paged control; a page click redraws all of them.

use std::any::Any;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{Result, Signal, TabulaConfig, TabulaError};

use crate::control::{Control, ControlArena, ControlBase, DecodeContext, PageContext, StateMap};
use crate::html::{Attributes, escape_html, render_tag};
use crate::paging::{MIN_PAGE_BUTTONS, PagedControl, calc_bunch};
use crate::request::{ActionParams, events};

/// Renders buttons whose clicks the client runtime reports as an action of
/// another control, carrying the button's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonProxy {
    control_id: String,
    action: String,
    #[serde(default)]
    attributes: Attributes,
}

impl ButtonProxy {
    pub fn new(control_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            action: action.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Attributes added to every button of the proxy.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn button_attributes(&self, value: &str) -> Attributes {
        let mut attributes = Attributes::new()
            .with("type", "button")
            .with("data-gr-proxy", self.control_id.as_str())
            .with("data-gr-action", self.action.as_str())
            .with("data-gr-value", value);
        attributes.merge(&self.attributes);
        attributes
    }

    /// A `<button>` whose click carries `value`. `label_html` is not escaped.
    pub fn button_html(&self, label_html: &str, value: &str, extra: &Attributes) -> String {
        let mut attributes = self.button_attributes(value);
        attributes.merge(extra);
        render_tag("button", &attributes, label_html)
    }

    /// The action a click on the button with `value` produces.
    pub fn action_for(&self, value: &str) -> ActionParams {
        ActionParams::new(self.control_id.as_str(), self.action.as_str()).with_value(value)
    }
}

/// A previous / numbered pages / next toolbar for a paged control.
///
/// The paged control must be on the page before the pager is added; adding
/// the pager registers it with the paged control.
///
/// ```
/// use horizon_tabula::{DataPager, Page, PagedTable, RequestContext, TabulaConfig, Value};
///
/// let config = TabulaConfig::default();
/// let mut page = Page::new("report", config.clone());
/// let mut table = PagedTable::new("people", &config);
/// table.set_data((0..25).map(|i| Value::map([("n", i)])).collect());
/// page.add_control(table).unwrap();
/// page.add_control(DataPager::new("pager", "people", &config)).unwrap();
///
/// let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
/// assert!(html.contains(">3</button>"));
/// ```
#[derive(Debug)]
pub struct DataPager {
    base: ControlBase,
    paged_control_id: String,
    max_page_buttons: usize,
    object_name: String,
    object_name_plural: String,
    prev_label: String,
    next_label: String,
    ellipsis_html: String,
    pager_tag: String,
    show_summary: bool,
    proxy: ButtonProxy,

    /// Emitted with the new page number after a page click.
    pub page_changed: Signal<usize>,
}

impl DataPager {
    pub const KIND: &'static str = "datapager";

    pub fn new(
        id: impl Into<String>,
        paged_control_id: impl Into<String>,
        config: &TabulaConfig,
    ) -> Self {
        let mut base = ControlBase::new(id);
        base.on(events::PAGE_CLICK);
        let proxy = ButtonProxy::new(base.id(), events::PAGE_CLICK);
        Self {
            base,
            paged_control_id: paged_control_id.into(),
            max_page_buttons: config.max_page_buttons,
            object_name: "item".into(),
            object_name_plural: "items".into(),
            prev_label: config.prev_label.clone(),
            next_label: config.next_label.clone(),
            ellipsis_html: config.ellipsis_html.clone(),
            pager_tag: config.pager_tag.clone(),
            show_summary: false,
            proxy,
            page_changed: Signal::new(),
        }
    }

    pub fn paged_control_id(&self) -> &str {
        &self.paged_control_id
    }

    pub fn max_page_buttons(&self) -> usize {
        self.max_page_buttons
    }

    /// Maximum number of buttons between previous and next, counting the
    /// first/last page buttons and ellipses. At least [`MIN_PAGE_BUTTONS`].
    pub fn set_max_page_buttons(&mut self, count: usize) {
        self.max_page_buttons = count.max(MIN_PAGE_BUTTONS);
    }

    /// Names of the paged objects used in the summary line.
    pub fn set_object_names(&mut self, singular: impl Into<String>, plural: impl Into<String>) {
        self.object_name = singular.into();
        self.object_name_plural = plural.into();
    }

    pub fn set_labels(&mut self, prev: impl Into<String>, next: impl Into<String>) {
        self.prev_label = prev.into();
        self.next_label = next.into();
    }

    /// Show "Showing 11-20 of 95 items" after the buttons.
    pub fn set_show_summary(&mut self, show: bool) {
        self.show_summary = show;
    }

    pub fn button_proxy(&self) -> &ButtonProxy {
        &self.proxy
    }

    pub fn button_proxy_mut(&mut self) -> &mut ButtonProxy {
        &mut self.proxy
    }

    fn paging<'c>(&self, ctx: &'c PageContext<'_>) -> Result<&'c PagedControl> {
        ctx.paged_control(&self.paged_control_id).ok_or_else(|| {
            TabulaError::misconfigured(
                self.base.id(),
                format!("'{}' is not a paged control on this page", self.paged_control_id),
            )
        })
    }

    fn ellipsis(&self) -> String {
        let attributes = Attributes::new()
            .with("type", "button")
            .with("class", "gr-ellipsis")
            .with_flag("disabled");
        render_tag("button", &attributes, &self.ellipsis_html)
    }

    fn page_button(&self, page: usize, current: usize) -> String {
        let extra = if page == current {
            Attributes::new()
                .with("role", "tab")
                .with("class", "selected")
                .with("aria-selected", "true")
                .with("tabindex", "0")
        } else {
            Attributes::new()
                .with("role", "tab")
                .with("aria-selected", "false")
                .with("tabindex", "-1")
        };
        self.proxy.button_html(&page.to_string(), &page.to_string(), &extra)
    }

    fn step_button(&self, label: &str, class: &str, target: usize, disabled: bool) -> String {
        let mut extra = Attributes::new().with("class", class);
        if disabled {
            extra.set_flag("disabled");
        }
        self.proxy.button_html(&escape_html(label), &target.to_string(), &extra)
    }

    fn summary(&self, paging: &PagedControl) -> String {
        let total = paging.total_items();
        let text = if total == 0 {
            format!("No {}", self.object_name_plural)
        } else {
            let (start, end) = paging.slice_offsets();
            let name = if total == 1 {
                &self.object_name
            } else {
                &self.object_name_plural
            };
            format!("Showing {}-{} of {} {}", start + 1, end, total, name)
        };
        let attributes = Attributes::new().with("class", "gr-pager-summary");
        render_tag("span", &attributes, &escape_html(&text))
    }

    fn render_buttons(&self, paging: &PagedControl) -> String {
        let page_count = paging.calc_page_count();
        let last = page_count.max(1);
        let current = paging.page_num().clamp(1, last);
        let bunch = calc_bunch(page_count, current, self.max_page_buttons);

        let prev = current.saturating_sub(1).max(1);
        let mut html = self.step_button(&self.prev_label, "gr-prev", prev, current == 1);
        if bunch.start != 1 {
            html.push_str(&self.page_button(1, current));
            html.push_str(&self.ellipsis());
        }
        for page in bunch.pages() {
            html.push_str(&self.page_button(page, current));
        }
        if bunch.end != last {
            html.push_str(&self.ellipsis());
            html.push_str(&self.page_button(last, current));
        }
        let next = (current + 1).min(last);
        html.push_str(&self.step_button(&self.next_label, "gr-next", next, current == last));
        html
    }

    fn page_click(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        let value = params.value_str();
        let requested: usize = value.trim().parse().map_err(|_| {
            TabulaError::bad_data(format!(
                "page click on '{}' with value '{value}'",
                self.base.id()
            ))
        })?;

        let page_count = self.paging(ctx)?.calc_page_count();
        let page = requested.clamp(1, page_count.max(1));
        let paged_id = self.paged_control_id.clone();
        ctx.with_control(&paged_id, |control, _| {
            if let Some(paging) = control.as_data_owner_mut().and_then(|o| o.paged_control_mut()) {
                paging.set_page_num(page);
            }
        })
        .ok_or_else(|| TabulaError::bad_id(paged_id.as_str(), "paged control is not available"))?;

        tracing::debug!(target: "horizon_tabula::pager", pager = %self.base.id(), paged = %paged_id, page, "page clicked");
        let pagers = self.paging(ctx)?.data_pager_ids().to_vec();
        ctx.refresh(&paged_id);
        for pager in &pagers {
            ctx.refresh(pager);
        }
        self.page_changed.emit(page);
        Ok(())
    }

    fn encode(&self) -> DataPagerState {
        DataPagerState {
            base: self.base.clone(),
            paged_control_id: self.paged_control_id.clone(),
            max_page_buttons: self.max_page_buttons,
            object_name: self.object_name.clone(),
            object_name_plural: self.object_name_plural.clone(),
            prev_label: self.prev_label.clone(),
            next_label: self.next_label.clone(),
            ellipsis_html: self.ellipsis_html.clone(),
            pager_tag: self.pager_tag.clone(),
            show_summary: self.show_summary,
            proxy: self.proxy.clone(),
        }
    }

    pub fn decode_boxed(
        data: serde_json::Value,
        _ctx: &DecodeContext<'_>,
    ) -> Result<Box<dyn Control>> {
        let state: DataPagerState = serde_json::from_value(data)?;
        Ok(Box::new(Self {
            base: state.base,
            paged_control_id: state.paged_control_id,
            max_page_buttons: state.max_page_buttons,
            object_name: state.object_name,
            object_name_plural: state.object_name_plural,
            prev_label: state.prev_label,
            next_label: state.next_label,
            ellipsis_html: state.ellipsis_html,
            pager_tag: state.pager_tag,
            show_summary: state.show_summary,
            proxy: state.proxy,
            page_changed: Signal::new(),
        }))
    }
}

impl Control for DataPager {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn attach(&mut self, controls: &mut ControlArena) -> Result<()> {
        let paging = controls
            .get_mut(&self.paged_control_id)
            .and_then(|control| control.as_data_owner_mut())
            .and_then(|owner| owner.paged_control_mut());
        match paging {
            Some(paging) => {
                paging.add_data_pager(self.base.id());
                Ok(())
            }
            None => Err(TabulaError::misconfigured(
                self.base.id(),
                format!("'{}' is not a paged control on this page", self.paged_control_id),
            )),
        }
    }

    fn pre_render(&mut self, ctx: &mut PageContext<'_>) -> Result<()> {
        let paged_id = self.paged_control_id.as_str();
        // A busy paged control is drawing this pager itself and has its data.
        if ctx.was_drawn(paged_id) || ctx.control(paged_id).is_none() {
            return Ok(());
        }
        match ctx.load_data(paged_id) {
            Err(err) if err.is_provider_failure() => {
                tracing::warn!(target: "horizon_tabula::pager", pager = %self.base.id(), paged = %paged_id, error = %err, "pager drawn without data");
                Ok(())
            }
            other => other,
        }
    }

    fn draw(&mut self, ctx: &mut PageContext<'_>) -> Result<String> {
        let paging = self.paging(ctx)?;
        let mut inner = self.render_buttons(paging);
        if self.show_summary {
            inner.push_str(&self.summary(paging));
        }
        let mut attributes = self.base.drawing_attributes("datapager");
        attributes.set("role", "tablist");
        Ok(render_tag(&self.pager_tag, &attributes, &inner))
    }

    fn do_action(&mut self, ctx: &mut PageContext<'_>, params: &ActionParams) -> Result<()> {
        if params.action == events::PAGE_CLICK {
            return self.page_click(ctx, params);
        }
        tracing::debug!(target: "horizon_tabula::pager", pager = %self.base.id(), action = %params.action, "unhandled action");
        Ok(())
    }

    fn marshal_state(&self, ctx: &PageContext<'_>, state: &mut StateMap) {
        if let Some(paging) = ctx.paged_control(&self.paged_control_id) {
            state.insert("pageNum".into(), paging.page_num().into());
        }
    }

    fn unmarshal_state(&mut self, ctx: &mut PageContext<'_>, state: &StateMap) {
        let Some(page) = state.get("pageNum").and_then(serde_json::Value::as_u64) else {
            return;
        };
        ctx.with_control(&self.paged_control_id, |control, _| {
            if let Some(paging) = control.as_data_owner_mut().and_then(|o| o.paged_control_mut()) {
                paging.set_page_num(page as usize);
            }
        });
    }

    fn serialize(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.encode())?)
    }

    fn restore(&mut self, ctx: &PageContext<'_>) -> Result<()> {
        if ctx.paged_control(&self.paged_control_id).is_none() {
            return Err(TabulaError::stale_state(self.base.id(), self.paged_control_id.as_str()));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Page-state form of a [`DataPager`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPagerState {
    pub base: ControlBase,
    #[serde(rename = "pagedControlID")]
    pub paged_control_id: String,
    pub max_page_buttons: usize,
    pub object_name: String,
    pub object_name_plural: String,
    pub prev_label: String,
    pub next_label: String,
    pub ellipsis_html: String,
    pub pager_tag: String,
    #[serde(default)]
    pub show_summary: bool,
    pub proxy: ButtonProxy,
}

static_assertions::assert_impl_all!(DataPager: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Page;
    use crate::request::RequestContext;
    use crate::table::PagedTable;
    use horizon_tabula_core::Value;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn page(total: usize, config: TabulaConfig) -> Page {
        let mut page = Page::new("p", config.clone());
        let mut table = PagedTable::new("t", &config);
        table.set_data((0..total).map(|i| Value::map([("n", i)])).collect());
        page.add_control(table).unwrap();
        page.add_control(DataPager::new("pager", "t", &config)).unwrap();
        page
    }

    /// Button labels in order, `...` for ellipses.
    fn labels(html: &str) -> Vec<String> {
        html.split("<button")
            .skip(1)
            .map(|b| {
                let label = &b[b.find('>').unwrap() + 1..b.find("</button>").unwrap()];
                if label == "&hellip;" { "...".to_string() } else { label.to_string() }
            })
            .collect()
    }

    #[test]
    fn test_button_proxy() {
        let mut proxy = ButtonProxy::new("pager", events::PAGE_CLICK);
        proxy.attributes_mut().add_class("btn");
        assert_eq!(
            proxy.button_html("2", "2", &Attributes::new()),
            "<button type=\"button\" data-gr-proxy=\"pager\" data-gr-action=\"PageClick\" data-gr-value=\"2\" class=\"btn\">2</button>"
        );
        let action = proxy.action_for("7");
        assert_eq!(action.control_id, "pager");
        assert_eq!(action.value_str(), "7");
    }

    #[test]
    fn test_attach_requires_paged_control() {
        let config = TabulaConfig::default();
        let mut page = Page::new("p", config.clone());
        let err = page
            .add_control(DataPager::new("pager", "missing", &config))
            .unwrap_err();
        assert!(matches!(err, TabulaError::Misconfiguration { .. }));

        let page = page_with_pager();
        let paging = page.control::<PagedTable>("t").unwrap().paging();
        assert_eq!(paging.data_pager_ids(), ["pager"]);
    }

    fn page_with_pager() -> Page {
        page(5, TabulaConfig::default())
    }

    #[test]
    fn test_single_page() {
        let mut page = page_with_pager();
        let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
        assert!(html.starts_with("<div id=\"pager\" data-grctl=\"datapager\""));
        assert!(html.contains("role=\"tablist\""));
        assert_eq!(labels(&html), ["Previous", "1", "Next"]);
        assert!(html.contains("class=\"gr-prev\" disabled>"));
        assert!(html.contains("class=\"gr-next\" disabled>"));
    }

    #[test]
    fn test_max_page_buttons_floor() {
        let mut page = page(200, TabulaConfig::default());
        page.control_mut::<PagedTable>("t").unwrap().set_page_num(10);
        let pager = page.control_mut::<DataPager>("pager").unwrap();
        pager.set_max_page_buttons(2);
        assert_eq!(pager.max_page_buttons(), MIN_PAGE_BUTTONS);

        let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
        assert_eq!(labels(&html), ["Previous", "1", "...", "10", "...", "20", "Next"]);
    }

    #[test]
    fn test_selected_button() {
        let mut page = page(30, TabulaConfig::default());
        page.control_mut::<PagedTable>("t").unwrap().set_page_num(2);
        let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
        assert!(html.contains(
            "data-gr-value=\"2\" role=\"tab\" class=\"selected\" aria-selected=\"true\" tabindex=\"0\">2</button>"
        ));
        assert!(html.contains(
            "data-gr-value=\"3\" role=\"tab\" aria-selected=\"false\" tabindex=\"-1\">3</button>"
        ));
        assert!(!html.contains("disabled>Previous"));
    }

    #[test]
    fn test_summary() {
        let mut page = page(95, TabulaConfig::default());
        {
            let pager = page.control_mut::<DataPager>("pager").unwrap();
            pager.set_show_summary(true);
            pager.set_object_names("person", "people");
        }
        page.control_mut::<PagedTable>("t").unwrap().set_page_num(2);
        let html = page.draw_control(&RequestContext::new(), "pager").unwrap();
        assert!(
            html.contains("<span class=\"gr-pager-summary\">Showing 11-20 of 95 people</span>")
        );

        let mut empty = page_with_total(0);
        empty.control_mut::<DataPager>("pager").unwrap().set_show_summary(true);
        let html = empty.draw_control(&RequestContext::new(), "pager").unwrap();
        assert!(html.contains(">No items</span>"));
    }

    fn page_with_total(total: usize) -> Page {
        page(total, TabulaConfig::default())
    }

    #[test]
    fn test_page_click_clamps_and_refreshes() {
        let mut page = page(25, TabulaConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        page.control::<DataPager>("pager")
            .unwrap()
            .page_changed
            .connect(move |p| sink.lock().push(*p));

        let request = RequestContext::ajax().with_action(
            page.control::<DataPager>("pager").unwrap().button_proxy().action_for("9"),
        );
        page.handle_request(&request).unwrap();

        assert_eq!(page.control::<PagedTable>("t").unwrap().page_num(), 3);
        assert_eq!(page.refresh_ids(), ["t", "pager"]);
        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_page_click_rejects_garbage() {
        let mut page = page_with_pager();
        let request = RequestContext::ajax()
            .with_action(ActionParams::new("pager", events::PAGE_CLICK).with_value("two"));
        let err = page.handle_request(&request).unwrap_err();
        assert!(matches!(err, TabulaError::BadData(_)));
    }

    #[test]
    fn test_state_keyed_by_pager() {
        let mut page = page(40, TabulaConfig::default());
        page.control_mut::<PagedTable>("t").unwrap().set_page_num(3);
        let saved = page.save_state();
        assert_eq!(saved["pager"]["pageNum"], 3);

        let mut only_pager = saved.clone();
        only_pager.remove("t");
        page.control_mut::<PagedTable>("t").unwrap().set_page_num(1);
        page.restore_state(&only_pager);
        assert_eq!(page.control::<PagedTable>("t").unwrap().page_num(), 3);
    }
}
