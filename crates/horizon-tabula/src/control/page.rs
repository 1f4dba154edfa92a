//! The page: an arena of controls plus the per-request plumbing.

use std::collections::{HashMap, HashSet};
use std::fmt;

use slotmap::{SlotMap, new_key_type};

use horizon_tabula_core::{PerfSpan, Result, TabulaConfig, TabulaError};

use super::registry::{DecodeContext, TypeRegistry};
use super::state::{ControlRecord, PageState, StateStore};
use super::{Control, PageTreeDebug, StateMap};
use crate::column::FormatContext;
use crate::data::{self, BinderRegistry, DataBinder, DataOwner};
use crate::paging::PagedControl;
use crate::request::RequestContext;
use crate::response::{JsCommand, ResponseCommands};

new_key_type! {
    /// Arena key of a control.
    pub struct ControlKey;
}

/// Controls of a page, addressable by ID.
///
/// A control that is currently handling a call is taken out of its slot, so
/// lookups made while it runs do not see it; [`contains`](Self::contains)
/// still reports it.
#[derive(Default)]
pub struct ControlArena {
    slots: SlotMap<ControlKey, Option<Box<dyn Control>>>,
    keys: HashMap<String, ControlKey>,
    order: Vec<String>,
}

impl fmt::Debug for ControlArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlArena").field("controls", &self.order).finish()
    }
}

impl ControlArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains_key(id)
    }

    /// Control IDs in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, id: &str) -> Option<&dyn Control> {
        let key = self.keys.get(id)?;
        self.slots.get(*key)?.as_deref()
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Control + 'static)> {
        let key = self.keys.get(id)?;
        self.slots.get_mut(*key)?.as_deref_mut()
    }

    /// Controls in insertion order, skipping any that are taken.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Control> {
        self.order.iter().filter_map(|id| self.get(id))
    }

    pub(crate) fn insert(&mut self, control: Box<dyn Control>) -> Result<ControlKey> {
        let id = control.id().to_string();
        if id.is_empty() {
            return Err(TabulaError::bad_id(id, "controls need an ID"));
        }
        if self.keys.contains_key(&id) {
            return Err(TabulaError::bad_id(id, "a control with this ID is already on the page"));
        }
        let key = self.slots.insert(Some(control));
        self.keys.insert(id.clone(), key);
        self.order.push(id);
        Ok(key)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Box<dyn Control>> {
        let key = self.keys.remove(id)?;
        self.order.retain(|i| i != id);
        self.slots.remove(key).flatten()
    }

    fn take(&mut self, id: &str) -> Option<(ControlKey, Box<dyn Control>)> {
        let key = *self.keys.get(id)?;
        let control = self.slots.get_mut(key)?.take()?;
        Some((key, control))
    }

    fn put_back(&mut self, key: ControlKey, control: Box<dyn Control>) {
        if let Some(slot) = self.slots.get_mut(key) {
            *slot = Some(control);
        }
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(&mut dyn Control)) {
        for slot in self.slots.values_mut() {
            if let Some(control) = slot.as_deref_mut() {
                f(control);
            }
        }
    }
}

/// Bookkeeping of the current request.
#[derive(Debug, Default)]
struct PassState {
    commands: ResponseCommands,
    refresh: Vec<String>,
    drawn: HashSet<String>,
    lent_paging: HashMap<String, PagedControl>,
}

/// What a control can reach while it handles a call.
pub struct PageContext<'a> {
    request: &'a RequestContext,
    config: &'a TabulaConfig,
    controls: &'a mut ControlArena,
    binders: &'a BinderRegistry,
    pass: &'a mut PassState,
}

impl fmt::Debug for PageContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("controls", &self.controls)
            .field("refresh", &self.pass.refresh)
            .finish_non_exhaustive()
    }
}

impl<'a> PageContext<'a> {
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    pub fn config(&self) -> &'a TabulaConfig {
        self.config
    }

    pub fn format_context(&self) -> FormatContext<'a> {
        FormatContext::new(self.config, self.request.timezone_offset())
    }

    /// Another control of the page.
    pub fn control(&self, id: &str) -> Option<&dyn Control> {
        self.controls.get(id)
    }

    pub fn contains_control(&self, id: &str) -> bool {
        self.controls.contains(id)
    }

    /// Page state of a paged control, including a busy one that lent it
    /// with [`with_lent_paging`](Self::with_lent_paging).
    pub fn paged_control(&self, id: &str) -> Option<&PagedControl> {
        match self.controls.get(id) {
            Some(control) => control.as_data_owner()?.paged_control(),
            None => self.pass.lent_paging.get(id),
        }
    }

    /// Run `f` with the page state of the busy control `owner` visible to
    /// the controls it draws, e.g. a pager in its caption.
    pub fn with_lent_paging<R>(
        &mut self,
        owner: &str,
        paging: &PagedControl,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.pass.lent_paging.insert(owner.to_string(), paging.clone());
        let result = f(self);
        self.pass.lent_paging.remove(owner);
        result
    }

    /// Run `f` on another control with a context of its own.
    ///
    /// Returns `None` when the control does not exist or is already busy
    /// further up the call stack.
    pub fn with_control<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut dyn Control, &mut PageContext<'_>) -> R,
    ) -> Option<R> {
        let (key, mut control) = self.controls.take(id)?;
        let result = {
            let mut ctx = PageContext {
                request: self.request,
                config: self.config,
                controls: &mut *self.controls,
                binders: self.binders,
                pass: &mut *self.pass,
            };
            f(control.as_mut(), &mut ctx)
        };
        self.controls.put_back(key, control);
        Some(result)
    }

    /// Load the data of another control through its binder.
    pub fn load_data(&mut self, id: &str) -> Result<()> {
        let (request, binders) = (self.request, self.binders);
        let control = self
            .controls
            .get_mut(id)
            .ok_or_else(|| TabulaError::bad_id(id, "no control with this ID"))?;
        match control.as_data_owner_mut() {
            Some(owner) => data::load_data(owner, request, binders),
            None => Err(TabulaError::misconfigured(id, "control does not own data")),
        }
    }

    /// Load the data of the control currently running.
    pub fn load_owner(&self, owner: &mut dyn DataOwner) -> Result<()> {
        data::load_data(owner, self.request, self.binders)
    }

    /// Draw another control inline, e.g. a caption.
    pub fn draw_control(&mut self, id: &str) -> Result<String> {
        self.with_control(id, draw_one)
            .unwrap_or_else(|| Err(TabulaError::bad_id(id, "no drawable control with this ID")))
    }

    /// Mark a control to be redrawn in the response.
    pub fn refresh(&mut self, id: &str) {
        if !self.pass.refresh.iter().any(|r| r == id) {
            tracing::trace!(target: "horizon_tabula::page", control = id, "refresh requested");
            self.pass.refresh.push(id.to_string());
        }
    }

    pub fn mark_drawn(&mut self, id: &str) {
        self.pass.drawn.insert(id.to_string());
    }

    /// Whether a control was already drawn in the current draw pass.
    pub fn was_drawn(&self, id: &str) -> bool {
        self.pass.drawn.contains(id)
    }

    pub fn commands_mut(&mut self) -> &mut ResponseCommands {
        &mut self.pass.commands
    }
}

fn draw_one(control: &mut dyn Control, ctx: &mut PageContext<'_>) -> Result<String> {
    control.pre_render(ctx)?;
    let html = control.draw(ctx)?;
    ctx.mark_drawn(control.id());
    Ok(html)
}

/// A page of controls.
///
/// ```
/// use horizon_tabula::{Column, Page, PagedTable, RequestContext, TabulaConfig, Value};
///
/// let config = TabulaConfig::default();
/// let mut page = Page::new("report", config.clone());
/// let mut table = PagedTable::new("people", &config);
/// table.add_column(Column::key("name", "Name")).unwrap();
/// table.set_data(vec![Value::map([("name", "Ada")])]);
/// page.add_control(table).unwrap();
///
/// let html = page.draw(&RequestContext::new()).unwrap();
/// assert!(html.contains("<td>Ada</td>"));
/// ```
#[derive(Debug)]
pub struct Page {
    id: String,
    config: TabulaConfig,
    controls: ControlArena,
    binders: BinderRegistry,
    pass: PassState,
}

impl Page {
    pub fn new(id: impl Into<String>, config: TabulaConfig) -> Self {
        Self {
            id: id.into(),
            config,
            controls: ControlArena::new(),
            binders: BinderRegistry::new(),
            pass: PassState::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &TabulaConfig {
        &self.config
    }

    /// Add a control. IDs must be unique on the page.
    pub fn add_control(&mut self, control: impl Control + 'static) -> Result<()> {
        self.add_boxed_control(Box::new(control))
    }

    pub fn add_boxed_control(&mut self, mut control: Box<dyn Control>) -> Result<()> {
        if self.controls.contains(control.id()) {
            return Err(TabulaError::bad_id(
                control.id(),
                "a control with this ID is already on the page",
            ));
        }
        control.attach(&mut self.controls)?;
        tracing::debug!(target: "horizon_tabula::page", page = %self.id, control = %control.id(), kind = control.kind(), "control added");
        self.controls.insert(control).map(|_| ())
    }

    pub fn remove_control(&mut self, id: &str) -> Option<Box<dyn Control>> {
        self.controls.remove(id)
    }

    /// Register the binder that supplies data for provider ID `id`.
    pub fn add_binder(&mut self, id: impl Into<String>, binder: impl DataBinder + 'static) {
        self.binders.insert(id, binder);
    }

    pub fn controls(&self) -> &ControlArena {
        &self.controls
    }

    /// A control of a concrete type.
    pub fn control<T: Control>(&self, id: &str) -> Option<&T> {
        self.controls.get(id)?.as_any().downcast_ref()
    }

    pub fn control_mut<T: Control>(&mut self, id: &str) -> Option<&mut T> {
        self.controls.get_mut(id)?.as_any_mut().downcast_mut()
    }

    fn context<'a>(&'a mut self, request: &'a RequestContext) -> PageContext<'a> {
        PageContext {
            request,
            config: &self.config,
            controls: &mut self.controls,
            binders: &self.binders,
            pass: &mut self.pass,
        }
    }

    /// Apply a request: form values for every control, then the action.
    #[tracing::instrument(skip_all, fields(page = %self.id))]
    pub fn handle_request(&mut self, request: &RequestContext) -> Result<()> {
        let ids = self.controls.ids().to_vec();
        let mut ctx = self.context(request);
        for id in &ids {
            ctx.with_control(id, |control, ctx| control.update_form_values(ctx));
        }

        let Some(action) = request.action() else {
            return Ok(());
        };
        tracing::debug!(
            target: "horizon_tabula::page",
            control = %action.control_id,
            action = %action.action,
            value = %action.value,
            "dispatching action"
        );
        ctx.with_control(&action.control_id, |control, ctx| control.do_action(ctx, action))
            .unwrap_or_else(|| {
                Err(TabulaError::bad_id(
                    action.control_id.as_str(),
                    "action addressed to a control that is not on the page",
                ))
            })
    }

    /// Draw every top-level control.
    #[tracing::instrument(skip_all, fields(page = %self.id))]
    pub fn draw(&mut self, request: &RequestContext) -> Result<String> {
        let roots: Vec<String> = self
            .controls
            .iter()
            .filter(|c| c.base().parent().is_none())
            .map(|c| c.id().to_string())
            .collect();
        self.pass.refresh.clear();
        let parts = self.draw_pass(request, &roots)?;
        Ok(parts.into_iter().map(|(_, html)| html).collect())
    }

    /// Draw a single control.
    pub fn draw_control(&mut self, request: &RequestContext, id: &str) -> Result<String> {
        let mut parts = self.draw_pass(request, &[id.to_string()])?;
        Ok(parts.pop().map(|(_, html)| html).unwrap_or_default())
    }

    /// Draw several controls in one pass, in the given order. Data loaded
    /// by an earlier control (a pager loading its table) is reused by later
    /// ones.
    pub fn draw_controls(&mut self, request: &RequestContext, ids: &[&str]) -> Result<Vec<String>> {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let parts = self.draw_pass(request, &ids)?;
        Ok(parts.into_iter().map(|(_, html)| html).collect())
    }

    /// Draw the controls marked for refresh since the last draw, returning
    /// `(id, html)` pairs in refresh order.
    pub fn draw_refreshed(&mut self, request: &RequestContext) -> Result<Vec<(String, String)>> {
        let ids = std::mem::take(&mut self.pass.refresh);
        self.draw_pass(request, &ids)
    }

    /// IDs marked for refresh.
    pub fn refresh_ids(&self) -> &[String] {
        &self.pass.refresh
    }

    fn draw_pass(
        &mut self,
        request: &RequestContext,
        ids: &[String],
    ) -> Result<Vec<(String, String)>> {
        let _perf = PerfSpan::new("draw");
        self.pass.drawn.clear();
        let result = {
            let mut ctx = self.context(request);
            ids.iter()
                .map(|id| ctx.draw_control(id).map(|html| (id.clone(), html)))
                .collect::<Result<Vec<_>>>()
        };
        // Provider data never outlives the pass.
        self.controls.for_each_mut(|control| {
            if let Some(owner) = control.as_data_owner_mut() {
                owner.data_manager_mut().reset_data();
            }
        });
        result
    }

    /// Commands queued for the client runtime.
    pub fn commands(&self) -> &ResponseCommands {
        &self.pass.commands
    }

    /// Take the queued commands in priority order.
    pub fn take_commands(&mut self) -> Vec<JsCommand> {
        self.pass.commands.take()
    }

    /// Collect the light-weight state of every control, keyed by control ID.
    pub fn save_state(&mut self) -> StateMap {
        let request = RequestContext::new();
        let ids = self.controls.ids().to_vec();
        let mut ctx = self.context(&request);
        let mut saved = StateMap::new();
        for id in ids {
            let mut state = StateMap::new();
            ctx.with_control(&id, |control, ctx| control.marshal_state(ctx, &mut state));
            if !state.is_empty() {
                saved.insert(id, serde_json::Value::Object(state));
            }
        }
        tracing::debug!(target: "horizon_tabula::state", page = %self.id, controls = saved.len(), "state saved");
        saved
    }

    /// Apply state collected by [`save_state`](Self::save_state).
    ///
    /// Pagers are restored before the controls they page, so a paged
    /// control's own page number wins.
    pub fn restore_state(&mut self, saved: &StateMap) {
        let request = RequestContext::new();
        let (mut first, mut rest): (Vec<String>, Vec<String>) = (Vec::new(), Vec::new());
        for control in self.controls.iter() {
            let id = control.id().to_string();
            if control.kind() == crate::pager::DataPager::KIND {
                first.push(id);
            } else {
                rest.push(id);
            }
        }
        let mut ctx = self.context(&request);
        for id in first.into_iter().chain(rest) {
            let Some(state) = saved.get(&id).and_then(|s| s.as_object()) else {
                continue;
            };
            ctx.with_control(&id, |control, ctx| control.unmarshal_state(ctx, state));
        }
    }

    /// Encode the whole page.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let _perf = PerfSpan::new("serialize");
        let controls = self
            .controls
            .iter()
            .map(|control| {
                Ok(ControlRecord {
                    kind: control.kind().to_string(),
                    id: control.id().to_string(),
                    data: control.serialize()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let state = PageState {
            page_id: self.id.clone(),
            controls,
        };
        let bytes = serde_json::to_vec(&state)?;
        tracing::debug!(target: "horizon_tabula::state", page = %self.id, bytes = bytes.len(), "page serialized");
        Ok(bytes)
    }

    /// Rebuild a page from [`serialize`](Self::serialize) output and
    /// [`restore`](Self::restore) it. Binders are not part of page state and
    /// must be added again.
    pub fn deserialize(
        bytes: &[u8],
        registry: &TypeRegistry,
        config: TabulaConfig,
    ) -> Result<Self> {
        let _perf = PerfSpan::new("deserialize");
        let state: PageState = serde_json::from_slice(bytes)?;
        let mut page = Page::new(state.page_id, config);
        {
            let ctx = DecodeContext {
                registry,
                config: &page.config,
            };
            for record in state.controls {
                let control = registry.decode_control(&record.kind, record.data, &ctx)?;
                if control.id() != record.id {
                    return Err(TabulaError::bad_data(format!(
                        "control '{}' decoded with ID '{}'",
                        record.id,
                        control.id()
                    )));
                }
                page.controls.insert(control)?;
            }
        }
        page.restore()?;
        tracing::debug!(target: "horizon_tabula::state", page = %page.id, controls = page.controls.len(), "page deserialized");
        Ok(page)
    }

    /// Re-resolve references between controls. Fails with a stale state
    /// error when a referenced control is gone.
    pub fn restore(&mut self) -> Result<()> {
        let request = RequestContext::new();
        let ids = self.controls.ids().to_vec();
        let mut ctx = self.context(&request);
        for id in &ids {
            ctx.with_control(id, |control, ctx| control.restore(ctx))
                .unwrap_or(Ok(()))?;
        }
        Ok(())
    }

    /// Serialize into a state store under the page ID.
    pub fn save_to(&self, store: &dyn StateStore) -> Result<()> {
        store.save(&self.id, self.serialize()?)
    }

    /// Load a page saved with [`save_to`](Self::save_to).
    pub fn load_from(
        store: &dyn StateStore,
        page_id: &str,
        registry: &TypeRegistry,
        config: TabulaConfig,
    ) -> Result<Option<Self>> {
        match store.load(page_id)? {
            Some(bytes) => Self::deserialize(&bytes, registry, config).map(Some),
            None => Ok(None),
        }
    }

    /// Text dump of the control tree.
    pub fn debug_tree(&self) -> String {
        PageTreeDebug::new().format_page(self)
    }
}

static_assertions::assert_impl_all!(Page: Send, Sync);
