//! Lazy data provision.
//!
//! A [`DataManager`] holds the rows a control renders. Rows are either set
//! directly, or supplied on demand by a [`DataBinder`] registered under a
//! provider ID. Provider-backed data only lives for one draw pass: it is
//! loaded right before drawing and reset afterwards, so large result sets are
//! never kept in the control tree between requests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use horizon_tabula_core::{BoxError, Result, TabulaError, Value};

use crate::paging::PagedControl;
use crate::request::RequestContext;
use crate::table::SortDirection;

/// Rows of a control plus the optional provider that supplies them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataManager {
    provider_id: Option<String>,
    #[serde(skip)]
    data: Option<Vec<Value>>,
    #[serde(skip)]
    offset: usize,
}

impl DataManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a complete row set.
    pub fn set_data(&mut self, rows: Vec<Value>) {
        self.set_data_with_offset(rows, 0);
    }

    /// Store a window of rows whose first row has absolute index `offset`.
    pub fn set_data_with_offset(&mut self, rows: Vec<Value>, offset: usize) {
        self.data = Some(rows);
        self.offset = offset;
    }

    /// Store rows held in a dynamic value, which must be a list.
    pub fn set_data_value(&mut self, rows: Value) -> Result<()> {
        match rows {
            Value::List(rows) => {
                self.set_data(rows);
                Ok(())
            }
            other => Err(TabulaError::bad_data(format!(
                "expected a list of rows, got {}",
                other.type_name()
            ))),
        }
    }

    /// Register the ID of the binder that supplies rows.
    pub fn set_data_provider(&mut self, provider_id: impl Into<String>) {
        self.provider_id = Some(provider_id.into());
    }

    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    pub fn has_data_provider(&self) -> bool {
        self.provider_id.is_some()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Current rows, if any.
    pub fn data(&self) -> Option<&[Value]> {
        self.data.as_deref()
    }

    /// Absolute index of the first row.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The rows of the current page, when the manager holds the complete row
    /// set of `paging`. `None` when it holds only the rows to draw.
    pub fn page_window(&self, paging: &PagedControl) -> Option<(usize, usize)> {
        let rows = self.data.as_ref()?;
        (self.offset == 0 && rows.len() == paging.total_items()).then(|| paging.slice_offsets())
    }

    /// Drop provider-supplied rows so the next draw binds again.
    /// Directly set data is kept.
    pub fn reset_data(&mut self) {
        if self.provider_id.is_some() {
            self.data = None;
            self.offset = 0;
        }
    }

    /// Visit rows in order with their absolute index. Stops when `f`
    /// returns `false`.
    pub fn range_data<F>(&self, mut f: F)
    where
        F: FnMut(usize, &Value) -> bool,
    {
        if let Some(rows) = &self.data {
            for (index, row) in rows.iter().enumerate() {
                if !f(self.offset + index, row) {
                    break;
                }
            }
        }
    }
}

/// A control that owns a [`DataManager`]. Binders fill it through this trait.
pub trait DataOwner {
    /// ID of the owning control.
    fn owner_id(&self) -> &str;

    fn data_manager(&self) -> &DataManager;

    fn data_manager_mut(&mut self) -> &mut DataManager;

    /// Page state, for paged controls.
    fn paged_control(&self) -> Option<&PagedControl> {
        None
    }

    fn paged_control_mut(&mut self) -> Option<&mut PagedControl> {
        None
    }

    /// Requested sort order, primary column first.
    fn sort_keys(&self) -> Vec<(String, SortDirection)> {
        Vec::new()
    }

    /// Store a complete row set.
    fn set_data(&mut self, rows: Vec<Value>) {
        self.data_manager_mut().set_data(rows);
    }

    /// Store a window of rows starting at absolute index `offset`.
    fn set_data_with_offset(&mut self, rows: Vec<Value>, offset: usize) {
        self.data_manager_mut().set_data_with_offset(rows, offset);
    }

    /// Set the total row count of a paged control. No-op when not paged.
    fn set_total_items(&mut self, total: usize) {
        if let Some(paging) = self.paged_control_mut() {
            paging.set_total_items(total);
        }
    }

    /// Store the current page out of a complete row set.
    ///
    /// Paged owners get the total set from `rows.len()` and keep only the
    /// rows of the current page. Other owners keep everything.
    fn set_paged_rows(&mut self, rows: Vec<Value>) {
        let window = self.paged_control_mut().map(|paging| {
            paging.set_total_items(rows.len());
            paging.slice_offsets()
        });
        match window {
            Some((start, end)) => {
                let page: Vec<Value> = rows.into_iter().skip(start).take(end - start).collect();
                self.set_data_with_offset(page, start);
            }
            None => self.set_data(rows),
        }
    }
}

/// Store rows on a paged owner.
///
/// Rows set directly are the complete set and fix the total. Rows stored by
/// a binder keep the total it set with [`DataOwner::set_total_items`];
/// the total only grows when the binder hands over more rows than that.
pub(crate) fn store_paged_rows(
    manager: &mut DataManager,
    paging: &mut PagedControl,
    rows: Vec<Value>,
) {
    if !manager.has_data_provider() || rows.len() > paging.total_items() {
        paging.set_total_items(rows.len());
    }
    manager.set_data(rows);
}

/// Supplies rows to a [`DataOwner`] on demand.
///
/// `bind_data` must store rows on the owner (via [`DataOwner::set_data`] or
/// one of its variants) before returning. Long-running binders should poll
/// the request's cancellation token.
pub trait DataBinder: Send + Sync {
    fn bind_data(
        &self,
        request: &RequestContext,
        owner: &mut dyn DataOwner,
    ) -> std::result::Result<(), BoxError>;
}

/// A [`DataBinder`] backed by a closure. Build one with [`binder_fn`].
pub struct FnBinder<F> {
    f: F,
}

impl<F> fmt::Debug for FnBinder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnBinder")
    }
}

impl<F> DataBinder for FnBinder<F>
where
    F: Fn(&RequestContext, &mut dyn DataOwner) -> std::result::Result<(), BoxError> + Send + Sync,
{
    fn bind_data(
        &self,
        request: &RequestContext,
        owner: &mut dyn DataOwner,
    ) -> std::result::Result<(), BoxError> {
        (self.f)(request, owner)
    }
}

/// Wrap a closure as a [`DataBinder`].
pub fn binder_fn<F>(f: F) -> FnBinder<F>
where
    F: Fn(&RequestContext, &mut dyn DataOwner) -> std::result::Result<(), BoxError> + Send + Sync,
{
    FnBinder { f }
}

/// Binders of a page, keyed by provider ID.
#[derive(Default, Clone)]
pub struct BinderRegistry {
    binders: HashMap<String, Arc<dyn DataBinder>>,
}

impl fmt::Debug for BinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.binders.keys().collect();
        ids.sort();
        f.debug_struct("BinderRegistry").field("binders", &ids).finish()
    }
}

impl BinderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binder, replacing any previous binder with the same ID.
    pub fn insert(&mut self, id: impl Into<String>, binder: impl DataBinder + 'static) {
        self.binders.insert(id.into(), Arc::new(binder));
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn DataBinder>> {
        self.binders.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.binders.contains_key(id)
    }
}

/// Ask the owner's binder for rows, if it has one and no rows are loaded.
///
/// On failure or cancellation the owner is left exactly as it was before
/// the call.
pub fn load_data(
    owner: &mut dyn DataOwner,
    request: &RequestContext,
    binders: &BinderRegistry,
) -> Result<()> {
    let manager = owner.data_manager();
    let Some(provider_id) = manager.provider_id().map(str::to_string) else {
        return Ok(());
    };
    if manager.has_data() {
        return Ok(());
    }

    let owner_id = owner.owner_id().to_string();
    if request.cancellation().is_cancelled() {
        return Err(TabulaError::cancelled(format!("loading data for '{owner_id}'")));
    }

    let binder = binders.get(&provider_id).cloned().ok_or_else(|| {
        TabulaError::misconfigured(
            owner_id.as_str(),
            format!("no data binder registered as '{provider_id}'"),
        )
    })?;

    let saved_data = owner.data_manager().clone();
    let saved_paging = owner.paged_control().cloned();
    let restore = |owner: &mut dyn DataOwner| {
        *owner.data_manager_mut() = saved_data.clone();
        if let (Some(paging), Some(saved)) = (owner.paged_control_mut(), saved_paging.clone()) {
            *paging = saved;
        }
    };

    tracing::debug!(target: "horizon_tabula::data", owner = %owner_id, provider = %provider_id, "binding data");
    if let Err(err) = binder.bind_data(request, owner) {
        restore(owner);
        tracing::warn!(target: "horizon_tabula::data", owner = %owner_id, provider = %provider_id, error = %err, "data binder failed");
        return Err(TabulaError::provider(provider_id, err));
    }
    if request.cancellation().is_cancelled() {
        restore(owner);
        return Err(TabulaError::cancelled(format!("loading data for '{owner_id}'")));
    }

    if !owner.data_manager().has_data() {
        tracing::warn!(target: "horizon_tabula::data", owner = %owner_id, provider = %provider_id, "data binder did not set any data");
        owner.set_data(Vec::new());
    }
    let rows = owner.data_manager().data().map_or(0, |rows| rows.len());
    tracing::trace!(target: "horizon_tabula::data", owner = %owner_id, rows, "data bound");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_tabula_core::CancellationToken;

    #[derive(Default)]
    struct Owner {
        data: DataManager,
        paging: Option<PagedControl>,
    }

    impl DataOwner for Owner {
        fn owner_id(&self) -> &str {
            "owner"
        }
        fn data_manager(&self) -> &DataManager {
            &self.data
        }
        fn data_manager_mut(&mut self) -> &mut DataManager {
            &mut self.data
        }
        fn paged_control(&self) -> Option<&PagedControl> {
            self.paging.as_ref()
        }
        fn paged_control_mut(&mut self) -> Option<&mut PagedControl> {
            self.paging.as_mut()
        }
    }

    fn rows(n: i64) -> Vec<Value> {
        (0..n).map(Value::from).collect()
    }

    #[test]
    fn test_range_data_absolute_indexes() {
        let mut manager = DataManager::new();
        manager.set_data_with_offset(rows(3), 20);
        let mut seen = Vec::new();
        manager.range_data(|index, row| {
            seen.push((index, row.as_i64().unwrap()));
            true
        });
        assert_eq!(seen, vec![(20, 0), (21, 1), (22, 2)]);
    }

    #[test]
    fn test_range_data_stops_early() {
        let mut manager = DataManager::new();
        manager.set_data(rows(10));
        let mut count = 0;
        manager.range_data(|index, _| {
            count += 1;
            index < 2
        });
        assert_eq!(count, 3);
    }

    #[test]
    fn test_set_data_value_requires_list() {
        let mut manager = DataManager::new();
        assert!(manager.set_data_value(Value::list([1, 2])).is_ok());
        assert_eq!(manager.data().map(<[Value]>::len), Some(2));
        let err = manager.set_data_value(Value::from("rows")).unwrap_err();
        assert!(matches!(err, TabulaError::BadData(_)));
    }

    #[test]
    fn test_reset_only_with_provider() {
        let mut manager = DataManager::new();
        manager.set_data(rows(2));
        manager.reset_data();
        assert!(manager.has_data());

        manager.set_data_provider("people");
        manager.reset_data();
        assert!(!manager.has_data());
    }

    #[test]
    fn test_load_data_binds_once() {
        let calls = Arc::new(parking_lot::Mutex::new(0));
        let counter = calls.clone();
        let mut binders = BinderRegistry::new();
        binders.insert(
            "people",
            binder_fn(move |_, owner| {
                *counter.lock() += 1;
                owner.set_paged_rows(rows(25));
                Ok(())
            }),
        );

        let mut owner = Owner {
            paging: Some(PagedControl::new(10)),
            ..Default::default()
        };
        owner.data.set_data_provider("people");
        owner.paging.as_mut().unwrap().set_page_num(3);

        let request = RequestContext::new();
        load_data(&mut owner, &request, &binders).unwrap();
        load_data(&mut owner, &request, &binders).unwrap();

        assert_eq!(*calls.lock(), 1);
        assert_eq!(owner.data.offset(), 20);
        assert_eq!(owner.data.data().map(<[Value]>::len), Some(5));
        assert_eq!(owner.paging.as_ref().unwrap().total_items(), 25);
    }

    #[test]
    fn test_load_data_failure_restores_state() {
        let mut binders = BinderRegistry::new();
        binders.insert(
            "broken",
            binder_fn(|_, owner| {
                owner.set_total_items(99);
                owner.set_data(rows(1));
                Err("connection refused".into())
            }),
        );

        let mut owner = Owner {
            paging: Some(PagedControl::new(10)),
            ..Default::default()
        };
        owner.data.set_data_provider("broken");

        let err = load_data(&mut owner, &RequestContext::new(), &binders).unwrap_err();
        assert!(err.is_provider_failure());
        assert!(!owner.data.has_data());
        assert_eq!(owner.paging.as_ref().unwrap().total_items(), 0);
    }

    #[test]
    fn test_load_data_cancelled() {
        let mut binders = BinderRegistry::new();
        binders.insert(
            "people",
            binder_fn(|_, owner| {
                owner.set_data(rows(3));
                Ok(())
            }),
        );
        let mut owner = Owner::default();
        owner.data.set_data_provider("people");

        let token = CancellationToken::new();
        token.cancel();
        let request = RequestContext::new().with_cancellation(token);
        let err = load_data(&mut owner, &request, &binders).unwrap_err();
        assert!(matches!(err, TabulaError::Cancelled(_)));
        assert!(!owner.data.has_data());
    }

    #[test]
    fn test_load_data_missing_binder() {
        let mut owner = Owner::default();
        owner.data.set_data_provider("nobody");
        let err =
            load_data(&mut owner, &RequestContext::new(), &BinderRegistry::new()).unwrap_err();
        assert!(matches!(err, TabulaError::Misconfiguration { .. }));
    }

    #[test]
    fn test_binder_page_keeps_total() {
        let mut manager = DataManager::new();
        manager.set_data_provider("people");
        let mut paging = PagedControl::new(10);
        paging.set_total_items(100);
        paging.set_page_num(3);

        store_paged_rows(&mut manager, &mut paging, rows(10));
        assert_eq!(paging.total_items(), 100);
        assert_eq!(paging.page_num(), 3);
        assert_eq!(manager.page_window(&paging), None);

        store_paged_rows(&mut manager, &mut paging, rows(120));
        assert_eq!(paging.total_items(), 120);
        assert_eq!(manager.page_window(&paging), Some((20, 30)));
    }

    #[test]
    fn test_direct_rows_set_total() {
        let mut manager = DataManager::new();
        let mut paging = PagedControl::new(10);
        paging.set_total_items(100);
        paging.set_page_num(3);

        store_paged_rows(&mut manager, &mut paging, rows(15));
        assert_eq!(paging.total_items(), 15);
        assert_eq!(paging.page_num(), 2);
        assert_eq!(manager.page_window(&paging), Some((10, 15)));
    }

    #[test]
    fn test_binder_without_data_leaves_empty_rows() {
        let mut binders = BinderRegistry::new();
        binders.insert("lazy", binder_fn(|_, _| Ok(())));
        let mut owner = Owner::default();
        owner.data.set_data_provider("lazy");
        load_data(&mut owner, &RequestContext::new(), &binders).unwrap();
        assert_eq!(owner.data.data(), Some(&[][..]));
    }
}
