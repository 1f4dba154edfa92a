//! Horizon Tabula - server-rendered paginated tables.
//!
//! This crate draws large, provider-supplied result sets as HTML tables
//! paired with pager toolbars, and keeps their state across requests:
//!
//! - **Tables**: [`Table`], [`PagedTable`] and [`SelectTable`] with sorting,
//!   captions, header/footer rows and row styling
//! - **Columns**: [`Column`] kinds for keys, aliases, templates, buttons,
//!   row numbers and checkboxes ([`CheckboxColumn`])
//! - **Paging**: [`PagedControl`] page arithmetic and the [`DataPager`]
//!   toolbar
//! - **Data**: [`DataManager`] plus the [`DataBinder`] hook that loads rows
//!   on demand
//! - **Page**: the [`Page`] arena that dispatches requests, draws controls
//!   and serializes its control tree
//!
//! # Example
//!
//! ```
//! use horizon_tabula::{
//!     Column, DataPager, Page, PagedTable, RequestContext, TabulaConfig, Value,
//! };
//!
//! let config = TabulaConfig::default().with_default_page_size(2);
//! let mut page = Page::new("report", config.clone());
//!
//! let mut table = PagedTable::new("people", &config);
//! table.add_column(Column::key("name", "Name").sortable()).unwrap();
//! table.set_data(vec![
//!     Value::map([("name", "Ada")]),
//!     Value::map([("name", "Grace")]),
//!     Value::map([("name", "Linus")]),
//! ]);
//! page.add_control(table).unwrap();
//! page.add_control(DataPager::new("pager", "people", &config)).unwrap();
//!
//! let html = page.draw(&RequestContext::new()).unwrap();
//! assert!(html.contains("<td>Grace</td>"));
//! assert!(!html.contains("<td>Linus</td>"));
//! ```

pub mod column;
pub mod control;
pub mod data;
pub mod html;
pub mod model;
pub mod pager;
pub mod paging;
pub mod request;
pub mod response;
pub mod table;

pub use horizon_tabula_core::{
    CancellationToken, Record, Result, Signal, TabulaConfig, TabulaError, Value,
};

pub use column::{
    ButtonColumn, CheckboxColumn, CheckboxProvider, Column, ColumnKind, ObjectRef, RowStyler,
};
pub use control::{Control, MemoryStateStore, Page, PageContext, StateStore, TypeRegistry};
pub use data::{DataBinder, DataManager, DataOwner, binder_fn};
pub use html::Attributes;
pub use model::{ItemList, ItemSource, ListItem};
pub use pager::{ButtonProxy, DataPager};
pub use paging::PagedControl;
pub use request::{ActionParams, RequestContext, RequestMode, events};
pub use response::{JsCommand, Priority, ResponseCommands};
pub use table::{PagedTable, SelectTable, SortDirection, Table};
