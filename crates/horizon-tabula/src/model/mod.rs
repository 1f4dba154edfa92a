//! List models shared by list-like controls.
//!
//! - [`ItemList`] / [`ListItem`]: hierarchical items with position-derived IDs
//! - [`ItemSource`]: the inputs a list accepts when bulk-adding items
//! - [`compare_ids`] / [`sort_ids`]: the order in which item IDs are reported

mod item_list;

pub use item_list::{
    IdDisplayer, ItemList, ItemSource, Labeler, ListItem, ValueLabeler, compare_ids, sort_ids,
};
