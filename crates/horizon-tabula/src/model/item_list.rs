//! Hierarchical item lists.
//!
//! An [`ItemList`] is the model behind every list-like control: select
//! lists, checkbox lists, menus. Each [`ListItem`] gets an ID that encodes its
//! position in the tree: the first item of a list owned by `sel` is `sel_0`,
//! its third child is `sel_0_2`. The list owns the IDs and rewrites them
//! after every insertion or removal.
//!
//! # Example
//!
//! ```
//! use horizon_tabula::model::ItemList;
//!
//! let mut list = ItemList::new("colors");
//! list.add_item("Red", "r");
//! let blue = list.add_item("Blue", "b");
//! blue.items_mut().add_item("Navy", "n");
//!
//! assert_eq!(list.get_item("colors_1_0").unwrap().label(), "Navy");
//! ```

use std::cmp::Ordering;

use horizon_tabula_core::{Result, TabulaError, Value};

use crate::html::Attributes;

/// An entry of an [`ItemList`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    id: String,
    value: Value,
    label: String,
    attributes: Attributes,
    anchor_attributes: Option<Attributes>,
    disabled: bool,
    is_divider: bool,
    items: ItemList,
}

impl ListItem {
    /// Create a detached item. Its ID is assigned when it is added to a list.
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: String::new(),
            value: value.into(),
            label: label.into(),
            attributes: Attributes::new(),
            anchor_attributes: None,
            disabled: false,
            is_divider: false,
            items: ItemList::new(""),
        }
    }

    /// Create a divider item.
    pub fn divider() -> Self {
        Self {
            is_divider: true,
            ..Self::new("", Value::Null)
        }
    }

    /// Builder: mark the item disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Builder: set an html attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Builder: render the label as a link.
    pub fn with_anchor(mut self, href: impl Into<String>) -> Self {
        self.anchor_attributes = Some(Attributes::new().with("href", href));
        self
    }

    /// Position-derived ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The item's value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the item's value.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn anchor_attributes(&self) -> Option<&Attributes> {
        self.anchor_attributes.as_ref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_divider(&self) -> bool {
        self.is_divider
    }

    /// Child items.
    pub fn items(&self) -> &ItemList {
        &self.items
    }

    /// Mutable child items. IDs of children are kept in sync with this item.
    pub fn items_mut(&mut self) -> &mut ItemList {
        &mut self.items
    }

    /// Returns `true` if the item has children.
    pub fn has_children(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Something that supplies both a value and a label.
pub trait ValueLabeler {
    fn value(&self) -> Value;
    fn label(&self) -> String;
}

/// Something that supplies an ID and a display string.
pub trait IdDisplayer {
    fn id(&self) -> String;
    fn display(&self) -> String;
}

/// Something that only supplies a label.
pub trait Labeler {
    fn label(&self) -> String;
}

/// Input accepted by [`ItemList::add_list_items`].
#[derive(Debug, Clone)]
pub enum ItemSource {
    /// A fully built item.
    Item(ListItem),
    /// A value with a label.
    Pair { value: Value, label: String },
    /// An identified object. The ID becomes the value.
    Identified { id: String, display: String },
    /// A label without a value.
    LabelOnly { label: String },
    /// A plain string form. Used as the label; there is no value.
    DisplayOnly { display: String },
    /// Several sources, flattened in order.
    Many(Vec<ItemSource>),
}

impl ItemSource {
    /// Convert a [`ValueLabeler`].
    pub fn from_value_labeler(source: &impl ValueLabeler) -> Self {
        Self::Pair {
            value: source.value(),
            label: source.label(),
        }
    }

    /// Convert an [`IdDisplayer`].
    pub fn from_id_displayer(source: &impl IdDisplayer) -> Self {
        Self::Identified {
            id: source.id(),
            display: source.display(),
        }
    }

    /// Convert a [`Labeler`].
    pub fn from_labeler(source: &impl Labeler) -> Self {
        Self::LabelOnly {
            label: source.label(),
        }
    }

    fn flatten_into(self, out: &mut Vec<ListItem>) {
        match self {
            ItemSource::Item(item) => out.push(item),
            ItemSource::Pair { value, label } => out.push(ListItem::new(label, value)),
            ItemSource::Identified { id, display } => out.push(ListItem::new(display, id)),
            ItemSource::LabelOnly { label } => out.push(ListItem::new(label, Value::Null)),
            ItemSource::DisplayOnly { display } => out.push(ListItem::new(display, Value::Null)),
            ItemSource::Many(sources) => {
                for source in sources {
                    source.flatten_into(out);
                }
            }
        }
    }
}

impl From<ListItem> for ItemSource {
    fn from(item: ListItem) -> Self {
        ItemSource::Item(item)
    }
}

impl From<&str> for ItemSource {
    fn from(display: &str) -> Self {
        ItemSource::DisplayOnly {
            display: display.to_string(),
        }
    }
}

impl From<String> for ItemSource {
    fn from(display: String) -> Self {
        ItemSource::DisplayOnly { display }
    }
}

impl<T: Into<ItemSource>> From<Vec<T>> for ItemSource {
    fn from(sources: Vec<T>) -> Self {
        ItemSource::Many(sources.into_iter().map(Into::into).collect())
    }
}

/// An ordered, hierarchical list of items owned by a control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemList {
    owner_id: String,
    items: Vec<ListItem>,
}

impl ItemList {
    /// Create an empty list for the given owner.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            items: Vec::new(),
        }
    }

    /// ID prefix of the items.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Change the owner and rewrite every ID.
    pub fn set_owner_id(&mut self, owner_id: impl Into<String>) {
        self.owner_id = owner_id.into();
        self.reindex(0);
    }

    /// Append an item and return it.
    pub fn add_item(&mut self, label: impl Into<String>, value: impl Into<Value>) -> &mut ListItem {
        let index = self.items.len();
        self.items.push(ListItem::new(label, value));
        self.reindex(index);
        &mut self.items[index]
    }

    /// Insert an item at `index`. Negative indices count from the end;
    /// out-of-range indices clamp to the ends of the list.
    pub fn add_item_at(
        &mut self,
        index: isize,
        label: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut ListItem {
        self.insert_item_at(index, ListItem::new(label, value))
    }

    /// Insert a prebuilt item at `index`, with the same index rules as
    /// [`add_item_at`](Self::add_item_at).
    pub fn insert_item_at(&mut self, index: isize, item: ListItem) -> &mut ListItem {
        let len = self.items.len() as isize;
        let index = if index < 0 { len + index } else { index };
        let index = index.clamp(0, len) as usize;
        self.items.insert(index, item);
        self.reindex(index);
        &mut self.items[index]
    }

    /// Append items from any mixture of sources, reindexing once.
    pub fn add_list_items<I, S>(&mut self, sources: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemSource>,
    {
        let start = self.items.len();
        let mut flattened = Vec::new();
        for source in sources {
            source.into().flatten_into(&mut flattened);
        }
        self.items.extend(flattened);
        self.reindex(start);
    }

    /// Item at a top-level position.
    pub fn item_at(&self, index: usize) -> Option<&ListItem> {
        self.items.get(index)
    }

    /// Mutable item at a top-level position.
    pub fn item_at_mut(&mut self, index: usize) -> Option<&mut ListItem> {
        self.items.get_mut(index)
    }

    /// Top-level items.
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Iterate over top-level items.
    pub fn iter(&self) -> std::slice::Iter<'_, ListItem> {
        self.items.iter()
    }

    /// Look up an item anywhere in the tree by its ID.
    pub fn get_item(&self, id: &str) -> Result<&ListItem> {
        let path = self.parse_id(id)?;
        let mut list = self;
        let mut found = None;
        for index in path {
            let item = list
                .items
                .get(index)
                .ok_or_else(|| TabulaError::bad_id(id, format!("index {index} is out of range")))?;
            list = &item.items;
            found = Some(item);
        }
        found.ok_or_else(|| TabulaError::bad_id(id, "id does not name an item"))
    }

    /// Mutable lookup by ID.
    pub fn get_item_mut(&mut self, id: &str) -> Result<&mut ListItem> {
        let path = self.parse_id(id)?;
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| TabulaError::bad_id(id, "id does not name an item"))?;
        let mut list = self;
        for &index in parents {
            list = &mut list
                .items
                .get_mut(index)
                .ok_or_else(|| TabulaError::bad_id(id, format!("index {index} is out of range")))?
                .items;
        }
        list.items
            .get_mut(*last)
            .ok_or_else(|| TabulaError::bad_id(id, format!("index {last} is out of range")))
    }

    fn parse_id(&self, id: &str) -> Result<Vec<usize>> {
        let rest = id
            .strip_prefix(self.owner_id.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| {
                TabulaError::bad_id(id, format!("id is not owned by '{}'", self.owner_id))
            })?;
        rest.split('_')
            .map(|segment| {
                segment.parse::<usize>().map_err(|_| {
                    TabulaError::bad_id(id, format!("segment '{segment}' is not an index"))
                })
            })
            .collect()
    }

    /// Depth-first search for the first item holding `value`.
    pub fn get_item_by_value(&self, value: &Value) -> Option<&ListItem> {
        for item in &self.items {
            if item.value == *value {
                return Some(item);
            }
            if let Some(found) = item.items.get_item_by_value(value) {
                return Some(found);
            }
        }
        None
    }

    /// Number of top-level items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove and return the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove_item_at(&mut self, index: usize) -> ListItem {
        let item = self.items.remove(index);
        self.reindex(index);
        item
    }

    /// Rewrite IDs of items from `start` on, and all of their descendants.
    fn reindex(&mut self, start: usize) {
        for (index, item) in self.items.iter_mut().enumerate().skip(start) {
            item.id = format!("{}_{}", self.owner_id, index);
            item.items.owner_id.clone_from(&item.id);
            item.items.reindex(0);
        }
    }
}

/// Compare two item IDs by their numeric path.
///
/// Segments are split on `_`. Numeric segments compare as numbers and sort
/// before non-numeric ones; a path that is a prefix of another sorts first.
/// `sel_1_2` therefore sorts before `sel_1_10`.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    let mut left = a.split('_');
    let mut right = b.split('_');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = compare_segments(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_segments(x: &str, y: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match (numeric(x), numeric(y)) {
        (true, true) => {
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.cmp(y),
    }
}

/// Sort IDs into item order.
pub fn sort_ids<S: AsRef<str>>(ids: &mut [S]) {
    ids.sort_by(|a, b| compare_ids(a.as_ref(), b.as_ref()));
}
