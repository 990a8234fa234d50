//! Region text → labeled proposal items
//!
//! Lines before the first label are headers and are dropped. Each label
//! line opens a new item, and following lines are folded into it until
//! the next label. Item content is collapsed to a single line.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grammar::LabelGrammar;
use crate::normalize::collapse_whitespace;

/// Label given to the synthetic trailing note item
pub const NOTE_LABEL: &str = "NOTE";

lazy_static! {
    static ref NOTE_MARKER: Regex = Regex::new(r"(?im)^[ \t]*NOTE\b[:\s-]*").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub label: String,
    pub content: String,
}

impl Item {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// Ordered label → content mapping.
///
/// Labels are unique: the first occurrence is kept and later duplicates
/// are rejected by [`ItemList::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct ItemList {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the label is already present. Returns whether the item
    /// was accepted.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.index.contains_key(&item.label) {
            return false;
        }
        self.index.insert(item.label.clone(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.index
            .get(label)
            .map(|&idx| self.items[idx].content.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Labels in discovery order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.label.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when some label already starts with `NOTE` (any case)
    pub fn has_note(&self) -> bool {
        self.labels().any(|label| {
            label
                .get(..NOTE_LABEL.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(NOTE_LABEL))
        })
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        items.into_iter().collect()
    }
}

impl From<ItemList> for Vec<Item> {
    fn from(list: ItemList) -> Self {
        list.items
    }
}

impl FromIterator<Item> for ItemList {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut list = ItemList::new();
        for item in iter {
            list.insert(item);
        }
        list
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Split region text into labeled items
pub fn segment(text: &str, grammar: &LabelGrammar) -> ItemList {
    let mut items = ItemList::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
        match grammar.recognize(line) {
            Some(found) if found.label.is_empty() => {
                debug!(line = %line, "Skipping malformed label line");
            }
            Some(found) => {
                if let Some((label, fragments)) = current.take() {
                    close_item(&mut items, label, &fragments);
                }
                let mut fragments = Vec::new();
                if !found.rest.is_empty() {
                    fragments.push(found.rest.to_string());
                }
                current = Some((found.label.to_string(), fragments));
            }
            None => {
                if let Some((_, fragments)) = current.as_mut() {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        fragments.push(trimmed.to_string());
                    }
                }
            }
        }
    }

    if let Some((label, fragments)) = current.take() {
        close_item(&mut items, label, &fragments);
    }

    debug!(items = items.len(), "Segmented region text");
    items
}

fn close_item(items: &mut ItemList, label: String, fragments: &[String]) {
    let content = collapse_whitespace(&fragments.join(" "));
    if !items.insert(Item::new(label.clone(), content)) {
        warn!(label = %label, "Duplicate label dropped, first occurrence kept");
    }
}

/// Capture the trailing note block, if any.
///
/// The block starts at the first line that opens with the word `NOTE` (any
/// case). Its content is the rest of that line after the `:`/`-`
/// separators, plus every following line.
pub fn extract_note_block(text: &str) -> Option<Item> {
    let marker = NOTE_MARKER.find(text)?;
    Some(Item::new(
        NOTE_LABEL,
        collapse_whitespace(&text[marker.end()..]),
    ))
}

/// Segment region text and, when `include_note` is set, append the note
/// block unless a NOTE item already exists. A region without labeled items
/// gets no note item either, so it still reads as empty.
pub fn segment_region(text: &str, grammar: &LabelGrammar, include_note: bool) -> ItemList {
    let mut items = segment(text, grammar);
    if include_note && !items.is_empty() && !items.has_note() {
        if let Some(note) = extract_note_block(text) {
            items.insert(note);
        }
    }
    items
}
