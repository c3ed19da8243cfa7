//! Visual marking of hovered and selected elements during capture.
//!
//! Purely a side channel: nothing in locating or extraction reads it, except
//! the capture session asking whether a node already carries the selected
//! marker.

use ego_tree::NodeId;
use std::collections::{BTreeMap, HashMap};

use crate::field::FieldName;

/// Text of the label placed next to a selected element
pub fn label_text(field: FieldName) -> String {
    format!("Selected: {}", field)
}

/// Outline colours used by the browser overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    /// Blue, transient
    Hover,
    /// Green, kept until selections are cleared
    Selected,
}

impl Outline {
    pub fn css(&self) -> &'static str {
        match self {
            Outline::Hover => "2px solid #3b82f6",
            Outline::Selected => "3px solid #10b981",
        }
    }
}

/// Side effects on the host page
pub trait Overlay {
    /// Create the label container if it is not there yet
    fn mount(&mut self);
    /// Remove the label container and every label in it
    fn unmount(&mut self);
    fn is_mounted(&self) -> bool;

    fn outline(&mut self, node: NodeId, outline: Outline);
    fn clear_outline(&mut self, node: NodeId);
    /// Drop hover outlines, keeping selected ones
    fn clear_hover_outlines(&mut self);
    /// Drop every outline and selected marker
    fn clear_outlines(&mut self);

    /// Mark `node` as the selection for `field` and label it
    fn mark_selected(&mut self, node: NodeId, field: FieldName);
    /// Undo [`Overlay::mark_selected`] when the field is re-captured elsewhere
    fn unmark_selected(&mut self, node: NodeId, field: FieldName);
    fn is_marked_selected(&self, node: NodeId) -> bool;
}

/// In-memory overlay recording what a browser overlay would draw
#[derive(Debug, Default)]
pub struct MarkerOverlay {
    mounted: bool,
    outlines: HashMap<NodeId, Outline>,
    selected: HashMap<NodeId, FieldName>,
    labels: BTreeMap<FieldName, (NodeId, String)>,
}

impl MarkerOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outline_of(&self, node: NodeId) -> Option<Outline> {
        self.outlines.get(&node).copied()
    }

    pub fn hover_count(&self) -> usize {
        self.outlines.values().filter(|o| **o == Outline::Hover).count()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Label shown for a field, with the node it is attached to
    pub fn label(&self, field: FieldName) -> Option<(NodeId, &str)> {
        self.labels.get(&field).map(|(node, text)| (*node, text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        !self.mounted && self.outlines.is_empty() && self.selected.is_empty() && self.labels.is_empty()
    }
}

impl Overlay for MarkerOverlay {
    fn mount(&mut self) {
        self.mounted = true;
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.labels.clear();
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn outline(&mut self, node: NodeId, outline: Outline) {
        self.outlines.insert(node, outline);
    }

    fn clear_outline(&mut self, node: NodeId) {
        self.outlines.remove(&node);
    }

    fn clear_hover_outlines(&mut self) {
        let selected = &self.selected;
        self.outlines
            .retain(|node, outline| *outline != Outline::Hover || selected.contains_key(node));
    }

    fn clear_outlines(&mut self) {
        self.outlines.clear();
        self.selected.clear();
    }

    fn mark_selected(&mut self, node: NodeId, field: FieldName) {
        self.outlines.insert(node, Outline::Selected);
        self.selected.insert(node, field);
        if self.mounted {
            self.labels.insert(field, (node, label_text(field)));
        }
    }

    fn unmark_selected(&mut self, node: NodeId, field: FieldName) {
        if self.selected.get(&node) != Some(&field) {
            return;
        }
        self.selected.remove(&node);
        self.outlines.remove(&node);
        if self.labels.get(&field).is_some_and(|(labelled, _)| *labelled == node) {
            self.labels.remove(&field);
        }
    }

    fn is_marked_selected(&self, node: NodeId) -> bool {
        self.selected.contains_key(&node)
    }
}
