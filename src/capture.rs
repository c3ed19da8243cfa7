//! Interactive selector capture.
//!
//! A session runs from "start capture for field X" until the operator clicks
//! an element (or the session is cancelled). While it runs exactly one click
//! listener and one hover listener are registered; starting again first
//! releases the previous pair.

use ego_tree::NodeId;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::field::FieldName;
use crate::overlay::{Outline, Overlay};
use crate::page::Page;
use crate::selector::synthesize;

/// Host-page events a session listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Click,
    Hover,
    /// Scroll/resize, keeps overlay labels next to their elements
    Viewport,
}

/// Handle for a registered listener; give it back to unsubscribe
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    kind: ListenerKind,
}

impl Subscription {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

/// Listeners currently registered on the host page
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    active: BTreeMap<u64, ListenerKind>,
}

impl ListenerRegistry {
    pub fn subscribe(&mut self, kind: ListenerKind) -> Subscription {
        self.next_id += 1;
        self.active.insert(self.next_id, kind);
        Subscription {
            id: self.next_id,
            kind,
        }
    }

    /// Returns false if the handle was already released
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.active.remove(&subscription.id).is_some()
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.active.values().filter(|k| **k == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// The element captured for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub node: NodeId,
    pub selector: String,
}

/// Current selection per field; selecting again replaces the previous one
#[derive(Debug, Default)]
pub struct HighlightState {
    selections: BTreeMap<FieldName, Selection>,
}

impl HighlightState {
    /// Record a selection, returning the one it replaced
    pub fn select(&mut self, field: FieldName, selection: Selection) -> Option<Selection> {
        self.selections.insert(field, selection)
    }

    pub fn get(&self, field: FieldName) -> Option<&Selection> {
        self.selections.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &Selection)> {
        self.selections.iter().map(|(f, s)| (*f, s))
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }
}

/// Synchronous reply to "start capture"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAck {
    pub success: bool,
    pub field: FieldName,
}

/// Emitted once per completed capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedSelector {
    pub field: FieldName,
    pub selector: String,
}

#[derive(Debug, Default)]
pub struct CaptureSession {
    active: Option<FieldName>,
    highlights: HighlightState,
    listeners: ListenerRegistry,
    click: Option<Subscription>,
    hover: Option<Subscription>,
    viewport: Option<Subscription>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field being captured, if a session is running
    pub fn active_field(&self) -> Option<FieldName> {
        self.active
    }

    pub fn highlights(&self) -> &HighlightState {
        &self.highlights
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Begin capturing `field`, replacing any running session
    pub fn start(&mut self, field: FieldName, overlay: &mut dyn Overlay) -> StartAck {
        self.release_session_listeners();
        overlay.clear_hover_outlines();

        if !overlay.is_mounted() {
            overlay.mount();
        }
        if self.viewport.is_none() {
            self.viewport = Some(self.listeners.subscribe(ListenerKind::Viewport));
        }

        self.active = Some(field);
        self.click = Some(self.listeners.subscribe(ListenerKind::Click));
        self.hover = Some(self.listeners.subscribe(ListenerKind::Hover));

        info!(field = %field, "started selection");
        StartAck {
            success: true,
            field,
        }
    }

    /// Pointer entered `node`
    pub fn hover(&self, node: NodeId, overlay: &mut dyn Overlay) {
        let Some(field) = self.active else {
            return;
        };
        if self.hover.is_none() {
            return;
        }
        let already_selected = self
            .highlights
            .get(field)
            .is_some_and(|selection| selection.node == node);
        if already_selected || overlay.is_marked_selected(node) {
            return;
        }
        overlay.outline(node, Outline::Hover);
    }

    /// Pointer left `node`
    pub fn hover_out(&self, node: NodeId, overlay: &mut dyn Overlay) {
        if !overlay.is_marked_selected(node) {
            overlay.clear_outline(node);
        }
    }

    /// The operator clicked `el`. Without a running session the click is a
    /// stale or duplicate event and is ignored.
    pub fn click(
        &mut self,
        page: &Page,
        el: ElementRef<'_>,
        overlay: &mut dyn Overlay,
    ) -> Option<CapturedSelector> {
        let field = match (self.active, &self.click) {
            (Some(field), Some(_)) => field,
            _ => {
                debug!("click outside a capture session, ignoring");
                return None;
            }
        };

        let node = el.id();
        let selector = synthesize(page, el);
        info!(field = %field, selector = %selector, "captured selector");

        let previous = self.highlights.select(
            field,
            Selection {
                node,
                selector: selector.clone(),
            },
        );
        if let Some(previous) = previous.filter(|p| p.node != node) {
            overlay.unmark_selected(previous.node, field);
        }
        overlay.mark_selected(node, field);

        self.release_session_listeners();
        overlay.clear_hover_outlines();

        Some(CapturedSelector { field, selector })
    }

    /// Stop the running session, keeping existing selections
    pub fn cancel(&mut self, overlay: &mut dyn Overlay) {
        self.release_session_listeners();
        overlay.clear_hover_outlines();
    }

    /// Forget every selection and remove all visual state. Safe to repeat.
    pub fn clear(&mut self, overlay: &mut dyn Overlay) {
        self.cancel(overlay);
        self.highlights.clear();
        overlay.clear_outlines();
        overlay.unmount();
        if let Some(viewport) = self.viewport.take() {
            self.listeners.unsubscribe(viewport);
        }
        info!("cleared all selections");
    }

    /// The host page is going away
    pub fn teardown(&mut self, overlay: &mut dyn Overlay) {
        self.clear(overlay);
    }

    fn release_session_listeners(&mut self) {
        if let Some(click) = self.click.take() {
            self.listeners.unsubscribe(click);
        }
        if let Some(hover) = self.hover.take() {
            self.listeners.unsubscribe(hover);
        }
        self.active = None;
    }
}
