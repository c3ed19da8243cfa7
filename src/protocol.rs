//! Messages exchanged with the collaborator driving a page, and the
//! controller that answers them.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::{CaptureSession, CapturedSelector, StartAck};
use crate::crawl::{crawl_page, ExtractionRecord};
use crate::field::{FieldName, SelectorMap};
use crate::overlay::Overlay;
use crate::page::Page;

/// Inbound requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    StartElementSelection { field: FieldName },
    ClearSelections,
    CrawlCurrentPage { selectors: SelectorMap },
}

/// Synchronous replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Started(StartAck),
    Crawled { data: ExtractionRecord },
    Cleared {},
}

/// Outbound events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    SelectorCaptured { field: FieldName, selector: String },
}

impl From<CapturedSelector> for Event {
    fn from(captured: CapturedSelector) -> Self {
        Event::SelectorCaptured {
            field: captured.field,
            selector: captured.selector,
        }
    }
}

/// Serves requests for one loaded page
pub struct PageController<'p, O: Overlay> {
    page: &'p Page,
    session: CaptureSession,
    overlay: O,
}

impl<'p, O: Overlay> PageController<'p, O> {
    pub fn new(page: &'p Page, overlay: O) -> Self {
        Self {
            page,
            session: CaptureSession::new(),
            overlay,
        }
    }

    pub fn page(&self) -> &'p Page {
        self.page
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn handle(&mut self, request: Request) -> Response {
        debug!(?request, "received request");
        match request {
            Request::StartElementSelection { field } => {
                Response::Started(self.session.start(field, &mut self.overlay))
            }
            Request::ClearSelections => {
                self.session.clear(&mut self.overlay);
                Response::Cleared {}
            }
            Request::CrawlCurrentPage { selectors } => Response::Crawled {
                data: crawl_page(self.page, &selectors),
            },
        }
    }

    pub fn hover(&mut self, el: ElementRef<'_>) {
        self.session.hover(el.id(), &mut self.overlay);
    }

    pub fn hover_out(&mut self, el: ElementRef<'_>) {
        self.session.hover_out(el.id(), &mut self.overlay);
    }

    /// Operator click; yields the event to publish when it completes a capture
    pub fn click(&mut self, el: ElementRef<'_>) -> Option<Event> {
        self.session
            .click(self.page, el, &mut self.overlay)
            .map(Event::from)
    }

    /// Page navigation: release listeners and overlay state
    pub fn teardown(&mut self) {
        self.session.teardown(&mut self.overlay);
    }

    /// Selector map built from this page's current selections
    pub fn captured_selectors(&self) -> SelectorMap {
        self.session
            .highlights()
            .iter()
            .map(|(field, selection)| (field, selection.selector.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::MarkerOverlay;

    #[test]
    fn test_request_wire_format() {
        let start: Request =
            serde_json::from_str(r#"{"type": "start-element-selection", "field": "price"}"#).unwrap();
        assert_eq!(start, Request::StartElementSelection { field: FieldName::Price });

        let clear: Request = serde_json::from_str(r#"{"type": "clear-selections"}"#).unwrap();
        assert_eq!(clear, Request::ClearSelections);

        let crawl: Request = serde_json::from_str(
            r#"{"type": "crawl-current-page", "selectors": {"price": ".p", "sku": ""}}"#,
        )
        .unwrap();
        match crawl {
            Request::CrawlCurrentPage { selectors } => {
                assert_eq!(selectors.get(FieldName::Price), Some(".p"));
                assert_eq!(selectors.fields().count(), 2);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_event_wire_format() {
        let event = Event::SelectorCaptured {
            field: FieldName::ProductName,
            selector: "h1.title".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "selector-captured");
        assert_eq!(json["field"], "productName");
        assert_eq!(json["selector"], "h1.title");
    }

    #[test]
    fn test_controller_capture_then_crawl() {
        let page = Page::parse(
            "https://shop.example/p",
            r#"<h1 class="title">Acme</h1><span class="price">$5</span>"#,
        )
        .unwrap();
        let mut controller = PageController::new(&page, MarkerOverlay::new());

        let reply = controller.handle(Request::StartElementSelection { field: FieldName::Price });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["field"], "price");

        let el = page.select_first("span.price").unwrap();
        controller.hover(el);
        let event = controller.click(el).unwrap();
        assert_eq!(
            event,
            Event::SelectorCaptured {
                field: FieldName::Price,
                selector: "span.price".into()
            }
        );
        assert_eq!(controller.click(el), None);

        let selectors = controller.captured_selectors();
        match controller.handle(Request::CrawlCurrentPage { selectors }) {
            Response::Crawled { data } => assert_eq!(data.field(FieldName::Price), Some("$5")),
            other => panic!("unexpected response {:?}", other),
        }

        controller.handle(Request::ClearSelections);
        assert!(controller.session().highlights().is_empty());
        assert!(controller.overlay().is_empty());
    }
}
