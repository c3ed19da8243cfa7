//! Capture session lifecycle driven through the request/event protocol

use pluck::capture::ListenerKind;
use pluck::field::FieldName;
use pluck::overlay::{MarkerOverlay, Outline, Overlay};
use pluck::page::Page;
use pluck::protocol::{Event, PageController, Request, Response};

const PAGE_HTML: &str = r#"
<html>
<head><title>Widget Pro</title></head>
<body>
    <div class="product">
        <h1 class="name">Widget Pro</h1>
        <p class="cost-now">$19.00</p>
        <p class="cost-was">$25.00</p>
        <div class="gallery"><img data-src="/img/widget.png"></div>
    </div>
</body>
</html>
"#;

fn page() -> Page {
    Page::parse("https://shop.example/widget", PAGE_HTML).unwrap()
}

fn request(json: &str) -> Request {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_capture_flow_over_the_wire() {
    let page = page();
    let mut controller = PageController::new(&page, MarkerOverlay::new());

    let ack = controller.handle(request(r#"{"type": "start-element-selection", "field": "productName"}"#));
    assert_eq!(
        serde_json::to_value(&ack).unwrap(),
        serde_json::json!({"success": true, "field": "productName"})
    );
    assert_eq!(controller.session().listeners().count(ListenerKind::Click), 1);

    let name = page.select_first("h1").unwrap();
    controller.hover(name);
    assert_eq!(controller.overlay().outline_of(name.id()), Some(Outline::Hover));

    let event = controller.click(name).unwrap();
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        serde_json::json!({"type": "selector-captured", "field": "productName", "selector": "h1.name"})
    );
    assert_eq!(controller.overlay().outline_of(name.id()), Some(Outline::Selected));
    assert_eq!(
        controller.overlay().label(FieldName::ProductName).map(|(_, text)| text),
        Some("Selected: productName")
    );
    assert_eq!(controller.session().listeners().count(ListenerKind::Click), 0);
}

#[test]
fn test_stale_click_is_ignored() {
    let page = page();
    let mut controller = PageController::new(&page, MarkerOverlay::new());
    let price = page.select_first("p.cost-now").unwrap();

    assert_eq!(controller.click(price), None);
    assert!(controller.session().highlights().is_empty());
}

#[test]
fn test_captured_selectors_feed_a_crawl() {
    let page = page();
    let mut controller = PageController::new(&page, MarkerOverlay::new());

    for (field, target) in [
        (FieldName::ProductName, "h1"),
        (FieldName::Price, "p.cost-was"),
        (FieldName::Price, "p.cost-now"),
        (FieldName::Image, "div.gallery"),
    ] {
        controller.handle(Request::StartElementSelection { field });
        let el = page.select_first(target).unwrap();
        assert!(controller.click(el).is_some());
    }

    let was = page.select_first("p.cost-was").unwrap();
    assert_eq!(controller.overlay().outline_of(was.id()), None);
    assert_eq!(controller.overlay().selected_count(), 3);

    let selectors = controller.captured_selectors();
    assert_eq!(selectors.get(FieldName::Price), Some("p.cost-now"));

    let Response::Crawled { data } = controller.handle(Request::CrawlCurrentPage { selectors }) else {
        panic!("expected crawl response");
    };
    assert_eq!(data.source_url, "https://shop.example/widget");
    assert_eq!(data.page_title, "Widget Pro");
    assert_eq!(data.field(FieldName::ProductName), Some("Widget Pro"));
    assert_eq!(data.field(FieldName::Price), Some("$19.00"));
    assert_eq!(data.field(FieldName::Image), Some("https://shop.example/img/widget.png"));
    assert_eq!(data.field(FieldName::Sku), None);
}

#[test]
fn test_clear_twice_matches_clear_once() {
    let page = page();
    let mut once = PageController::new(&page, MarkerOverlay::new());
    let mut twice = PageController::new(&page, MarkerOverlay::new());
    let name = page.select_first("h1").unwrap();

    for controller in [&mut once, &mut twice] {
        controller.handle(Request::StartElementSelection { field: FieldName::ProductName });
        controller.click(name);
        controller.handle(Request::StartElementSelection { field: FieldName::Price });
        controller.hover(page.select_first("p.cost-now").unwrap());
    }

    once.handle(Request::ClearSelections);
    twice.handle(Request::ClearSelections);
    let reply = twice.handle(Request::ClearSelections);
    assert!(matches!(reply, Response::Cleared {}));

    for controller in [&once, &twice] {
        assert_eq!(controller.session().active_field(), None);
        assert!(controller.session().highlights().is_empty());
        assert!(controller.session().listeners().is_empty());
        assert!(controller.overlay().is_empty());
    }
}

#[test]
fn test_teardown_releases_everything() {
    let page = page();
    let mut controller = PageController::new(&page, MarkerOverlay::new());

    controller.handle(Request::StartElementSelection { field: FieldName::Image });
    assert!(!controller.session().listeners().is_empty());
    assert!(controller.overlay().is_mounted());

    controller.teardown();
    controller.teardown();
    assert!(controller.session().listeners().is_empty());
    assert!(!controller.overlay().is_mounted());
}
