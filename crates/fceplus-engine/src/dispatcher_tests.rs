use super::*;
use crate::aggregate::TOTAL_ID;
use fceplus_dataset::CourseId;
use fceplus_dom::Location;

const PLANNER_URL: &str = "https://s3.andrew.cmu.edu/sio/index.html#schedule-home";
const LISTING_URL: &str = "https://s3.andrew.cmu.edu/sio/index.html#semester-schedule";

fn id(s: &str) -> CourseId {
    CourseId::parse(s).unwrap()
}

fn dataset() -> ReferenceDataset {
    vec![
        (id("15780"), Some(10.5)),
        (id("11111"), Some(3.333)),
        (id("22222"), Some(3.334)),
    ]
    .into_iter()
    .collect()
}

fn units_label() -> Node {
    Node::element("div")
        .with_class("schedule-units-label")
        .with_text("Units: ")
        .with_child(Node::element("b").with_text("36"))
}

/// Planner page with the units label and an empty sidebar.
fn planner() -> (Dispatcher, Document, Node) {
    let doc = Document::new(Location::parse(PLANNER_URL).unwrap());
    doc.body().append_child(&units_label());
    let sidebar = Node::element("div").with_id("sidebar");
    doc.body().append_child(&sidebar);
    let dispatcher = Dispatcher::new(doc.clone(), &EngineConfig::default());
    (dispatcher, doc, sidebar)
}

/// Planner that is observing with the dataset loaded.
fn loaded_planner() -> (Dispatcher, Document, Node) {
    let (mut d, doc, sidebar) = planner();
    d.handle(HostEvent::DocumentReady);
    d.handle(HostEvent::DatasetLoaded(Ok(dataset())));
    (d, doc, sidebar)
}

fn course(label: &str) -> Node {
    Node::element("div")
        .with_class("gwt-course")
        .with_child(Node::element("div").with_class("txt").with_text(label))
}

fn flush(d: &mut Dispatcher, doc: &Document) {
    d.handle(HostEvent::Mutations(doc.take_records()));
}

fn total_text(doc: &Document) -> Option<String> {
    doc.get_element_by_id(TOTAL_ID).map(|n| n.text_content())
}

#[test]
fn test_lifecycle() {
    let (mut d, _, _) = planner();
    assert_eq!(d.state(), DispatcherState::Inactive);
    assert_eq!(d.mode(), PageMode::Interactive);

    d.handle(HostEvent::DocumentReady);
    assert_eq!(d.state(), DispatcherState::Observing);

    d.dispose();
    assert_eq!(d.state(), DispatcherState::Disposed);
    d.handle(HostEvent::DocumentReady);
    assert_eq!(d.state(), DispatcherState::Disposed);
}

#[test]
fn test_batches_before_observing_are_dropped() {
    let (mut d, doc, sidebar) = planner();
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 0.0);
    assert!(total_text(&doc).is_none());
}

#[test]
fn test_reference_and_fallback() {
    let (mut d, doc, sidebar) = loaded_planner();
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    doc.append_child(&sidebar, course("99999 :: 9 units"));
    flush(&mut d, &doc);

    assert_eq!(d.aggregate().total(), 19.5);
    assert!(d.aggregate().missing().contains(&id("99999")));
    assert_eq!(total_text(&doc).as_deref(), Some(" (FCE: 19.5 ⚠)"));
    assert!(sidebar.text_content().contains("15780 :: 9 units (FCE avg: 10.5)"));
    assert!(sidebar.text_content().contains("99999 :: 9 units (FCE: no data)"));
}

#[test]
fn test_duplicate_fire_counts_once() {
    let (mut d, doc, sidebar) = loaded_planner();
    let row = course("15780 :: 9 units");
    doc.append_child(&sidebar, row.clone());
    doc.record(MutationRecord::added(&sidebar, vec![row.clone()]));
    flush(&mut d, &doc);
    let text = row.text_content();

    doc.record(MutationRecord::added(&sidebar, vec![row.clone()]));
    flush(&mut d, &doc);

    assert_eq!(d.aggregate().total(), 10.5);
    assert_eq!(row.text_content(), text);
}

#[test]
fn test_add_then_remove_restores_total() {
    let (mut d, doc, sidebar) = loaded_planner();
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);
    let before = d.aggregate().total();

    let row = course("99999 :: 12 units");
    doc.append_child(&sidebar, row.clone());
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 22.5);

    doc.remove_child(&sidebar, &row);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), before);
    assert!(d.aggregate().missing().is_empty());
    assert_eq!(total_text(&doc).as_deref(), Some(" (FCE: 10.5)"));
}

#[test]
fn test_removed_subtree_is_reversed() {
    let (mut d, doc, sidebar) = loaded_planner();
    let group = Node::element("div")
        .with_child(course("15780 :: 9 units"))
        .with_child(course("99999 :: 9 units"));
    doc.append_child(&sidebar, group.clone());
    flush(&mut d, &doc);

    doc.remove_child(&sidebar, &group);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 0.0);
    assert_eq!(total_text(&doc).as_deref(), Some(""));
}

#[test]
fn test_rerender_in_one_batch() {
    let (mut d, doc, sidebar) = loaded_planner();
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);

    doc.replace_children(&sidebar, vec![course("15780 :: 9 units"), course("99999 :: 3 units")]);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 13.5);
}

#[test]
fn test_rounding_in_one_batch() {
    let (mut d, doc, sidebar) = loaded_planner();
    doc.replace_children(&sidebar, vec![course("11111 :: 9 units"), course("22222 :: 9 units")]);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 6.67);
    assert_eq!(total_text(&doc).as_deref(), Some(" (FCE: 6.67)"));
}

#[test]
fn test_missing_set_multiplicity() {
    let (mut d, doc, sidebar) = loaded_planner();
    let first = course("99999 :: 9 units");
    let second = course("99-999 :: 9 units");
    doc.append_child(&sidebar, first.clone());
    doc.append_child(&sidebar, second.clone());
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().missing().count(&id("99999")), 2);

    doc.remove_child(&sidebar, &first);
    flush(&mut d, &doc);
    assert!(d.aggregate().missing().contains(&id("99999")));

    doc.remove_child(&sidebar, &second);
    flush(&mut d, &doc);
    assert!(!d.aggregate().missing().contains(&id("99999")));
}

#[test]
fn test_hash_change_resets() {
    let (mut d, doc, sidebar) = loaded_planner();
    let row = course("99999 :: 9 units");
    doc.append_child(&sidebar, row.clone());
    flush(&mut d, &doc);
    assert!(d.aggregate().total() > 0.0);

    doc.set_hash("plan-schedule");
    d.handle(HostEvent::HashChange);
    assert_eq!(d.aggregate().total(), 0.0);
    assert!(d.aggregate().missing().is_empty());
    assert_eq!(total_text(&doc).as_deref(), Some(""));

    // The stale row leaving afterwards does not push the total negative.
    doc.remove_child(&sidebar, &row);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 0.0);
}

#[test]
fn test_removal_pending_across_navigation() {
    let (mut d, doc, sidebar) = loaded_planner();
    let row = course("99999 :: 9 units");
    doc.append_child(&sidebar, row.clone());
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 9.0);

    // The row leaves before navigation, its record is delivered after.
    doc.remove_child(&sidebar, &row);
    d.handle(HostEvent::HashChange);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 0.0);
    assert!(d.aggregate().missing().is_empty());
    assert_eq!(total_text(&doc).as_deref(), Some(""));

    // Brought back on the new page, it counts once.
    doc.append_child(&sidebar, row.clone());
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 9.0);
    assert_eq!(d.aggregate().missing().count(&id("99999")), 1);
    assert_eq!(row.text_content(), "99999 :: 9 units (FCE: no data)");
}

#[test]
fn test_hash_listener_waits_for_dataset() {
    let (mut d, _, _) = planner();
    d.handle(HostEvent::HashChange);
    assert!(!d.hash_listener_installed());
    assert_eq!(d.state(), DispatcherState::Inactive);

    d.handle(HostEvent::DatasetLoaded(Err(DatasetError::Network(
        "connection refused".to_string(),
    ))));
    assert!(d.hash_listener_installed());

    // Late subscription when document-ready never came.
    d.handle(HostEvent::HashChange);
    assert_eq!(d.state(), DispatcherState::Observing);
}

#[test]
fn test_failed_dataset_uses_declared_hours() {
    let (mut d, doc, sidebar) = planner();
    d.handle(HostEvent::DocumentReady);
    d.handle(HostEvent::DatasetLoaded(Err(DatasetError::Status {
        status: 404,
        url: "https://example.invalid/fce.json".to_string(),
    })));
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);

    assert_eq!(d.aggregate().total(), 9.0);
    assert!(d.aggregate().missing().is_empty());
    assert_eq!(sidebar.text_content(), "15780 :: 9 units");
}

#[test]
fn test_detail_popup_is_display_only() {
    let (mut d, doc, _) = loaded_planner();
    let cell = Node::element("div").with_text("12.0");
    let dialog = Node::element("div")
        .with_class("gwt-DialogBox")
        .with_child(Node::element("div").with_class("Caption").with_text("15-780 Graduate AI"))
        .with_child(
            Node::element("table")
                .with_class("course-description-sections-tbl")
                .with_child(
                    Node::element("tr").with_child(Node::element("td").with_child(cell.clone())),
                ),
        );
    doc.append_child(&doc.body(), dialog.clone());
    flush(&mut d, &doc);

    assert_eq!(cell.text_content(), "12.0 (FCE: 10.5)");
    assert_eq!(d.aggregate().total(), 0.0);

    doc.remove_child(&doc.body(), &dialog);
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 0.0);
}

#[test]
fn test_broken_popup_does_not_stop_batch() {
    let (mut d, doc, sidebar) = loaded_planner();
    let broken = Node::element("div").with_class("gwt-DialogBox").with_text("Loading...");
    doc.append_child(&doc.body(), broken);
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 10.5);
}

#[test]
fn test_calendar_entry_renders_once_label_arrives() {
    let doc = Document::new(Location::parse(PLANNER_URL).unwrap());
    let sidebar = Node::element("div");
    doc.body().append_child(&sidebar);
    let mut d = Dispatcher::new(doc.clone(), &EngineConfig::default());
    d.handle(HostEvent::DocumentReady);
    d.handle(HostEvent::DatasetLoaded(Ok(dataset())));

    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);
    assert!(total_text(&doc).is_none());

    let calendar = Node::element("div")
        .with_child(units_label())
        .with_child(Node::element("div").with_class("gwt-appointment").with_text("15-780"));
    doc.append_child(&doc.body(), calendar);
    flush(&mut d, &doc);
    assert_eq!(total_text(&doc).as_deref(), Some(" (FCE: 10.5)"));
}

#[test]
fn test_static_listing_scan() {
    let doc = Document::new(Location::parse(LISTING_URL).unwrap());
    let body = doc.body();
    body.append_child(&units_label());
    for text in ["15-780 Mon", "15-780 Wed", "15-780 Fri"] {
        body.append_child(&Node::element("div").with_class("gwt-appointment").with_text(text));
    }
    let mut d = Dispatcher::new(doc.clone(), &EngineConfig::default());
    assert_eq!(d.mode(), PageMode::StaticListing);

    d.handle(HostEvent::DocumentReady);
    assert_eq!(d.state(), DispatcherState::Inactive);

    d.handle(HostEvent::PageLoad);
    assert!(total_text(&doc).is_none());

    d.handle(HostEvent::DatasetLoaded(Ok(dataset())));
    assert_eq!(d.aggregate().total(), 10.5);
    assert_eq!(total_text(&doc).as_deref(), Some(" (FCE: 10.5)"));

    // One-shot: a second page-load does not rescan.
    body.append_child(&Node::element("div").with_class("gwt-appointment").with_text("99-999 9 units"));
    d.handle(HostEvent::PageLoad);
    assert_eq!(d.aggregate().total(), 10.5);
}

#[test]
fn test_static_listing_ignores_navigation() {
    let doc = Document::new(Location::parse(LISTING_URL).unwrap());
    let body = doc.body();
    body.append_child(&units_label());
    for text in ["15-780 Mon", "15-780 Wed"] {
        body.append_child(&Node::element("div").with_class("gwt-appointment").with_text(text));
    }
    let mut d = Dispatcher::new(doc.clone(), &EngineConfig::default());
    d.handle(HostEvent::DatasetLoaded(Ok(dataset())));
    d.handle(HostEvent::PageLoad);
    assert_eq!(d.aggregate().total(), 10.5);

    d.handle(HostEvent::HashChange);
    assert_eq!(d.state(), DispatcherState::Inactive);

    let sidebar = Node::element("div");
    doc.append_child(&body, sidebar.clone());
    doc.append_child(&sidebar, course("15780 :: 9 units"));
    flush(&mut d, &doc);
    assert_eq!(d.aggregate().total(), 10.5);

    d.handle(HostEvent::HashChange);
    assert_eq!(d.aggregate().total(), 10.5);
    assert_eq!(total_text(&doc).as_deref(), Some(" (FCE: 10.5)"));
}
