//! Behaviour tests for the select widget.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_select::core::{
    AttributeChanges, Document, DocumentTreeDebug, ElementId, Event, EventTarget, EventType, Key,
    KeyboardModifiers, Layout, MutationRecord, ObserverOptions, Rect, Size, TreeFormatOptions,
    UpgradePolicy,
};
use horizon_select::{
    AccessibilityStrategy, DropdownState, OpeningPosition, PickerStyle, Select, SelectConfig,
    SelectMode, VerticalAlignment, names,
};
use parking_lot::Mutex;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Fixture {
    doc: Document,
    root: ElementId,
    native: ElementId,
    ui: ElementId,
    options: Vec<ElementId>,
}

/// `<div><select>options</select><span data-select-ui></span></div>` in the
/// body. Each option is `(label, disabled)`.
fn fixture_with(doc: Document, options: &[(&str, bool)]) -> Fixture {
    let root = doc.create_element("div");
    let native = doc.create_element("select");
    let options = options
        .iter()
        .map(|&(label, disabled)| {
            let option = doc.create_element("option");
            doc.set_text(option, label).unwrap();
            doc.toggle_attribute(option, "disabled", disabled).unwrap();
            doc.append_child(native, option).unwrap();
            option
        })
        .collect();
    let ui = doc.create_element("span");
    doc.set_attribute(ui, names::UI_CONTAINER, "").unwrap();
    doc.append_child(root, native).unwrap();
    doc.append_child(root, ui).unwrap();
    doc.append_child(doc.body(), root).unwrap();
    Fixture {
        doc,
        root,
        native,
        ui,
        options,
    }
}

fn fixture(options: &[(&str, bool)]) -> Fixture {
    fixture_with(Document::new(), options)
}

fn fruits() -> Fixture {
    fixture(&[("Apple", false), ("Pear", false), ("Plum", false)])
}

fn mounted(fx: &Fixture, config: SelectConfig) -> Select {
    let select = Select::builder(&fx.doc, fx.root).config(config).build().unwrap();
    select.mount().unwrap();
    select
}

fn count_events(doc: &Document, target: impl Into<EventTarget>, event_type: EventType) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    doc.add_listener(target, event_type, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    count
}

fn record_mutations(doc: &Document, target: ElementId, options: ObserverOptions) -> Arc<Mutex<Vec<MutationRecord>>> {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();
    doc.observe(target, options, move |batch: &[MutationRecord]| {
        sink.lock().extend_from_slice(batch);
    })
    .unwrap();
    records
}

fn press(doc: &Document, target: ElementId, key: Key) -> Event {
    doc.key_down(target, key, KeyboardModifiers::NONE).unwrap()
}

#[test]
fn test_builds_single_mode_ui() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());

    assert_eq!(select.mode(), Some(SelectMode::Single));
    let button = select.button().expect("single mode has a button");
    assert_eq!(fx.doc.parent(button.element()), Some(fx.ui));
    assert_eq!(fx.doc.text(button.element()).as_deref(), Some("Apple"));

    let panel = select.panel().expect("single mode has a panel");
    let options = select.options().unwrap();
    assert_eq!(fx.doc.parent(select.dropdown_content()), Some(panel.element()));
    assert_eq!(fx.doc.parent(options.element()), Some(select.dropdown_content()));
    assert!(fx.doc.has_attribute(select.dropdown_content(), names::DROPDOWN));
    assert!(fx.doc.has_attribute(select.dropdown_content(), names::TETHERED_CONTENT));
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
}

#[test]
fn test_builds_multiple_mode_ui() {
    setup();
    let fx = fruits();
    fx.doc.set_attribute(fx.native, "multiple", "").unwrap();
    let select = mounted(&fx, SelectConfig::default());

    assert_eq!(select.mode(), Some(SelectMode::Multiple));
    assert!(select.button().is_none());
    assert!(select.panel().is_none());
    let list = select.options().unwrap();
    assert_eq!(fx.doc.children(fx.ui), vec![list.element()]);
    assert_eq!(fx.doc.children(list.element()).len(), 3);
}

#[test]
fn test_mode_flips_keep_button_xor_inline_list() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());

    for multiple in [true, false, true, true, false, false, true] {
        fx.doc.toggle_attribute(fx.native, "multiple", multiple).unwrap();
        fx.doc.flush();

        let children = fx.doc.children(fx.ui);
        assert_eq!(children.len(), 1);
        let has_button = select.button().is_some();
        let has_inline_list = select
            .options()
            .is_some_and(|list| children.contains(&list.element()));
        assert!(has_button ^ has_inline_list);
        assert_eq!(has_inline_list, multiple);
    }
}

#[test]
fn test_unrelated_mutations_do_not_rebuild() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    let button = select.button().unwrap().element();

    fx.doc.set_attribute(fx.options[1], "selected", "").unwrap();
    fx.doc.set_attribute(fx.native, "disabled", "").unwrap();
    fx.doc.remove_attribute(fx.native, "disabled").unwrap();
    fx.doc.flush();

    assert_eq!(select.button().unwrap().element(), button);
    assert!(fx.doc.exists(button));
}

#[test]
fn test_toggle_opens_and_tethers() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());

    fx.doc.click(fx.ui);
    assert_eq!(select.dropdown_state(), DropdownState::Open);
    let panel = select.panel().unwrap();
    assert_eq!(fx.doc.parent(panel.element()), Some(fx.doc.body()));
    assert_eq!(panel.tether(), Some(fx.ui));
    assert_eq!(panel.min_bottom_space(), 160.0);
    assert!(fx.doc.has_attribute(select.button().unwrap().element(), names::OPEN));
    assert_eq!(fx.doc.active_element(), Some(fx.native));

    fx.doc.click(fx.ui);
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
    assert!(!fx.doc.has_attribute(select.button().unwrap().element(), names::OPEN));
}

#[test]
fn test_disabled_control_ignores_toggle() {
    setup();
    let fx = fruits();
    fx.doc.set_attribute(fx.native, "disabled", "").unwrap();
    let select = mounted(&fx, SelectConfig::default());

    fx.doc.click(fx.ui);
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
    assert_eq!(fx.doc.active_element(), None);
}

#[test]
fn test_multiple_mode_click_only_focuses() {
    setup();
    let fx = fruits();
    fx.doc.set_attribute(fx.native, "multiple", "").unwrap();
    let select = mounted(&fx, SelectConfig::default());

    fx.doc.click(fx.ui);
    select.toggle();
    select.close();
    assert_eq!(fx.doc.active_element(), Some(fx.native));
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
}

#[test]
fn test_outside_click_closes() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    select.toggle();
    assert!(select.is_open());

    let elsewhere = fx.doc.create_element("p");
    fx.doc.append_child(fx.doc.body(), elsewhere).unwrap();
    fx.doc.click(elsewhere);

    assert!(!select.is_open());
    assert!(!fx.doc.has_attribute(select.button().unwrap().element(), names::OPEN));
}

#[test]
fn test_choosing_an_option_updates_native_and_closes() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    let changes = count_events(&fx.doc, fx.native, EventType::Change);
    select.toggle();

    let list = select.options().unwrap();
    let pear = fx.doc.children(list.element())[1];
    fx.doc.click(pear);

    assert_eq!(select.native().unwrap().selected_index(), Some(1));
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
    assert_eq!(fx.doc.text(select.button().unwrap().element()).as_deref(), Some("Pear"));
}

#[test]
fn test_open_then_close_before_ready_leaves_closed() {
    setup();
    let doc = Document::new();
    doc.set_upgrade_policy(UpgradePolicy::Manual);
    let fx = fixture_with(doc, &[("Apple", false), ("Pear", false)]);
    let select = mounted(&fx, SelectConfig::default());
    let panel = select.panel().unwrap();
    let list = select.options().unwrap();

    select.toggle();
    assert_eq!(select.dropdown_state(), DropdownState::Opening);
    select.toggle();
    assert_eq!(select.dropdown_state(), DropdownState::Closed);

    fx.doc.mark_ready(panel.element()).unwrap();
    fx.doc.mark_ready(list.element()).unwrap();
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
    assert_eq!(fx.doc.parent(panel.element()), None);
    assert_eq!(panel.tether(), None);
}

fn open_with_ready_order(panel_first: bool) -> (Option<ElementId>, ElementId) {
    let doc = Document::new();
    doc.set_upgrade_policy(UpgradePolicy::Manual);
    let fx = fixture_with(doc, &[("Apple", false), ("Pear", false)]);
    let select = mounted(&fx, SelectConfig::default());
    let panel = select.panel().unwrap();
    let list = select.options().unwrap();

    select.toggle();
    let (first, second) = if panel_first {
        (panel.element(), list.element())
    } else {
        (list.element(), panel.element())
    };
    fx.doc.mark_ready(first).unwrap();
    assert_eq!(select.dropdown_state(), DropdownState::Opening);
    fx.doc.mark_ready(second).unwrap();
    assert_eq!(select.dropdown_state(), DropdownState::Open);
    assert_eq!(fx.doc.children(list.element()).len(), 2);

    (panel.tether(), fx.ui)
}

#[test]
fn test_readiness_join_is_commutative() {
    setup();
    let (tether, ui) = open_with_ready_order(true);
    assert_eq!(tether, Some(ui));
    let (tether, ui) = open_with_ready_order(false);
    assert_eq!(tether, Some(ui));
}

#[test]
fn test_button_ready_after_open_shows_open() {
    setup();
    let doc = Document::new();
    doc.set_upgrade_policy(UpgradePolicy::Manual);
    let fx = fixture_with(doc, &[("Apple", false)]);
    let select = mounted(&fx, SelectConfig::default());
    let button = select.button().unwrap();

    select.toggle();
    assert!(!fx.doc.has_attribute(button.element(), names::OPEN));
    fx.doc.mark_ready(button.element()).unwrap();
    assert!(fx.doc.has_attribute(button.element(), names::OPEN));
    assert_eq!(fx.doc.text(button.element()).as_deref(), Some("Apple"));
}

/// Anchor near the viewport bottom so the panel opens upward, and give the
/// dropdown content a measured box.
fn layout_for_top_alignment(fx: &Fixture, select: &Select) {
    fx.doc.set_viewport(Size::new(1000.0, 800.0));
    fx.doc
        .set_layout(fx.ui, Layout::with_bounds(Rect::new(0.0, 700.0, 200.0, 30.0)))
        .unwrap();
    fx.doc
        .set_layout(
            select.dropdown_content(),
            Layout::with_bounds(Rect::new(0.0, 300.0, 200.0, 400.0)),
        )
        .unwrap();
    fx.doc
        .set_layout(
            select.options().unwrap().element(),
            Layout::with_bounds(Rect::new(0.0, 300.0, 200.0, 400.0))
                .with_scroll_height(998.0)
                .with_borders(1.0, 1.0),
        )
        .unwrap();
}

#[test]
fn test_opens_upward_near_viewport_bottom() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    layout_for_top_alignment(&fx, &select);

    select.toggle();
    assert_eq!(select.panel().unwrap().vertical_alignment(), VerticalAlignment::Top);
    assert_eq!(select.dropdown_position(), Some(VerticalAlignment::Top));
    assert_eq!(
        fx.doc
            .attribute(select.button().unwrap().element(), names::OPENING_POSITION)
            .as_deref(),
        Some(OpeningPosition::Up.as_str())
    );
    assert_eq!(fx.doc.explicit_height(select.dropdown_content()), Some(700.0));
}

#[test]
fn test_height_reconciliation_is_idempotent() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    layout_for_top_alignment(&fx, &select);
    select.toggle();

    let records = record_mutations(
        &fx.doc,
        select.dropdown_content(),
        ObserverOptions::new().attribute_filter(["style"]),
    );
    for _ in 0..2 {
        fx.doc
            .dispatch_event(EventTarget::Window, Event::new(EventType::Scroll, false, false));
    }
    assert!(records.lock().is_empty());
}

#[test]
fn test_bottom_aligned_height_fits_viewport() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default().with_min_bottom_space(0.0));
    fx.doc.set_viewport(Size::new(1000.0, 800.0));
    fx.doc
        .set_layout(fx.ui, Layout::with_bounds(Rect::new(0.0, 100.0, 200.0, 30.0)))
        .unwrap();
    fx.doc
        .set_layout(
            select.dropdown_content(),
            Layout::with_bounds(Rect::new(0.0, 130.0, 200.0, 90.0)),
        )
        .unwrap();
    fx.doc
        .set_layout(
            select.options().unwrap().element(),
            Layout::with_bounds(Rect::new(0.0, 130.0, 200.0, 90.0)).with_scroll_height(90.0),
        )
        .unwrap();

    select.toggle();
    assert_eq!(select.dropdown_position(), Some(VerticalAlignment::Bottom));
    // Natural height already matches; nothing to write.
    assert_eq!(fx.doc.explicit_height(select.dropdown_content()), None);

    fx.doc.set_viewport(Size::new(1000.0, 180.0));
    assert_eq!(fx.doc.explicit_height(select.dropdown_content()), Some(50.0));
}

#[test]
fn test_min_bottom_space_propagates_live() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default().with_min_bottom_space(200.0));
    assert_eq!(select.min_bottom_space(), 200.0);

    select.toggle();
    let panel = select.panel().unwrap();
    assert_eq!(panel.min_bottom_space(), 200.0);

    select.set_min_bottom_space(500.0).unwrap();
    assert_eq!(select.min_bottom_space(), 500.0);
    assert_eq!(panel.min_bottom_space(), 500.0);
}

#[test]
fn test_min_bottom_space_rejects_invalid_values() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    select.toggle();
    let panel = select.panel().unwrap();

    for pixels in [f32::NAN, f32::INFINITY, -1.0] {
        let err = select.set_min_bottom_space(pixels).unwrap_err();
        assert!(matches!(err, horizon_select::SelectError::Config(_)));
    }
    assert_eq!(select.min_bottom_space(), 160.0);
    assert_eq!(panel.min_bottom_space(), 160.0);

    select.set_min_bottom_space(0.0).unwrap();
    assert_eq!(panel.min_bottom_space(), 0.0);
}

#[test]
fn test_blur_debounce_keeps_marker_on_quick_refocus() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    let button = select.button().unwrap().element();
    let records = record_mutations(
        &fx.doc,
        button,
        ObserverOptions::new().attribute_filter([names::ACTIVE]),
    );

    fx.doc.focus(fx.native).unwrap();
    assert!(fx.doc.has_attribute(button, names::ACTIVE));

    fx.doc.blur(fx.native);
    fx.doc.advance_time(Duration::from_millis(10));
    fx.doc.focus(fx.native).unwrap();
    fx.doc.advance_time(Duration::from_millis(100));

    assert!(fx.doc.has_attribute(button, names::ACTIVE));
    // One write per focus and no removal in between.
    assert_eq!(records.lock().len(), 2);
    assert!(
        records
            .lock()
            .iter()
            .all(|record| record.attribute_name() == Some(names::ACTIVE))
    );
    assert_eq!(fx.doc.active_timers(), 0);
}

#[test]
fn test_blur_removes_marker_after_debounce() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    let button = select.button().unwrap().element();

    fx.doc.focus(fx.native).unwrap();
    fx.doc.blur(fx.native);
    fx.doc.advance_time(Duration::from_millis(20));
    assert!(fx.doc.has_attribute(button, names::ACTIVE));
    fx.doc.advance_time(Duration::from_millis(20));
    assert!(!fx.doc.has_attribute(button, names::ACTIVE));
}

#[test]
fn test_multiple_mode_marks_inline_list() {
    setup();
    let fx = fruits();
    fx.doc.set_attribute(fx.native, "multiple", "").unwrap();
    let select = mounted(&fx, SelectConfig::default());
    let list = select.options().unwrap().element();

    fx.doc.focus(fx.native).unwrap();
    assert!(fx.doc.has_attribute(list, names::ACTIVE));
}

fn os_picker() -> SelectConfig {
    SelectConfig::default().with_picker(PickerStyle::OsPopup)
}

#[test]
fn test_arrow_down_skips_disabled_option() {
    setup();
    let fx = fixture(&[("A", false), ("B", true), ("C", false)]);
    let select = mounted(&fx, os_picker());
    let changes = count_events(&fx.doc, fx.native, EventType::Change);

    let event = press(&fx.doc, fx.native, Key::ArrowDown);
    assert!(event.is_default_prevented());
    assert_eq!(select.native().unwrap().selected_index(), Some(2));
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
}

#[test]
fn test_arrow_down_at_end_does_nothing() {
    setup();
    let fx = fixture(&[("A", false), ("B", true), ("C", false)]);
    let select = mounted(&fx, os_picker());
    fx.doc.set_attribute(fx.options[2], "selected", "").unwrap();
    let changes = count_events(&fx.doc, fx.native, EventType::Change);

    press(&fx.doc, fx.native, Key::ArrowDown);
    assert_eq!(select.native().unwrap().selected_index(), Some(2));
    assert_eq!(changes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_arrow_skips_disabled_group() {
    setup();
    let fx = fixture(&[("A", false)]);
    let group = fx.doc.create_element("optgroup");
    fx.doc.set_attribute(group, "disabled", "").unwrap();
    let grouped = fx.doc.create_element("option");
    fx.doc.set_text(grouped, "Grouped").unwrap();
    fx.doc.append_child(group, grouped).unwrap();
    fx.doc.append_child(fx.native, group).unwrap();
    let last = fx.doc.create_element("option");
    fx.doc.set_text(last, "Z").unwrap();
    fx.doc.append_child(fx.native, last).unwrap();
    let select = mounted(&fx, os_picker());

    press(&fx.doc, fx.native, Key::ArrowDown);
    assert_eq!(select.native().unwrap().selected_label().as_deref(), Some("Z"));
    press(&fx.doc, fx.native, Key::ArrowUp);
    assert_eq!(select.native().unwrap().selected_label().as_deref(), Some("A"));
}

#[test]
fn test_inline_picker_leaves_arrows_to_native() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default().with_picker(PickerStyle::Inline));

    let event = press(&fx.doc, fx.native, Key::ArrowDown);
    assert!(!event.is_default_prevented());
    assert_eq!(select.native().unwrap().selected_index(), Some(0));
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
}

#[test]
fn test_arrow_with_modifier_toggles() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, os_picker());

    let event = fx
        .doc
        .key_down(fx.native, Key::ArrowDown, KeyboardModifiers::ALT)
        .unwrap();
    assert!(event.is_default_prevented());
    assert!(select.is_open());
    assert_eq!(select.native().unwrap().selected_index(), Some(0));
}

#[test]
fn test_escape_while_closed_is_ignored() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());

    let event = press(&fx.doc, fx.native, Key::Escape);
    assert!(!event.is_default_prevented());
    assert_eq!(select.dropdown_state(), DropdownState::Closed);
}

#[test]
fn test_escape_closes_open_dropdown() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    select.toggle();

    let event = press(&fx.doc, fx.native, Key::Escape);
    assert!(event.is_default_prevented());
    assert!(!select.is_open());
}

#[test]
fn test_space_opens_but_never_closes() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());

    let event = press(&fx.doc, fx.native, Key::Space);
    assert!(event.is_default_prevented());
    assert!(select.is_open());

    let event = press(&fx.doc, fx.native, Key::Space);
    assert!(event.is_default_prevented());
    assert!(select.is_open());
}

#[test]
fn test_enter_toggles() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());

    press(&fx.doc, fx.native, Key::Enter);
    assert!(select.is_open());
    press(&fx.doc, fx.native, Key::Enter);
    assert!(!select.is_open());
}

#[test]
fn test_change_refocuses_native_in_single_mode() {
    setup();
    let fx = fruits();
    let _select = mounted(&fx, SelectConfig::default());
    assert_eq!(fx.doc.active_element(), None);

    fx.doc.dispatch_event(fx.native, Event::change());
    assert_eq!(fx.doc.active_element(), Some(fx.native));
}

#[test]
fn test_ready_notification_carries_attributes() {
    setup();
    let fx = fruits();
    let received = Arc::new(Mutex::new(Vec::<AttributeChanges>::new()));
    let sink = received.clone();
    fx.doc.add_listener(
        fx.doc.body(),
        EventType::custom(names::READY_EVENT),
        move |event: &mut Event| {
            if let Some(attributes) = event.attributes() {
                sink.lock().push(attributes.clone());
            }
        },
    );
    let _select = mounted(&fx, SelectConfig::default());

    let received = received.lock();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].get(names::READY), Some(&Some(String::new())));
    assert_eq!(received[0].get(names::SINGLE), Some(&Some(String::new())));
    assert!(!fx.doc.has_attribute(fx.root, names::READY));
}

#[test]
fn test_standalone_root_gets_attributes_directly() {
    setup();
    let fx = fruits();
    fx.doc.set_attribute(fx.root, names::STANDALONE, "").unwrap();
    let _select = mounted(&fx, SelectConfig::default());
    assert!(fx.doc.has_attribute(fx.root, names::READY));
    assert!(fx.doc.has_attribute(fx.root, names::SINGLE));

    fx.doc.set_attribute(fx.native, "multiple", "").unwrap();
    fx.doc.flush();
    assert!(fx.doc.has_attribute(fx.root, names::READY));
    assert!(!fx.doc.has_attribute(fx.root, names::SINGLE));
}

#[derive(Default)]
struct Recording {
    calls: Arc<Mutex<Vec<String>>>,
}

impl AccessibilityStrategy for Recording {
    fn set_open(&self, open: bool) {
        self.calls.lock().push(format!("open:{open}"));
    }

    fn generate_meta_attributes(&self, mut base: AttributeChanges) -> AttributeChanges {
        base.insert("role".into(), Some("listbox".into()));
        base
    }

    fn on_mount(&self) {
        self.calls.lock().push("mount".into());
    }

    fn on_unmount(&self) {
        self.calls.lock().push("unmount".into());
    }

    fn on_ui_clicked(&self, _event: &Event) {
        self.calls.lock().push("ui-click".into());
    }

    fn on_change(&self) {
        self.calls.lock().push("change".into());
    }
}

#[test]
fn test_accessibility_hooks() {
    setup();
    let fx = fruits();
    fx.doc.set_attribute(fx.root, names::STANDALONE, "").unwrap();
    let strategy = Recording::default();
    let calls = strategy.calls.clone();
    let select = Select::builder(&fx.doc, fx.root)
        .accessibility(strategy)
        .build()
        .unwrap();
    select.mount().unwrap();
    assert_eq!(fx.doc.attribute(fx.root, "role").as_deref(), Some("listbox"));

    fx.doc.click(fx.ui);
    fx.doc.click(fx.doc.body());
    fx.doc.dispatch_event(fx.native, Event::change());
    select.unmount();
    select.unmount();

    assert_eq!(
        *calls.lock(),
        vec!["mount", "ui-click", "open:true", "open:false", "change", "unmount"]
    );
}

#[test]
fn test_rebuild_while_open_reports_close() {
    setup();
    let fx = fruits();
    let strategy = Recording::default();
    let calls = strategy.calls.clone();
    let select = Select::builder(&fx.doc, fx.root)
        .accessibility(strategy)
        .build()
        .unwrap();
    select.mount().unwrap();
    select.toggle();
    assert!(select.is_open());

    fx.doc.set_attribute(fx.native, "multiple", "").unwrap();
    fx.doc.flush();

    assert!(!select.is_open());
    assert_eq!(select.mode(), Some(SelectMode::Multiple));
    assert_eq!(*calls.lock(), vec!["mount", "open:true", "open:false"]);
}

#[test]
fn test_button_follows_selection_set_by_script() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    let button = select.button().unwrap().element();
    assert_eq!(fx.doc.text(button).as_deref(), Some("Apple"));

    fx.doc.set_attribute(fx.options[2], "selected", "").unwrap();
    fx.doc.flush();
    assert_eq!(select.native().unwrap().selected_index(), Some(2));
    assert_eq!(fx.doc.text(button).as_deref(), Some("Plum"));

    fx.doc.set_attribute(fx.native, "disabled", "").unwrap();
    fx.doc.flush();
    assert!(fx.doc.has_attribute(button, names::DISABLED));
}

#[test]
fn test_tree_dump_shows_rebuilt_overlay() {
    setup();
    let fx = fruits();
    let _select = mounted(&fx, SelectConfig::default());

    let dump = DocumentTreeDebug::with_options(TreeFormatOptions::minimal())
        .format_subtree(&fx.doc, fx.root);
    assert!(dump.contains("select-button"));
}

#[test]
fn test_unmount_detaches_and_silences() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    select.toggle();
    let button = select.button().unwrap().element();
    fx.doc.focus(fx.native).unwrap();
    fx.doc.blur(fx.native);
    assert_eq!(fx.doc.active_timers(), 1);

    select.unmount();
    assert!(!select.is_open());
    assert!(!select.is_mounted());
    assert_eq!(fx.doc.active_timers(), 0);

    fx.doc.click(fx.ui);
    assert!(!select.is_open());
    fx.doc.set_attribute(fx.native, "multiple", "").unwrap();
    fx.doc.flush();
    assert_eq!(select.button().unwrap().element(), button);

    select.mount().unwrap();
    assert!(select.button().is_none(), "mount catches up with the mode");
    fx.doc.click(fx.ui);
    assert!(!select.is_open());
}

#[test]
fn test_toggle_after_unmount_keeps_panel_detached() {
    setup();
    let fx = fruits();
    let select = mounted(&fx, SelectConfig::default());
    let panel = select.panel().unwrap().element();
    select.unmount();

    select.toggle();
    assert!(!select.is_open());
    assert_eq!(fx.doc.parent(panel), None);
    assert_eq!(fx.doc.children(fx.doc.body()), vec![fx.root]);

    select.mount().unwrap();
    select.toggle();
    assert!(select.is_open());
}

#[test]
fn test_unmount_without_mount_is_safe() {
    setup();
    let fx = fruits();
    let select = Select::new(&fx.doc, fx.root).unwrap();
    select.unmount();
    assert!(!select.is_mounted());
}

#[test]
fn test_resolves_late_elements() {
    setup();
    let doc = Document::new();
    let root = doc.create_element("div");
    doc.append_child(doc.body(), root).unwrap();
    let select = Select::new(&doc, root).unwrap();
    select.mount().unwrap();
    assert_eq!(select.mode(), None);

    let native = doc.create_element("select");
    let option = doc.create_element("option");
    doc.set_text(option, "Only").unwrap();
    doc.append_child(native, option).unwrap();
    let ui = doc.create_element("span");
    doc.set_attribute(ui, names::UI_CONTAINER, "").unwrap();
    doc.append_child(root, native).unwrap();
    doc.append_child(root, ui).unwrap();
    doc.flush();

    assert_eq!(select.mode(), Some(SelectMode::Single));
    assert!(select.button().is_some());
    doc.click(ui);
    assert!(select.is_open());
}

#[test]
fn test_two_widgets_share_the_body() {
    setup();
    let doc = Document::new();
    let first = fixture_with(doc.clone(), &[("A", false)]);
    let second = fixture_with(doc.clone(), &[("B", false)]);
    let one = mounted(&first, SelectConfig::default());
    let two = mounted(&second, SelectConfig::default());

    doc.click(first.ui);
    doc.click(second.ui);
    assert!(one.is_open());
    assert!(two.is_open());
    let panels = [one.panel().unwrap().element(), two.panel().unwrap().element()];
    assert!(panels.iter().all(|panel| doc.parent(*panel) == Some(doc.body())));

    doc.click(doc.body());
    assert!(!one.is_open());
    assert!(!two.is_open());
}

#[test]
fn test_rejects_invalid_config() {
    let fx = fruits();
    let err = Select::builder(&fx.doc, fx.root)
        .config(SelectConfig::default().with_min_bottom_space(-1.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, horizon_select::SelectError::Config(_)));
}
