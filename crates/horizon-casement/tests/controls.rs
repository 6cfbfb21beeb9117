//! Integration tests for the built-in controls, driven through the runtime
//! the way a host would drive them.

use std::collections::BTreeSet;

use horizon_casement::controls::{
    ComboBox, ComboRequest, ControlKind, DialogItem, DialogTemplate, EditControl, EditStyle,
    ListRequest, ListStyle, create_dialog,
};
use horizon_casement::{
    DefaultBehavior, IDCANCEL, InputEvent, Key, Message, Modifiers, MouseButton, Point, Rect,
    RuntimeConfig, UiRuntime, WindowId, WindowParams, WindowStyle,
};
use proptest::prelude::*;

fn setup() -> UiRuntime {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_casement=debug,horizon_casement_core=debug")
        .with_test_writer()
        .try_init();
    UiRuntime::new(RuntimeConfig::default())
}

fn frame(ui: &mut UiRuntime) -> WindowId {
    ui.create_window(WindowParams::top_level(Rect::from_xywh(0, 0, 400, 300)), DefaultBehavior)
        .unwrap()
}

fn key(key: Key, modifiers: Modifiers) -> InputEvent {
    InputEvent::Key {
        key,
        pressed: true,
        modifiers,
    }
}

fn click(ui: &mut UiRuntime, x: i32, y: i32) {
    for pressed in [true, false] {
        ui.handle_input(InputEvent::PointerButton {
            button: MouseButton::Left,
            pressed,
            pos: Point::new(x, y),
            modifiers: Modifiers::empty(),
            double_click: false,
        });
    }
}

// ── Edit ────────────────────────────────────────────────────────────────

#[test]
fn word_left_over_accented_text_lands_on_start() {
    let mut ui = setup();
    let main = frame(&mut ui);
    let edit = ControlKind::Edit
        .create(
            &mut ui,
            WindowParams::child(main, 1, Rect::from_xywh(10, 10, 200, 24)).with_text("café!"),
        )
        .unwrap();
    ui.set_focus(edit);

    ui.handle_input(key(Key::End, Modifiers::empty()));
    assert_eq!(ui.with_behavior::<EditControl, _>(edit, |e| e.caret()), Some(5));
    ui.handle_input(key(Key::Left, Modifiers::CTRL));
    assert_eq!(ui.with_behavior::<EditControl, _>(edit, |e| e.caret()), Some(0));
}

#[test]
fn typing_through_input_events_edits_text() {
    let mut ui = setup();
    let main = frame(&mut ui);
    let edit = ControlKind::Edit
        .create(&mut ui, WindowParams::child(main, 1, Rect::from_xywh(10, 10, 200, 24)))
        .unwrap();
    ui.set_focus(edit);
    for ch in "naïve".chars() {
        ui.handle_input(InputEvent::Text {
            ch,
            modifiers: Modifiers::empty(),
        });
    }
    ui.handle_input(key(Key::Backspace, Modifiers::empty()));
    assert_eq!(ui.text(edit), "naïv");
}

#[derive(Debug, Clone)]
enum EditOp {
    Key(Key, Modifiers),
    Type(char),
}

fn edit_op() -> impl Strategy<Value = EditOp> {
    let keys = prop_oneof![
        Just(Key::Left),
        Just(Key::Right),
        Just(Key::Up),
        Just(Key::Down),
        Just(Key::Home),
        Just(Key::End),
        Just(Key::PageUp),
        Just(Key::PageDown),
        Just(Key::Backspace),
        Just(Key::Delete),
    ];
    let modifiers = prop_oneof![
        Just(Modifiers::empty()),
        Just(Modifiers::SHIFT),
        Just(Modifiers::CTRL),
        Just(Modifiers::CTRL | Modifiers::SHIFT),
    ];
    prop_oneof![
        4 => (keys, modifiers).prop_map(|(k, m)| EditOp::Key(k, m)),
        1 => prop::sample::select(vec!['a', 'é', '漢', '🙂', ' ', '_', '\n']).prop_map(EditOp::Type),
    ]
}

proptest! {
    #[test]
    fn edit_cursor_stays_on_character_boundaries(
        text in "[a-zé漢🙂_ .\n]{0,40}",
        ops in prop::collection::vec(edit_op(), 1..60),
    ) {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let main = frame(&mut ui);
        let edit = ui
            .create_window(
                WindowParams::child(main, 1, Rect::from_xywh(0, 0, 90, 60))
                    .with_text(text)
                    .with_control_style(EditStyle::MULTILINE.bits()),
                EditControl::new(),
            )
            .unwrap();

        for op in ops {
            let msg = match op {
                EditOp::Key(key, modifiers) => Message::KeyDown { key, modifiers },
                EditOp::Type(ch) => Message::Char { ch, modifiers: Modifiers::empty() },
            };
            ui.send(edit, msg);

            let (text, caret, anchor, selected) = ui
                .with_behavior::<EditControl, _>(edit, |e| {
                    let anchor = e.anchor().unwrap_or(e.caret());
                    (e.text().to_owned(), e.caret(), anchor, e.selected_text().to_owned())
                })
                .unwrap();
            let chars = text.chars().count();
            prop_assert!(caret <= chars, "caret {caret} past {chars} chars");
            prop_assert!(anchor <= chars, "anchor {anchor} past {chars} chars");
            let (start, end) = (caret.min(anchor), caret.max(anchor));
            let expected: String = text.chars().skip(start).take(end - start).collect();
            prop_assert_eq!(selected, expected);
        }
    }
}

// ── List view ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum ListOp {
    Toggle(usize),
    SetCount(usize),
}

fn list_op() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        6 => any::<usize>().prop_map(ListOp::Toggle),
        1 => (0usize..300).prop_map(ListOp::SetCount),
    ]
}

fn selection(ui: &mut UiRuntime, list: WindowId) -> Vec<usize> {
    let mut msg = Message::control(ListRequest::GetSelection(Vec::new()));
    ui.dispatch(list, &mut msg);
    match msg.control_mut::<ListRequest>() {
        Some(ListRequest::GetSelection(rows)) => std::mem::take(rows),
        _ => Vec::new(),
    }
}

proptest! {
    #[test]
    fn owner_data_selection_matches_model(
        initial in 0usize..300,
        ops in prop::collection::vec(list_op(), 1..80),
    ) {
        let mut ui = UiRuntime::new(RuntimeConfig::default());
        let main = frame(&mut ui);
        let list = ControlKind::ListView
            .create(
                &mut ui,
                WindowParams::child(main, 1, Rect::from_xywh(0, 0, 300, 200))
                    .with_control_style(ListStyle::OWNER_DATA.bits()),
            )
            .unwrap();
        ui.send(list, Message::control(ListRequest::SetItemCount(initial)));

        let mut count = initial;
        let mut model = BTreeSet::new();
        for op in ops {
            match op {
                ListOp::Toggle(row) if count > 0 => {
                    let row = row % count;
                    let selected = !model.contains(&row);
                    ui.send(list, Message::control(ListRequest::SetSelected { row, selected }));
                    if selected {
                        model.insert(row);
                    } else {
                        model.remove(&row);
                    }
                }
                ListOp::Toggle(_) => {}
                ListOp::SetCount(new_count) => {
                    ui.send(list, Message::control(ListRequest::SetItemCount(new_count)));
                    model.retain(|&row| row < new_count);
                    count = new_count;
                }
            }
            prop_assert_eq!(selection(&mut ui, list), model.iter().copied().collect::<Vec<_>>());
        }
        prop_assert_eq!(ui.send(list, Message::control(ListRequest::SelectedCount)), model.len() as isize);
    }
}

// ── Combo box ───────────────────────────────────────────────────────────

#[test]
fn combo_drop_down_chooses_with_the_pointer() {
    let mut ui = setup();
    let main = frame(&mut ui);
    let combo = ControlKind::ComboBox
        .create(&mut ui, WindowParams::child(main, 7, Rect::from_xywh(10, 10, 150, 24)))
        .unwrap();
    for color in ["Red", "Green", "Blue"] {
        ui.send(combo, Message::control(ComboRequest::AddString(color.into())));
    }

    // Press on the combo: the list opens below it and takes capture.
    click(&mut ui, 50, 20);
    let popup = ui
        .with_behavior::<ComboBox, _>(combo, |c| c.dropped())
        .flatten()
        .expect("list should be open");
    assert_eq!(ui.capture(), Some(popup));
    assert_eq!(ui.get_focus(), Some(combo));

    // The list starts at screen y 34; each row is 18 high after a 1 px border.
    click(&mut ui, 50, 34 + 1 + 18 + 5);
    assert!(!ui.is_window(popup));
    assert_eq!(ui.capture(), None);
    assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), 1);
    assert_eq!(ui.text(combo), "Green");
}

#[test]
fn combo_press_elsewhere_dismisses_without_choosing() {
    let mut ui = setup();
    let main = frame(&mut ui);
    let combo = ControlKind::ComboBox
        .create(&mut ui, WindowParams::child(main, 7, Rect::from_xywh(10, 10, 150, 24)))
        .unwrap();
    ui.send(combo, Message::control(ComboRequest::AddString("Only".into())));
    click(&mut ui, 50, 20);
    click(&mut ui, 300, 250);
    assert_eq!(ui.with_behavior::<ComboBox, _>(combo, |c| c.dropped()).flatten(), None);
    assert_eq!(ui.send(combo, Message::control(ComboRequest::GetCurSel)), -1);
}

// ── Dialogs ─────────────────────────────────────────────────────────────

#[test]
fn dialog_tab_order_and_escape() {
    let mut ui = setup();
    let main = frame(&mut ui);
    let template = DialogTemplate::new("Find", Rect::from_xywh(50, 50, 260, 140))
        .with_item(
            DialogItem::new(ControlKind::Label, 1, Rect::from_xywh(8, 8, 60, 16))
                .with_text("Find:")
                .with_style(WindowStyle::empty()),
        )
        .with_item(DialogItem::new(ControlKind::Edit, 2, Rect::from_xywh(70, 8, 180, 20)))
        .with_item(DialogItem::new(ControlKind::ListView, 3, Rect::from_xywh(8, 34, 242, 60)))
        .with_item(
            DialogItem::new(ControlKind::Button, IDCANCEL, Rect::from_xywh(180, 104, 70, 24))
                .with_text("Close"),
        )
        .modal(true);
    let dialog = create_dialog(&mut ui, Some(main), template, None).unwrap();
    let edit = ui.child_by_control_id(dialog.id, 2).unwrap();
    let list = ui.child_by_control_id(dialog.id, 3).unwrap();
    let close = ui.child_by_control_id(dialog.id, IDCANCEL).unwrap();

    assert_eq!(ui.get_focus(), Some(edit));
    ui.handle_input(key(Key::Tab, Modifiers::empty()));
    assert_eq!(ui.get_focus(), Some(list));
    ui.handle_input(key(Key::Tab, Modifiers::empty()));
    assert_eq!(ui.get_focus(), Some(close));
    ui.handle_input(key(Key::Tab, Modifiers::SHIFT));
    assert_eq!(ui.get_focus(), Some(list));

    // The owner ignores the pointer while the dialog is up.
    assert_eq!(ui.window_from_point(Point::new(390, 290)), None);

    ui.handle_input(key(Key::Escape, Modifiers::empty()));
    assert_eq!(dialog.result(), Some(IDCANCEL as isize));
    assert!(ui.is_enabled(main));
    assert_eq!(ui.window_from_point(Point::new(390, 290)), Some(main));
}
