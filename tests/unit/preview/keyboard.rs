use super::*;

#[test]
fn declared_modifiers_must_match_exactly() {
    assert!(modifiers_match(Modifiers::SUPER, Modifiers::SUPER.into()));
    assert!(!modifiers_match(Modifiers::SUPER, Modifiers::empty().into()));
    assert!(!modifiers_match(
        Modifiers::SUPER,
        (Modifiers::SUPER | Modifiers::SHIFT).into()
    ));
    assert!(modifiers_match(
        Modifiers::SUPER | Modifiers::SHIFT,
        (Modifiers::SUPER | Modifiers::SHIFT).into()
    ));
}

#[test]
fn lock_state_does_not_affect_declared_shortcuts() {
    assert!(modifiers_match(
        Modifiers::ALT,
        (Modifiers::ALT | Modifiers::CAPS_LOCK).into()
    ));
}

#[test]
fn empty_declaration_rejects_any_nonzero_bitmask() {
    assert!(modifiers_match(Modifiers::empty(), Modifiers::empty().into()));
    assert!(!modifiers_match(Modifiers::empty(), Modifiers::CAPS_LOCK.into()));
    assert!(!modifiers_match(Modifiers::empty(), Modifiers::NUM_LOCK.into()));
}

#[test]
fn list_input_satisfies_empty_declaration() {
    assert!(modifiers_match(
        Modifiers::empty(),
        ModsInput::List([false, true, false, false])
    ));
    assert!(modifiers_match(Modifiers::SUPER, ModsInput::List([true; 4])));
    assert!(!modifiers_match(
        Modifiers::SUPER,
        ModsInput::List([false, true, true, true])
    ));
}

#[test]
fn press_resolves_bound_shortcut() {
    let table = ShortcutTable::default();
    assert_eq!(
        table.resolve(Key::Space, KeyAction::Press, Modifiers::empty().into()),
        Some(Shortcut::PlayPreview)
    );
    assert_eq!(
        table.resolve(Key::Space, KeyAction::Press, Modifiers::SHIFT.into()),
        Some(Shortcut::PlayPreloaded)
    );
    assert_eq!(
        table.resolve(Key::Char('r'), KeyAction::Press, Modifiers::SUPER.into()),
        Some(Shortcut::RestartRenderer)
    );
    assert_eq!(
        table.resolve(Key::Char('r'), KeyAction::Press, Modifiers::empty().into()),
        None
    );
}

#[test]
fn repeat_fires_only_for_repeatable_shortcuts() {
    let table = ShortcutTable::default();
    assert_eq!(
        table.resolve(Key::Right, KeyAction::Repeat, Modifiers::empty().into()),
        Some(Shortcut::PreviewNext)
    );
    assert_eq!(
        table.resolve(Key::Space, KeyAction::Repeat, Modifiers::empty().into()),
        None
    );
    assert_eq!(
        table.resolve(Key::Right, KeyAction::Release, Modifiers::empty().into()),
        None
    );
}

#[test]
fn caps_lock_blocks_unmodified_shortcut() {
    let table = ShortcutTable::default();
    assert_eq!(
        table.resolve(Key::Space, KeyAction::Press, Modifiers::CAPS_LOCK.into()),
        None
    );
}

#[test]
fn custom_table_uses_given_repeatable_set() {
    let table = ShortcutTable::new(
        vec![(Shortcut::Kill, vec![(Modifiers::CONTROL, Key::Char('c'))])],
        vec![Shortcut::Kill],
    );
    assert!(table.is_repeatable(Shortcut::Kill));
    assert_eq!(
        table.resolve(Key::Char('c'), KeyAction::Repeat, Modifiers::CONTROL.into()),
        Some(Shortcut::Kill)
    );
}
