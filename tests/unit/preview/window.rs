use super::*;

#[test]
fn key_codes_map_to_lowercase_chars() {
    assert_eq!(key_from(KeyCode::KeyQ), Some(Key::Char('q')));
    assert_eq!(key_from(KeyCode::Digit7), Some(Key::Char('7')));
    assert_eq!(key_from(KeyCode::Equal), Some(Key::Char('=')));
    assert_eq!(key_from(KeyCode::F11), Some(Key::F(11)));
    assert_eq!(key_from(KeyCode::CapsLock), None);
}

#[test]
fn modifier_state_maps_to_flags() {
    let m = modifiers_from(ModifiersState::SUPER | ModifiersState::SHIFT);
    assert_eq!(m, Modifiers::SUPER | Modifiers::SHIFT);
}
