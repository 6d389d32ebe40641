//! Keyboard shortcut table and modifier matching.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Lock states are reported alongside the four real modifiers, so a bitmask can be non-empty
    /// while none of `SUPER`, `ALT`, `SHIFT` or `CONTROL` is held.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Command / Windows key.
        const SUPER = 1 << 0;
        /// Alt / Option.
        const ALT = 1 << 1;
        /// Shift.
        const SHIFT = 1 << 2;
        /// Control.
        const CONTROL = 1 << 3;
        /// Caps lock engaged.
        const CAPS_LOCK = 1 << 4;
        /// Num lock engaged.
        const NUM_LOCK = 1 << 5;
    }
}

/// The four modifiers a shortcut can declare, in matching order.
const MATCHED: [Modifiers; 4] = [
    Modifiers::SUPER,
    Modifiers::ALT,
    Modifiers::SHIFT,
    Modifiers::CONTROL,
];

/// Modifier state as delivered by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModsInput {
    /// Raw bitmask from the windowing layer.
    Bits(Modifiers),
    /// Pre-matched flags for `[super, alt, shift, control]`, as produced by scripted input.
    List([bool; 4]),
}

impl From<Modifiers> for ModsInput {
    fn from(m: Modifiers) -> Self {
        ModsInput::Bits(m)
    }
}

/// Whether `mods` satisfies a shortcut declaring `declared`.
///
/// Each of the four modifiers must be held exactly when declared. A pre-matched list always
/// satisfies a shortcut that declares nothing. A shortcut that declares nothing is rejected for
/// any non-empty bitmask, lock states included.
// FIXME: confirm whether a lock state alone should block unmodified shortcuts.
pub fn modifiers_match(declared: Modifiers, mods: ModsInput) -> bool {
    let flags = match mods {
        ModsInput::List(l) => l,
        ModsInput::Bits(bits) => MATCHED.map(|m| declared.contains(m) == bits.contains(m)),
    };
    let mut matched = flags.iter().all(|f| *f);
    if !matched && declared.is_empty() && matches!(mods, ModsInput::List(_)) {
        matched = true;
    }
    if declared.is_empty() && matches!(mods, ModsInput::Bits(b) if !b.is_empty()) {
        matched = false;
    }
    matched
}

/// Physical key, independent of layout-specific text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letter, digit or punctuation key, lower-case.
    Char(char),
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Space bar.
    Space,
    /// Return / Enter.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Home.
    Home,
    /// End.
    End,
    /// Function key `F1..=F12`.
    F(u8),
}

/// Key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Key went down.
    Press,
    /// Auto-repeat while held.
    Repeat,
    /// Key went up.
    Release,
}

/// Modal keyboard layer; shortcuts only apply in [`KeyLayer::Default`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyLayer {
    /// Shortcut table active.
    #[default]
    Default,
    /// Renderer-defined editing layer.
    Editing,
    /// Renderer-defined command entry layer.
    Command,
    /// Free text entry.
    Text,
}

/// Named preview commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shortcut {
    /// Previous frame.
    PreviewPrev,
    /// Next frame.
    PreviewNext,
    /// Jump back ten frames.
    PreviewPrevMany,
    /// Jump forward ten frames.
    PreviewNextMany,
    /// First frame.
    JumpHome,
    /// Last frame.
    JumpEnd,
    /// Toggle live playback.
    PlayPreview,
    /// Toggle playback of frames rendered to disk.
    PlayPreloaded,
    /// Render every frame.
    RenderAll,
    /// Render the current frame.
    RenderOne,
    /// Restart the renderer.
    RestartRenderer,
    /// Quit.
    Kill,
    /// Grow the preview scale.
    PreviewScaleUp,
    /// Shrink the preview scale.
    PreviewScaleDown,
    /// Reset the preview scale.
    PreviewScaleDefault,
    /// Raise window opacity.
    WindowOpacityUp,
    /// Lower window opacity.
    WindowOpacityDown,
    /// Copy the current previews as SVG.
    CopySvgToClipboard,
    /// Enter the editing key layer.
    KeylayerEditing,
    /// Enter the command key layer.
    KeylayerCommand,
}

/// Shortcuts that also fire on key auto-repeat.
pub const REPEATABLE_SHORTCUTS: &[Shortcut] = &[
    Shortcut::PreviewPrev,
    Shortcut::PreviewNext,
    Shortcut::PreviewPrevMany,
    Shortcut::PreviewNextMany,
    Shortcut::PreviewScaleUp,
    Shortcut::PreviewScaleDown,
    Shortcut::WindowOpacityUp,
    Shortcut::WindowOpacityDown,
];

/// Default bindings: each shortcut with its accepted `(modifiers, key)` combinations.
pub fn shortcuts_keyed() -> Vec<(Shortcut, Vec<(Modifiers, Key)>)> {
    let none = Modifiers::empty();
    let cmd = Modifiers::SUPER;
    let shift = Modifiers::SHIFT;
    let alt = Modifiers::ALT;
    vec![
        (Shortcut::PreviewPrev, vec![(none, Key::Left), (none, Key::Char('a'))]),
        (Shortcut::PreviewNext, vec![(none, Key::Right), (none, Key::Char('d'))]),
        (Shortcut::PreviewPrevMany, vec![(shift, Key::Left)]),
        (Shortcut::PreviewNextMany, vec![(shift, Key::Right)]),
        (Shortcut::JumpHome, vec![(none, Key::Home), (cmd, Key::Left)]),
        (Shortcut::JumpEnd, vec![(none, Key::End), (cmd, Key::Right)]),
        (Shortcut::PlayPreview, vec![(none, Key::Space)]),
        (Shortcut::PlayPreloaded, vec![(shift, Key::Space)]),
        (Shortcut::RenderAll, vec![(cmd | shift, Key::Char('a'))]),
        (Shortcut::RenderOne, vec![(cmd, Key::Char('s'))]),
        (Shortcut::RestartRenderer, vec![(cmd, Key::Char('r'))]),
        (Shortcut::Kill, vec![(cmd, Key::Char('q'))]),
        (Shortcut::PreviewScaleUp, vec![(cmd, Key::Char('='))]),
        (Shortcut::PreviewScaleDown, vec![(cmd, Key::Char('-'))]),
        (Shortcut::PreviewScaleDefault, vec![(cmd, Key::Char('0'))]),
        (Shortcut::WindowOpacityUp, vec![(alt, Key::Up)]),
        (Shortcut::WindowOpacityDown, vec![(alt, Key::Down)]),
        (Shortcut::CopySvgToClipboard, vec![(cmd, Key::Char('c'))]),
        (Shortcut::KeylayerEditing, vec![(none, Key::Enter)]),
        (Shortcut::KeylayerCommand, vec![(shift, Key::Char(';'))]),
    ]
}

/// Shortcut resolver over a keyed table.
#[derive(Clone, Debug)]
pub struct ShortcutTable {
    keyed: Vec<(Shortcut, Vec<(Modifiers, Key)>)>,
    repeatable: Vec<Shortcut>,
}

impl Default for ShortcutTable {
    fn default() -> Self {
        Self::new(shortcuts_keyed(), REPEATABLE_SHORTCUTS.to_vec())
    }
}

impl ShortcutTable {
    /// Table over explicit bindings.
    pub fn new(keyed: Vec<(Shortcut, Vec<(Modifiers, Key)>)>, repeatable: Vec<Shortcut>) -> Self {
        Self { keyed, repeatable }
    }

    /// Whether `shortcut` fires on auto-repeat.
    pub fn is_repeatable(&self, shortcut: Shortcut) -> bool {
        self.repeatable.contains(&shortcut)
    }

    /// First shortcut bound to `key` under `mods` that fires for `action`.
    ///
    /// Presses always fire; repeats fire only for repeatable shortcuts; releases never fire.
    pub fn resolve(&self, key: Key, action: KeyAction, mods: ModsInput) -> Option<Shortcut> {
        for (shortcut, options) in &self.keyed {
            for (declared, bound) in options {
                if *bound != key || !modifiers_match(*declared, mods) {
                    continue;
                }
                let fires = match action {
                    KeyAction::Press => true,
                    KeyAction::Repeat => self.is_repeatable(*shortcut),
                    KeyAction::Release => false,
                };
                if fires {
                    return Some(*shortcut);
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/keyboard.rs"]
mod tests;
