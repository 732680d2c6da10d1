use winit::keyboard::{Key, NamedKey};

use stereorig::{Command, Eye, EyeTransform, NudgeDirection, PlacementMode};

/// Metres added or removed by one size or distance keypress.
pub const SIZE_STEP: f32 = 0.1;
/// Metres moved by one calibration arrow keypress.
pub const CALIBRATION_STEP: f32 = 0.005;
/// Degrees rotated by one calibration keypress.
pub const ROTATION_STEP: f32 = 0.1;

/// What a keypress asks the window to do.
#[derive(Debug)]
pub enum KeyAction<I> {
    /// Forward to the viewer state.
    Viewer(Command<I>),
    ToggleSession,
    /// Calibration keys now target this eye.
    SelectEye(Eye),
    Quit,
}

/// Maps keys to actions, remembering which eye the calibration keys move.
#[derive(Debug)]
pub struct KeyBindings {
    selected: Eye,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            selected: Eye::Left,
        }
    }
}

impl KeyBindings {
    pub fn selected(&self) -> Eye {
        self.selected
    }

    pub fn map<I>(&mut self, key: &Key) -> Option<KeyAction<I>> {
        let eye = self.selected;
        let nudge = |dx: f32, dy: f32, drotation: f32| {
            KeyAction::Viewer(Command::NudgeEye {
                eye,
                dx,
                dy,
                drotation,
            })
        };

        let action = match key {
            Key::Named(NamedKey::Escape) => KeyAction::Quit,
            Key::Named(NamedKey::ArrowLeft) => nudge(-CALIBRATION_STEP, 0.0, 0.0),
            Key::Named(NamedKey::ArrowRight) => nudge(CALIBRATION_STEP, 0.0, 0.0),
            Key::Named(NamedKey::ArrowUp) => nudge(0.0, CALIBRATION_STEP, 0.0),
            Key::Named(NamedKey::ArrowDown) => nudge(0.0, -CALIBRATION_STEP, 0.0),
            Key::Character(text) => {
                let mut chars = text.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                match ch.to_ascii_lowercase() {
                    'v' => KeyAction::ToggleSession,
                    'r' => KeyAction::Viewer(Command::RequestRecenter),
                    's' => KeyAction::Viewer(Command::RequestSwap),
                    'h' => KeyAction::Viewer(Command::TogglePlacementMode),
                    ',' | '<' => KeyAction::Viewer(Command::NudgeHorizontal(NudgeDirection::Left)),
                    '.' | '>' => {
                        KeyAction::Viewer(Command::NudgeHorizontal(NudgeDirection::Right))
                    }
                    '[' => KeyAction::Viewer(Command::AdjustPanelWidth(-SIZE_STEP)),
                    ']' => KeyAction::Viewer(Command::AdjustPanelWidth(SIZE_STEP)),
                    '-' => KeyAction::Viewer(Command::AdjustViewDistance(-SIZE_STEP)),
                    '=' | '+' => KeyAction::Viewer(Command::AdjustViewDistance(SIZE_STEP)),
                    '1' => self.select(Eye::Left),
                    '2' => self.select(Eye::Right),
                    'q' => nudge(0.0, 0.0, -ROTATION_STEP),
                    'e' => nudge(0.0, 0.0, ROTATION_STEP),
                    '0' => KeyAction::Viewer(Command::SetEyeTransform {
                        eye,
                        transform: EyeTransform::default(),
                    }),
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(action)
    }

    fn select<I>(&mut self, eye: Eye) -> KeyAction<I> {
        self.selected = eye;
        KeyAction::SelectEye(eye)
    }
}

/// Short label used in the window title.
pub fn placement_label(mode: PlacementMode) -> &'static str {
    match mode {
        PlacementMode::WorldAnchored => "world-anchored",
        PlacementMode::HeadLocked => "head-locked",
    }
}

#[cfg(test)]
mod tests {
    use stereorig::{FrameInput, ViewerState};
    use winit::keyboard::SmolStr;

    use super::*;

    fn char_key(ch: &str) -> Key {
        Key::Character(SmolStr::new(ch))
    }

    fn map(bindings: &mut KeyBindings, key: Key) -> Option<KeyAction<()>> {
        bindings.map(&key)
    }

    #[test]
    fn placement_keys_map_to_commands() {
        let mut bindings = KeyBindings::default();
        assert!(matches!(
            map(&mut bindings, char_key("r")),
            Some(KeyAction::Viewer(Command::RequestRecenter))
        ));
        assert!(matches!(
            map(&mut bindings, char_key("S")),
            Some(KeyAction::Viewer(Command::RequestSwap))
        ));
        assert!(matches!(
            map(&mut bindings, char_key(",")),
            Some(KeyAction::Viewer(Command::NudgeHorizontal(
                NudgeDirection::Left
            )))
        ));
        assert!(matches!(
            map(&mut bindings, char_key("v")),
            Some(KeyAction::ToggleSession)
        ));
    }

    #[test]
    fn size_keys_queue_relative_steps() {
        let mut bindings = KeyBindings::default();
        assert!(matches!(
            map(&mut bindings, char_key("]")),
            Some(KeyAction::Viewer(Command::AdjustPanelWidth(delta))) if delta == SIZE_STEP
        ));
        assert!(matches!(
            map(&mut bindings, char_key("-")),
            Some(KeyAction::Viewer(Command::AdjustViewDistance(delta))) if delta == -SIZE_STEP
        ));
    }

    #[test]
    fn repeated_size_keys_before_a_frame_all_apply() {
        let mut bindings = KeyBindings::default();
        let mut state: ViewerState<()> = ViewerState::default();
        for _ in 0..2 {
            if let Some(KeyAction::Viewer(command)) = map(&mut bindings, char_key("[")) {
                state.push(command);
            }
        }
        state.step(FrameInput::Preview);
        assert!((state.config().panel_width() - 1.6).abs() < 1e-5);
    }

    #[test]
    fn calibration_keys_follow_selected_eye() {
        let mut bindings = KeyBindings::default();
        assert!(matches!(
            map(&mut bindings, char_key("2")),
            Some(KeyAction::SelectEye(Eye::Right))
        ));
        assert_eq!(bindings.selected(), Eye::Right);
        match map(&mut bindings, Key::Named(NamedKey::ArrowUp)) {
            Some(KeyAction::Viewer(Command::NudgeEye { eye, dx, dy, .. })) => {
                assert_eq!(eye, Eye::Right);
                assert_eq!(dx, 0.0);
                assert_eq!(dy, CALIBRATION_STEP);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            map(&mut bindings, char_key("0")),
            Some(KeyAction::Viewer(Command::SetEyeTransform { eye: Eye::Right, .. }))
        ));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut bindings = KeyBindings::default();
        assert!(map(&mut bindings, char_key("z")).is_none());
        assert!(map(&mut bindings, char_key("ab")).is_none());
        assert!(map(&mut bindings, Key::Named(NamedKey::Tab)).is_none());
        assert!(matches!(
            map(&mut bindings, Key::Named(NamedKey::Escape)),
            Some(KeyAction::Quit)
        ));
    }
}
