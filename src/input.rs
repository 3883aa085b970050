use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Main,
    Chat,
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum UserAction {
    Feed,
    Pet,
    Poke,
    LightToggle,
    Nap,
    ChatOpen,
    ChatChar(char),
    ChatBackspace,
    ChatSend,
    ChatCancel,
    HelpToggle,
    Quit,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(scene: Scene, ev: &InputEvent) -> Option<UserAction> {
    if ev.mods.contains(KeyModifiers::CONTROL) && matches!(ev.key, KeyCode::Char('c')) {
        return Some(UserAction::Quit);
    }

    match scene {
        Scene::Chat => match ev.key {
            KeyCode::Enter => Some(UserAction::ChatSend),
            KeyCode::Esc => Some(UserAction::ChatCancel),
            KeyCode::Backspace => Some(UserAction::ChatBackspace),
            KeyCode::Char(ch) if !ch.is_control() => Some(UserAction::ChatChar(ch)),
            _ => None,
        },
        Scene::Help => match ev.key {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => Some(UserAction::HelpToggle),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserAction::Quit),
            _ => None,
        },
        Scene::Main => match ev.key {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(UserAction::Feed),
            KeyCode::Char('p') | KeyCode::Char('P') => Some(UserAction::Pet),
            KeyCode::Char(' ') => Some(UserAction::Poke),
            KeyCode::Char('l') | KeyCode::Char('L') => Some(UserAction::LightToggle),
            KeyCode::Char('z') | KeyCode::Char('Z') => Some(UserAction::Nap),
            KeyCode::Char('/') | KeyCode::Enter => Some(UserAction::ChatOpen),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(UserAction::HelpToggle),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserAction::Quit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent {
            key: code,
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn main_scene_keys() {
        assert_eq!(
            map_event_to_action(Scene::Main, &key(KeyCode::Char('f'))),
            Some(UserAction::Feed)
        );
        assert_eq!(
            map_event_to_action(Scene::Main, &key(KeyCode::Char(' '))),
            Some(UserAction::Poke)
        );
        assert_eq!(map_event_to_action(Scene::Main, &key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn chat_scene_captures_letters() {
        assert_eq!(
            map_event_to_action(Scene::Chat, &key(KeyCode::Char('q'))),
            Some(UserAction::ChatChar('q'))
        );
        assert_eq!(
            map_event_to_action(Scene::Chat, &key(KeyCode::Char('안'))),
            Some(UserAction::ChatChar('안'))
        );
        assert_eq!(
            map_event_to_action(Scene::Chat, &key(KeyCode::Esc)),
            Some(UserAction::ChatCancel)
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ev = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        assert_eq!(map_event_to_action(Scene::Chat, &ev), Some(UserAction::Quit));
    }
}
