use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Message, Model};
use crate::editor::{Direction, EditInput, InlineFormat};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Paste(text) if model.prompt.is_some() => {
                let mut value = model.prompt.as_ref()?.input().to_string();
                value.push_str(text.lines().next().unwrap_or_default());
                Some(Message::PromptInput(value))
            }
            Event::Paste(text) => {
                let text = (!text.is_empty()).then(|| text.clone());
                Some(Message::Edit(EditInput::Paste(text)))
            }
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if let Some(prompt) = &model.prompt {
            return match key.code {
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Backspace => {
                    let mut value = prompt.input().to_string();
                    value.pop();
                    Some(Message::PromptInput(value))
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    let mut value = prompt.input().to_string();
                    value.push(c);
                    Some(Message::PromptInput(value))
                }
                _ => None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl {
            return match key.code {
                KeyCode::Char('q' | 'c') => Some(Message::Quit),
                KeyCode::Char('s') => Some(Message::Save),
                KeyCode::Char('n') => Some(Message::NewNote),
                KeyCode::Char('d') => Some(Message::DeleteNote),
                KeyCode::Char('p') => Some(Message::TogglePreview),
                KeyCode::Char('b') => Some(edit(EditInput::Format(InlineFormat::Bold))),
                KeyCode::Char('e') => Some(edit(EditInput::Format(InlineFormat::Italic))),
                KeyCode::Char('k') => Some(edit(EditInput::Format(InlineFormat::Code))),
                KeyCode::Char('l') => Some(Message::StartLink),
                KeyCode::Char('r') => Some(Message::StartRename),
                KeyCode::Char('t') => Some(edit(EditInput::ToggleTodo)),
                KeyCode::Left => Some(move_caret(Direction::Left, shift)),
                KeyCode::Right => Some(move_caret(Direction::Right, shift)),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(c) => Some(edit(EditInput::Char(c))),
            KeyCode::Enter => Some(edit(EditInput::Enter)),
            KeyCode::Backspace => Some(edit(EditInput::Backspace)),
            KeyCode::Delete => Some(edit(EditInput::Delete)),
            KeyCode::Tab => Some(edit(EditInput::Indent)),
            KeyCode::BackTab => Some(edit(EditInput::Outdent)),
            KeyCode::Left => Some(move_caret(Direction::Left, shift)),
            KeyCode::Right => Some(move_caret(Direction::Right, shift)),
            KeyCode::Up => Some(move_caret(Direction::Up, shift)),
            KeyCode::Down => Some(move_caret(Direction::Down, shift)),
            KeyCode::Home => Some(edit(EditInput::Home)),
            KeyCode::End => Some(edit(EditInput::End)),
            KeyCode::PageDown => Some(Message::NextNote),
            KeyCode::PageUp => Some(Message::PrevNote),
            _ => None,
        }
    }
}

const fn edit(input: EditInput) -> Message {
    Message::Edit(input)
}

const fn move_caret(direction: Direction, extend: bool) -> Message {
    Message::Edit(EditInput::Move { direction, extend })
}
