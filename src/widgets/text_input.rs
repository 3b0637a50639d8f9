use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::Theme;

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Changed, // text edited
    Submit,  // Enter pressed
    Cancel,  // Esc pressed
}

/// Single-line text input wrapping tui-textarea
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    text_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            value: String::new(),
            text_color: None,
            focused: false,
        };
        input.apply_style();
        input
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.apply_style();
        self
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(color) = self.text_color {
            style = style.fg(color);
        }
        self.textarea.set_style(style);
        // No underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
        let cursor = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            // Same style as the text hides the cursor
            style
        };
        self.textarea.set_cursor_style(cursor);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_style();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![self.value.clone()]);
        self.apply_style();
        let end = self.value.chars().count().min(u16::MAX as usize) as u16;
        self.textarea.move_cursor(CursorMove::Jump(0, end));
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => TextInputEvent::Submit,
            KeyCode::Esc => TextInputEvent::Cancel,
            _ => {
                let input = key_event_to_input(event);
                if matches!(input.key, Key::Null | Key::Char('\n') | Key::Char('\r')) {
                    return TextInputEvent::None;
                }
                self.textarea.input(input);
                let value = self.textarea.lines().first().cloned().unwrap_or_default();
                if value == self.value {
                    TextInputEvent::None
                } else {
                    self.value = value;
                    TextInputEvent::Changed
                }
            }
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.textarea.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_emits_changed() {
        let mut input = TextInput::new();
        assert_eq!(
            input.handle_key(&key(KeyCode::Char('t'))),
            TextInputEvent::Changed
        );
        input.handle_key(&key(KeyCode::Char('1')));
        assert_eq!(input.value(), "t1");
        assert_eq!(
            input.handle_key(&key(KeyCode::Backspace)),
            TextInputEvent::Changed
        );
        assert_eq!(input.value(), "t");
    }

    #[test]
    fn test_enter_and_esc() {
        let mut input = TextInput::new();
        input.set_value("vendor");
        assert_eq!(input.handle_key(&key(KeyCode::Enter)), TextInputEvent::Submit);
        assert_eq!(input.handle_key(&key(KeyCode::Esc)), TextInputEvent::Cancel);
        assert_eq!(input.value(), "vendor");
    }

    #[test]
    fn test_set_value_appends_at_end() {
        let mut input = TextInput::new();
        input.set_value("ab");
        input.handle_key(&key(KeyCode::Char('c')));
        assert_eq!(input.value(), "abc");
        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_unmapped_keys_ignored() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(&key(KeyCode::F(2))), TextInputEvent::None);
        assert_eq!(input.handle_key(&key(KeyCode::Left)), TextInputEvent::None);
    }
}
