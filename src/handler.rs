use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::client::Backend;
use crate::controller::Focus;
use crate::tui::AppEvent;

pub fn handle_event<B: Backend>(app: &mut App<B>, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Reply(outcome) => {
            app.chat.finish(outcome);
        }
    }
    Ok(())
}

fn handle_key<B: Backend>(app: &mut App<B>, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.chat.focus {
        Focus::Input => handle_input_key(app, key),
        Focus::Messages => handle_messages_key(app, key),
    }
}

fn handle_input_key<B: Backend>(app: &mut App<B>, key: KeyEvent) {
    let input = &mut app.chat.input;
    match key.code {
        // Shift/Alt+Enter breaks the line, plain Enter sends
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            input.insert_newline();
        }
        KeyCode::Enter => app.submit(),

        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Esc => app.chat.focus = Focus::Messages,

        KeyCode::PageUp => {
            let page = app.messages_page();
            app.chat.messages.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.messages_page();
            app.chat.messages.scroll_down(page);
        }

        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            input.insert_char(c);
        }
        _ => {}
    }
}

fn handle_messages_key<B: Backend>(app: &mut App<B>, key: KeyEvent) {
    let messages = &mut app.chat.messages;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter | KeyCode::Char('i') => app.chat.focus = Focus::Input,

        KeyCode::Char('j') | KeyCode::Down => messages.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => messages.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => messages.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => messages.scroll_to_bottom(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.messages_page() / 2;
            app.chat.messages.scroll_down(half.max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.messages_page() / 2;
            app.chat.messages.scroll_up(half.max(1));
        }

        KeyCode::PageDown => {
            let page = app.messages_page();
            app.chat.messages.scroll_down(page);
        }
        KeyCode::PageUp => {
            let page = app.messages_page();
            app.chat.messages.scroll_up(page);
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse<B: Backend>(app: &mut App<B>, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_messages = app.messages_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_input = app.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_send = app.send_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_messages => app.chat.messages.scroll_down(3),
        MouseEventKind::ScrollUp if in_messages => app.chat.messages.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) => {
            if in_send {
                app.submit();
            } else if in_input {
                app.chat.focus = Focus::Input;
            } else if in_messages {
                app.chat.focus = Focus::Messages;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GenerateRequest, Outcome};
    use crate::controller::ChatController;
    use crate::state::ConversationId;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    /// Never answers, so the gate stays closed for the whole test
    #[derive(Clone, Default)]
    struct Hanging {
        calls: Arc<AtomicUsize>,
    }

    impl Backend for Hanging {
        fn generate(&self, _request: GenerateRequest) -> BoxFuture<'static, Outcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            futures_util::future::pending().boxed()
        }
    }

    fn app() -> (App<Hanging>, Hanging) {
        let backend = Hanging::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let chat = ChatController::new(backend.clone(), ConversationId::default());
        (App::new(chat, "http://test/", tx), backend)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App<Hanging>, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyModifiers::NONE)).unwrap();
        }
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[tokio::test]
    async fn test_enter_submits() {
        let (mut app, backend) = app();
        type_text(&mut app, "Hello");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();

        assert!(app.chat.is_busy());
        assert_eq!(app.chat.messages.len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_modified_enter_inserts_newline() {
        let (mut app, backend) = app();
        type_text(&mut app, "a");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::SHIFT)).unwrap();
        type_text(&mut app, "b");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::ALT)).unwrap();

        assert_eq!(app.chat.input.value(), "a\nb\n");
        assert!(app.chat.messages.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enter_and_click_share_the_gate() {
        let (mut app, backend) = app();
        app.send_area = Some(Rect::new(40, 20, 10, 3));

        type_text(&mut app, "first");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, click(42, 21)).unwrap();

        assert_eq!(app.chat.messages.len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_button_click_submits() {
        let (mut app, backend) = app();
        app.send_area = Some(Rect::new(40, 20, 10, 3));

        type_text(&mut app, "clicked");
        handle_event(&mut app, click(5, 5)).unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        handle_event(&mut app, click(45, 22)).unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.chat.messages.messages()[0].text(), Some("clicked"));
    }

    #[tokio::test]
    async fn test_typing_ignored_while_waiting() {
        let (mut app, _) = app();
        type_text(&mut app, "Hello");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        type_text(&mut app, "more");
        assert_eq!(app.chat.input.value(), "");
    }

    #[tokio::test]
    async fn test_reply_event_restores_focus() {
        let (mut app, _) = app();
        type_text(&mut app, "Hello");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, key(KeyCode::Tab, KeyModifiers::NONE)).unwrap();
        assert_eq!(app.chat.focus, Focus::Messages);

        let reply = AppEvent::Reply(Outcome::TransportError {
            message: "connection refused".to_string(),
        });
        handle_event(&mut app, reply).unwrap();

        assert!(!app.chat.is_busy());
        assert!(app.chat.input.is_enabled());
        assert_eq!(app.chat.focus, Focus::Input);
        assert_eq!(
            app.chat.messages.last().unwrap().text(),
            Some("Erro: connection refused")
        );
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let (mut app, _) = app();
        type_text(&mut app, "q");
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE)).unwrap();
        handle_event(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE)).unwrap();
        assert!(app.should_quit);

        let (mut app, _) = self::app();
        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_tab_toggles_focus() {
        let (mut app, _) = app();
        handle_event(&mut app, key(KeyCode::Tab, KeyModifiers::NONE)).unwrap();
        assert_eq!(app.chat.focus, Focus::Messages);

        // Tab in the message pane must not quit or scroll, only switch back
        handle_event(&mut app, key(KeyCode::Tab, KeyModifiers::NONE)).unwrap();
        assert_eq!(app.chat.focus, Focus::Input);
        assert!(!app.should_quit);

        handle_event(&mut app, AppEvent::Resize).unwrap();
        assert_eq!(app.chat.focus, Focus::Input);
    }
}
