use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::client::{Backend, HttpBackend};
use crate::controller::{ChatController, Focus};
use crate::tui::AppEvent;

pub struct App<B = HttpBackend> {
    pub should_quit: bool,
    pub chat: ChatController<B>,
    pub endpoint: String,

    // Animation state
    pub animation_frame: u8, // 0-2, which loading dot is lit

    // Panel areas for mouse hit-testing (updated during render)
    pub messages_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,

    events: UnboundedSender<AppEvent>,
}

impl<B: Backend> App<B> {
    pub fn new(chat: ChatController<B>, endpoint: &str, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            chat,
            endpoint: endpoint.to_string(),
            animation_frame: 0,
            messages_area: None,
            input_area: None,
            send_area: None,
            events,
        }
    }

    /// Submit the prompt box. Enter and the send button both land here.
    pub fn submit(&mut self) {
        let Some(pending) = self.chat.submit() else {
            return;
        };

        self.animation_frame = 0;
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = pending.await;
            if events.send(AppEvent::Reply(outcome)).is_err() {
                debug!("reply dropped: UI loop has exited");
            }
        });
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.chat.focus = match self.chat.focus {
            Focus::Input => Focus::Messages,
            Focus::Messages => Focus::Input,
        };
    }

    pub fn messages_page(&self) -> u16 {
        self.messages_area
            .map(|area| area.height.saturating_sub(2))
            .filter(|height| *height > 0)
            .unwrap_or(10)
    }
}
