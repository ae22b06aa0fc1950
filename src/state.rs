//! Conversation state shown in the chat pane
//!
//! Messages live only as long as the process; nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Body of a message. `Loading` is the assistant placeholder drawn as three dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Loading,
    Text(String),
    /// A placeholder resolved from a failed request
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub content: Content,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self {
            sender: Sender::User,
            content: Content::Text(text.to_string()),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            sender: Sender::Assistant,
            content: Content::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.content == Content::Loading
    }

    pub fn is_error(&self) -> bool {
        matches!(self.content, Content::Error(_))
    }

    /// Text of the message, `None` while it is still a placeholder
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) | Content::Error(text) => Some(text),
            Content::Loading => None,
        }
    }

    /// Body rows as drawn at `width` columns; empty while loading
    pub fn body_rows(&self, width: u16) -> Vec<String> {
        let Some(text) = self.text() else {
            return Vec::new();
        };
        if text.is_empty() {
            return vec![String::new()];
        }
        text.lines()
            .flat_map(|line| wrap_text_to_width(line, width as usize))
            .collect()
    }
}

/// Greedy word wrap. Words longer than `width` are split across rows.
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        // Break overlong words into width-sized chunks
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        if chars.is_empty() {
            continue;
        }

        let word_len = chars.len();
        if current_len == 0 {
            current_line.extend(chars);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.extend(chars);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line.extend(chars);
            current_len = word_len;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Opaque conversation identifier assigned by the server.
///
/// Starts empty. Once it holds a value it is never cleared, only replaced
/// by another non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: Option<&str>) -> Self {
        let mut conversation = Self::default();
        conversation.adopt(id);
        conversation
    }

    /// Store `candidate` if it is present and non-empty. Returns true when the id changed.
    pub fn adopt(&mut self, candidate: Option<&str>) -> bool {
        match candidate.map(str::trim) {
            Some(id) if !id.is_empty() && id != self.0 => {
                self.0 = id.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered chat history plus the pane's scroll position
#[derive(Debug, Default)]
pub struct MessageList {
    messages: Vec<Message>,
    pub scroll: u16,
    /// Keep the newest entry in view on the next render
    pub follow_tail: bool,
}

impl MessageList {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            scroll: 0,
            follow_tail: true,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push_user(&mut self, text: &str) {
        self.messages.push(Message::user(text));
        self.scroll_to_bottom();
    }

    /// Append an assistant placeholder and return its index
    pub fn push_placeholder(&mut self) -> usize {
        self.messages.push(Message::placeholder());
        self.scroll_to_bottom();
        self.messages.len() - 1
    }

    /// Replace the placeholder at `index` with its final content.
    ///
    /// A placeholder is replaced once; returns false if `index` is not a pending placeholder.
    pub fn resolve(&mut self, index: usize, content: Content) -> bool {
        match self.messages.get_mut(index) {
            Some(message) if message.is_loading() && content != Content::Loading => {
                message.content = content;
                true
            }
            _ => false,
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_tail = false;
        self.scroll = 0;
    }

    /// Settle the scroll offset against the rendered content size.
    ///
    /// Called from the renderer, which is the only place that knows the pane size.
    pub fn clamp_scroll(&mut self, total_lines: u16, visible_lines: u16) {
        let max_scroll = total_lines.saturating_sub(visible_lines);
        if self.follow_tail || self.scroll >= max_scroll {
            self.scroll = max_scroll;
            self.follow_tail = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_ignores_empty_values() {
        let mut id = ConversationId::default();
        assert!(!id.adopt(None));
        assert!(!id.adopt(Some("")));
        assert!(!id.adopt(Some("   ")));
        assert!(id.is_empty());

        assert!(id.adopt(Some("abc123")));
        assert!(!id.adopt(Some("")));
        assert!(!id.adopt(None));
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_conversation_id_overwritten_by_new_value() {
        let mut id = ConversationId::new(Some("first"));
        assert!(id.adopt(Some("second")));
        assert_eq!(id.as_str(), "second");
        assert!(!id.adopt(Some("second")));
    }

    #[test]
    fn test_placeholder_resolved_once() {
        let mut list = MessageList::new();
        list.push_user("Hello");
        let index = list.push_placeholder();

        assert!(list.messages()[index].is_loading());
        assert!(list.resolve(index, Content::Text("Hi!".to_string())));
        assert!(!list.resolve(index, Content::Text("again".to_string())));
        assert_eq!(list.messages()[index].text(), Some("Hi!"));
    }

    #[test]
    fn test_resolve_rejects_user_message() {
        let mut list = MessageList::new();
        list.push_user("Hello");
        assert!(!list.resolve(0, Content::Text("overwrite".to_string())));
        assert!(!list.resolve(5, Content::Text("missing".to_string())));
        assert_eq!(list.messages()[0].text(), Some("Hello"));
    }

    #[test]
    fn test_wrap_breaks_at_word_boundaries() {
        assert_eq!(
            wrap_text_to_width("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text_to_width("", 10), vec![""]);
        assert_eq!(wrap_text_to_width("abcdefghijklmno", 10), vec!["abcdefghij", "klmno"]);
        assert_eq!(wrap_text_to_width("ab abcdefghijkl", 10), vec!["ab", "abcdefghij", "kl"]);
    }

    #[test]
    fn test_body_rows_keep_line_breaks() {
        let message = Message::user("first line\n\nsecond");
        assert_eq!(message.body_rows(20), vec!["first line", "", "second"]);
        assert_eq!(Message::user("").body_rows(20), vec![""]);
        assert!(Message::placeholder().body_rows(20).is_empty());
    }

    #[test]
    fn test_error_content_is_flagged() {
        let mut list = MessageList::new();
        let index = list.push_placeholder();
        assert!(!list.resolve(index, Content::Loading));
        assert!(list.resolve(index, Content::Error("Erro: overloaded".to_string())));
        assert!(list.messages()[index].is_error());
        assert_eq!(list.messages()[index].text(), Some("Erro: overloaded"));
    }

    #[test]
    fn test_clamp_scroll_follows_tail() {
        let mut list = MessageList::new();
        list.clamp_scroll(40, 10);
        assert_eq!(list.scroll, 30);

        list.scroll_up(5);
        assert!(!list.follow_tail);
        list.clamp_scroll(50, 10);
        assert_eq!(list.scroll, 25);

        list.scroll_down(100);
        list.clamp_scroll(50, 10);
        assert_eq!(list.scroll, 40);
        assert!(list.follow_tail);
    }
}
