//! Graph state
//!
//! A [`GraphState`] is a map of named [`StateValue`]s. Nodes never mutate it
//! directly; they return a [`StateUpdate`] which the engine merges. The
//! `messages` key is append-only, every other key is overwritten.

use agentry_llm::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key holding the conversation
pub const MESSAGES_KEY: &str = "messages";

/// A value stored in the graph state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    /// Text
    String(String),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Arbitrary JSON
    Json(serde_json::Value),
    /// Chat messages
    Messages(Vec<ChatMessage>),
}

impl StateValue {
    /// Text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float value; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// JSON value
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Messages
    pub fn as_messages(&self) -> Option<&[ChatMessage]> {
        match self {
            Self::Messages(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<serde_json::Value> for StateValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<ChatMessage>> for StateValue {
    fn from(value: Vec<ChatMessage>) -> Self {
        Self::Messages(value)
    }
}

/// Shared state flowing through a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    values: HashMap<String, StateValue>,
}

impl GraphState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding a single user message
    pub fn from_user(text: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.push_message(ChatMessage::user(text));
        state
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    /// Overwrite `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove `key`
    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.values.remove(key)
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Text at `key`
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(StateValue::as_str)
    }

    /// The conversation, empty when absent
    pub fn messages(&self) -> &[ChatMessage] {
        self.get(MESSAGES_KEY)
            .and_then(StateValue::as_messages)
            .unwrap_or(&[])
    }

    /// Most recent message
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages().last()
    }

    /// Most recent assistant message text, if any
    pub fn last_ai_text(&self) -> Option<&str> {
        self.messages()
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Append to the conversation
    pub fn push_message(&mut self, message: ChatMessage) {
        match self.values.get_mut(MESSAGES_KEY) {
            Some(StateValue::Messages(messages)) => messages.push(message),
            _ => {
                self.values
                    .insert(MESSAGES_KEY.to_string(), StateValue::Messages(vec![message]));
            }
        }
    }

    /// Apply an update: messages append, everything else overwrites
    pub fn merge(&mut self, update: StateUpdate) {
        for (key, value) in update.values {
            match value {
                StateValue::Messages(new) if key == MESSAGES_KEY => {
                    for message in new {
                        self.push_message(message);
                    }
                }
                other => {
                    self.values.insert(key, other);
                }
            }
        }
    }
}

/// Changes returned by a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    values: Vec<(String, StateValue)>,
}

impl StateUpdate {
    /// No changes
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`
    pub fn set(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    /// Append one message
    pub fn message(self, message: ChatMessage) -> Self {
        self.messages(vec![message])
    }

    /// Append several messages
    pub fn messages(self, messages: Vec<ChatMessage>) -> Self {
        self.set(MESSAGES_KEY, StateValue::Messages(messages))
    }

    /// Whether there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys touched by the update
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }
}

impl From<GraphState> for StateUpdate {
    fn from(state: GraphState) -> Self {
        let mut values: Vec<(String, StateValue)> = state.values.into_iter().collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_messages_and_overwrites_rest() {
        let mut state = GraphState::from_user("hi").with("topic", "rust");

        state.merge(
            StateUpdate::new()
                .message(ChatMessage::assistant("hello"))
                .set("topic", "graphs")
                .set("count", 2i64),
        );

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.last_ai_text(), Some("hello"));
        assert_eq!(state.get_string("topic"), Some("graphs"));
        assert_eq!(state.get("count").and_then(StateValue::as_integer), Some(2));
    }

    #[test]
    fn test_state_round_trips_through_update() {
        let state = GraphState::from_user("question").with("flag", true);
        let mut merged = GraphState::from_user("earlier");

        merged.merge(StateUpdate::from(state));

        assert_eq!(merged.messages().len(), 2);
        assert_eq!(merged.get("flag").and_then(StateValue::as_bool), Some(true));
    }
}
