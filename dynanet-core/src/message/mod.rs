pub mod history;

pub use history::{History, HistoryEntry, TransitRecord};

use dynanet_linalg::Matrix;

/// A matrix travelling along the graph, together with its provenance.
///
/// Cloning deep-copies both the content and the history, so fanning a message out
/// to several connections never shares state between the copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    content: Matrix,
    history: History,
}

impl Message {
    /// A message with an empty history.
    pub fn new(content: Matrix) -> Self {
        Message {
            content,
            history: History::new(),
        }
    }

    pub fn with_history(content: Matrix, history: History) -> Self {
        Message { content, history }
    }

    pub fn content(&self) -> &Matrix {
        &self.content
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn shape(&self) -> (usize, usize) {
        self.content.dim()
    }

    pub fn into_parts(self) -> (Matrix, History) {
        (self.content, self.history)
    }

    /// Combines pending messages into one.
    ///
    /// No messages yields `None`. A single message is returned unchanged. Two or
    /// more are summed elementwise and the sum's history is the union of the
    /// summands' histories, recorded as one branch entry. All messages must have
    /// the same shape.
    pub fn merge(messages: Vec<Message>) -> Option<Message> {
        let mut messages = messages.into_iter();
        let first = messages.next()?;
        let mut rest = messages.peekable();
        if rest.peek().is_none() {
            return Some(first);
        }

        let (mut content, first_history) = first.into_parts();
        let mut children = vec![first_history];
        for message in rest {
            let (summand, history) = message.into_parts();
            content += &summand;
            children.push(history);
        }
        let mut history = History::new();
        history.push_branch(children);
        Some(Message::with_history(content, history))
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
