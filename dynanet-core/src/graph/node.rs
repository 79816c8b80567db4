use super::ids::{ConnectionId, NodeId};
use crate::error::DynaNetError;
use crate::message::Message;
use dynanet_linalg::Matrix;

/// Role of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Accepts externally supplied data.
    Input,
    Internal,
    /// Exposes its combined inbound messages to the caller.
    Output,
}

/// A matrix-valued vertex of the graph.
///
/// Every message a node sends or receives has the node's `shape`.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    shape: (usize, usize),
    incoming: Vec<ConnectionId>,
    outgoing: Vec<ConnectionId>,
    outgoing_buffer: Option<Message>,
    incoming_messages: Vec<Message>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, shape: (usize, usize)) -> Self {
        Node {
            id,
            kind,
            shape,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            outgoing_buffer: None,
            incoming_messages: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn incoming(&self) -> &[ConnectionId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[ConnectionId] {
        &self.outgoing
    }

    pub fn outgoing_buffer(&self) -> Option<&Message> {
        self.outgoing_buffer.as_ref()
    }

    pub fn incoming_messages(&self) -> &[Message] {
        &self.incoming_messages
    }

    pub(crate) fn add_incoming(&mut self, connection: ConnectionId) {
        self.incoming.push(connection);
    }

    pub(crate) fn add_outgoing(&mut self, connection: ConnectionId) {
        self.outgoing.push(connection);
    }

    fn check_shape(&self, actual: (usize, usize)) -> Result<(), DynaNetError> {
        if actual != self.shape {
            return Err(DynaNetError::ShapeMismatch {
                node: self.id,
                expected: self.shape,
                actual,
            });
        }
        Ok(())
    }

    /// Queues an inbound message.
    ///
    /// # Errors
    /// `DynaNetError::ShapeMismatch` if the message content does not have the node's shape.
    pub fn receive(&mut self, message: Message) -> Result<(), DynaNetError> {
        self.check_shape(message.shape())?;
        self.incoming_messages.push(message);
        Ok(())
    }

    /// Sets the outbound buffer to `content` with an empty history.
    pub(crate) fn deposit(&mut self, content: Matrix) -> Result<(), DynaNetError> {
        self.check_shape(content.dim())?;
        self.outgoing_buffer = Some(Message::new(content));
        Ok(())
    }

    /// Returns the outbound message, combining pending inbound messages into it first
    /// if none is buffered yet.
    ///
    /// # Errors
    /// `DynaNetError::NoDataReady` if there is neither a buffered nor an inbound message.
    pub fn ensure_outgoing(&mut self) -> Result<&Message, DynaNetError> {
        if self.outgoing_buffer.is_none() {
            let pending = std::mem::take(&mut self.incoming_messages);
            self.outgoing_buffer = Message::merge(pending);
        }
        self.outgoing_buffer
            .as_ref()
            .ok_or(DynaNetError::NoDataReady { node: self.id })
    }

    /// Drains the inbound queue.
    pub fn take_incoming(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.incoming_messages)
    }

    /// Empties both the inbound queue and the outbound buffer.
    pub fn clear(&mut self) {
        self.incoming_messages.clear();
        self.outgoing_buffer = None;
    }
}
