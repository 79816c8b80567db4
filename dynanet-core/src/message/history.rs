use crate::graph::ConnectionId;
use dynanet_linalg::Matrix;

/// What a message looked like when it crossed one connection.
///
/// `input` is the content before the transform and `intermediate` is
/// `weight_a · input`, both needed to reverse the edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitRecord {
    pub connection: ConnectionId,
    pub input: Matrix,
    pub intermediate: Matrix,
}

/// One step of a message's provenance.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// The message crossed a connection.
    Transit(TransitRecord),
    /// The message is the sum of several messages, one history per summand.
    Branch(Vec<History>),
}

/// Ordered provenance trail of a message, oldest entry first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn push_transit(&mut self, record: TransitRecord) {
        self.entries.push(HistoryEntry::Transit(record));
    }

    pub fn push_branch(&mut self, children: Vec<History>) {
        self.entries.push(HistoryEntry::Branch(children));
    }

    /// Removes and returns the most recent entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The most recent entry, if it is a transit record.
    pub fn last_transit(&self) -> Option<&TransitRecord> {
        match self.entries.last() {
            Some(HistoryEntry::Transit(record)) => Some(record),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transit entries at this level, not counting those inside branches.
    pub fn transit_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, HistoryEntry::Transit(_)))
            .count()
    }

    /// Branch entries at this level.
    pub fn branch_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, HistoryEntry::Branch(_)))
            .count()
    }
}
