use crate::graph::NodeId;
use std::collections::VecDeque;

/// FIFO queue of nodes where each node is admitted at most once per traversal.
#[derive(Debug, Clone)]
pub(crate) struct Worklist {
    queue: VecDeque<NodeId>,
    admitted: Vec<bool>,
}

impl Worklist {
    pub(crate) fn new(node_count: usize) -> Self {
        Worklist {
            queue: VecDeque::new(),
            admitted: vec![false; node_count],
        }
    }

    /// Queues `node` unless it was queued before. Returns whether it was queued.
    pub(crate) fn push(&mut self, node: NodeId) -> bool {
        match self.admitted.get_mut(node.index()) {
            Some(admitted) if !*admitted => {
                *admitted = true;
                self.queue.push_back(node);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn pop(&mut self) -> Option<NodeId> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_idempotent() {
        let mut worklist = Worklist::new(3);
        assert!(worklist.push(NodeId(2)));
        assert!(worklist.push(NodeId(0)));
        assert!(!worklist.push(NodeId(2)));
        assert_eq!(worklist.pop(), Some(NodeId(2)));
        // Already admitted once in this traversal.
        assert!(!worklist.push(NodeId(2)));
        assert_eq!(worklist.pop(), Some(NodeId(0)));
        assert_eq!(worklist.pop(), None);
    }

    #[test]
    fn test_out_of_range_node_is_ignored() {
        let mut worklist = Worklist::new(1);
        assert!(!worklist.push(NodeId(5)));
        assert_eq!(worklist.pop(), None);
    }
}
