use crate::error::DynaNetError;
use crate::graph::{Graph, NodeId};
use crate::worklist::Worklist;
use log::debug;

/// Visits every node reachable from the Input nodes, breadth first, once each.
///
/// `visit` runs before the node's successors are queued. Returns the number of
/// visited nodes.
pub(crate) fn forward_sweep<F>(graph: &mut Graph, mut visit: F) -> Result<usize, DynaNetError>
where
    F: FnMut(&mut Graph, NodeId) -> Result<(), DynaNetError>,
{
    let mut worklist = Worklist::new(graph.node_count());
    let inputs: Vec<NodeId> = graph.input_nodes().collect();
    for input in inputs {
        worklist.push(input);
    }

    let mut visited = 0;
    while let Some(node) = worklist.pop() {
        visit(graph, node)?;
        visited += 1;
        let successors = graph
            .node(node)?
            .outgoing()
            .iter()
            .map(|&id| graph.connection(id).map(|c| c.node_out()))
            .collect::<Result<Vec<_>, _>>()?;
        for successor in successors {
            worklist.push(successor);
        }
    }
    Ok(visited)
}

/// Empties the inbound queue and the outbound buffer of every node reachable from
/// the Input nodes, deposited input data included.
pub fn clear_messages(graph: &mut Graph) -> Result<(), DynaNetError> {
    let cleared = forward_sweep(graph, |graph, node| {
        graph.node_mut(node)?.clear();
        Ok(())
    })?;
    debug!("clear_messages: {} nodes cleared", cleared);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use ndarray::array;

    #[test]
    fn test_clear_messages_reaches_every_downstream_node() {
        let mut graph = Graph::new();
        let input = graph.add_input_node((1, 1));
        let hidden = graph.add_internal_node((1, 1));
        let output = graph.add_output_node((1, 1));
        let detached = graph.add_internal_node((1, 1));
        graph.connect(input, hidden).unwrap();
        graph.connect(hidden, output).unwrap();

        graph.deposit(input, array![[1.0]]).unwrap();
        crate::propagation::propagate(&mut graph, &[input]).unwrap();
        graph.read(output).unwrap();
        graph.node_mut(detached).unwrap().receive(Message::new(array![[2.0]])).unwrap();

        clear_messages(&mut graph).unwrap();
        for node in [input, hidden, output] {
            let node = graph.node(node).unwrap();
            assert!(node.outgoing_buffer().is_none());
            assert!(node.incoming_messages().is_empty());
        }
        // Not reachable from an Input node.
        assert_eq!(graph.node(detached).unwrap().incoming_messages().len(), 1);
    }

    #[test]
    fn test_sweep_visits_each_node_once() {
        let mut graph = Graph::new();
        let input = graph.add_input_node((1, 1));
        let left = graph.add_internal_node((1, 1));
        let right = graph.add_internal_node((1, 1));
        let output = graph.add_output_node((1, 1));
        for (from, to) in [(input, left), (input, right), (left, output), (right, output)] {
            graph.connect(from, to).unwrap();
        }
        let mut order = Vec::new();
        let visited = forward_sweep(&mut graph, |_, node| {
            order.push(node);
            Ok(())
        })
        .unwrap();
        assert_eq!(visited, 4);
        assert_eq!(order, vec![input, left, right, output]);
    }
}
