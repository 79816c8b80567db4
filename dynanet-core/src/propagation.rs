use crate::error::DynaNetError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::message::Message;
use crate::worklist::Worklist;
use log::{debug, trace};

/// Drives messages forward from `frontier` until no node is left to fire.
///
/// A node fires as soon as it is dequeued: its pending inbound messages are
/// combined into its outbound buffer (unless one is already buffered) and a copy
/// is sent across every outgoing connection. Destinations other than Output nodes
/// are queued; Output nodes keep their messages until they are read.
///
/// # Errors
/// * `DynaNetError::NoDataReady` if a dequeued node has nothing to send.
/// * Any error of [`Connection::transmit`](crate::graph::Connection::transmit).
pub fn propagate(graph: &mut Graph, frontier: &[NodeId]) -> Result<(), DynaNetError> {
    let mut worklist = Worklist::new(graph.node_count());
    for &node in frontier {
        worklist.push(node);
    }

    let mut fired = 0;
    while let Some(node) = worklist.pop() {
        fire(graph, node, &mut worklist)?;
        fired += 1;
    }
    debug!("propagate: {} nodes fired", fired);
    Ok(())
}

fn fire(graph: &mut Graph, id: NodeId, worklist: &mut Worklist) -> Result<(), DynaNetError> {
    graph.node_mut(id)?.ensure_outgoing()?;

    let node = graph.node(id)?;
    let message = node
        .outgoing_buffer()
        .ok_or(DynaNetError::NoDataReady { node: id })?;
    let mut deliveries: Vec<(NodeId, Message)> = Vec::with_capacity(node.outgoing().len());
    for &connection_id in node.outgoing() {
        let connection = graph.connection(connection_id)?;
        deliveries.push((connection.node_out(), connection.transmit(message)?));
    }
    trace!("propagate: {} sends {} messages", id, deliveries.len());

    for (destination, message) in deliveries {
        let target = graph.node_mut(destination)?;
        target.receive(message)?;
        if target.kind() != NodeKind::Output {
            worklist.push(destination);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "propagation_test.rs"]
mod tests;
