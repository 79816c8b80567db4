use crate::error::DynaNetError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::message::{History, HistoryEntry, Message, TransitRecord};
use crate::worklist::Worklist;
use dynanet_linalg::{LinearSolver, Matrix};
use log::{debug, trace};

/// Builds the error message `expected - actual` for an Output node.
///
/// The node's pending messages are combined first if that has not happened yet;
/// the returned message carries the combined message's history.
///
/// # Errors
/// * `DynaNetError::UnexpectedNodeKind` if `output` is not an Output node.
/// * `DynaNetError::NoDataReady` if nothing reached the node.
/// * `DynaNetError::ShapeMismatch` if `expected` does not have the node's shape.
pub fn seed_error(graph: &mut Graph, output: NodeId, expected: &Matrix) -> Result<Message, DynaNetError> {
    let actual = graph.read(output)?;
    if actual.dim() != expected.dim() {
        return Err(DynaNetError::ShapeMismatch {
            node: output,
            expected: actual.dim(),
            actual: expected.dim(),
        });
    }
    let difference = expected - actual;
    let history = graph
        .node(output)?
        .outgoing_buffer()
        .map(|message| message.history().clone())
        .ok_or(DynaNetError::NoDataReady { node: output })?;
    Ok(Message::with_history(difference, history))
}

/// Drives error messages backwards from the Output nodes named in `seeds`.
///
/// Each error message is routed by the last entry of its history: a transit record
/// sends it back across that connection, a branch record splits it evenly across
/// the merged children. Every connection crossed accumulates weight deltas; nothing
/// is applied to the weights here.
///
/// # Arguments
/// * `graph`: Graph whose inbound queues are empty apart from the seeds.
/// * `seeds`: Output node and error message pairs.
/// * `split_ratio`: Share of each edge's error assigned to its weight factors.
/// * `solver`: Solver used by every connection.
///
/// # Errors
/// * `DynaNetError::NoErrorReady` if a dequeued node has no pending error.
/// * `DynaNetError::MalformedHistory` if a history cannot be reversed.
/// * Any error of the linear solves.
pub fn backpropagate(
    graph: &mut Graph,
    seeds: Vec<(NodeId, Message)>,
    split_ratio: f64,
    solver: &LinearSolver<'_>,
) -> Result<(), DynaNetError> {
    let mut worklist = Worklist::new(graph.node_count());
    for (node, error) in seeds {
        graph.node_mut(node)?.receive(error)?;
        worklist.push(node);
    }

    let mut visited = 0;
    while let Some(node) = worklist.pop() {
        reverse_node(graph, node, split_ratio, solver)?;
        visited += 1;

        let predecessors = graph
            .node(node)?
            .incoming()
            .iter()
            .map(|&id| graph.connection(id).map(|c| c.node_in()))
            .collect::<Result<Vec<_>, _>>()?;
        for predecessor in predecessors {
            if graph.node(predecessor)?.kind() != NodeKind::Input {
                worklist.push(predecessor);
            }
        }
    }
    debug!("backpropagate: {} nodes visited", visited);
    Ok(())
}

fn reverse_node(
    graph: &mut Graph,
    node: NodeId,
    split_ratio: f64,
    solver: &LinearSolver<'_>,
) -> Result<(), DynaNetError> {
    let errors = graph.node_mut(node)?.take_incoming();
    if errors.is_empty() {
        return Err(DynaNetError::NoErrorReady { node });
    }
    trace!("backpropagate: {} handles {} error messages", node, errors.len());

    for error in errors {
        let (content, mut history) = error.into_parts();
        match history.pop() {
            Some(HistoryEntry::Transit(record)) => {
                reverse_transit(graph, node, record, content, history, split_ratio, solver)?;
            }
            Some(HistoryEntry::Branch(children)) => {
                let share = &content / children.len() as f64;
                for mut child in children {
                    match child.pop() {
                        Some(HistoryEntry::Transit(record)) => {
                            reverse_transit(graph, node, record, share.clone(), child, split_ratio, solver)?;
                        }
                        _ => {
                            return Err(DynaNetError::MalformedHistory(format!(
                                "branch child at {} does not end in a transit record",
                                node
                            )))
                        }
                    }
                }
            }
            None => {
                return Err(DynaNetError::MalformedHistory(format!(
                    "error message at {} has an empty history",
                    node
                )))
            }
        }
    }
    Ok(())
}

/// Sends `error` back across the connection named by `record` and queues the
/// resulting error at its source, if the source takes one.
fn reverse_transit(
    graph: &mut Graph,
    node: NodeId,
    record: TransitRecord,
    error: Matrix,
    remaining: History,
    split_ratio: f64,
    solver: &LinearSolver<'_>,
) -> Result<(), DynaNetError> {
    let connection = graph.connection(record.connection)?;
    if connection.node_out() != node {
        return Err(DynaNetError::MalformedHistory(format!(
            "{} ends at {}, but the error is at {}",
            record.connection,
            connection.node_out(),
            node
        )));
    }
    let source = connection.node_in();
    let source_kind = graph.node(source)?.kind();

    let upstream = graph
        .connection_mut(record.connection)?
        .transmit_error(&error, &record, source_kind, split_ratio, solver)?;
    if let Some(upstream) = upstream {
        graph
            .node_mut(source)?
            .receive(Message::with_history(upstream, remaining))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "backprop_test.rs"]
mod tests;
