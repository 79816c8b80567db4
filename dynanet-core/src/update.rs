use crate::error::DynaNetError;
use crate::graph::Graph;
use crate::sweep::forward_sweep;
use log::debug;

/// Applies and resets the pending deltas of every connection reachable from the
/// Input nodes.
pub fn update_weights(graph: &mut Graph) -> Result<(), DynaNetError> {
    let mut updated = 0;
    forward_sweep(graph, |graph, node| {
        let outgoing = graph.node(node)?.outgoing().to_vec();
        for id in outgoing {
            graph.connection_mut(id)?.apply_deltas();
            updated += 1;
        }
        Ok(())
    })?;
    debug!("update_weights: {} connections updated", updated);
    Ok(())
}
