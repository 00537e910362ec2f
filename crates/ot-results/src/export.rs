//! Per-node summary export as CSV or JSON.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::types::ResultSnapshot;
use crate::{ResultsError, ResultsResult};

/// One summary row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSummary {
    /// Node name, or its id when the node is unnamed.
    pub node: String,
    #[serde(rename = "T_min")]
    pub t_min: f64,
    #[serde(rename = "T_max")]
    pub t_max: f64,
    #[serde(rename = "T_initial")]
    pub t_initial: f64,
    #[serde(rename = "T_final")]
    pub t_final: f64,
    /// `T_final − T_initial`
    #[serde(rename = "delta_T")]
    pub delta_t: f64,
}

/// Summarise every node with a recorded history. Fails when nothing was recorded.
pub fn summarize(result: &ResultSnapshot) -> ResultsResult<Vec<NodeSummary>> {
    let rows: Vec<NodeSummary> = result
        .nodes
        .iter()
        .filter_map(|n| {
            let first = *n.temperatures.first()?;
            let last = *n.temperatures.last()?;
            let (lo, hi) = n
                .temperatures
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                    (lo.min(t), hi.max(t))
                });
            let node = if n.name.is_empty() { &n.id } else { &n.name };
            Some(NodeSummary {
                node: node.clone(),
                t_min: lo,
                t_max: hi,
                t_initial: first,
                t_final: last,
                delta_t: last - first,
            })
        })
        .collect();
    if rows.is_empty() {
        return Err(ResultsError::Empty {
            run_id: result.run_id.clone(),
        });
    }
    Ok(rows)
}

pub fn write_summary_csv<W: Write>(rows: &[NodeSummary], writer: W) -> ResultsResult<()> {
    let mut w = csv::Writer::from_writer(writer);
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// CSV text with header `node,T_min,T_max,T_initial,T_final,delta_T`.
pub fn summary_csv(result: &ResultSnapshot) -> ResultsResult<String> {
    let rows = summarize(result)?;
    let mut buf = Vec::new();
    write_summary_csv(&rows, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn summary_json(result: &ResultSnapshot) -> ResultsResult<String> {
    Ok(serde_json::to_string_pretty(&summarize(result)?)?)
}
