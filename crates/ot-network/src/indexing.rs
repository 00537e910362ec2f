//! Stable indexing for solver integration.
//!
//! Maps string ids of a snapshot to contiguous solver indices (0..N) and partitions
//! nodes by kind so the solvers can address diffusion, arithmetic and boundary
//! temperatures as dense slices.

use std::collections::HashMap;

use ot_core::{ConductorIdx, LoadIdx, NodeIdx};

use crate::schema::{NetworkSnapshot, NodeKind};
use crate::{NetworkError, NetworkResult};

/// Index map providing stable, contiguous indices for snapshot entities.
///
/// Node indices follow snapshot order; the kind partitions list node indices in the
/// same order.
#[derive(Debug, Clone)]
pub struct NetworkIndex {
    node_to_idx: HashMap<String, NodeIdx>,
    conductor_to_idx: HashMap<String, ConductorIdx>,
    load_to_idx: HashMap<String, LoadIdx>,

    /// Node kind per node index.
    kinds: Vec<NodeKind>,
    /// `(from, to)` per conductor index.
    endpoints: Vec<(NodeIdx, NodeIdx)>,
    /// Target node per heat load index.
    load_nodes: Vec<NodeIdx>,

    diffusion: Vec<NodeIdx>,
    arithmetic: Vec<NodeIdx>,
    boundary: Vec<NodeIdx>,
}

impl NetworkIndex {
    /// Build an index from a snapshot. Every reference must resolve, so run
    /// validation first.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> NetworkResult<Self> {
        let node_to_idx: HashMap<String, NodeIdx> = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), NodeIdx::from_usize(i)))
            .collect();

        let lookup = |id: &str| {
            node_to_idx
                .get(id)
                .copied()
                .ok_or_else(|| NetworkError::UnknownId {
                    what: "node",
                    id: id.to_string(),
                })
        };

        let endpoints = snapshot
            .conductors
            .iter()
            .map(|c| Ok((lookup(&c.from)?, lookup(&c.to)?)))
            .collect::<NetworkResult<Vec<_>>>()?;
        let load_nodes = snapshot
            .heat_loads
            .iter()
            .map(|l| lookup(&l.node_id))
            .collect::<NetworkResult<Vec<_>>>()?;

        let kinds: Vec<NodeKind> = snapshot.nodes.iter().map(|n| n.kind).collect();
        let partition = |kind: NodeKind| {
            kinds
                .iter()
                .enumerate()
                .filter(|(_, k)| **k == kind)
                .map(|(i, _)| NodeIdx::from_usize(i))
                .collect::<Vec<_>>()
        };
        let diffusion = partition(NodeKind::Diffusion);
        let arithmetic = partition(NodeKind::Arithmetic);
        let boundary = partition(NodeKind::Boundary);

        Ok(Self {
            conductor_to_idx: snapshot
                .conductors
                .iter()
                .enumerate()
                .map(|(i, c)| (c.id.clone(), ConductorIdx::from_usize(i)))
                .collect(),
            load_to_idx: snapshot
                .heat_loads
                .iter()
                .enumerate()
                .map(|(i, l)| (l.id.clone(), LoadIdx::from_usize(i)))
                .collect(),
            node_to_idx,
            kinds,
            endpoints,
            load_nodes,
            diffusion,
            arithmetic,
            boundary,
        })
    }

    /// Number of nodes in the index.
    pub fn node_count(&self) -> usize {
        self.kinds.len()
    }

    /// Number of conductors in the index.
    pub fn conductor_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn node_idx(&self, id: &str) -> NetworkResult<NodeIdx> {
        self.node_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| NetworkError::UnknownId {
                what: "node",
                id: id.to_string(),
            })
    }

    pub fn conductor_idx(&self, id: &str) -> NetworkResult<ConductorIdx> {
        self.conductor_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| NetworkError::UnknownId {
                what: "conductor",
                id: id.to_string(),
            })
    }

    pub fn load_idx(&self, id: &str) -> NetworkResult<LoadIdx> {
        self.load_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| NetworkError::UnknownId {
                what: "heat load",
                id: id.to_string(),
            })
    }

    /// Node kind at a node index (panics if out of bounds).
    pub fn kind(&self, node: NodeIdx) -> NodeKind {
        self.kinds[node.index()]
    }

    /// `(from, to)` of a conductor (panics if out of bounds).
    pub fn endpoints(&self, conductor: ConductorIdx) -> (NodeIdx, NodeIdx) {
        self.endpoints[conductor.index()]
    }

    /// All conductor endpoints in index order.
    pub fn all_endpoints(&self) -> &[(NodeIdx, NodeIdx)] {
        &self.endpoints
    }

    /// Target node of each heat load in index order.
    pub fn load_nodes(&self) -> &[NodeIdx] {
        &self.load_nodes
    }

    pub fn diffusion_nodes(&self) -> &[NodeIdx] {
        &self.diffusion
    }

    pub fn arithmetic_nodes(&self) -> &[NodeIdx] {
        &self.arithmetic
    }

    pub fn boundary_nodes(&self) -> &[NodeIdx] {
        &self.boundary
    }
}
