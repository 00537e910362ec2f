//! Compiled thermal problem shared by the steady and transient solvers.

use ot_conductance::{LoadSet, PortTemps, ThermalLink, compile_conductors};
use ot_network::{BoundaryTemp, NetworkIndex, NetworkSnapshot, NodeKind, validate_snapshot};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// A snapshot compiled into dense arrays and link models.
///
/// Node and conductor positions follow the snapshot order, so index `i` in any of
/// the per-node slices refers to `snapshot.nodes[i]`.
pub struct ThermalProblem {
    index: NetworkIndex,
    node_ids: Vec<String>,
    node_names: Vec<String>,
    conductor_ids: Vec<String>,
    kinds: Vec<NodeKind>,
    /// J/K, zero for arithmetic and boundary nodes.
    capacitance: Vec<f64>,
    boundary: Vec<Option<BoundaryTemp>>,
    initial: Vec<f64>,
    links: Vec<Box<dyn ThermalLink>>,
    endpoints: Vec<(usize, usize)>,
    /// Per node: `(conductor, other node)`.
    adjacency: Vec<Vec<(usize, usize)>>,
    diffusion: Vec<usize>,
    arithmetic: Vec<usize>,
    boundary_nodes: Vec<usize>,
    loads: LoadSet,
}

impl std::fmt::Debug for ThermalProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThermalProblem")
            .field("nodes", &self.node_ids.len())
            .field("conductors", &self.links.len())
            .field("loads", &self.loads.len())
            .finish()
    }
}

impl ThermalProblem {
    /// Validate `snapshot` and compile it. Malformed input never reaches a solver.
    pub fn compile(snapshot: &NetworkSnapshot) -> SolverResult<Self> {
        validate_snapshot(snapshot).map_err(ot_network::NetworkError::from)?;
        let index = NetworkIndex::from_snapshot(snapshot)?;
        let links = compile_conductors(snapshot)?;
        let loads = LoadSet::compile(snapshot, &index)?;

        let n = snapshot.nodes.len();
        let mut capacitance = vec![0.0; n];
        for &i in index.diffusion_nodes() {
            let node = &snapshot.nodes[i.index()];
            capacitance[i.index()] = snapshot.effective_capacitance(node).ok_or_else(|| {
                SolverError::ProblemSetup {
                    what: format!("diffusion node '{}' has no capacitance", node.id),
                }
            })?;
        }

        let endpoints: Vec<(usize, usize)> = index
            .all_endpoints()
            .iter()
            .map(|(a, b)| (a.index(), b.index()))
            .collect();
        let mut adjacency = vec![Vec::new(); n];
        for (c, &(a, b)) in endpoints.iter().enumerate() {
            adjacency[a].push((c, b));
            adjacency[b].push((c, a));
        }

        let to_usize = |v: &[ot_core::NodeIdx]| v.iter().map(|i| i.index()).collect::<Vec<_>>();
        let problem = Self {
            diffusion: to_usize(index.diffusion_nodes()),
            arithmetic: to_usize(index.arithmetic_nodes()),
            boundary_nodes: to_usize(index.boundary_nodes()),
            node_ids: snapshot.nodes.iter().map(|n| n.id.clone()).collect(),
            node_names: snapshot.nodes.iter().map(|n| n.label().to_string()).collect(),
            conductor_ids: snapshot.conductors.iter().map(|c| c.id.clone()).collect(),
            kinds: snapshot.nodes.iter().map(|n| n.kind).collect(),
            capacitance,
            boundary: snapshot.nodes.iter().map(|n| n.boundary_temp.clone()).collect(),
            initial: snapshot.nodes.iter().map(|n| n.temperature).collect(),
            links,
            endpoints,
            adjacency,
            loads,
            index,
        };
        debug!(
            nodes = n,
            diffusion = problem.diffusion.len(),
            arithmetic = problem.arithmetic.len(),
            conductors = problem.links.len(),
            "thermal problem compiled"
        );
        Ok(problem)
    }

    pub fn index(&self) -> &NetworkIndex {
        &self.index
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn conductor_count(&self) -> usize {
        self.links.len()
    }

    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    pub fn conductor_ids(&self) -> &[String] {
        &self.conductor_ids
    }

    pub fn kind(&self, node: usize) -> NodeKind {
        self.kinds[node]
    }

    pub fn capacitance(&self) -> &[f64] {
        &self.capacitance
    }

    pub fn diffusion_nodes(&self) -> &[usize] {
        &self.diffusion
    }

    pub fn arithmetic_nodes(&self) -> &[usize] {
        &self.arithmetic
    }

    pub fn boundary_nodes(&self) -> &[usize] {
        &self.boundary_nodes
    }

    pub fn links(&self) -> &[Box<dyn ThermalLink>] {
        &self.links
    }

    pub fn endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub(crate) fn neighbours(&self, node: usize) -> &[(usize, usize)] {
        &self.adjacency[node]
    }

    pub fn loads(&self) -> &LoadSet {
        &self.loads
    }

    /// Initial temperatures with boundary nodes set to their value at `t`.
    pub fn initial_temperatures(&self, t: f64) -> Vec<f64> {
        let mut temps = self.initial.clone();
        self.apply_boundaries(t, &mut temps);
        temps
    }

    /// Overwrite boundary node temperatures with their value at `t`.
    pub fn apply_boundaries(&self, t: f64, temps: &mut [f64]) {
        for &i in &self.boundary_nodes {
            if let Some(bt) = &self.boundary[i] {
                temps[i] = bt.at(t);
            }
        }
    }

    /// From→to heat flow of every conductor.
    pub fn conductor_flows(&self, temps: &[f64], out: &mut Vec<f64>) {
        out.clear();
        out.extend(self.links.iter().zip(&self.endpoints).map(|(link, &(a, b))| {
            link.flow(PortTemps::new(temps[a], temps[b]))
        }));
    }

    /// Add the net conductor heat flowing into each node to `node_q`.
    pub fn accumulate_conduction(&self, temps: &[f64], node_q: &mut [f64]) {
        for (link, &(a, b)) in self.links.iter().zip(&self.endpoints) {
            let q = link.flow(PortTemps::new(temps[a], temps[b]));
            node_q[a] -= q;
            node_q[b] += q;
        }
    }

    /// Heat exchanged with boundary nodes as `(into network, out of network)`, both
    /// non-negative. Conductors between two boundary nodes are ignored.
    pub fn boundary_exchange(&self, temps: &[f64]) -> (f64, f64) {
        let is_boundary = |i: usize| self.kinds[i] == NodeKind::Boundary;
        let (mut q_in, mut q_out) = (0.0, 0.0);
        for (link, &(a, b)) in self.links.iter().zip(&self.endpoints) {
            let into_network = match (is_boundary(a), is_boundary(b)) {
                (true, false) => link.flow(PortTemps::new(temps[a], temps[b])),
                (false, true) => -link.flow(PortTemps::new(temps[a], temps[b])),
                _ => continue,
            };
            if into_network >= 0.0 {
                q_in += into_network;
            } else {
                q_out -= into_network;
            }
        }
        (q_in, q_out)
    }

    /// Total stored energy `Σ C_i·T_i` (J) relative to 0 K.
    pub fn stored_energy(&self, temps: &[f64]) -> f64 {
        self.diffusion
            .iter()
            .map(|&i| self.capacitance[i] * temps[i])
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ot_network::NetworkBuilder;

    fn problem() -> ThermalProblem {
        let snap = NetworkBuilder::new()
            .diffusion("a", 300.0, 50.0)
            .arithmetic("b", 290.0)
            .boundary("sink", 200.0)
            .linear("ab", "a", "b", 2.0)
            .linear("bs", "b", "sink", 4.0)
            .constant_load("q", "a", 10.0)
            .build()
            .unwrap();
        ThermalProblem::compile(&snap).unwrap()
    }

    #[test]
    fn compiles_partitions_and_capacitance() {
        let p = problem();
        assert_eq!(p.node_count(), 3);
        assert_eq!(p.diffusion_nodes(), &[0]);
        assert_eq!(p.arithmetic_nodes(), &[1]);
        assert_eq!(p.boundary_nodes(), &[2]);
        assert_eq!(p.capacitance(), &[50.0, 0.0, 0.0]);
        assert_eq!(p.neighbours(1).len(), 2);
    }

    #[test]
    fn conduction_is_conservative() {
        let p = problem();
        let temps = [300.0, 250.0, 200.0];
        let mut q = vec![0.0; 3];
        p.accumulate_conduction(&temps, &mut q);
        assert_eq!(q, vec![-100.0, 100.0 - 200.0, 200.0]);
        assert_eq!(q.iter().sum::<f64>(), 0.0);

        let (q_in, q_out) = p.boundary_exchange(&temps);
        assert_eq!((q_in, q_out), (0.0, 200.0));
    }

    #[test]
    fn rejects_invalid_snapshot() {
        let snap = NetworkBuilder::new()
            .diffusion("a", 300.0, 50.0)
            .linear("loop", "a", "a", 1.0)
            .snapshot();
        assert!(matches!(
            ThermalProblem::compile(&snap),
            Err(SolverError::Network(_))
        ));
    }
}
