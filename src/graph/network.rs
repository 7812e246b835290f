use crate::error::{IntegrityError, Result};
use crate::graph::{Edge, IndexedEdge, Vertex};
use crate::schedule::StopId;
use crate::{EdgeId, Mode, VertexId};

use geo::{Distance, Euclidean, Line, Point};
use log::debug;
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};

pub type GraphStructure = DiGraph<Vertex, Edge>;

/// Prefix of every vertex and edge synthesized by the mapping engine.
pub const ARTIFICIAL_PREFIX: &str = "pt_";

/// Routing graph of the physical infrastructure.
///
/// The graph is append-only: vertices and edges are supplied by an upstream
/// reader using [`Graph::add_vertex`] and [`Graph::add_edge`], and the mapping
/// engine may later add artificial elements or widen the mode set of an edge.
/// Nothing is ever removed, so [`NodeIndex`] and [`EdgeIndex`] values stay valid
/// for the lifetime of the graph.
#[derive(Default)]
pub struct Graph {
    pub(crate) graph: GraphStructure,

    vertices: FxHashMap<VertexId, NodeIndex>,
    edges: FxHashMap<EdgeId, EdgeIndex>,

    // Artificial elements, keyed by what they stand in for.
    stop_vertices: FxHashMap<StopId, NodeIndex>,
    stop_edges: FxHashMap<StopId, EdgeIndex>,
    connectors: FxHashMap<(NodeIndex, NodeIndex), EdgeIndex>,

    /// Spatial index over every non-artificial edge.
    pub(crate) index: RTree<IndexedEdge>,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph with Vertices: {}, Edges: {}",
            self.graph.node_count(),
            self.graph.edge_count()
        )
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<NodeIndex> {
        if self.vertices.contains_key(&vertex.id) {
            return Err(IntegrityError::DuplicateVertex(vertex.id).into());
        }

        let id = vertex.id.clone();
        let ix = self.graph.add_node(vertex);
        self.vertices.insert(id, ix);
        Ok(ix)
    }

    /// Inserts an edge between two existing vertices.
    ///
    /// Edges without a length are given the straight-line distance between
    /// their vertices. Non-artificial edges are added to the spatial index.
    pub fn add_edge(&mut self, mut edge: Edge) -> Result<EdgeIndex> {
        if self.edges.contains_key(&edge.id) {
            return Err(IntegrityError::DuplicateEdge(edge.id).into());
        }

        let source = self.vertex_ix(&edge.source)?;
        let target = self.vertex_ix(&edge.target)?;

        let line = Line::new(self.position(source), self.position(target));
        if edge.length.is_nan() {
            edge.length = Euclidean.distance(line.start_point(), line.end_point());
        }

        let artificial = edge.artificial;
        let id = edge.id.clone();
        let ix = self.graph.add_edge(source, target, edge);
        self.edges.insert(id, ix);

        if !artificial {
            self.index.insert(IndexedEdge { ix, line });
        }

        Ok(ix)
    }

    #[inline]
    pub fn vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id).map(|ix| &self.graph[*ix])
    }

    #[inline]
    pub fn vertex_at(&self, ix: NodeIndex) -> &Vertex {
        &self.graph[ix]
    }

    pub fn vertex_ix(&self, id: &VertexId) -> Result<NodeIndex> {
        self.vertices
            .get(id)
            .copied()
            .ok_or_else(|| IntegrityError::UnknownVertex(id.clone()).into())
    }

    #[inline]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id).map(|ix| &self.graph[*ix])
    }

    #[inline]
    pub fn edge_at(&self, ix: EdgeIndex) -> &Edge {
        &self.graph[ix]
    }

    pub fn edge_ix(&self, id: &EdgeId) -> Result<EdgeIndex> {
        self.edges
            .get(id)
            .copied()
            .ok_or_else(|| IntegrityError::UnknownEdge(id.clone()).into())
    }

    /// Resolves a sequence of edge identifiers, failing on the first unknown edge.
    pub fn edge_ixs<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a EdgeId>,
    ) -> Result<Vec<EdgeIndex>> {
        ids.into_iter().map(|id| self.edge_ix(id)).collect()
    }

    #[inline]
    pub fn endpoints(&self, ix: EdgeIndex) -> (NodeIndex, NodeIndex) {
        // Edges are never removed, so every index handed out remains valid.
        self.graph
            .edge_endpoints(ix)
            .unwrap_or((NodeIndex::end(), NodeIndex::end()))
    }

    #[inline]
    pub fn source(&self, ix: EdgeIndex) -> NodeIndex {
        self.endpoints(ix).0
    }

    #[inline]
    pub fn target(&self, ix: EdgeIndex) -> NodeIndex {
        self.endpoints(ix).1
    }

    #[inline]
    pub fn position(&self, ix: NodeIndex) -> Point {
        self.graph[ix].position
    }

    /// The straight-line geometry of an edge.
    pub fn edge_line(&self, ix: EdgeIndex) -> Line {
        let (source, target) = self.endpoints(ix);
        Line::new(self.position(source), self.position(target))
    }

    /// The planar length of the edge geometry, which may differ from its
    /// [`length`](Edge::length) attribute.
    pub fn geometric_length(&self, ix: EdgeIndex) -> f64 {
        let line = self.edge_line(ix);
        Euclidean.distance(line.start_point(), line.end_point())
    }

    /// The planar bearing of an edge, see [`bearing`](crate::spatial::bearing).
    pub fn edge_bearing(&self, ix: EdgeIndex) -> f64 {
        let line = self.edge_line(ix);
        crate::spatial::bearing(line.start_point(), line.end_point())
    }

    pub fn outgoing(&self, ix: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, Edge>> {
        self.graph.edges_directed(ix, Direction::Outgoing)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.graph.edge_references().map(|edge| (edge.id(), edge.weight()))
    }

    /// Widens an edge to carry `mode` on behalf of a mapped route.
    ///
    /// The mode is recorded in [`Edge::assigned`], leaving the modes the edge
    /// was supplied with untouched, so later candidate searches are unaffected.
    /// Returns `true` if the edge did not already permit the mode.
    pub fn allow_mode(&mut self, ix: EdgeIndex, mode: &Mode) -> bool {
        match self.graph.edge_weight_mut(ix) {
            Some(edge) if !edge.permits(mode) => {
                debug!("Edge {} now carries {mode}", edge.id);
                edge.assigned.insert(mode.clone())
            }
            _ => false,
        }
    }

    /// Obtains the artificial vertex standing in for a stop without candidates,
    /// creating it on first use.
    pub fn artificial_stop_vertex(&mut self, stop: &StopId, position: Point) -> Result<NodeIndex> {
        if let Some(ix) = self.stop_vertices.get(stop) {
            return Ok(*ix);
        }

        let id = VertexId::new(stop_element_id(stop));
        if self.vertices.contains_key(&id) {
            return Err(IntegrityError::DuplicateVertex(id).into());
        }

        let ix = self.graph.add_node(Vertex::new(id.clone(), position));
        self.vertices.insert(id, ix);
        self.stop_vertices.insert(stop.clone(), ix);
        Ok(ix)
    }

    /// Obtains the artificial zero-length loop edge which anchors a stop without
    /// candidates. Returns the edge, and whether it was newly created.
    pub fn artificial_stop_edge(
        &mut self,
        stop: &StopId,
        position: Point,
        freespeed: f64,
    ) -> Result<(EdgeIndex, bool)> {
        if let Some(ix) = self.stop_edges.get(stop) {
            return Ok((*ix, false));
        }

        let vertex = self.artificial_stop_vertex(stop, position)?;
        let id = EdgeId::new(stop_element_id(stop));
        let ix = self.insert_artificial_edge(id, vertex, vertex, 0.0, freespeed)?;
        self.stop_edges.insert(stop.clone(), ix);
        Ok((ix, true))
    }

    /// Obtains the artificial edge directly joining two vertices.
    /// Returns the edge, and whether it was newly created.
    pub fn artificial_connector(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        freespeed: f64,
    ) -> Result<(EdgeIndex, bool)> {
        if let Some(ix) = self.connectors.get(&(from, to)) {
            return Ok((*ix, false));
        }

        let id = EdgeId::new(connector_id(&self.graph[from].id, &self.graph[to].id));
        let length = Euclidean.distance(self.position(from), self.position(to));
        let ix = self.insert_artificial_edge(id, from, to, length, freespeed)?;
        self.connectors.insert((from, to), ix);
        Ok((ix, true))
    }

    fn insert_artificial_edge(
        &mut self,
        id: EdgeId,
        source: NodeIndex,
        target: NodeIndex,
        length: f64,
        freespeed: f64,
    ) -> Result<EdgeIndex> {
        if self.edges.contains_key(&id) {
            return Err(IntegrityError::DuplicateEdge(id).into());
        }

        let edge = Edge::new(
            id.clone(),
            self.graph[source].id.clone(),
            self.graph[target].id.clone(),
        )
        .with_length(length)
        .with_freespeed(freespeed)
        .as_artificial();

        debug!("Creating artificial edge {id} ({length:.1}m)");
        let ix = self.graph.add_edge(source, target, edge);
        self.edges.insert(id, ix);
        Ok(ix)
    }
}

/// `pt_s:<stop>`, shared by the artificial vertex and loop edge of a stop.
fn stop_element_id(stop: &StopId) -> String {
    format!("{ARTIFICIAL_PREFIX}s:{stop}")
}

/// `pt_c:<len>:<from>_<to>`. The length of the source id keeps the split
/// between the two vertex ids unambiguous.
fn connector_id(from: &VertexId, to: &VertexId) -> String {
    format!("{ARTIFICIAL_PREFIX}c:{}:{from}_{to}", from.as_str().len())
}
