use crate::graph::{Graph, ModeFilter};
use crate::mapping::{Cost, CostModel};

use indexmap::IndexMap;
use indexmap::map::Entry;
use pathfinding::num_traits::Zero;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::BuildHasherDefault;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

type Node = NodeIndex;

#[derive(Debug)]
struct SmallestHolder {
    cost: Cost,
    index: usize,
}

impl PartialEq for SmallestHolder {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.index == other.index
    }
}

impl Eq for SmallestHolder {}

impl PartialOrd for SmallestHolder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestHolder {
    /// Reversed, so the heap pops the cheapest (then earliest discovered) entry.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Struct returned by [`Dijkstra::reach`].
pub struct DijkstraReachable<FN> {
    to_see: BinaryHeap<SmallestHolder>,
    seen: FxHashSet<usize>,
    parents: FxIndexMap<Node, (usize, Option<EdgeIndex>, Cost)>,
    successors: FN,
}

/// Information about a node reached by [`Dijkstra::reach`].
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct DijkstraReachableItem {
    /// The node that was reached.
    pub node: Node,
    /// The previous node that the current node came from.
    /// If the node is the first node, there will be no parent.
    pub parent: Option<Node>,
    /// The edge taken from the parent.
    pub edge: Option<EdgeIndex>,
    /// The total cost from the starting node.
    pub total_cost: Cost,
}

impl<FN, IN> Iterator for DijkstraReachable<FN>
where
    FN: FnMut(&Node) -> IN,
    IN: IntoIterator<Item = (Node, EdgeIndex, Cost)>,
{
    type Item = DijkstraReachableItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(SmallestHolder { cost, index }) = self.to_see.pop() {
            if !self.seen.insert(index) {
                continue;
            }

            let Some((node, (parent_index, edge, total_cost))) = self.parents.get_index(index)
            else {
                continue;
            };

            let item = DijkstraReachableItem {
                node: *node,
                parent: self.parents.get_index(*parent_index).map(|x| *x.0),
                edge: *edge,
                total_cost: *total_cost,
            };

            let successors = (self.successors)(node);
            for (successor, via, move_cost) in successors {
                let new_cost = cost.saturating_add(move_cost);

                let index = match self.parents.entry(successor) {
                    Entry::Vacant(e) => {
                        let n = e.index();
                        e.insert((index, Some(via), new_cost));
                        n
                    }
                    Entry::Occupied(mut e) => {
                        if e.get().2 > new_cost {
                            e.insert((index, Some(via), new_cost));
                            e.index()
                        } else {
                            continue;
                        }
                    }
                };

                self.to_see.push(SmallestHolder {
                    cost: new_cost,
                    index,
                });
            }

            return Some(item);
        }

        None
    }
}

/// The settled nodes of a bounded search, from which paths are rebuilt.
#[derive(Debug, Default)]
pub struct Reach {
    settled: FxHashMap<Node, DijkstraReachableItem>,
}

impl Reach {
    #[inline]
    pub fn cost(&self, node: Node) -> Option<Cost> {
        self.settled.get(&node).map(|item| item.total_cost)
    }

    /// The edges leading from the start of the search to `node`, in travel order.
    pub fn path(&self, node: Node) -> Option<Vec<EdgeIndex>> {
        let mut current = self.settled.get(&node)?;
        let mut edges = vec![];

        while let (Some(edge), Some(parent)) = (current.edge, current.parent) {
            edges.push(edge);
            current = self.settled.get(&parent)?;
        }

        edges.reverse();
        Some(edges)
    }

    pub fn len(&self) -> usize {
        self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}

pub struct Dijkstra;

impl Dijkstra {
    /// Visit all nodes that are reachable from a start node. The node
    /// will be visited in order of cost, with the closest nodes first.
    ///
    /// The `successors` function receives the current node, and returns
    /// an iterator of successors associated with the edge taken and its cost.
    pub fn reach<FN, IN>(&self, start: &Node, successors: FN) -> DijkstraReachable<FN>
    where
        FN: FnMut(&Node) -> IN,
        IN: IntoIterator<Item = (Node, EdgeIndex, Cost)>,
    {
        let mut to_see: BinaryHeap<SmallestHolder> = BinaryHeap::with_capacity(256);
        to_see.push(SmallestHolder {
            cost: Zero::zero(),
            index: 0,
        });

        let mut parents: FxIndexMap<Node, (usize, Option<EdgeIndex>, Cost)> =
            FxIndexMap::with_capacity_and_hasher(64, BuildHasherDefault::<FxHasher>::default());

        parents.insert(*start, (usize::MAX, None, Zero::zero()));
        let seen = FxHashSet::default();

        DijkstraReachable {
            to_see,
            seen,
            parents,
            successors,
        }
    }

    /// Searches the mode-filtered graph from `start` until every target is
    /// settled, or no node remains within `bound`.
    pub fn bounded(
        &self,
        graph: &Graph,
        start: Node,
        filter: &ModeFilter,
        model: CostModel,
        bound: Cost,
        targets: &FxHashSet<Node>,
    ) -> Reach {
        let mut remaining = targets.len();
        let mut reach = Reach::default();

        let successors = move |node: &Node| {
            graph
                .outgoing(*node)
                .filter(move |edge| filter.admits(edge.weight()))
                .map(move |edge| (edge.target(), edge.id(), model.edge_cost(edge.weight())))
        };

        for item in self
            .reach(&start, successors)
            .take_while(|item| item.total_cost <= bound)
        {
            if targets.contains(&item.node) {
                remaining -= 1;
            }

            reach.settled.insert(item.node, item);
            if remaining == 0 {
                break;
            }
        }

        reach
    }
}
