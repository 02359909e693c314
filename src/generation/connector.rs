//! # Region Connection
//!
//! Joins the leaf regions of a [`RegionTree`] with corridors so that every room
//! can reach every other:
//!
//! 1. leaves sharing a long enough border are adjacent
//! 2. a randomized spanning tree links all leaves
//! 3. some remaining adjacent pairs get extra corridors, creating loops
//! 4. each empty leaf records which neighbours it must stitch together inside itself
//! 5. connections that end in an empty leaf which does not stitch them are pruned
//!    until nothing changes

use crate::config::{MIN_SHARED_BORDER, RESERVED_TOP_ROWS};
use crate::generation::{RegionId, RegionKind, RegionTree};
use crate::utils::{walk, Axis, SharedEdge};
use crate::{DelveError, DelveResult, GenerationConfig, Position};
use log::debug;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A corridor between two adjacent leaf regions.
///
/// The first region is the left or top one. The corridor crosses the shared
/// border between `entries.0` (last cell inside the first region) and
/// `entries.1` (first cell inside the second). `start` and `end` are where it
/// finishes inside each region: the nearest room cell, or the entry itself when
/// the region has no room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub regions: (RegionId, RegionId),
    /// Axis the corridor travels along when crossing the border
    pub direction: Axis,
    pub start: Position,
    pub entries: (Position, Position),
    pub end: Position,
}

impl Connection {
    /// Whether this connection joins `a` and `b`, in either order.
    pub fn joins(&self, a: RegionId, b: RegionId) -> bool {
        self.regions == (a, b) || self.regions == (b, a)
    }

    /// The region at the other end from `region`.
    pub fn other(&self, region: RegionId) -> Option<RegionId> {
        if self.regions.0 == region {
            Some(self.regions.1)
        } else if self.regions.1 == region {
            Some(self.regions.0)
        } else {
            None
        }
    }

    /// The entry cell on `region`'s side of the border.
    pub fn entry_in(&self, region: RegionId) -> Option<Position> {
        if self.regions.0 == region {
            Some(self.entries.0)
        } else if self.regions.1 == region {
            Some(self.entries.1)
        } else {
            None
        }
    }

    /// Cells the corridor occupies, from `start` to `end`.
    ///
    /// Inside the first region the corridor leaves the room along the
    /// perpendicular axis and turns toward the border; inside the second it
    /// continues straight from the border and turns into the room.
    pub fn corridor(&self) -> Vec<Position> {
        let mut cells = walk(self.start, self.entries.0, self.direction.perpendicular());
        cells.extend(walk(self.entries.1, self.end, self.direction));
        cells
    }
}

/// An empty leaf and the neighbours it joins by internal corridors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyRegionConnection {
    pub region: RegionId,
    /// Neighbours in stitching order; consecutive pairs are joined
    pub neighbors: Vec<RegionId>,
}

/// Output of [`RegionConnector::connect`], already pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionPlan {
    /// Spanning-tree connections
    pub mst: Vec<Connection>,
    /// Extra connections forming loops
    pub optional: Vec<Connection>,
    pub empty_regions: Vec<EmptyRegionConnection>,
}

impl ConnectionPlan {
    /// All surviving connections, spanning tree first.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.mst.iter().chain(self.optional.iter())
    }

    /// The connection joining `a` and `b`, if any.
    pub fn find(&self, a: RegionId, b: RegionId) -> Option<&Connection> {
        self.connections().find(|c| c.joins(a, b))
    }

    pub fn empty_region(&self, region: RegionId) -> Option<&EmptyRegionConnection> {
        self.empty_regions.iter().find(|e| e.region == region)
    }

    fn size(&self) -> usize {
        self.mst.len()
            + self.optional.len()
            + self.empty_regions.len()
            + self
                .empty_regions
                .iter()
                .map(|e| e.neighbors.len())
                .sum::<usize>()
    }
}

/// Two leaves that may be joined, with the border they share.
#[derive(Debug, Clone, Copy)]
struct Adjacency {
    a: RegionId,
    b: RegionId,
    /// Computed from `a`'s point of view
    edge: SharedEdge,
}

impl Adjacency {
    fn other(&self, region: RegionId) -> RegionId {
        if self.a == region {
            self.b
        } else {
            self.a
        }
    }
}

/// Builds the corridor graph over a region tree.
#[derive(Debug, Clone)]
pub struct RegionConnector {
    /// Probability that a non-tree adjacent pair gets a loop corridor
    pub extra_connection_chance: f64,
    /// Shortest shared border that counts as adjacent
    pub min_shared_border: i32,
}

impl RegionConnector {
    /// A chance outside `0.0..=1.0` is clamped; NaN means no loops.
    pub fn new(extra_connection_chance: f64) -> Self {
        Self {
            extra_connection_chance: unit_chance(extra_connection_chance),
            min_shared_border: MIN_SHARED_BORDER,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.extra_connection_chance)
    }

    /// The border two regions share, if it is long enough to carry a corridor.
    pub fn can_connect(&self, a: &crate::Rect, b: &crate::Rect) -> Option<SharedEdge> {
        a.shared_edge(b)
            .filter(|edge| edge.len() >= self.min_shared_border)
    }

    /// Connects every leaf of `tree`.
    ///
    /// Fails with [`DelveError::GenerationFailed`] when the leaves do not form a
    /// single adjacency component, which the caller should treat as a failed
    /// attempt.
    pub fn connect(&self, tree: &RegionTree, rng: &mut StdRng) -> DelveResult<ConnectionPlan> {
        let leaves = tree.leaves();
        let adjacency = self.adjacency(tree, &leaves);
        let mut by_region: HashMap<RegionId, Vec<usize>> = HashMap::new();
        for (index, pair) in adjacency.iter().enumerate() {
            by_region.entry(pair.a).or_default().push(index);
            by_region.entry(pair.b).or_default().push(index);
        }

        let (mst, used) = self.spanning_tree(tree, &leaves, &adjacency, &by_region, rng)?;

        let mut optional = Vec::new();
        for (index, pair) in adjacency.iter().enumerate() {
            if !used.contains(&index) && rng.gen_bool(self.extra_connection_chance) {
                optional.push(build_connection(tree, pair, rng));
            }
        }

        let empty_regions = route_empty_regions(tree, &leaves, &mst, &optional, rng);
        let mut plan = ConnectionPlan {
            mst,
            optional,
            empty_regions,
        };
        let before = plan.size();
        prune_orphans(tree, &mut plan);

        debug!(
            "Connected {} regions: {} tree corridors, {} loops, {} empty-region routes ({} items pruned)",
            leaves.len(),
            plan.mst.len(),
            plan.optional.len(),
            plan.empty_regions.len(),
            before - plan.size()
        );
        Ok(plan)
    }

    fn adjacency(&self, tree: &RegionTree, leaves: &[RegionId]) -> Vec<Adjacency> {
        let mut pairs = Vec::new();
        for (i, &a) in leaves.iter().enumerate() {
            for &b in &leaves[i + 1..] {
                let (Some(ra), Some(rb)) = (tree.get(a), tree.get(b)) else {
                    continue;
                };
                if let Some(edge) = self.can_connect(&ra.rect, &rb.rect) {
                    pairs.push(Adjacency { a, b, edge });
                }
            }
        }
        pairs
    }

    fn spanning_tree(
        &self,
        tree: &RegionTree,
        leaves: &[RegionId],
        adjacency: &[Adjacency],
        by_region: &HashMap<RegionId, Vec<usize>>,
        rng: &mut StdRng,
    ) -> DelveResult<(Vec<Connection>, HashSet<usize>)> {
        let mut mst = Vec::new();
        let mut used = HashSet::new();
        let Some(&seed) = leaves.choose(rng) else {
            return Ok((mst, used));
        };

        let mut connected = vec![seed];
        let mut unconnected: BTreeSet<RegionId> =
            leaves.iter().copied().filter(|&id| id != seed).collect();

        while !unconnected.is_empty() {
            let mut progress = false;
            let mut order = connected.clone();
            order.shuffle(rng);

            for region in order {
                let candidates: Vec<usize> = by_region
                    .get(&region)
                    .map(|edges| {
                        edges
                            .iter()
                            .copied()
                            .filter(|&e| unconnected.contains(&adjacency[e].other(region)))
                            .collect()
                    })
                    .unwrap_or_default();
                let Some(&edge) = candidates.choose(rng) else {
                    continue;
                };

                let neighbor = adjacency[edge].other(region);
                mst.push(build_connection(tree, &adjacency[edge], rng));
                used.insert(edge);
                unconnected.remove(&neighbor);
                connected.push(neighbor);
                progress = true;
            }

            if !progress {
                return Err(DelveError::GenerationFailed(format!(
                    "{} of {} regions share no usable border with the rest",
                    unconnected.len(),
                    leaves.len()
                )));
            }
        }

        Ok((mst, used))
    }
}

pub(crate) fn unit_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// Picks a crossing point on the shared border and anchors both ends.
fn build_connection(tree: &RegionTree, pair: &Adjacency, rng: &mut StdRng) -> Connection {
    let edge = pair.edge;
    let (first, second) = if edge.receiver_first {
        (pair.a, pair.b)
    } else {
        (pair.b, pair.a)
    };

    // Keep off the border's ends, and keep horizontal corridors below the reserved rows
    let mut low = edge.from + 1;
    if edge.crossing == Axis::Horizontal {
        low = low.max(RESERVED_TOP_ROWS);
    }
    let high = edge.to - 1;
    let offset = if low < high {
        rng.gen_range(low..high)
    } else {
        (edge.from + edge.to) / 2
    };

    let entries = match edge.crossing {
        Axis::Horizontal => (
            Position::new(edge.line - 1, offset),
            Position::new(edge.line, offset),
        ),
        Axis::Vertical => (
            Position::new(offset, edge.line - 1),
            Position::new(offset, edge.line),
        ),
    };

    Connection {
        regions: (first, second),
        direction: edge.crossing,
        start: tree.room(first).map_or(entries.0, |room| room.clamp(entries.0)),
        entries,
        end: tree.room(second).map_or(entries.1, |room| room.clamp(entries.1)),
    }
}

/// Decides which neighbours each empty leaf stitches together.
///
/// Spanning-tree neighbours are always stitched so the tree stays connected
/// through the empty leaf. A leaf the tree reaches only once borrows a loop
/// neighbour, if it has one, so that it still joins two paths.
fn route_empty_regions(
    tree: &RegionTree,
    leaves: &[RegionId],
    mst: &[Connection],
    optional: &[Connection],
    rng: &mut StdRng,
) -> Vec<EmptyRegionConnection> {
    let mut routes = Vec::new();
    for &region in leaves {
        if !matches!(tree.get(region).map(|r| &r.kind), Some(RegionKind::Empty)) {
            continue;
        }

        let mut neighbors: Vec<RegionId> = mst.iter().filter_map(|c| c.other(region)).collect();
        if neighbors.len() == 1 {
            let loops: Vec<RegionId> = optional.iter().filter_map(|c| c.other(region)).collect();
            if let Some(&extra) = loops.choose(rng) {
                neighbors.push(extra);
            }
        }
        routes.push(EmptyRegionConnection { region, neighbors });
    }
    routes
}

fn is_anchored(
    tree: &RegionTree,
    empty_regions: &[EmptyRegionConnection],
    region: RegionId,
    other: RegionId,
) -> bool {
    tree.has_room(region)
        || empty_regions
            .iter()
            .any(|e| e.region == region && e.neighbors.contains(&other))
}

/// Removes connections that do not lead to a room, repeating until stable.
///
/// Each productive pass strictly shrinks the plan, so the loop terminates.
fn prune_orphans(tree: &RegionTree, plan: &mut ConnectionPlan) {
    loop {
        let before = plan.size();

        let empty_regions = &plan.empty_regions;
        let anchored = |c: &Connection| {
            is_anchored(tree, empty_regions, c.regions.0, c.regions.1)
                && is_anchored(tree, empty_regions, c.regions.1, c.regions.0)
        };
        plan.mst.retain(anchored);
        plan.optional.retain(anchored);

        let (mst, optional) = (&plan.mst, &plan.optional);
        for route in plan.empty_regions.iter_mut() {
            let region = route.region;
            route
                .neighbors
                .retain(|&n| mst.iter().chain(optional.iter()).any(|c| c.joins(region, n)));
        }
        plan.empty_regions.retain(|route| route.neighbors.len() > 1);

        if plan.size() == before {
            break;
        }
    }
}
