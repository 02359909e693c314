//! # Region Splitting
//!
//! Recursive binary partitioning of the level area. Regions live in an arena
//! and refer to each other by [`RegionId`]; a region is either a branch with two
//! children, a leaf holding a room, or an empty leaf that corridors may pass
//! through.

use super::connector::unit_chance;
use crate::{GenerationConfig, Padding, Rect};
use rand::{rngs::StdRng, Rng};

/// Index of a region inside its [`RegionTree`].
pub type RegionId = usize;

/// How a branch region was divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Divided into a left and a right half
    Horizontal,
    /// Divided into a top and a bottom half
    Vertical,
}

/// What a region holds. Exactly one of these applies to every region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKind {
    Branch {
        first: RegionId,
        second: RegionId,
        direction: SplitDirection,
    },
    Room(Rect),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub rect: Rect,
    pub kind: RegionKind,
}

impl Region {
    pub fn room(&self) -> Option<Rect> {
        match self.kind {
            RegionKind::Room(room) => Some(room),
            _ => None,
        }
    }

    pub fn is_empty_leaf(&self) -> bool {
        self.kind == RegionKind::Empty
    }
}

/// Arena holding every region produced by one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTree {
    regions: Vec<Region>,
    root: RegionId,
}

impl RegionTree {
    /// Assembles a tree from hand-built regions.
    #[cfg(test)]
    pub(crate) fn from_parts(regions: Vec<Region>, root: RegionId) -> Self {
        Self { regions, root }
    }

    pub fn root(&self) -> RegionId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn room(&self, id: RegionId) -> Option<Rect> {
        self.get(id).and_then(Region::room)
    }

    pub fn has_room(&self, id: RegionId) -> bool {
        self.room(id).is_some()
    }

    /// Leaf regions, first child before second, depth first.
    pub fn leaves(&self) -> Vec<RegionId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.regions[id].kind {
                RegionKind::Branch { first, second, .. } => {
                    stack.push(second);
                    stack.push(first);
                }
                _ => leaves.push(id),
            }
        }
        leaves
    }

    /// Every room rectangle in the tree.
    pub fn rooms(&self) -> Vec<Rect> {
        self.regions.iter().filter_map(Region::room).collect()
    }

    pub fn room_count(&self) -> usize {
        self.regions.iter().filter(|r| r.room().is_some()).count()
    }

    fn push(&mut self, region: Region) -> RegionId {
        self.regions.push(region);
        self.regions.len() - 1
    }
}

/// Recursively partitions a rectangle into regions and places rooms in the leaves.
///
/// A dimension can be split when it holds two minimum sections, a minimum
/// section being the minimum room size plus the padding on both sides. Leaves
/// therefore always have room for at least a minimum-sized room.
#[derive(Debug, Clone)]
pub struct RegionSplitter {
    pub min_room_width: i32,
    pub min_room_height: i32,
    pub max_room_width: i32,
    pub max_room_height: i32,
    pub padding: Padding,
    /// Probability that a leaf is left empty instead of receiving a room
    pub empty_region_chance: f64,
}

impl RegionSplitter {
    /// Creates a splitter for square room bounds with default padding and no empty leaves.
    pub fn new(min_room_size: i32, max_room_size: i32) -> Self {
        Self {
            min_room_width: min_room_size,
            min_room_height: min_room_size,
            max_room_width: max_room_size,
            max_room_height: max_room_size,
            padding: Padding::default(),
            empty_region_chance: 0.0,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.min_room_size as i32, config.max_room_size as i32)
            .with_empty_region_chance(config.empty_region_chance)
    }

    pub fn with_empty_region_chance(mut self, chance: f64) -> Self {
        self.empty_region_chance = unit_chance(chance);
        self
    }

    pub fn min_section_width(&self) -> i32 {
        self.min_room_width + self.padding.horizontal()
    }

    pub fn min_section_height(&self) -> i32 {
        self.min_room_height + self.padding.vertical()
    }

    /// Splits `rect` into a fresh region tree.
    pub fn split(&self, rect: Rect, rng: &mut StdRng) -> RegionTree {
        let mut tree = RegionTree {
            regions: Vec::new(),
            root: 0,
        };
        tree.root = self.split_region(&mut tree, rect, rng);
        tree
    }

    fn split_region(&self, tree: &mut RegionTree, rect: Rect, rng: &mut StdRng) -> RegionId {
        let min_width = self.min_section_width();
        let min_height = self.min_section_height();
        let can_split_horizontally = rect.width >= min_width * 2;
        let can_split_vertically = rect.height >= min_height * 2;

        let direction = match (can_split_horizontally, can_split_vertically) {
            (true, true) => {
                if rng.gen_bool(0.5) {
                    SplitDirection::Horizontal
                } else {
                    SplitDirection::Vertical
                }
            }
            (true, false) => SplitDirection::Horizontal,
            (false, true) => SplitDirection::Vertical,
            (false, false) => {
                let kind = self.carve_leaf(rect, rng);
                return tree.push(Region { rect, kind });
            }
        };

        let (first_rect, second_rect) = match direction {
            SplitDirection::Horizontal => {
                let offset = rng.gen_range(min_width..=rect.width - min_width);
                (
                    Rect::new(rect.left, rect.top, offset, rect.height),
                    Rect::new(rect.left + offset, rect.top, rect.width - offset, rect.height),
                )
            }
            SplitDirection::Vertical => {
                let offset = rng.gen_range(min_height..=rect.height - min_height);
                (
                    Rect::new(rect.left, rect.top, rect.width, offset),
                    Rect::new(rect.left, rect.top + offset, rect.width, rect.height - offset),
                )
            }
        };

        let first = self.split_region(tree, first_rect, rng);
        let second = self.split_region(tree, second_rect, rng);
        tree.push(Region {
            rect,
            kind: RegionKind::Branch {
                first,
                second,
                direction,
            },
        })
    }

    fn carve_leaf(&self, rect: Rect, rng: &mut StdRng) -> RegionKind {
        let available_width = rect.width - self.padding.horizontal();
        let available_height = rect.height - self.padding.vertical();
        if available_width < self.min_room_width
            || available_height < self.min_room_height
            || rng.gen_bool(self.empty_region_chance)
        {
            return RegionKind::Empty;
        }

        let width = rng.gen_range(
            self.min_room_width..=self.max_room_width.clamp(self.min_room_width, available_width),
        );
        let height = rng.gen_range(
            self.min_room_height..=self.max_room_height.clamp(self.min_room_height, available_height),
        );
        RegionKind::Room(Rect::new(
            rect.left + self.padding.left,
            rect.top + self.padding.top,
            width,
            height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn split(seed: u64, splitter: &RegionSplitter, rect: Rect) -> RegionTree {
        let mut rng = StdRng::seed_from_u64(seed);
        splitter.split(rect, &mut rng)
    }

    #[test]
    fn test_leaves_partition_the_area() {
        let area = Rect::new(0, 0, 60, 40);
        let splitter = RegionSplitter::new(5, 9);
        for seed in 0..20 {
            let tree = split(seed, &splitter, area);
            let mut covered = HashSet::new();
            for id in tree.leaves() {
                for pos in tree.get(id).unwrap().rect.positions() {
                    assert!(covered.insert(pos), "leaves overlap at {:?}", pos);
                }
            }
            assert_eq!(covered.len() as i32, area.area());
        }
    }

    #[test]
    fn test_rooms_fit_inside_padded_leaves() {
        let splitter = RegionSplitter::new(5, 9);
        for seed in 0..20 {
            let tree = split(seed, &splitter, Rect::new(0, 0, 50, 36));
            for id in tree.leaves() {
                let region = tree.get(id).unwrap();
                let room = region.room().expect("no empty leaves without an empty chance");
                assert_eq!(room.left, region.rect.left + 1);
                assert_eq!(room.top, region.rect.top + 2);
                assert!(room.right() < region.rect.right());
                assert!(room.bottom() < region.rect.bottom());
                assert!((5..=9).contains(&room.width));
                assert!((5..=9).contains(&room.height));
            }
        }
    }

    #[test]
    fn test_leaves_cannot_be_split_further() {
        let splitter = RegionSplitter::new(5, 9);
        let tree = split(3, &splitter, Rect::new(0, 0, 70, 45));
        for id in tree.leaves() {
            let rect = tree.get(id).unwrap().rect;
            assert!(rect.width < splitter.min_section_width() * 2);
            assert!(rect.height < splitter.min_section_height() * 2);
            assert!(rect.width >= splitter.min_section_width());
            assert!(rect.height >= splitter.min_section_height());
        }
    }

    #[test]
    fn test_branches_hold_two_children() {
        let tree = split(11, &RegionSplitter::new(5, 9), Rect::new(0, 0, 40, 30));
        let mut children = 0;
        for id in 0..tree.len() {
            if let RegionKind::Branch { first, second, .. } = tree.get(id).unwrap().kind {
                assert_ne!(first, second);
                assert!(tree.get(first).is_some() && tree.get(second).is_some());
                children += 2;
            }
        }
        // Every region except the root is somebody's child
        assert_eq!(children, tree.len() - 1);
        assert_eq!(tree.get(tree.root()).unwrap().rect, Rect::new(0, 0, 40, 30));
    }

    #[test]
    fn test_small_area_is_a_single_room() {
        let tree = split(5, &RegionSplitter::new(5, 9), Rect::new(0, 0, 12, 14));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.room_count(), 1);
        let room = tree.room(tree.root()).unwrap();
        assert!(room.contains(Position::new(1, 2)));
    }

    #[test]
    fn test_empty_region_chance() {
        let area = Rect::new(0, 0, 60, 40);
        let all_empty = RegionSplitter::new(5, 9).with_empty_region_chance(1.0);
        assert_eq!(split(1, &all_empty, area).room_count(), 0);

        let tree = split(1, &RegionSplitter::new(5, 9).with_empty_region_chance(0.5), area);
        let leaves = tree.leaves();
        let empty = leaves
            .iter()
            .filter(|&&id| tree.get(id).unwrap().is_empty_leaf())
            .count();
        assert_eq!(empty + tree.room_count(), leaves.len());

        let nan = RegionSplitter::new(5, 9).with_empty_region_chance(f64::NAN);
        assert_eq!(nan.empty_region_chance, 0.0);
        assert_eq!(split(1, &nan, area), split(1, &RegionSplitter::new(5, 9), area));
    }

    #[test]
    fn test_split_is_deterministic() {
        let splitter = RegionSplitter::new(4, 8).with_empty_region_chance(0.2);
        let area = Rect::new(0, 0, 48, 32);
        assert_eq!(split(77, &splitter, area), split(77, &splitter, area));
    }
}
