//! # Grid Geometry
//!
//! Rectangles, paddings, and the axis-aligned walks corridors are carved along.

use crate::Position;
use serde::{Deserialize, Serialize};

/// An axis of travel on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Along x
    Horizontal,
    /// Along y
    Vertical,
}

impl Axis {
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// An axis-aligned rectangle of cells. `right()` and `bottom()` are exclusive.
///
/// # Examples
///
/// ```
/// use delve::{Position, Rect};
///
/// let rect = Rect::new(2, 3, 4, 5);
/// assert_eq!(rect.right(), 6);
/// assert_eq!(rect.bottom(), 8);
/// assert!(rect.contains(Position::new(5, 7)));
/// assert!(!rect.contains(Position::new(6, 7)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// The border two touching rectangles share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedEdge {
    /// Axis a corridor travels along to cross the border
    pub crossing: Axis,
    /// x of a vertical border, or y of a horizontal one
    pub line: i32,
    /// Start of the overlap along the border (inclusive)
    pub from: i32,
    /// End of the overlap along the border (exclusive)
    pub to: i32,
    /// Whether the receiver of `shared_edge` is the left/top rectangle
    pub receiver_first: bool,
}

impl SharedEdge {
    pub fn len(&self) -> i32 {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.left && pos.x < self.right() && pos.y >= self.top && pos.y < self.bottom()
    }

    /// The cell of this rectangle nearest to `pos`.
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(self.left, self.right() - 1),
            pos.y.clamp(self.top, self.bottom() - 1),
        )
    }

    /// Every cell inside the rectangle, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (left, right) = (self.left, self.right());
        (self.top..self.bottom()).flat_map(move |y| (left..right).map(move |x| Position::new(x, y)))
    }

    /// The edge this rectangle shares with `other`, if they touch side by side
    /// or one above the other with a non-empty overlap.
    pub fn shared_edge(&self, other: &Rect) -> Option<SharedEdge> {
        let vertical_overlap = (self.top.max(other.top), self.bottom().min(other.bottom()));
        let horizontal_overlap = (self.left.max(other.left), self.right().min(other.right()));

        let edge = if self.right() == other.left || other.right() == self.left {
            SharedEdge {
                crossing: Axis::Horizontal,
                line: if self.right() == other.left {
                    other.left
                } else {
                    self.left
                },
                from: vertical_overlap.0,
                to: vertical_overlap.1,
                receiver_first: self.right() == other.left,
            }
        } else if self.bottom() == other.top || other.bottom() == self.top {
            SharedEdge {
                crossing: Axis::Vertical,
                line: if self.bottom() == other.top {
                    other.top
                } else {
                    self.top
                },
                from: horizontal_overlap.0,
                to: horizontal_overlap.1,
                receiver_first: self.bottom() == other.top,
            }
        } else {
            return None;
        };

        (!edge.is_empty()).then_some(edge)
    }
}

/// Insets applied to a region to position its room.
///
/// `right` and `bottom` are margins kept free for walls; `top` leaves space for
/// the wall face and wall top drawn above the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Padding {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::new(1, 2, 1, 1)
    }
}

/// Walks from `from` to `to` one cell at a time, finishing `first` before the
/// other axis. Both endpoints are included; the result bends at most once.
///
/// # Examples
///
/// ```
/// use delve::{Position, utils::{Axis, walk}};
///
/// let path = walk(Position::new(0, 0), Position::new(2, 1), Axis::Horizontal);
/// assert_eq!(
///     path,
///     vec![
///         Position::new(0, 0),
///         Position::new(1, 0),
///         Position::new(2, 0),
///         Position::new(2, 1),
///     ]
/// );
/// ```
pub fn walk(from: Position, to: Position, first: Axis) -> Vec<Position> {
    let mut path = Vec::with_capacity(from.manhattan_distance(to) as usize + 1);
    let mut current = from;
    path.push(current);
    while current != to {
        current = current.step_toward(to, first == Axis::Horizontal);
        path.push(current);
    }
    path
}

/// Walks through each waypoint in turn, finishing `first` before the other axis
/// on every leg. Shared waypoints appear once.
pub fn walk_through(waypoints: &[Position], first: Axis) -> Vec<Position> {
    let mut path: Vec<Position> = Vec::new();
    for leg in waypoints.windows(2) {
        let segment = walk(leg[0], leg[1], first);
        let skip = usize::from(!path.is_empty());
        path.extend(segment.into_iter().skip(skip));
    }
    if path.is_empty() {
        path.extend(waypoints.first().copied());
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(5, 5, 10, 8);
        assert_eq!(rect.right(), 15);
        assert_eq!(rect.bottom(), 13);
        assert_eq!(rect.area(), 80);
        assert_eq!(rect.positions().count(), 80);
    }

    #[test]
    fn test_rect_clamp() {
        let rect = Rect::new(2, 2, 3, 3);
        assert_eq!(rect.clamp(Position::new(0, 3)), Position::new(2, 3));
        assert_eq!(rect.clamp(Position::new(10, 10)), Position::new(4, 4));
        assert_eq!(rect.clamp(Position::new(3, 3)), Position::new(3, 3));
    }

    #[test]
    fn test_shared_edge_side_by_side() {
        let left = Rect::new(0, 0, 10, 20);
        let right = Rect::new(10, 5, 8, 30);

        let edge = left.shared_edge(&right).unwrap();
        assert_eq!(edge.crossing, Axis::Horizontal);
        assert_eq!(edge.line, 10);
        assert_eq!((edge.from, edge.to), (5, 20));
        assert!(edge.receiver_first);

        let mirrored = right.shared_edge(&left).unwrap();
        assert_eq!(mirrored.line, 10);
        assert!(!mirrored.receiver_first);
    }

    #[test]
    fn test_shared_edge_stacked() {
        let top = Rect::new(0, 0, 12, 8);
        let bottom = Rect::new(4, 8, 12, 8);

        let edge = bottom.shared_edge(&top).unwrap();
        assert_eq!(edge.crossing, Axis::Vertical);
        assert_eq!(edge.line, 8);
        assert_eq!(edge.len(), 8);
        assert!(!edge.receiver_first);
    }

    #[test]
    fn test_shared_edge_requires_contact() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.shared_edge(&Rect::new(11, 0, 5, 10)).is_none());
        // Corner contact only
        assert!(a.shared_edge(&Rect::new(10, 10, 5, 5)).is_none());
    }

    #[test]
    fn test_walk_is_one_bend() {
        let path = walk(Position::new(3, 3), Position::new(0, 5), Axis::Vertical);
        assert_eq!(path.len(), 6);
        assert_eq!(path[2], Position::new(3, 5));
        assert_eq!(path.last(), Some(&Position::new(0, 5)));

        let single = walk(Position::new(1, 1), Position::new(1, 1), Axis::Horizontal);
        assert_eq!(single, vec![Position::new(1, 1)]);
    }

    #[test]
    fn test_walk_through_waypoints() {
        let path = walk_through(
            &[Position::new(0, 0), Position::new(2, 0), Position::new(2, 2)],
            Axis::Horizontal,
        );
        assert_eq!(path.len(), 5);
        assert_eq!(path[2], Position::new(2, 0));

        assert_eq!(
            walk_through(&[Position::new(4, 4)], Axis::Vertical),
            vec![Position::new(4, 4)]
        );
    }
}
