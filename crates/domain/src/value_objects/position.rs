//! Grid positions and axis-constrained connectivity
//!
//! A [`Position`] is an immutable integer coordinate. Three flavours of
//! adjacency are offered:
//!
//! - [`Position::is_adjacent`] - the 26-neighbourhood (faces, edges and corners)
//! - [`Position::is_adjacent_along`] - a single unit step on one axis
//! - [`Position::is_adjacent_towards`] - a compound step built from [`Direction`]s
//!
//! [`Position::are_connected`] decides whether a set of positions can be laid
//! out as one unbroken chain along an axis, which is what joining modules into
//! a single component requires.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

// ============================================================================
// Axis
// ============================================================================

/// One of the three grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The negative and positive unit directions on this axis.
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::X => [Direction::Left, Direction::Right],
            Axis::Y => [Direction::Top, Direction::Bottom],
            Axis::Z => [Direction::Front, Direction::Back],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

impl FromStr for Axis {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(DomainError::parse(format!("Invalid axis: {}", s))),
        }
    }
}

// ============================================================================
// Direction
// ============================================================================

/// A unit step on exactly one axis.
///
/// Top decreases Y and Back increases Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
        Direction::Front,
        Direction::Back,
    ];

    /// The axis this direction moves along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Top | Direction::Bottom => Axis::Y,
            Direction::Left | Direction::Right => Axis::X,
            Direction::Front | Direction::Back => Axis::Z,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Front => Direction::Back,
            Direction::Back => Direction::Front,
        }
    }

    /// Unit offset as `(dx, dy, dz)`.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Top => (0, -1, 0),
            Direction::Bottom => (0, 1, 0),
            Direction::Left => (-1, 0, 0),
            Direction::Right => (1, 0, 0),
            Direction::Front => (0, 0, -1),
            Direction::Back => (0, 0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Top => write!(f, "top"),
            Direction::Bottom => write!(f, "bottom"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Front => write!(f, "front"),
            Direction::Back => write!(f, "back"),
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "front" => Ok(Direction::Front),
            "back" => Ok(Direction::Back),
            _ => Err(DomainError::parse(format!("Invalid direction: {}", s))),
        }
    }
}

/// Sum the offsets of `directions`, rejecting two steps on the same axis.
fn combined_offset(directions: &[Direction]) -> Result<(i64, i64, i64), DomainError> {
    let mut seen: Vec<Axis> = Vec::with_capacity(3);
    let (mut dx, mut dy, mut dz) = (0i64, 0i64, 0i64);
    for direction in directions {
        let axis = direction.axis();
        if seen.contains(&axis) {
            return Err(DomainError::validation(format!(
                "The direction along the same axis must be unique (axis {} given twice)",
                axis
            )));
        }
        seen.push(axis);

        let (x, y, z) = direction.offset();
        dx += i64::from(x);
        dy += i64::from(y);
        dz += i64::from(z);
    }
    Ok((dx, dy, dz))
}

// ============================================================================
// Position
// ============================================================================

/// A 3D integer grid coordinate, equal only when all three coordinates match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
    z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// A position on the front plane (`z = 0`).
    pub fn planar(x: i32, y: i32) -> Self {
        Self::new(x, y, 0)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    fn delta(&self, other: &Position) -> (i64, i64, i64) {
        (
            i64::from(other.x) - i64::from(self.x),
            i64::from(other.y) - i64::from(self.y),
            i64::from(other.z) - i64::from(self.z),
        )
    }

    /// The neighbouring position one step in `direction`.
    ///
    /// `None` only at the edge of the `i32` range.
    pub fn neighbor(&self, direction: Direction) -> Option<Position> {
        let (dx, dy, dz) = direction.offset();
        Some(Position::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// The position reached by applying every direction at once.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when two directions share an axis.
    /// Returns `Ok(None)` only at the edge of the `i32` range.
    pub fn relative(&self, directions: &[Direction]) -> Result<Option<Position>, DomainError> {
        let (dx, dy, dz) = combined_offset(directions)?;
        let shift = |value: i32, by: i64| i32::try_from(i64::from(value) + by).ok();
        Ok(shift(self.x, dx)
            .zip(shift(self.y, dy))
            .zip(shift(self.z, dz))
            .map(|((x, y), z)| Position::new(x, y, z)))
    }

    /// True for every face, edge and corner neighbour (never for `self`).
    pub fn is_adjacent(&self, other: &Position) -> bool {
        let (dx, dy, dz) = self.delta(other);
        let (dx, dy, dz) = (dx.abs(), dy.abs(), dz.abs());
        dx.max(dy).max(dz) == 1
    }

    /// True when `other` is exactly one unit step away along `axis`, in either
    /// direction, with the other two coordinates unchanged.
    pub fn is_adjacent_along(&self, other: &Position, axis: Axis) -> bool {
        axis.directions().iter().any(|direction| {
            let (x, y, z) = direction.offset();
            self.delta(other) == (i64::from(x), i64::from(y), i64::from(z))
        })
    }

    /// True when `other` equals `self` moved by all `directions` at once.
    ///
    /// An empty direction list describes `self`, which is never adjacent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when two directions share an axis
    /// (for example `Left` together with `Right`).
    pub fn is_adjacent_towards(
        &self,
        other: &Position,
        directions: &[Direction],
    ) -> Result<bool, DomainError> {
        let offset = combined_offset(directions)?;
        Ok(offset != (0, 0, 0) && self.delta(other) == offset)
    }

    /// Whether every position can be visited exactly once by a chain of
    /// unit steps along `axis`.
    ///
    /// Fewer than two positions never form a chain. See [`Position::find_chain`]
    /// for the cost model.
    pub fn are_connected(positions: &[Position], axis: Axis) -> bool {
        Self::find_chain(positions, axis).is_some()
    }

    /// The first axis along which `positions` form a chain, if any.
    pub fn connecting_axis(positions: &[Position]) -> Option<Axis> {
        Axis::ALL
            .into_iter()
            .find(|axis| Self::are_connected(positions, *axis))
    }

    /// Order `positions` into a chain along `axis`, if such an order exists.
    ///
    /// This is a Hamiltonian path search: depth-first with backtracking from
    /// every admissible start. Cheap structural checks run first (isolated
    /// positions, more than two chain ends, a disconnected neighbour graph) and
    /// when chain ends exist only they are tried as starts. The worst case is
    /// still exponential in `positions.len()`, so callers handling user input
    /// should cap the input size.
    ///
    /// Repeated positions can never be chained since each cell is visited once.
    pub fn find_chain(positions: &[Position], axis: Axis) -> Option<Vec<Position>> {
        if positions.len() < 2 {
            return None;
        }
        let distinct: HashSet<&Position> = positions.iter().collect();
        if distinct.len() != positions.len() {
            return None;
        }

        let search = ChainSearch::new(positions, axis)?;
        search
            .run()
            .map(|order| order.into_iter().map(|i| positions[i]).collect())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ============================================================================
// Chain search
// ============================================================================

/// Backtracking state over the axis-neighbour graph of a position list.
struct ChainSearch {
    neighbors: Vec<Vec<usize>>,
    starts: Vec<usize>,
    visited: Vec<bool>,
    path: Vec<usize>,
}

impl ChainSearch {
    /// Build the graph, or `None` when it cannot contain a chain.
    fn new(positions: &[Position], axis: Axis) -> Option<Self> {
        let count = positions.len();
        let neighbors: Vec<Vec<usize>> = positions
            .iter()
            .map(|from| {
                positions
                    .iter()
                    .enumerate()
                    .filter(|(_, to)| from.is_adjacent_along(to, axis))
                    .map(|(index, _)| index)
                    .collect()
            })
            .collect();

        if neighbors.iter().any(|n| n.is_empty()) {
            return None;
        }

        let ends: Vec<usize> = (0..count).filter(|&i| neighbors[i].len() == 1).collect();
        if ends.len() > 2 {
            return None;
        }

        if !Self::is_connected(&neighbors) {
            return None;
        }

        let starts = if ends.is_empty() {
            (0..count).collect()
        } else {
            ends
        };

        Some(Self {
            neighbors,
            starts,
            visited: vec![false; count],
            path: Vec::with_capacity(count),
        })
    }

    fn is_connected(neighbors: &[Vec<usize>]) -> bool {
        let mut reached = vec![false; neighbors.len()];
        let mut stack = vec![0];
        reached[0] = true;
        while let Some(current) = stack.pop() {
            for &next in &neighbors[current] {
                if !reached[next] {
                    reached[next] = true;
                    stack.push(next);
                }
            }
        }
        reached.into_iter().all(|r| r)
    }

    fn run(mut self) -> Option<Vec<usize>> {
        for index in 0..self.starts.len() {
            let start = self.starts[index];
            if self.extend(start) {
                return Some(self.path);
            }
        }
        None
    }

    fn extend(&mut self, current: usize) -> bool {
        self.visited[current] = true;
        self.path.push(current);
        if self.path.len() == self.neighbors.len() {
            return true;
        }

        for index in 0..self.neighbors[current].len() {
            let next = self.neighbors[current][index];
            if !self.visited[next] && self.extend(next) {
                return true;
            }
        }

        // Dead end: backtrack
        self.visited[current] = false;
        self.path.pop();
        false
    }
}
