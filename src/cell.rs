// Cell classification and the dense tag grid
//
// Every square of the board carries exactly one CellTag. Our snake is
// always drawn with the Own* tags, every other snake with Other* tags.

use crate::types::Coord;

/// Content of a single board square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellTag {
    Empty,
    Food,
    Hazard,
    OwnHead,
    OwnBody,
    OwnTail,
    OtherHead,
    OtherBody,
    OtherTail,
}

impl CellTag {
    pub fn head(own: bool) -> CellTag {
        if own {
            CellTag::OwnHead
        } else {
            CellTag::OtherHead
        }
    }

    pub fn body(own: bool) -> CellTag {
        if own {
            CellTag::OwnBody
        } else {
            CellTag::OtherBody
        }
    }

    pub fn tail(own: bool) -> CellTag {
        if own {
            CellTag::OwnTail
        } else {
            CellTag::OtherTail
        }
    }

    /// A head may enter this square.
    ///
    /// Tails count as safe because they vacate on the same tick. The one
    /// exception (the owner just ate) is handled by the simulator.
    pub fn is_safe(self) -> bool {
        matches!(
            self,
            CellTag::Empty | CellTag::Food | CellTag::OwnTail | CellTag::OtherTail
        )
    }
}

/// Row-major grid of tags, `y * width + x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellTag>,
}

impl Grid {
    /// Creates a grid with every square Empty
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Grid {
            width,
            height,
            cells: vec![CellTag::Empty; size],
        }
    }

    /// True iff `0 <= x < width` and `0 <= y < height`
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        debug_assert!(self.in_bounds(coord), "{:?} outside grid", coord);
        (coord.y * self.width + coord.x) as usize
    }

    pub fn get(&self, coord: Coord) -> CellTag {
        self.cells[self.index(coord)]
    }

    pub fn set(&mut self, coord: Coord, tag: CellTag) {
        let idx = self.index(coord);
        self.cells[idx] = tag;
    }

    pub fn fill(&mut self, tag: CellTag) {
        self.cells.iter_mut().for_each(|c| *c = tag);
    }

    /// Number of squares carrying `tag`
    pub fn count(&self, tag: CellTag) -> usize {
        self.cells.iter().filter(|&&c| c == tag).count()
    }

    pub fn contains(&self, tag: CellTag) -> bool {
        self.cells.contains(&tag)
    }

    /// Iterates every square with its coordinate
    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellTag)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, &tag)| {
            let i = i as i32;
            (Coord::new(i % width, i / width), tag)
        })
    }
}
