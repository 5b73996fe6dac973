use smallvec::SmallVec;

use crate::utils::coords::{Direction, EdgeMask, TileLocation};
use super::{ElementKind, PathElement, TileElement, TileQuery};

// ----------------------------------------------
// TileCell
// ----------------------------------------------

#[derive(Clone, Debug, Default)]
struct TileCell {
    elements: SmallVec<[TileElement; 2]>,
    walls: EdgeMask,
    surface_blocked: bool,
    not_owned: bool,
}

// ----------------------------------------------
// TileMap
// ----------------------------------------------

// WxH grid of tile element stacks. Tiles outside the grid
// have no elements, are blocked and not owned by the park.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: i32,
    height: i32,
    cells: Vec<TileCell>, // WxH cells.
}

impl TileMap {
    pub fn new(width: i32, height: i32) -> Self {
        debug_assert!(width > 0 && height > 0);
        let cell_count = (width * height) as usize;
        Self { width, height, cells: vec![TileCell::default(); cell_count] }
    }

    // Builds a map from rows of characters, row index = y, column = x.
    // Path tiles are connected to every orthogonal path neighbor.
    //  '#' = path
    //  '=' = wide path
    //  'Q' = queue not bound to any ride
    //  anything else = no path
    pub fn from_path_rows(rows: &[&str], z: i32) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        let mut map = Self::new(width.max(1), height.max(1));

        let char_at = |x: i32, y: i32| -> u8 {
            if x < 0 || y < 0 || y >= height {
                return b' ';
            }
            rows[y as usize].as_bytes().get(x as usize).copied().unwrap_or(b' ')
        };

        for y in 0..height {
            for x in 0..width {
                let ch = char_at(x, y);
                if !matches!(ch, b'#' | b'=' | b'Q') {
                    continue;
                }

                let mut edges = EdgeMask::empty();
                for dir in Direction::ALL {
                    let (dx, dy) = dir.delta();
                    if matches!(char_at(x + dx, y + dy), b'#' | b'=' | b'Q') {
                        edges = edges.with(dir);
                    }
                }

                let path = match ch {
                    b'=' => PathElement::new(edges).wide(),
                    b'Q' => PathElement::new(edges).queue(None),
                    _    => PathElement::new(edges),
                };
                map.place(x, y, TileElement::path(z, path));
            }
        }

        map
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn is_within_bounds(&self, x: i32, y: i32) -> bool {
        if (x < 0 || x >= self.width) || (y < 0 || y >= self.height) {
            return false;
        }
        true
    }

    #[inline]
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.is_within_bounds(x, y) {
            return None;
        }
        Some((x + (y * self.width)) as usize)
    }

    #[inline]
    fn cell(&self, x: i32, y: i32) -> Option<&TileCell> {
        self.cell_index(x, y).map(|index| &self.cells[index])
    }

    #[inline]
    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut TileCell> {
        self.cell_index(x, y).map(|index| &mut self.cells[index])
    }

    // Returns false if (x,y) is outside the map.
    pub fn place(&mut self, x: i32, y: i32, element: TileElement) -> bool {
        match self.cell_mut(x, y) {
            Some(cell) => {
                cell.elements.push(element);
                true
            }
            None => false,
        }
    }

    pub fn clear_tile(&mut self, x: i32, y: i32) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.elements.clear();
        }
    }

    // Mutable access to the path element at exact height `location.z`.
    pub fn path_mut(&mut self, location: TileLocation) -> Option<&mut PathElement> {
        let cell = self.cell_mut(location.x, location.y)?;
        cell.elements.iter_mut()
            .filter(|element| element.base_z == location.z)
            .find_map(|element| match &mut element.kind {
                ElementKind::Path(path) => Some(path),
                _ => None,
            })
    }

    pub fn add_wall(&mut self, x: i32, y: i32, direction: Direction) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.walls = cell.walls.with(direction);
        }
    }

    pub fn set_surface_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.surface_blocked = blocked;
        }
    }

    pub fn set_owned_by_park(&mut self, x: i32, y: i32, owned: bool) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.not_owned = !owned;
        }
    }
}

impl TileQuery for TileMap {
    #[inline]
    fn elements_at(&self, x: i32, y: i32) -> &[TileElement] {
        match self.cell(x, y) {
            Some(cell) => &cell.elements,
            None => &[],
        }
    }

    #[inline]
    fn is_wall_in_the_way(&self, location: TileLocation, direction: Direction) -> bool {
        self.cell(location.x, location.y)
            .is_some_and(|cell| cell.walls.has(direction))
    }

    #[inline]
    fn is_surface_blocked(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_none_or(|cell| cell.surface_blocked)
    }

    #[inline]
    fn is_owned_by_park(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(|cell| !cell.not_owned)
    }
}
