use glam::IVec2;

/// Dense width × height matrix addressed by `(x, y)` = (column, row),
/// stored row-major (`index = y * width + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// A grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major cell vector.
    ///
    /// Returns `None` when `cells.len() != width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<T>) -> Option<Self> {
        (cells.len() == width as usize * height as usize).then_some(Self { width, height, cells })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Row-major index of `cell`, or `None` when out of bounds.
    #[inline]
    pub fn index_of(&self, cell: IVec2) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    #[inline]
    pub fn get(&self, cell: IVec2) -> Option<&T> {
        self.index_of(cell).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, cell: IVec2) -> Option<&mut T> {
        self.index_of(cell).map(|i| &mut self.cells[i])
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

/// Passable/blocking matrix derived from the map's blocking layers.
/// `true` marks a blocking cell.
pub type BlockingGrid = Grid<bool>;

impl Grid<bool> {
    /// A fully passable grid, for maps without any blocking layer.
    pub fn open(width: u32, height: u32) -> Self {
        Self::filled(width, height, false)
    }

    /// Out-of-bounds cells count as blocked.
    #[inline]
    pub fn is_blocked(&self, cell: IVec2) -> bool {
        self.get(cell).copied().unwrap_or(true)
    }

    /// Mark or clear a single cell. Out-of-bounds writes are ignored.
    pub fn set_blocked(&mut self, cell: IVec2, blocked: bool) {
        if let Some(c) = self.get_mut(cell) {
            *c = blocked;
        }
    }
}
