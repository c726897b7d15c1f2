use core::fmt;

use serde::{Deserialize, Serialize};

/// 盤の一辺の路数。
pub const SIZE: usize = 15;

/// 石の色（手番）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Stone {
    /// 黒（先手）。
    Black,
    /// 白（後手）。
    White,
}

impl Stone {
    /// 相手の色を返す。
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

/// 交点の座標（行, 列）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// 列。
    pub col: usize,
    /// 行。
    pub row: usize,
}

impl Point {
    /// 天元（盤の中央）。
    pub const CENTER: Self = Self::new(SIZE.div_euclid(2), SIZE.div_euclid(2));

    /// 盤内かどうかを返す。
    #[inline]
    #[must_use]
    pub const fn is_inside(self) -> bool {
        self.row < SIZE && self.col < SIZE
    }

    /// 座標を生成する（範囲チェックなし）。
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { col, row }
    }

    /// `(d_row, d_col)` だけずらした盤内の座標を返す。盤外なら `None`。
    #[inline]
    #[must_use]
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        let point = Self::new(row, col);
        point.is_inside().then_some(point)
    }
}

/// 15路盤。`cells[row][col]`。
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// 各交点の石。
    cells: [[Option<Stone>; SIZE]; SIZE],
}

impl Board {
    /// 石の無い盤を返す。
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: [[None; SIZE]; SIZE],
        }
    }

    /// 指定交点の石を返す。盤外・空点は `None`。
    #[inline]
    #[must_use]
    pub fn get(&self, point: Point) -> Option<Stone> {
        self.cells.get(point.row)?.get(point.col).copied().flatten()
    }

    /// 盤内の空点かを返す。
    #[inline]
    #[must_use]
    pub fn is_empty_at(&self, point: Point) -> bool {
        point.is_inside() && self.get(point).is_none()
    }

    /// 石が1つも無いかを返す。
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// 全交点が埋まっているかを返す。
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// 指定交点に石を置く（`None` で取り除く）。盤外は無視する。
    #[inline]
    pub fn set(&mut self, point: Point, stone: Option<Stone>) {
        if let Some(cell) = self
            .cells
            .get_mut(point.row)
            .and_then(|row| row.get_mut(point.col))
        {
            *cell = stone;
        }
    }

    /// 石の置かれた交点を行優先で列挙する。
    pub fn stones(&self) -> impl Iterator<Item = (Point, Stone)> + '_ {
        all_points().filter_map(|point| self.get(point).map(|stone| (point, stone)))
    }

    /// 石を置いた盤面を返す（テスト・局面作成用）。
    #[inline]
    #[must_use]
    pub fn with(mut self, point: Point, stone: Stone) -> Self {
        self.set(point, Some(stone));
        self
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                let symbol = match cell {
                    Some(Stone::Black) => 'X',
                    Some(Stone::White) => 'O',
                    None => '.',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 盤上の全交点を行優先で返す。
pub(crate) fn all_points() -> impl Iterator<Item = Point> {
    (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Point::new(row, col)))
}
