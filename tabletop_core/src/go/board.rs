use core::fmt;

use serde::{Deserialize, Serialize};

/// 盤の一辺の路数。
pub const SIZE: usize = 19;

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

/// 交点の座標（x: 列、y: 行）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// 列。
    pub x: usize,
    /// 行。
    pub y: usize,
}

impl Point {
    /// 座標を生成する（範囲チェックなし）。
    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// 盤内かどうかを返す。
    #[inline]
    #[must_use]
    pub const fn is_inside(self) -> bool {
        self.x < SIZE && self.y < SIZE
    }

    /// 上下左右の隣接点のうち盤内のものを返す（右、左、下、上の順）。
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        let right = Some(Self::new(self.x.wrapping_add(1), self.y));
        let left = self.x.checked_sub(1).map(|x| Self::new(x, self.y));
        let down = Some(Self::new(self.x, self.y.wrapping_add(1)));
        let up = self.y.checked_sub(1).map(|y| Self::new(self.x, y));
        [right, left, down, up]
            .into_iter()
            .flatten()
            .filter(|point| point.is_inside())
    }
}

/// 19路盤。`cells[y][x]`。
///
/// 保存形式との互換のため入れ子の `Vec` で持つ。寸法の検証はスナップショット読み込み時に行う。
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// 各交点の石。
    cells: Vec<Vec<Option<Stone>>>,
}

impl Board {
    /// 石の無い盤を返す。
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cells: vec![vec![None; SIZE]; SIZE],
        }
    }

    /// 指定交点の石を返す。盤外・空点は `None`。
    #[inline]
    #[must_use]
    pub fn get(&self, point: Point) -> Option<Stone> {
        self.cells.get(point.y)?.get(point.x).copied().flatten()
    }

    /// 19×19 であるかを返す。
    #[inline]
    #[must_use]
    pub fn has_standard_size(&self) -> bool {
        self.cells.len() == SIZE && self.cells.iter().all(|row| row.len() == SIZE)
    }

    /// 盤内の空点かを返す。
    #[inline]
    #[must_use]
    pub fn is_empty_at(&self, point: Point) -> bool {
        point.is_inside() && self.get(point).is_none()
    }

    /// 指定交点に石を置く（`None` で取り除く）。盤外は無視する。
    #[inline]
    pub fn set(&mut self, point: Point, stone: Option<Stone>) {
        if let Some(cell) = self
            .cells
            .get_mut(point.y)
            .and_then(|row| row.get_mut(point.x))
        {
            *cell = stone;
        }
    }

    /// 石を置いた盤面を返す（テスト・局面作成用）。
    #[inline]
    #[must_use]
    pub fn with(mut self, point: Point, stone: Stone) -> Self {
        self.set(point, Some(stone));
        self
    }

    /// 指定色の石の数を返す。
    #[must_use]
    pub fn count(&self, stone: Stone) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell == Some(stone))
            .count()
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

/// 盤上の全交点を行優先（y, x の順）で返す。
pub(crate) fn all_points() -> impl Iterator<Item = Point> {
    (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| Point::new(x, y)))
}
