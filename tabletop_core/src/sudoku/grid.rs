use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 1辺のマス数。
pub const SIDE: usize = 9;

/// ブロック（3×3）の1辺のマス数。
pub const BOX: usize = 3;

/// 全マス数。
pub const CELLS: usize = SIDE * SIDE;

/// 盤面として解釈できない入力。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum GridError {
    /// マス数が81でない。
    #[error("sudoku grid must have {CELLS} cells, got {0}")]
    Length(usize),
    /// 1〜9以外の数字。
    #[error("cell {index} holds {value}, expected a digit 1-9")]
    Digit {
        /// マスの番号（行優先）。
        index: usize,
        /// 入っていた値。
        value: u8,
    },
    /// 数字・空白記号以外の文字。
    #[error("unexpected character {0:?}")]
    Character(char),
}

/// 9×9 の数独盤面。`cells[row * 9 + col]`、空きマスは `None`。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<u8>>", into = "Vec<Option<u8>>")]
pub struct Grid {
    /// 各マスの数字。
    cells: [Option<u8>; CELLS],
}

impl Grid {
    /// 指定マスの数字を返す。範囲外・空きマスは `None`。
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        index_of(row, col).and_then(|index| self.cell(index))
    }

    /// 行優先の番号でマスの数字を返す。
    #[inline]
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied().flatten()
    }

    /// 全マスを行優先で返す。
    #[inline]
    #[must_use]
    pub const fn cells(&self) -> &[Option<u8>; CELLS] {
        &self.cells
    }

    /// 他のマスと数字が重複しているマスの番号（行・列・ブロックのいずれか）。
    #[must_use]
    pub fn conflicts(&self) -> BTreeSet<usize> {
        let mut conflicts = BTreeSet::new();
        for unit in units() {
            for (position, &first) in unit.iter().enumerate() {
                let Some(digit) = self.cell(first) else {
                    continue;
                };
                for &second in unit.iter().skip(position.saturating_add(1)) {
                    if self.cell(second) == Some(digit) {
                        conflicts.insert(first);
                        conflicts.insert(second);
                    }
                }
            }
        }
        conflicts
    }

    /// 空きマスの無い盤面を返す。
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: [None; CELLS],
        }
    }

    /// 空きマスを行優先で探す。
    #[inline]
    #[must_use]
    pub fn first_empty(&self) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(Option::is_none)
            .map(split_index)
    }

    /// 全マスが埋まり、重複が無いかを返す。
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.conflicts().is_empty()
    }

    /// 全マスが埋まっているかを返す。
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// `digit` を `(row, col)` に置いても、同じ行・列・ブロックの他のマスと重複しないかを返す。
    #[must_use]
    pub fn is_valid_placement(&self, row: usize, col: usize, digit: u8) -> bool {
        let clashes = |r: usize, c: usize| (r, c) != (row, col) && self.get(r, c) == Some(digit);

        if (0..SIDE).any(|c| clashes(row, c)) || (0..SIDE).any(|r| clashes(r, col)) {
            return false;
        }

        let top = box_origin(row);
        let left = box_origin(col);
        !(top..top.saturating_add(BOX))
            .any(|r| (left..left.saturating_add(BOX)).any(|c| clashes(r, c)))
    }

    /// 埋まっているマスの数。
    #[inline]
    #[must_use]
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// 指定マスを書き換える。範囲外は無視する。
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, digit: Option<u8>) {
        if let Some(cell) = index_of(row, col).and_then(|index| self.cells.get_mut(index)) {
            *cell = digit;
        }
    }
}

impl Default for Grid {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Option<u8>>> for Grid {
    type Error = GridError;

    fn try_from(values: Vec<Option<u8>>) -> Result<Self, Self::Error> {
        let cells: [Option<u8>; CELLS] = values
            .try_into()
            .map_err(|rejected: Vec<Option<u8>>| GridError::Length(rejected.len()))?;
        for (index, value) in cells.iter().enumerate() {
            if let Some(value) = *value
                && !is_digit(value)
            {
                return Err(GridError::Digit { index, value });
            }
        }
        Ok(Self { cells })
    }
}

impl From<Grid> for Vec<Option<u8>> {
    #[inline]
    fn from(grid: Grid) -> Self {
        grid.cells.to_vec()
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// `1`〜`9` を数字、`.` または `0` を空きマスとして読む。空白は読み飛ばす。
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let values = text
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| match ch {
                '.' | '0' => Ok(None),
                '1'..='9' => ch
                    .to_digit(10)
                    .and_then(|digit| u8::try_from(digit).ok())
                    .map(Some)
                    .ok_or(GridError::Character(ch)),
                _ => Err(GridError::Character(ch)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from(values)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, cell) in self.cells.iter().enumerate() {
            match cell {
                Some(digit) => write!(f, "{digit}")?,
                None => write!(f, ".")?,
            }
            if split_index(index).1 == SIDE.saturating_sub(1) {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// 1〜9 の数字か。
#[inline]
#[must_use]
pub const fn is_digit(value: u8) -> bool {
    matches!(value, 1..=9)
}

/// 行・列番号を含むブロックの先頭（0, 3, 6）。
#[inline]
const fn box_origin(n: usize) -> usize {
    match n.checked_rem(BOX) {
        Some(offset) => n.saturating_sub(offset),
        None => n,
    }
}

/// 行優先番号を `(row, col)` に分解する。
#[inline]
#[must_use]
pub const fn split_index(index: usize) -> (usize, usize) {
    match (index.checked_div(SIDE), index.checked_rem(SIDE)) {
        (Some(row), Some(col)) => (row, col),
        _ => (0, 0),
    }
}

/// `(row, col)` の行優先番号。範囲外は `None`。
#[inline]
const fn index_of(row: usize, col: usize) -> Option<usize> {
    if row < SIDE && col < SIDE {
        Some(row.saturating_mul(SIDE).saturating_add(col))
    } else {
        None
    }
}

/// 行・列・ブロック（各9マス）の番号の組を全て返す。
fn units() -> impl Iterator<Item = [usize; SIDE]> {
    let at = |row: usize, col: usize| row.saturating_mul(SIDE).saturating_add(col);
    let rows = (0..SIDE).map(move |row| core::array::from_fn(|col| at(row, col)));
    let cols = (0..SIDE).map(move |col| core::array::from_fn(|row| at(row, col)));
    let boxes = (0..SIDE).map(move |block| {
        // ブロック番号もマス番号と同じく 3×3 の中で行優先に並べる。
        let (block_row, block_col) = (block.div_euclid(BOX), block.rem_euclid(BOX));
        core::array::from_fn(|offset| {
            let row = block_row.saturating_mul(BOX).saturating_add(offset.div_euclid(BOX));
            let col = block_col.saturating_mul(BOX).saturating_add(offset.rem_euclid(BOX));
            at(row, col)
        })
    });
    rows.chain(cols).chain(boxes)
}
