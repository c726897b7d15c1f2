use core::fmt;

use serde::{Deserialize, Serialize};

/// 盤の一辺の長さ。
pub const BOARD_LEN: i8 = 8;

/// 盤の一辺の長さ（配列用）。
const BOARD_LEN_USIZE: usize = 8;

/// 駒の色（手番）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Color {
    /// 先手。盤の下側（行 6, 7）から行 0 へ向かう。
    White,
    /// 後手。盤の上側（行 0, 1）から行 7 へ向かう。
    Black,
}

impl Color {
    /// ポーンの前進方向（行の増分）を返す。
    #[inline]
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// 相手側の色を返す。
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// ポーンの初期行を返す。
    #[inline]
    #[must_use]
    pub const fn pawn_start_row(self) -> i8 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }
}

/// 駒の種類。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Kind {
    /// ポーン。
    Pawn,
    /// ルーク。
    Rook,
    /// ナイト。
    Knight,
    /// ビショップ。
    Bishop,
    /// クイーン。
    Queen,
    /// キング。
    King,
}

/// 駒（種類＋色）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// 色。
    pub color: Color,
    /// 種類。
    #[serde(rename = "type")]
    pub kind: Kind,
}

impl Piece {
    /// 駒を生成する。
    #[inline]
    #[must_use]
    pub const fn new(kind: Kind, color: Color) -> Self {
        Self { color, kind }
    }

    /// 表示用の1文字（白は大文字、黒は小文字）。
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> char {
        let upper = match self.kind {
            Kind::Pawn => 'P',
            Kind::Rook => 'R',
            Kind::Knight => 'N',
            Kind::Bishop => 'B',
            Kind::Queen => 'Q',
            Kind::King => 'K',
        };
        match self.color {
            Color::White => upper,
            Color::Black => upper.to_ascii_lowercase(),
        }
    }
}

/// 盤上の座標（行, 列）。範囲外の値も表現できる。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// 列（0..=7）。
    pub col: i8,
    /// 行（0 が黒側）。
    pub row: i8,
}

impl Coord {
    /// 盤内かどうかを返す。
    #[inline]
    #[must_use]
    pub const fn is_inside(self) -> bool {
        self.row >= 0 && self.row < BOARD_LEN && self.col >= 0 && self.col < BOARD_LEN
    }

    /// 座標を生成する（範囲チェックなし）。
    #[inline]
    #[must_use]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { col, row }
    }

    /// 配列添字 `(row, col)` に変換する。盤外なら `None`。
    #[inline]
    fn indices(self) -> Option<(usize, usize)> {
        if !self.is_inside() {
            return None;
        }
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        Some((row, col))
    }

    /// `(d_row, d_col)` だけずらした座標を返す。
    #[inline]
    #[must_use]
    pub const fn offset(self, d_row: i8, d_col: i8) -> Self {
        Self {
            col: self.col.wrapping_add(d_col),
            row: self.row.wrapping_add(d_row),
        }
    }
}

/// 1手（移動元→移動先）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 移動元。
    pub from: Coord,
    /// 移動先。
    pub to: Coord,
}

impl Move {
    /// 手を生成する。
    #[inline]
    #[must_use]
    pub const fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

/// 8×8 の盤面。`squares[row][col]`。
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// 各マスの駒。
    squares: [[Option<Piece>; BOARD_LEN_USIZE]; BOARD_LEN_USIZE],
}

impl Board {
    /// 駒の無い盤面を返す。
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [[None; BOARD_LEN_USIZE]; BOARD_LEN_USIZE],
        }
    }

    /// 指定マスの駒を返す。盤外・空マスは `None`。
    #[inline]
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<Piece> {
        let (row, col) = coord.indices()?;
        self.squares.get(row)?.get(col).copied().flatten()
    }

    /// 初期配置を返す。
    #[must_use]
    pub fn initial() -> Self {
        const BACK_RANK: [Kind; BOARD_LEN_USIZE] = [
            Kind::Rook,
            Kind::Knight,
            Kind::Bishop,
            Kind::Queen,
            Kind::King,
            Kind::Bishop,
            Kind::Knight,
            Kind::Rook,
        ];

        let mut board = Self::empty();
        for (col, kind) in (0_i8..).zip(BACK_RANK) {
            board.set(Coord::new(0, col), Some(Piece::new(kind, Color::Black)));
            board.set(Coord::new(1, col), Some(Piece::new(Kind::Pawn, Color::Black)));
            board.set(Coord::new(6, col), Some(Piece::new(Kind::Pawn, Color::White)));
            board.set(Coord::new(7, col), Some(Piece::new(kind, Color::White)));
        }
        board
    }

    /// 指定色の駒を（座標, 駒）で行優先に列挙する。
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        all_coords().filter_map(move |coord| match self.get(coord) {
            Some(piece) if piece.color == color => Some((coord, piece)),
            _ => None,
        })
    }

    /// `from` の駒を `to` へ移した新しい盤面を返す（`to` の駒は取られる）。
    #[must_use]
    pub fn moved(&self, mv: Move) -> Self {
        let mut next = self.clone();
        let piece = next.get(mv.from);
        next.set(mv.from, None);
        next.set(mv.to, piece);
        next
    }

    /// 指定マスに駒を置く（`None` で取り除く）。盤外は無視する。
    #[inline]
    pub fn set(&mut self, coord: Coord, piece: Option<Piece>) {
        let Some((row, col)) = coord.indices() else {
            return;
        };
        if let Some(cell) = self.squares.get_mut(row).and_then(|line| line.get_mut(col)) {
            *cell = piece;
        }
    }

    /// 駒を置いた盤面を返す（テスト・局面作成用）。
    #[inline]
    #[must_use]
    pub fn with(mut self, coord: Coord, piece: Piece) -> Self {
        self.set(coord, Some(piece));
        self
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_LEN {
            for col in 0..BOARD_LEN {
                let symbol = self.get(Coord::new(row, col)).map_or('.', Piece::symbol);
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 盤上の全座標を行優先で返す。
pub(crate) fn all_coords() -> impl Iterator<Item = Coord> {
    (0..BOARD_LEN).flat_map(|row| (0..BOARD_LEN).map(move |col| Coord::new(row, col)))
}

#[cfg(test)]
mod tests {
    use super::{Board, Color, Coord, Kind, Move, Piece};

    #[test]
    fn lookups_outside_the_board_return_none() {
        let board = Board::initial();
        assert_eq!(board.get(Coord::new(-1, 0)), None);
        assert_eq!(board.get(Coord::new(0, 8)), None);
        assert_eq!(
            board.get(Coord::new(7, 4)),
            Some(Piece::new(Kind::King, Color::White))
        );
    }

    #[test]
    fn moved_leaves_original_untouched() {
        let board = Board::initial();
        let next = board.moved(Move::new(Coord::new(6, 4), Coord::new(4, 4)));
        assert!(board.get(Coord::new(6, 4)).is_some());
        assert!(next.get(Coord::new(6, 4)).is_none());
        assert_eq!(
            next.get(Coord::new(4, 4)),
            Some(Piece::new(Kind::Pawn, Color::White))
        );
    }

    #[test]
    fn initial_board_has_sixteen_pieces_per_side() {
        let board = Board::initial();
        assert_eq!(board.pieces_of(Color::White).count(), 16);
        assert_eq!(board.pieces_of(Color::Black).count(), 16);
    }

    #[test]
    fn renders_ranks_top_down() {
        let text = Board::initial().to_string();
        let first = text.lines().next().unwrap_or_default();
        assert_eq!(first, "rnbqkbnr");
    }
}
