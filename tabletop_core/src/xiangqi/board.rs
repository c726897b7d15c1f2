use core::fmt;

use serde::{Deserialize, Serialize};

/// 盤の列数（x: 0..=8）。
pub const COLS: i8 = 9;

/// 盤の行数（y: 0..=9）。
pub const ROWS: i8 = 10;

/// 手番（陣営）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Side {
    /// 先手。盤の y = 0 側に陣取り、y の増える方向へ進む。
    Red,
    /// 後手。盤の y = 9 側に陣取り、y の減る方向へ進む。
    Black,
}

impl Side {
    /// 兵（卒）の前進方向（y の増分）を返す。
    #[inline]
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::Red => 1,
            Self::Black => -1,
        }
    }

    /// 相手側を返す。
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }
}

/// 駒の種類。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Kind {
    /// 車。
    Chariot,
    /// 馬。
    Horse,
    /// 相／象。
    Elephant,
    /// 仕／士。
    Advisor,
    /// 帥／將。
    General,
    /// 炮／砲。
    Cannon,
    /// 兵／卒。
    Soldier,
}

/// 盤上の座標。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// 列（0..=8）。
    pub x: i8,
    /// 行（0..=9）。
    pub y: i8,
}

impl Point {
    /// 盤内かどうかを返す。
    #[inline]
    #[must_use]
    pub const fn is_inside(self) -> bool {
        self.x >= 0 && self.x < COLS && self.y >= 0 && self.y < ROWS
    }

    /// 座標を生成する（範囲チェックなし）。
    #[inline]
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

/// 駒。`id` は位置とは独立した不変の識別子。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// 識別子。
    pub id: u32,
    /// 種類。
    pub kind: Kind,
    /// 陣営。
    #[serde(rename = "color")]
    pub side: Side,
    /// 列。
    pub x: i8,
    /// 行。
    pub y: i8,
}

impl Piece {
    /// 駒を生成する。
    #[inline]
    #[must_use]
    pub const fn new(id: u32, kind: Kind, side: Side, x: i8, y: i8) -> Self {
        Self {
            id,
            kind,
            side,
            x,
            y,
        }
    }

    /// 現在位置を返す。
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// 表示用の漢字。
    #[must_use]
    pub const fn symbol(&self) -> char {
        match (self.side, self.kind) {
            (_, Kind::Chariot) => '車',
            (_, Kind::Horse) => '馬',
            (Side::Red, Kind::Elephant) => '相',
            (Side::Black, Kind::Elephant) => '象',
            (Side::Red, Kind::Advisor) => '仕',
            (Side::Black, Kind::Advisor) => '士',
            (Side::Red, Kind::General) => '帥',
            (Side::Black, Kind::General) => '將',
            (Side::Red, Kind::Cannon) => '炮',
            (Side::Black, Kind::Cannon) => '砲',
            (Side::Red, Kind::Soldier) => '兵',
            (Side::Black, Kind::Soldier) => '卒',
        }
    }
}

/// 駒の一覧で表す盤面。検索は線形走査。
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// 盤上の駒（順序は生成順）。
    pieces: Vec<Piece>,
}

impl Board {
    /// 駒の一覧から盤面を作る（検証なし）。
    #[inline]
    #[must_use]
    pub const fn from_pieces(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    /// 指定陣営の帥（將）を返す。
    #[inline]
    #[must_use]
    pub fn general(&self, side: Side) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|piece| piece.side == side && piece.kind == Kind::General)
    }

    /// 初期配置を返す。
    #[must_use]
    pub fn initial() -> Self {
        const BACK_RANK: [Kind; 9] = [
            Kind::Chariot,
            Kind::Horse,
            Kind::Elephant,
            Kind::Advisor,
            Kind::General,
            Kind::Advisor,
            Kind::Elephant,
            Kind::Horse,
            Kind::Chariot,
        ];

        let mut pieces = Vec::with_capacity(32);
        let mut next_id = 1_u32;
        let mut add = |kind: Kind, side: Side, x: i8, y: i8| {
            pieces.push(Piece::new(next_id, kind, side, x, y));
            next_id = next_id.wrapping_add(1);
        };

        for (side, back, cannon, soldier) in [(Side::Red, 0, 2, 3), (Side::Black, 9, 7, 6)] {
            for (x, kind) in (0_i8..).zip(BACK_RANK) {
                add(kind, side, x, back);
            }
            add(Kind::Cannon, side, 1, cannon);
            add(Kind::Cannon, side, 7, cannon);
            for x in [0, 2, 4, 6, 8] {
                add(Kind::Soldier, side, x, soldier);
            }
        }

        Self { pieces }
    }

    /// 駒の一覧を返す。
    #[inline]
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// 識別子で駒を探す。
    #[inline]
    #[must_use]
    pub fn piece(&self, id: u32) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    /// 指定座標の駒を返す。盤外・空マスは `None`。
    #[inline]
    #[must_use]
    pub fn piece_at(&self, x: i8, y: i8) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.x == x && piece.y == y)
    }

    /// 指定陣営の駒を一覧の順に列挙する。
    #[inline]
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |piece| piece.side == side)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..ROWS).rev() {
            for x in 0..COLS {
                let symbol = self.piece_at(x, y).map_or('・', Piece::symbol);
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 盤上の全座標を行優先（y, x の順）で返す。
pub(crate) fn all_points() -> impl Iterator<Item = Point> {
    (0..ROWS).flat_map(|y| (0..COLS).map(move |x| Point::new(x, y)))
}
