//! 駒の動き、王手判定、終局判定。
//!
//! どの判定も盤面を書き換えない。局面を進めるときは [`apply`] で新しい盤面を作る。

use serde::{Deserialize, Serialize};

use crate::xiangqi::board::{Board, Kind, Piece, Point, Side, all_points};

/// 手番側に合法手が無いときの終局理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Outcome {
    /// 王手されていて逃れる手が無い。
    Checkmate,
    /// 王手されていないが合法手が無い。
    Stalemate,
}

/// 1手（移動元→移動先）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 移動元。
    pub from: Point,
    /// 移動先。
    pub to: Point,
}

impl Move {
    /// 手を生成する。
    #[inline]
    #[must_use]
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

/// 駒 `piece_id` を `to` へ動かした新しい盤面を返す。
///
/// `to` にある他の駒は取り除かれる。`piece_id` が存在しなければ、`to` の駒が消えるだけ。
#[must_use]
pub fn apply(board: &Board, piece_id: u32, to: Point) -> Board {
    let pieces = board
        .pieces()
        .iter()
        .filter(|piece| piece.id == piece_id || piece.x != to.x || piece.y != to.y)
        .map(|piece| {
            if piece.id == piece_id {
                Piece {
                    x: to.x,
                    y: to.y,
                    ..*piece
                }
            } else {
                *piece
            }
        })
        .collect();
    Board::from_pieces(pieces)
}

/// `from` にある駒を動かした新しい盤面を返す。駒が無ければ `None`。
#[inline]
#[must_use]
pub fn apply_move(board: &Board, mv: Move) -> Option<Board> {
    let id = board.piece_at(mv.from.x, mv.from.y)?.id;
    Some(apply(board, id, mv.to))
}

/// 指定陣営の駒について、動ける（`is_valid_move` を満たす）手を生成順に列挙する。
///
/// 駒は盤面の一覧順、移動先は行優先。自陣の帥が王手に晒されるかは見ない。
pub(crate) fn candidate_moves(board: &Board, side: Side) -> impl Iterator<Item = (&Piece, Point)> {
    board.pieces_of(side).flat_map(move |piece| {
        all_points()
            .filter(move |to| is_valid_move(piece, to.x, to.y, board))
            .map(move |to| (piece, to))
    })
}

/// 手番側が詰み・ステイルメイトかを返す。終局していなければ `None`。
///
/// 全駒 × 全マスを試し、指した後に自陣の帥が王手されない手が1つでもあれば終局していない。
#[must_use]
pub fn is_game_over(side: Side, board: &Board) -> Option<Outcome> {
    let has_escape = candidate_moves(board, side)
        .any(|(piece, to)| !is_king_in_check(side, &apply(board, piece.id, to)));
    if has_escape {
        return None;
    }

    if is_king_in_check(side, board) {
        Some(Outcome::Checkmate)
    } else {
        Some(Outcome::Stalemate)
    }
}

/// 指定陣営の帥が王手されているかを返す。
///
/// 相手のいずれかの駒が帥の位置へ動けるか、両帥が同じ列で間に駒が無い（飛将）とき王手。
/// 帥が盤上に無い陣営は王手されていない扱い。
#[must_use]
pub fn is_king_in_check(side: Side, board: &Board) -> bool {
    let Some(general) = board.general(side) else {
        return false;
    };

    let attacked = board
        .pieces_of(side.opponent())
        .any(|enemy| is_valid_move(enemy, general.x, general.y, board));
    if attacked {
        return true;
    }

    match board.general(side.opponent()) {
        Some(enemy_general) if enemy_general.x == general.x => {
            count_between(board, general.point(), enemy_general.point()) == 0
        }
        _ => false,
    }
}

/// `piece` を `(to_x, to_y)` へ動かせるかを返す。
///
/// 盤外、自駒のあるマス、移動なしは不正。それ以外は駒の種類ごとの規則に従う。
#[must_use]
pub fn is_valid_move(piece: &Piece, to_x: i8, to_y: i8, board: &Board) -> bool {
    let to = Point::new(to_x, to_y);
    if !to.is_inside() {
        return false;
    }
    if piece.x == to_x && piece.y == to_y {
        return false;
    }

    let dx = to_x.wrapping_sub(piece.x);
    let dy = to_y.wrapping_sub(piece.y);
    let abs_dx = dx.unsigned_abs();
    let abs_dy = dy.unsigned_abs();

    let shape_ok = match piece.kind {
        Kind::Chariot | Kind::Cannon => dx == 0 || dy == 0,
        Kind::Horse => (abs_dx == 1 && abs_dy == 2) || (abs_dx == 2 && abs_dy == 1),
        Kind::Elephant => abs_dx == 2 && abs_dy == 2 && is_own_half(piece.side, to_y),
        Kind::Advisor => abs_dx == 1 && abs_dy == 1 && is_in_palace(piece.side, to),
        Kind::General => abs_dx.wrapping_add(abs_dy) == 1 && is_in_palace(piece.side, to),
        Kind::Soldier => dx == 0 && dy == piece.side.forward(),
    };
    if !shape_ok {
        return false;
    }

    let target = board.piece_at(to_x, to_y);
    if target.is_some_and(|other| other.side == piece.side) {
        return false;
    }

    match piece.kind {
        Kind::Chariot => count_between(board, piece.point(), to) == 0,
        Kind::Cannon => {
            let screens = count_between(board, piece.point(), to);
            if target.is_some() {
                screens == 1
            } else {
                screens == 0
            }
        }
        Kind::Horse => {
            let leg = if abs_dx == 1 {
                Point::new(piece.x, piece.y.wrapping_add(dy.signum()))
            } else {
                Point::new(piece.x.wrapping_add(dx.signum()), piece.y)
            };
            board.piece_at(leg.x, leg.y).is_none()
        }
        Kind::Elephant => {
            let eye = Point::new(
                piece.x.wrapping_add(dx.signum()),
                piece.y.wrapping_add(dy.signum()),
            );
            board.piece_at(eye.x, eye.y).is_none()
        }
        Kind::Advisor | Kind::General | Kind::Soldier => true,
    }
}

/// 指定陣営の合法手（指した後に自陣の帥が王手されない手）を生成順に列挙する。
#[must_use]
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    candidate_moves(board, side)
        .filter(|&(piece, to)| !is_king_in_check(side, &apply(board, piece.id, to)))
        .map(|(piece, to)| Move::new(piece.point(), to))
        .collect()
}

/// 同じ直線上の `from` と `to` の間（両端を除く）にある駒の数。
fn count_between(board: &Board, from: Point, to: Point) -> usize {
    if from.x == to.x {
        let (low, high) = (from.y.min(to.y), from.y.max(to.y));
        board
            .pieces()
            .iter()
            .filter(|piece| piece.x == from.x && piece.y > low && piece.y < high)
            .count()
    } else {
        let (low, high) = (from.x.min(to.x), from.x.max(to.x));
        board
            .pieces()
            .iter()
            .filter(|piece| piece.y == from.y && piece.x > low && piece.x < high)
            .count()
    }
}

/// 九宮（列 3..=5、紅は行 0..=2、黒は行 7..=9）の内側か。
const fn is_in_palace(side: Side, point: Point) -> bool {
    if point.x < 3 || point.x > 5 {
        return false;
    }
    match side {
        Side::Red => point.y <= 2,
        Side::Black => point.y >= 7,
    }
}

/// 河を越えていない（紅は行 0..=4、黒は行 5..=9）か。
const fn is_own_half(side: Side, y: i8) -> bool {
    match side {
        Side::Red => y <= 4,
        Side::Black => y >= 5,
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, apply, is_game_over, is_king_in_check, is_valid_move, legal_moves};
    use crate::xiangqi::board::{Board, Kind, Piece, Point, Side};

    fn red(id: u32, kind: Kind, x: i8, y: i8) -> Piece {
        Piece::new(id, kind, Side::Red, x, y)
    }

    fn black(id: u32, kind: Kind, x: i8, y: i8) -> Piece {
        Piece::new(id, kind, Side::Black, x, y)
    }

    fn capture_board() -> Board {
        Board::from_pieces(vec![
            red(1, Kind::General, 4, 0),
            black(2, Kind::General, 4, 9),
            red(3, Kind::Chariot, 4, 1),
            black(4, Kind::Soldier, 4, 2),
            black(5, Kind::Chariot, 0, 0),
            red(6, Kind::Soldier, 0, 1),
        ])
    }

    fn cannon_board(screens: &[Piece]) -> Board {
        let mut pieces = vec![
            red(1, Kind::General, 4, 0),
            black(2, Kind::General, 4, 9),
            red(3, Kind::Cannon, 4, 2),
            black(5, Kind::Chariot, 4, 6),
        ];
        pieces.extend_from_slice(screens);
        Board::from_pieces(pieces)
    }

    #[test]
    fn chariot_captures_and_own_pieces_are_protected() {
        let board = capture_board();
        let chariot = red(3, Kind::Chariot, 4, 1);
        assert!(is_valid_move(&chariot, 4, 2, &board));
        assert!(!is_valid_move(&chariot, 4, 0, &board));
        assert!(!is_valid_move(&chariot, 4, 3, &board));

        let after = apply(&board, 3, Point::new(4, 2));
        assert!(after.piece(4).is_none());
        assert_eq!(after.piece(3).map(Piece::point), Some(Point::new(4, 2)));
        assert_eq!(after.pieces().len(), 5);
    }

    #[test]
    fn black_chariot_captures_red_soldier() {
        let board = capture_board();
        let chariot = black(5, Kind::Chariot, 0, 0);
        assert!(is_valid_move(&chariot, 0, 1, &board));
        let after = apply(&board, 5, Point::new(0, 1));
        assert!(after.piece(6).is_none());
    }

    #[test]
    fn cannon_needs_exactly_one_screen_to_capture() {
        let cannon = red(3, Kind::Cannon, 4, 2);

        let none = cannon_board(&[]);
        assert!(!is_valid_move(&cannon, 4, 6, &none));
        assert!(is_valid_move(&cannon, 4, 5, &none));

        let one = cannon_board(&[black(4, Kind::Soldier, 4, 4)]);
        assert!(is_valid_move(&cannon, 4, 6, &one));
        assert!(!is_valid_move(&cannon, 4, 5, &one));
        let after = apply(&one, 3, Point::new(4, 6));
        assert!(after.piece(5).is_none());
        assert!(after.piece(4).is_some());

        let two = cannon_board(&[
            black(4, Kind::Soldier, 4, 3),
            red(6, Kind::Horse, 4, 4),
        ]);
        assert!(!is_valid_move(&cannon, 4, 6, &two));
    }

    #[test]
    fn horse_is_blocked_by_its_leg() {
        let horse = red(3, Kind::Horse, 1, 0);
        let open = Board::from_pieces(vec![horse]);
        assert!(is_valid_move(&horse, 2, 2, &open));
        assert!(is_valid_move(&horse, 3, 1, &open));
        assert!(!is_valid_move(&horse, 3, 2, &open));

        let blocked = Board::from_pieces(vec![horse, red(4, Kind::Soldier, 1, 1)]);
        assert!(!is_valid_move(&horse, 2, 2, &blocked));
        assert!(!is_valid_move(&horse, 0, 2, &blocked));
        assert!(is_valid_move(&horse, 3, 1, &blocked));

        let side_leg = Board::from_pieces(vec![horse, black(4, Kind::Soldier, 2, 0)]);
        assert!(!is_valid_move(&horse, 3, 1, &side_leg));
    }

    #[test]
    fn elephant_stays_home_and_respects_its_eye() {
        let elephant = red(3, Kind::Elephant, 2, 4);
        let open = Board::from_pieces(vec![elephant]);
        assert!(is_valid_move(&elephant, 0, 2, &open));
        assert!(is_valid_move(&elephant, 4, 2, &open));
        assert!(!is_valid_move(&elephant, 4, 6, &open));

        let black_elephant = black(4, Kind::Elephant, 2, 5);
        let board = Board::from_pieces(vec![black_elephant]);
        assert!(!is_valid_move(&black_elephant, 4, 3, &board));
        assert!(is_valid_move(&black_elephant, 4, 7, &board));

        let eye_blocked = Board::from_pieces(vec![elephant, black(5, Kind::Soldier, 3, 3)]);
        assert!(!is_valid_move(&elephant, 4, 2, &eye_blocked));
    }

    #[test]
    fn advisor_and_general_stay_in_palace() {
        let advisor = red(3, Kind::Advisor, 4, 1);
        let general = black(4, Kind::General, 4, 7);
        let board = Board::from_pieces(vec![advisor, general]);

        assert!(is_valid_move(&advisor, 5, 2, &board));
        assert!(!is_valid_move(&advisor, 4, 2, &board));
        assert!(!is_valid_move(&red(3, Kind::Advisor, 5, 2), 6, 3, &board));

        assert!(is_valid_move(&general, 4, 8, &board));
        assert!(is_valid_move(&general, 3, 7, &board));
        assert!(!is_valid_move(&general, 4, 6, &board));
        assert!(!is_valid_move(&general, 5, 8, &board));
    }

    #[test]
    fn soldier_only_steps_forward() {
        let soldier = red(3, Kind::Soldier, 4, 3);
        let board = Board::from_pieces(vec![soldier]);
        assert!(is_valid_move(&soldier, 4, 4, &board));
        assert!(!is_valid_move(&soldier, 4, 2, &board));
        assert!(!is_valid_move(&soldier, 5, 3, &board));
        assert!(!is_valid_move(&soldier, 4, 5, &board));

        let crossed = black(4, Kind::Soldier, 4, 4);
        let board = Board::from_pieces(vec![crossed]);
        assert!(is_valid_move(&crossed, 4, 3, &board));
        assert!(!is_valid_move(&crossed, 3, 4, &board));
    }

    #[test]
    fn rejects_targets_off_the_board() {
        let chariot = red(3, Kind::Chariot, 0, 0);
        let board = Board::from_pieces(vec![chariot]);
        assert!(!is_valid_move(&chariot, -1, 0, &board));
        assert!(!is_valid_move(&chariot, 0, 10, &board));
        assert!(!is_valid_move(&chariot, 0, 0, &board));
    }

    #[test]
    fn flying_general_counts_as_check() {
        let facing = Board::from_pieces(vec![
            red(1, Kind::General, 4, 0),
            black(2, Kind::General, 4, 9),
        ]);
        assert!(is_king_in_check(Side::Red, &facing));
        assert!(is_king_in_check(Side::Black, &facing));

        let screened = Board::from_pieces(vec![
            red(1, Kind::General, 4, 0),
            black(2, Kind::General, 4, 9),
            red(3, Kind::Soldier, 4, 3),
        ]);
        assert!(!is_king_in_check(Side::Black, &screened));
    }

    #[test]
    fn side_without_general_is_not_in_check() {
        let board = Board::from_pieces(vec![red(3, Kind::Chariot, 4, 5)]);
        assert!(!is_king_in_check(Side::Black, &board));
    }

    #[test]
    fn detects_checkmate() {
        let board = Board::from_pieces(vec![
            red(1, Kind::General, 4, 0),
            red(2, Kind::Chariot, 0, 9),
            black(3, Kind::General, 4, 9),
        ]);
        assert!(is_king_in_check(Side::Black, &board));
        assert_eq!(is_game_over(Side::Black, &board), Some(Outcome::Checkmate));
        assert_eq!(is_game_over(Side::Red, &board), None);
    }

    #[test]
    fn detects_stalemate() {
        let board = Board::from_pieces(vec![
            red(1, Kind::General, 4, 0),
            red(2, Kind::Chariot, 0, 8),
            black(3, Kind::General, 3, 9),
        ]);
        assert!(!is_king_in_check(Side::Black, &board));
        assert_eq!(is_game_over(Side::Black, &board), Some(Outcome::Stalemate));
    }

    #[test]
    fn legal_moves_exclude_self_check() {
        let board = Board::from_pieces(vec![
            red(1, Kind::General, 4, 0),
            red(2, Kind::Chariot, 4, 4),
            black(3, Kind::General, 4, 9),
        ]);
        let moves = legal_moves(&board, Side::Red);
        assert!(moves.iter().all(|mv| mv.from != Point::new(4, 4) || mv.to.x == 4));
        assert!(!moves.is_empty());
    }

    #[test]
    fn initial_position_has_forty_four_moves() {
        let board = Board::initial();
        assert_eq!(legal_moves(&board, Side::Red).len(), 44);
        assert_eq!(legal_moves(&board, Side::Black).len(), 44);
        assert_eq!(is_game_over(Side::Red, &board), None);
    }
}
