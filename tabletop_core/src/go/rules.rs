use crate::go::board::{Board, Point, Stone};
use crate::go::group::find_group;

/// 着手の結果。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placement {
    /// 着手・石取り後の盤面。
    pub board: Board,
    /// 取り上げた相手の石の数。
    pub captured: u32,
}

/// `point` に `stone` を打った結果を返す。着手できなければ `None`。
///
/// 1. 盤外・石のある点には打てない。
/// 2. 隣接する相手の連のうち呼吸点が無くなったものを取り上げる（各石は1回だけ数える）。
/// 3. 取り上げた後で自分の連に呼吸点が無く、1子も取っていなければ自殺手として不可。
#[must_use]
pub fn place(board: &Board, point: Point, stone: Stone) -> Option<Placement> {
    if !board.is_empty_at(point) {
        return None;
    }

    let mut next = board.clone();
    next.set(point, Some(stone));

    let opponent = stone.opponent();
    let mut captured = 0_u32;
    for neighbor in point.neighbors() {
        if next.get(neighbor) != Some(opponent) {
            continue;
        }
        let group = find_group(neighbor.x, neighbor.y, &next, opponent);
        if !group.liberties.is_empty() {
            continue;
        }
        for removed in &group.stones {
            next.set(*removed, None);
        }
        let count = u32::try_from(group.stones.len()).unwrap_or(u32::MAX);
        captured = captured.saturating_add(count);
    }

    let own = find_group(point.x, point.y, &next, stone);
    if own.liberties.is_empty() && captured == 0 {
        return None;
    }

    Some(Placement {
        board: next,
        captured,
    })
}

#[cfg(test)]
mod tests {
    use super::place;
    use crate::go::board::{Board, Point, Stone};

    #[test]
    fn occupied_and_off_board_points_are_rejected() {
        let board = Board::empty().with(Point::new(3, 3), Stone::Black);
        assert!(place(&board, Point::new(3, 3), Stone::White).is_none());
        assert!(place(&board, Point::new(19, 3), Stone::White).is_none());
    }

    #[test]
    fn captures_a_surrounded_stone() {
        let board = Board::empty()
            .with(Point::new(5, 5), Stone::White)
            .with(Point::new(4, 5), Stone::Black)
            .with(Point::new(6, 5), Stone::Black)
            .with(Point::new(5, 4), Stone::Black);
        let placement = place(&board, Point::new(5, 6), Stone::Black);
        assert!(placement.is_some());
        if let Some(result) = placement {
            assert_eq!(result.captured, 1);
            assert_eq!(result.board.get(Point::new(5, 5)), None);
            assert_eq!(result.board.get(Point::new(5, 6)), Some(Stone::Black));
        }
    }

    #[test]
    fn suicide_is_rejected() {
        let board = Board::empty()
            .with(Point::new(1, 0), Stone::Black)
            .with(Point::new(0, 1), Stone::Black);
        assert!(place(&board, Point::new(0, 0), Stone::White).is_none());
        assert_eq!(board.get(Point::new(0, 0)), None);
    }

    #[test]
    fn capture_is_resolved_before_suicide_check() {
        // (2,0) の隣は全て黒だが、黒 (1,0) の最後の呼吸点でもある。
        let board = Board::empty()
            .with(Point::new(0, 0), Stone::White)
            .with(Point::new(1, 0), Stone::Black)
            .with(Point::new(1, 1), Stone::White)
            .with(Point::new(3, 0), Stone::Black)
            .with(Point::new(2, 1), Stone::Black);

        let placement = place(&board, Point::new(2, 0), Stone::White);
        assert!(placement.is_some());
        if let Some(result) = placement {
            assert_eq!(result.captured, 1);
            assert_eq!(result.board.get(Point::new(1, 0)), None);
            assert_eq!(result.board.get(Point::new(2, 0)), Some(Stone::White));
        }
    }

    #[test]
    fn group_capture_counts_each_stone_once() {
        let board = Board::empty()
            .with(Point::new(0, 0), Stone::White)
            .with(Point::new(1, 0), Stone::White)
            .with(Point::new(2, 0), Stone::Black)
            .with(Point::new(0, 1), Stone::Black);
        let placement = place(&board, Point::new(1, 1), Stone::Black);
        assert_eq!(placement.map(|result| result.captured), Some(2));
    }
}
