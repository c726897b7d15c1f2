use std::collections::{HashSet, VecDeque};

use crate::go::board::{Board, Point, Stone, all_points};

/// 連（同色でつながった石の集まり）とその呼吸点。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Group {
    /// 呼吸点（重複なし、発見順）。
    pub liberties: Vec<Point>,
    /// 連を構成する石（発見順）。
    pub stones: Vec<Point>,
}

/// 陣地（どちらか一方の色の石だけに囲まれた空点）の数。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Territory {
    /// 黒の陣地。
    pub black: u32,
    /// 白の陣地。
    pub white: u32,
}

/// `(x, y)` から幅優先探索で連と呼吸点を求める。
///
/// 起点が盤外なら空の連を返す。起点の色は確認しない（`stone` 色としてつながりを辿る）。
#[must_use]
pub fn find_group(x: usize, y: usize, board: &Board, stone: Stone) -> Group {
    let start = Point::new(x, y);
    if !start.is_inside() {
        return Group::default();
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut group = Group::default();

    while let Some(current) = queue.pop_front() {
        group.stones.push(current);
        for neighbor in current.neighbors() {
            if !visited.insert(neighbor) {
                continue;
            }
            match board.get(neighbor) {
                Some(color) if color == stone => queue.push_back(neighbor),
                Some(_) => {}
                None => group.liberties.push(neighbor),
            }
        }
    }

    group
}

/// 空点の領域を塗りつぶし、片方の色だけに接する領域をその色の陣地として数える。
#[must_use]
pub fn calculate_score(board: &Board) -> Territory {
    let mut visited: HashSet<Point> = HashSet::new();
    let mut territory = Territory::default();

    for start in all_points() {
        if !board.is_empty_at(start) || !visited.insert(start) {
            continue;
        }

        let mut queue = VecDeque::from([start]);
        let mut size = 0_u32;
        let mut touches_black = false;
        let mut touches_white = false;

        while let Some(current) = queue.pop_front() {
            size = size.saturating_add(1);
            for neighbor in current.neighbors() {
                match board.get(neighbor) {
                    Some(Stone::Black) => touches_black = true,
                    Some(Stone::White) => touches_white = true,
                    None => {
                        if visited.insert(neighbor) {
                            queue.push_back(neighbor);
                        }
                    }
                }
            }
        }

        match (touches_black, touches_white) {
            (true, false) => territory.black = territory.black.saturating_add(size),
            (false, true) => territory.white = territory.white.saturating_add(size),
            _ => {}
        }
    }

    territory
}
