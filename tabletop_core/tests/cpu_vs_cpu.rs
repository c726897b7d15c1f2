//! 結合テスト: 各ゲームで CPU 同士の対局が合法手だけで進むことを確認する。

/// 統合テスト本体。
#[cfg(test)]
mod tests {
    use tabletop_core::ai::Ai;
    use tabletop_core::{chess, go, gomoku, xiangqi};

    /// ランダム同士のチェスが、拒否される手なしに終局か手数上限まで進むことを確認する。
    #[test]
    fn chess_random_vs_random() {
        let mut game = chess::Game::initial();
        let mut white = chess::ai::Agent::new(1);
        let mut black = chess::ai::Agent::new(2);

        for _turn in 0_u16..400 {
            if game.is_game_over() {
                break;
            }
            let side = game.side_to_move();
            let agent = if side == chess::Color::White { &mut white } else { &mut black };
            let Some(mv) = agent.select_move(game.board(), side) else {
                break;
            };
            let status = game.play(mv);
            assert!(status.is_ok(), "chess move must be accepted, mv={mv:?} got={status:?}");
        }
        assert!(game.history().len() > 1, "at least one move must be played");
    }

    /// 深さ1同士のシャンチーで、AI の手が常に受け付けられることを確認する。
    #[test]
    fn xiangqi_shallow_search() {
        let mut game = xiangqi::Game::initial();
        let mut red = xiangqi::ai::Agent::new(1);
        let mut black = xiangqi::ai::Agent::new(0);

        for _turn in 0_u16..30 {
            if game.is_game_over() {
                break;
            }
            let side = game.side_to_move();
            let agent = if side == xiangqi::Side::Red { &mut red } else { &mut black };
            let Some(mv) = agent.select_move(game.board(), side) else {
                break;
            };
            let status = game.play(mv);
            assert!(status.is_ok(), "xiangqi move must be accepted, mv={mv:?} got={status:?}");
        }
        assert!(game.history().len() > 1, "at least one move must be played");
    }

    /// 貪欲 AI 同士の囲碁が、着手拒否なしに進むことを確認する。
    #[test]
    fn go_greedy_vs_greedy() {
        let mut game = go::Game::initial();
        let mut black = go::ai::Agent::new(3);
        let mut white = go::ai::Agent::new(4);

        for _turn in 0_u16..60 {
            if game.is_game_over() {
                break;
            }
            let side = game.side_to_move();
            let agent = if side == go::Stone::Black { &mut black } else { &mut white };
            let Some(mv) = agent.select_move(game.board(), side) else {
                break;
            };
            let status = game.play(mv);
            assert!(status.is_ok(), "go move must be accepted, mv={mv:?} got={status:?}");
        }

        let score = game.score();
        assert!(score.black > 0.0 || score.white > 0.0, "someone must have points, got={score:?}");
    }

    /// 五目並べで浅い探索同士が終局（勝ちまたは引き分け）まで打てることを確認する。
    #[test]
    fn gomoku_plays_to_the_end() {
        let mut game = gomoku::Game::initial();
        let mut black = gomoku::ai::Agent::new(1);
        let mut white = gomoku::ai::Agent::new(0);

        for _turn in 0_u16..225 {
            if game.is_game_over() {
                break;
            }
            let side = game.side_to_move();
            let agent = if side == gomoku::Stone::Black { &mut black } else { &mut white };
            let Some(point) = agent.select_move(game.board(), side) else {
                break;
            };
            let status = game.play(point);
            assert!(status.is_ok(), "gomoku move must be accepted, at={point:?} got={status:?}");
        }

        assert!(game.is_game_over(), "game must finish within the board size");
        assert_ne!(game.status(), gomoku::GameStatus::InProgress);
    }
}
