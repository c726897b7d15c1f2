use core::sync::atomic::AtomicBool;

use rand::SeedableRng as _;
use rand::rngs::SmallRng;

/// AI への問い合わせ（盤面の値コピー＋手番）。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request<B, P> {
    /// 問い合わせ時点の盤面。
    pub board: B,
    /// 手を選ぶ側。
    pub player: P,
}

impl<B, P> Request<B, P> {
    /// 問い合わせを生成する。
    #[inline]
    #[must_use]
    pub const fn new(board: B, player: P) -> Self {
        Self { board, player }
    }
}

/// 手を選択するAI。
///
/// 盤面は読み取り専用で渡される。探索中に盤面を書き換える実装は内部で複製を使うこと。
pub trait Ai {
    /// 盤面の型。
    type Board: Clone + Send + 'static;
    /// 手番（プレイヤー）の型。
    type Player: Copy + Send + 'static;
    /// 手の型。
    type Move: Copy + Send + 'static;

    /// 次の手を選択する。合法手が無ければ `None`。
    fn select_move(&mut self, board: &Self::Board, player: Self::Player) -> Option<Self::Move>;

    /// [`Ai::select_move`] と同じだが、中断フラグが立ったら探索を打ち切って `None` を返してよい。
    ///
    /// 既定ではフラグを見ずに最後まで探索する。
    #[inline]
    fn select_move_until(
        &mut self,
        board: &Self::Board,
        player: Self::Player,
        _stop: &AtomicBool,
    ) -> Option<Self::Move> {
        self.select_move(board, player)
    }
}

/// `seed` から決定的な乱数生成器を作る。
#[inline]
#[must_use]
pub(crate) fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}
