use core::fmt::Debug;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ai::{Ai, Request};
use crate::persistence::{self, PersistError, SaveOutcome, SnapshotStore};
use crate::worker::{AiWorker, Reply, Ticket, WorkerError};

/// 手番制ゲームの共通操作。対局セッションはこれを通してゲームを進める。
pub trait TurnBased {
    /// AI に渡す盤面の型。
    type Board: Clone + Send + 'static;
    /// 手を拒否した理由の型。
    type Error: Debug;
    /// 手の型。
    type Move: Copy + Debug + Send + 'static;
    /// 手番（プレイヤー）の型。
    type Player: Copy + Debug + Eq + Send + 'static;
    /// 保存形式の型。
    type Snapshot: persistence::Snapshot;

    /// AI に渡す盤面の複製を返す。
    fn ai_board(&self) -> Self::Board;
    /// 終局しているかどうかを返す。
    fn is_finished(&self) -> bool;
    /// 現手番の手を適用する。
    ///
    /// # Errors
    ///
    /// 手が受け付けられない場合、その理由を返す。局面は変わらない。
    fn play_move(&mut self, mv: Self::Move) -> Result<(), Self::Error>;
    /// 初期局面に戻す。
    fn reset(&mut self);
    /// 履歴を読み込んだ局面1つで置き換える。
    fn restore(&mut self, snapshot: Self::Snapshot);
    /// 現手番を返す。
    fn side_to_move(&self) -> Self::Player;
    /// 現在の局面を返す。
    fn snapshot(&self) -> &Self::Snapshot;
    /// 最大 `steps` 手戻す。実際に戻した手数を返す。
    fn undo(&mut self, steps: usize) -> usize;
}

/// AI の返答を処理した結果。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum AiEvent<M> {
    /// AI の手を現在の局面に適用した。
    Applied(M),
    /// AI に指せる手が無かった。
    NoMove,
    /// AI の手が現在の局面では受け付けられなかった。
    Rejected(M),
}

/// セッション操作の失敗。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError<E: Debug> {
    /// 手が受け付けられなかった。
    #[error("move rejected: {0:?}")]
    Rejected(E),
    /// AI の手番なので人間の入力は受け付けない。
    #[error("it is the computer's turn")]
    NotYourTurn,
    /// AI ワーカーの失敗。
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// 人間と AI の対局。
///
/// ゲーム（履歴）を持つのはこの構造体だけで、AI ワーカーには盤面の複製だけを渡す。
/// AI の返答は、届いた時点の現在の局面に適用する。
/// 待った・新規対局・読み込みでは返答待ちの問い合わせを取り消し、遅れて届いた返答は捨てる。
pub struct Session<G, A>
where
    G: TurnBased,
    A: Ai<Board = G::Board, Move = G::Move, Player = G::Player> + Send + 'static,
{
    /// AI が受け持つ側。
    ai_side: G::Player,
    /// 進行中のゲーム。
    game: G,
    /// AI ワーカー。
    worker: AiWorker<A>,
}

impl<G, A> Session<G, A>
where
    G: TurnBased,
    A: Ai<Board = G::Board, Move = G::Move, Player = G::Player> + Send + 'static,
{
    /// AI が受け持つ側を返す。
    #[inline]
    pub const fn ai_side(&self) -> G::Player {
        self.ai_side
    }

    /// ゲームを返す。
    #[inline]
    pub const fn game(&self) -> &G {
        &self.game
    }

    /// AI の手番かどうか（終局後は `false`）を返す。
    #[inline]
    pub fn is_ai_turn(&self) -> bool {
        !self.game.is_finished() && self.game.side_to_move() == self.ai_side
    }

    /// AI の返答待ちかどうかを返す。
    #[inline]
    pub const fn is_thinking(&self) -> bool {
        self.worker.is_busy()
    }

    /// 保存先から局面を読み込む。読み込めたら `true`。
    ///
    /// 不正な文書は拒否し、ゲームは変わらない。
    ///
    /// # Errors
    ///
    /// [`persistence::load`] と同じ。
    ///
    pub fn load<T: SnapshotStore + ?Sized>(&mut self, store: &mut T) -> Result<bool, PersistError> {
        let Some(snapshot) = persistence::load::<G::Snapshot, T>(store)? else {
            debug!("load cancelled");
            return Ok(false);
        };
        self.worker.cancel();
        self.game.restore(snapshot);
        info!("game loaded");
        Ok(true)
    }

    /// `game` と `agent` で対局を始める。`agent` は `ai_side` を受け持つ。
    ///
    /// # Errors
    ///
    /// `WorkerError::Spawn`: AI ワーカーを起動できなかった場合
    ///
    pub fn new(game: G, agent: A, ai_side: G::Player) -> Result<Self, WorkerError> {
        Ok(Self {
            ai_side,
            game,
            worker: AiWorker::spawn(agent)?,
        })
    }

    /// 人間の手を適用し、次が AI の手番なら問い合わせを送る。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `SessionError::NotYourTurn`: AI の手番の場合
    /// - `SessionError::Rejected`: 手が受け付けられなかった場合
    /// - `SessionError::Worker`: AI への問い合わせに失敗した場合
    ///
    pub fn play(&mut self, mv: G::Move) -> Result<(), SessionError<G::Error>> {
        if self.is_ai_turn() {
            return Err(SessionError::NotYourTurn);
        }
        self.game.play_move(mv).map_err(SessionError::Rejected)?;
        self.request_ai_move()?;
        Ok(())
    }

    /// 届いていれば AI の返答を処理する。待たない。
    ///
    /// # Errors
    ///
    /// `SessionError::Worker`: AI ワーカーが停止していた場合
    ///
    pub fn poll(&mut self) -> Result<Option<AiEvent<G::Move>>, SessionError<G::Error>> {
        let reply = self.worker.try_recv()?;
        Ok(reply.map(|reply| self.apply(reply)))
    }

    /// AI の手番で、終局しておらず、返答待ちも無ければ問い合わせを送る。
    ///
    /// 送った場合はその識別子を返す。
    ///
    /// # Errors
    ///
    /// `WorkerError::Disconnected`: AI ワーカーが停止していた場合
    ///
    pub fn request_ai_move(&mut self) -> Result<Option<Ticket>, WorkerError> {
        if !self.is_ai_turn() || self.worker.is_busy() {
            return Ok(None);
        }
        let request = Request::new(self.game.ai_board(), self.ai_side);
        self.worker.submit(request).map(Some)
    }

    /// 新しい対局を始める。返答待ちの問い合わせは取り消す。
    #[inline]
    pub fn reset(&mut self) {
        self.worker.cancel();
        self.game.reset();
    }

    /// 現在の局面を保存先に書き込む。
    ///
    /// # Errors
    ///
    /// [`persistence::save`] と同じ。
    ///
    #[inline]
    pub fn save<T: SnapshotStore + ?Sized>(&self, store: &mut T) -> Result<SaveOutcome, PersistError> {
        persistence::save(store, self.game.snapshot())
    }

    /// 最大 `steps` 手戻す。返答待ちの問い合わせは取り消す。実際に戻した手数を返す。
    ///
    /// 戻した結果が AI の手番になる場合は、さらに1手戻して人間の手番にする。
    /// それ以上戻せない（初手が AI の手番）なら、AI に問い合わせ直す。
    ///
    /// # Errors
    ///
    /// `WorkerError::Disconnected`: 問い合わせ直す際に AI ワーカーが停止していた場合
    ///
    pub fn undo(&mut self, steps: usize) -> Result<usize, WorkerError> {
        self.worker.cancel();
        let mut undone = self.game.undo(steps);
        if undone > 0 && self.is_ai_turn() {
            undone = undone.saturating_add(self.game.undo(1));
        }
        if self.is_ai_turn() {
            self.request_ai_move()?;
        }
        debug!(undone, "moves undone");
        Ok(undone)
    }

    /// AI の返答を待って処理する。返答待ちが無ければ `None`。
    ///
    /// # Errors
    ///
    /// `SessionError::Worker`: AI ワーカーが停止していた場合
    ///
    pub fn wait(&mut self) -> Result<Option<AiEvent<G::Move>>, SessionError<G::Error>> {
        let reply = self.worker.wait()?;
        Ok(reply.map(|reply| self.apply(reply)))
    }

    /// 返答を、届いた時点の現在の局面に適用する。
    fn apply(&mut self, reply: Reply<G::Move>) -> AiEvent<G::Move> {
        let Some(mv) = reply.mv else {
            debug!(ticket = ?reply.ticket, "AI has no move");
            return AiEvent::NoMove;
        };
        match self.game.play_move(mv) {
            Ok(()) => {
                debug!(?mv, "AI move applied");
                AiEvent::Applied(mv)
            }
            Err(error) => {
                warn!(?mv, ?error, "AI move rejected");
                AiEvent::Rejected(mv)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AiEvent, Session, SessionError};
    use crate::gomoku::{self, Point, Stone};
    use crate::persistence::MemoryStore;

    fn session() -> Session<gomoku::Game, gomoku::ai::Agent> {
        match Session::new(gomoku::Game::initial(), gomoku::ai::Agent::new(1), Stone::White) {
            Ok(session) => session,
            Err(error) => panic!("spawn failed: {error}"),
        }
    }

    #[test]
    fn human_move_triggers_the_ai_reply() {
        let mut session = session();
        assert!(!session.is_ai_turn());
        assert!(session.play(Point::new(7, 7)).is_ok());
        assert!(session.is_ai_turn());
        assert!(session.is_thinking());
        assert!(matches!(
            session.play(Point::new(0, 0)),
            Err(SessionError::NotYourTurn)
        ));

        let event = session.wait();
        assert!(matches!(event, Ok(Some(AiEvent::Applied(_)))));
        assert_eq!(session.game().side_to_move(), Stone::Black);
        assert_eq!(session.game().history().len(), 3);
    }

    #[test]
    fn undo_discards_the_pending_reply() {
        let mut session = session();
        assert!(session.play(Point::new(7, 7)).is_ok());
        assert!(matches!(session.undo(1), Ok(1)));
        assert!(!session.is_thinking());

        assert!(matches!(session.wait(), Ok(None)));
        assert!(session.game().history().is_at_start());
        // 遅れて届いた返答は次の問い合わせと取り違えない。
        assert!(session.play(Point::new(3, 3)).is_ok());
        assert!(matches!(session.wait(), Ok(Some(AiEvent::Applied(_)))));
        assert_eq!(session.game().board().get(Point::new(3, 3)), Some(Stone::Black));
    }

    #[test]
    fn undo_after_the_ai_reply_returns_to_the_human_turn() {
        let mut session = session();
        assert!(session.play(Point::new(7, 7)).is_ok());
        assert!(matches!(session.wait(), Ok(Some(AiEvent::Applied(_)))));

        assert!(matches!(session.undo(1), Ok(2)));
        assert_eq!(session.game().side_to_move(), Stone::Black);
        assert!(session.game().history().is_at_start());
        assert!(!session.is_thinking());

        assert!(session.play(Point::new(3, 3)).is_ok());
        assert!(matches!(session.wait(), Ok(Some(AiEvent::Applied(_)))));
        assert_eq!(session.game().history().len(), 3);
    }

    #[test]
    fn undo_to_an_ai_opening_asks_the_ai_again() {
        let spawned = Session::new(gomoku::Game::initial(), gomoku::ai::Agent::new(1), Stone::Black);
        let Ok(mut session) = spawned else {
            panic!("spawn failed");
        };
        assert!(matches!(session.request_ai_move(), Ok(Some(_))));
        assert!(matches!(session.wait(), Ok(Some(AiEvent::Applied(_)))));
        assert!(!session.is_ai_turn());

        assert!(matches!(session.undo(1), Ok(1)));
        assert!(session.is_ai_turn());
        assert!(session.is_thinking());
        assert!(matches!(session.wait(), Ok(Some(AiEvent::Applied(_)))));
        assert_eq!(session.game().side_to_move(), Stone::White);
    }

    #[test]
    fn rejected_human_move_leaves_the_game_unchanged() {
        let mut session = session();
        assert!(session.play(Point::new(7, 7)).is_ok());
        assert!(matches!(session.wait(), Ok(Some(_))));
        assert!(matches!(
            session.play(Point::new(7, 7)),
            Err(SessionError::Rejected(gomoku::PlayError::Occupied))
        ));
        assert_eq!(session.game().history().len(), 3);
    }

    #[test]
    fn save_then_load_restores_a_single_snapshot() {
        let mut session = session();
        assert!(session.play(Point::new(7, 7)).is_ok());
        assert!(matches!(session.wait(), Ok(Some(_))));

        let mut store = MemoryStore::new();
        assert!(session.save(&mut store).is_ok());
        let saved = session.game().snapshot().clone();

        session.reset();
        assert!(matches!(session.load(&mut store), Ok(true)));
        assert_eq!(*session.game().snapshot(), saved);
        assert_eq!(session.game().history().len(), 1);

        let mut broken = MemoryStore::with_bytes(b"{\"board\": 3}".to_vec());
        assert!(session.load(&mut broken).is_err());
        assert_eq!(*session.game().snapshot(), saved);
        assert!(matches!(session.load(&mut MemoryStore::cancelled()), Ok(false)));
    }
}
