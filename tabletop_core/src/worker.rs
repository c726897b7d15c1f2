use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{trace, warn};

use crate::ai::{Ai, Request};

/// 問い合わせの識別子。返答はこれで問い合わせと対応付ける。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ticket(u64);

/// ワーカーからの返答。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Reply<M> {
    /// AI が選んだ手。合法手が無ければ `None`。
    pub mv: Option<M>,
    /// 対応する問い合わせ。
    pub ticket: Ticket,
}

/// ワーカーの失敗。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkerError {
    /// 返答待ちの問い合わせがすでにある。
    #[error("an AI request is already outstanding")]
    Busy,
    /// ワーカースレッドが停止している。
    #[error("AI worker thread has stopped")]
    Disconnected,
    /// スレッドを起動できなかった。
    #[error("failed to spawn AI worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// ワーカースレッドに送る問い合わせ。
type Job<B, P> = (Ticket, Request<B, P>);

/// AI を専用スレッドで動かすワーカー。
///
/// - 返答待ちの問い合わせは常に高々1つ。
/// - [`AiWorker::cancel`] した問い合わせの返答は、届いても捨てる。
/// - 破棄するとスレッドに停止を指示し、終了を待たずに切り離す。
///   探索中の AI は [`Ai::select_move_until`] で停止指示を受け取り、探索を打ち切る。
#[derive(Debug)]
pub struct AiWorker<A: Ai> {
    /// 停止指示。
    cancel: Arc<AtomicBool>,
    /// 次に発行する識別子。
    next_ticket: u64,
    /// 返答待ちの問い合わせ。
    outstanding: Option<Ticket>,
    /// 返答の受信側。
    replies: Receiver<Reply<A::Move>>,
    /// 問い合わせの送信側。破棄時に閉じる。
    requests: Option<Sender<Job<A::Board, A::Player>>>,
}

impl<A> AiWorker<A>
where
    A: Ai + Send + 'static,
{
    /// 返答待ちの問い合わせを取り消す。その返答は届いても捨てる。
    #[inline]
    pub fn cancel(&mut self) {
        if let Some(ticket) = self.outstanding.take() {
            trace!(?ticket, "AI request cancelled");
        }
    }

    /// 返答待ちの問い合わせがあるかを返す。
    #[inline]
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.outstanding.is_some()
    }

    /// 返答待ちの問い合わせを返す。
    #[inline]
    #[must_use]
    pub const fn outstanding(&self) -> Option<Ticket> {
        self.outstanding
    }

    /// `agent` を動かすスレッドを起動する。
    ///
    /// # Errors
    ///
    /// `WorkerError::Spawn`: スレッドを起動できなかった場合
    ///
    pub fn spawn(mut agent: A) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = mpsc::channel::<Job<A::Board, A::Player>>();
        let (reply_tx, reply_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&cancel);

        thread::Builder::new()
            .name("tabletop-ai".to_owned())
            .spawn(move || {
                for (ticket, request) in request_rx {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    trace!(?ticket, "AI request received");
                    let mv = agent.select_move_until(&request.board, request.player, &stop);
                    if stop.load(Ordering::Relaxed) || reply_tx.send(Reply { mv, ticket }).is_err() {
                        break;
                    }
                }
                trace!("AI worker stopped");
            })?;

        Ok(Self {
            cancel,
            next_ticket: 0,
            outstanding: None,
            replies: reply_rx,
            requests: Some(request_tx),
        })
    }

    /// 問い合わせを送る。盤面は値で渡す。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `WorkerError::Busy`: 返答待ちの問い合わせがある場合
    /// - `WorkerError::Disconnected`: ワーカースレッドが停止している場合
    ///
    pub fn submit(&mut self, request: Request<A::Board, A::Player>) -> Result<Ticket, WorkerError> {
        if self.is_busy() {
            return Err(WorkerError::Busy);
        }
        let ticket = Ticket(self.next_ticket);
        let sender = self.requests.as_ref().ok_or(WorkerError::Disconnected)?;
        sender
            .send((ticket, request))
            .map_err(|_closed| WorkerError::Disconnected)?;

        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.outstanding = Some(ticket);
        trace!(?ticket, "AI request submitted");
        Ok(ticket)
    }

    /// 届いている返答を待たずに受け取る。返答待ちの問い合わせへの返答が無ければ `None`。
    ///
    /// # Errors
    ///
    /// `WorkerError::Disconnected`: 返答待ちのままワーカースレッドが停止した場合
    ///
    pub fn try_recv(&mut self) -> Result<Option<Reply<A::Move>>, WorkerError> {
        loop {
            match self.replies.try_recv() {
                Ok(reply) => {
                    if let Some(reply) = self.accept(reply) {
                        return Ok(Some(reply));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return self.disconnected(),
            }
        }
    }

    /// 返答待ちの問い合わせへの返答を待つ。問い合わせが無ければすぐに `None` を返す。
    ///
    /// # Errors
    ///
    /// `WorkerError::Disconnected`: 返答待ちのままワーカースレッドが停止した場合
    ///
    pub fn wait(&mut self) -> Result<Option<Reply<A::Move>>, WorkerError> {
        while self.is_busy() {
            let Ok(reply) = self.replies.recv() else {
                return self.disconnected();
            };
            if let Some(reply) = self.accept(reply) {
                return Ok(Some(reply));
            }
        }
        Ok(None)
    }

    /// [`AiWorker::wait`] と同じだが、`timeout` を過ぎたら `None` を返す（問い合わせは残る）。
    ///
    /// # Errors
    ///
    /// [`AiWorker::wait`] と同じ。
    ///
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<Reply<A::Move>>, WorkerError> {
        let deadline = Instant::now().checked_add(timeout);
        while self.is_busy() {
            let remaining = deadline.map_or(timeout, |deadline| deadline.saturating_duration_since(Instant::now()));
            match self.replies.recv_timeout(remaining) {
                Ok(reply) => {
                    if let Some(reply) = self.accept(reply) {
                        return Ok(Some(reply));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return self.disconnected(),
            }
        }
        Ok(None)
    }

    /// 返答待ちの問い合わせへの返答なら受け取り、そうでなければ捨てる。
    fn accept(&mut self, reply: Reply<A::Move>) -> Option<Reply<A::Move>> {
        if self.outstanding == Some(reply.ticket) {
            self.outstanding = None;
            trace!(ticket = ?reply.ticket, "AI reply accepted");
            Some(reply)
        } else {
            warn!(ticket = ?reply.ticket, "discarded stale AI reply");
            None
        }
    }

    /// スレッド停止時の後始末。返答待ちが無ければエラーにしない。
    fn disconnected(&mut self) -> Result<Option<Reply<A::Move>>, WorkerError> {
        if self.outstanding.take().is_some() {
            Err(WorkerError::Disconnected)
        } else {
            Ok(None)
        }
    }
}

impl<A: Ai> Drop for AiWorker<A> {
    #[inline]
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.requests = None;
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;

    use super::{AiWorker, WorkerError};
    use crate::ai::{Ai, Request};

    /// 合図が来るまで返答しない AI。返す手は盤面の値そのもの。
    struct Gated {
        gate: Receiver<()>,
    }

    impl Ai for Gated {
        type Board = u32;
        type Move = u32;
        type Player = bool;

        fn select_move(&mut self, board: &u32, _player: bool) -> Option<u32> {
            self.gate.recv().ok().map(|()| *board)
        }
    }

    /// 停止指示が来るまで探索を続け、打ち切ったことを知らせる AI。
    struct Endless {
        aborted: Sender<()>,
        started: Sender<()>,
    }

    impl Ai for Endless {
        type Board = u32;
        type Move = u32;
        type Player = bool;

        fn select_move(&mut self, board: &u32, _player: bool) -> Option<u32> {
            Some(*board)
        }

        fn select_move_until(&mut self, _board: &u32, _player: bool, stop: &AtomicBool) -> Option<u32> {
            let _sent = self.started.send(());
            while !stop.load(Ordering::Relaxed) {
                std::thread::yield_now();
            }
            let _sent = self.aborted.send(());
            None
        }
    }

    fn gated() -> (Sender<()>, Result<AiWorker<Gated>, WorkerError>) {
        let (open, gate) = mpsc::channel();
        (open, AiWorker::spawn(Gated { gate }))
    }

    #[test]
    fn only_one_request_may_be_outstanding() {
        let (open, worker) = gated();
        let Ok(mut worker) = worker else {
            panic!("spawn failed");
        };
        assert!(worker.submit(Request::new(1, true)).is_ok());
        assert!(matches!(
            worker.submit(Request::new(2, true)),
            Err(WorkerError::Busy)
        ));

        assert!(open.send(()).is_ok());
        let reply = worker.wait();
        assert!(matches!(reply, Ok(Some(ref reply)) if reply.mv == Some(1)));
        assert!(!worker.is_busy());
        assert!(worker.submit(Request::new(3, true)).is_ok());
    }

    #[test]
    fn cancelled_reply_is_discarded() {
        let (open, worker) = gated();
        let Ok(mut worker) = worker else {
            panic!("spawn failed");
        };
        assert!(worker.submit(Request::new(10, false)).is_ok());
        worker.cancel();
        assert!(!worker.is_busy());

        let Ok(fresh) = worker.submit(Request::new(20, false)) else {
            panic!("submit failed");
        };
        assert!(open.send(()).is_ok());
        assert!(open.send(()).is_ok());

        let reply = worker.wait();
        assert!(matches!(reply, Ok(Some(ref reply)) if reply.ticket == fresh && reply.mv == Some(20)));
    }

    #[test]
    fn try_recv_does_not_block() {
        let (open, worker) = gated();
        let Ok(mut worker) = worker else {
            panic!("spawn failed");
        };
        assert!(matches!(worker.try_recv(), Ok(None)));
        assert!(worker.submit(Request::new(5, true)).is_ok());
        assert!(matches!(worker.try_recv(), Ok(None)));
        assert!(matches!(worker.wait_timeout(Duration::from_millis(10)), Ok(None)));
        assert!(worker.is_busy());

        assert!(open.send(()).is_ok());
        assert!(matches!(worker.wait(), Ok(Some(_))));
    }

    #[test]
    fn dropping_a_busy_worker_returns_immediately() {
        let (open, worker) = gated();
        let Ok(mut worker) = worker else {
            panic!("spawn failed");
        };
        assert!(worker.submit(Request::new(1, true)).is_ok());
        drop(worker);
        // スレッドは合図を受けた後、停止指示を見て返答せずに終了する。
        assert!(open.send(()).is_ok());
    }

    #[test]
    fn dropping_the_worker_stops_an_in_flight_search() {
        let (aborted_tx, aborted) = mpsc::channel();
        let (started_tx, started) = mpsc::channel();
        let worker = AiWorker::spawn(Endless {
            aborted: aborted_tx,
            started: started_tx,
        });
        let Ok(mut worker) = worker else {
            panic!("spawn failed");
        };
        assert!(worker.submit(Request::new(7, true)).is_ok());
        assert!(started.recv_timeout(Duration::from_secs(5)).is_ok());

        drop(worker);
        assert!(aborted.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
