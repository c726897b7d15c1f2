/// 局面スナップショットの履歴（古い順）。
///
/// - 常に1件以上のスナップショットを持つ。
/// - 最後の要素が現在の局面。
/// - 待ったは末尾を切り詰めるだけで、先頭（初期局面）は決して削除しない。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct History<S> {
    /// 先頭（初期局面または読み込んだ局面）。
    first: S,
    /// 先頭以降に追加されたスナップショット。
    rest: Vec<S>,
}

impl<S> History<S> {
    /// 現在の局面を返す。
    #[inline]
    #[must_use]
    pub fn current(&self) -> &S {
        self.rest.last().unwrap_or(&self.first)
    }

    /// 履歴が初期局面のみかを返す。
    #[inline]
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.rest.is_empty()
    }

    /// スナップショットを古い順に走査する。
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        core::iter::once(&self.first).chain(self.rest.iter())
    }

    /// 記録されているスナップショット数（初期局面を含む）を返す。
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rest.len().saturating_add(1)
    }

    /// 初期局面のみの履歴を作る。
    #[inline]
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self {
            first: initial,
            rest: Vec::new(),
        }
    }

    /// 新しい局面を末尾に追加する。
    #[inline]
    pub fn push(&mut self, snapshot: S) {
        self.rest.push(snapshot);
    }

    /// 履歴全体を1件のスナップショットで置き換える（新規対局・読み込み）。
    #[inline]
    pub fn replace(&mut self, snapshot: S) {
        self.first = snapshot;
        self.rest.clear();
    }

    /// 最大 `steps` 手戻す。実際に戻した手数を返す。
    ///
    /// 初期局面より前には戻らない。
    #[inline]
    pub fn undo(&mut self, steps: usize) -> usize {
        let count = steps.min(self.rest.len());
        let keep = self.rest.len().saturating_sub(count);
        self.rest.truncate(keep);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::History;

    #[test]
    fn pushes_then_undoes_back_to_initial() {
        let mut history = History::new(0_u32);
        for value in 1_u32..=10 {
            history.push(value);
        }
        assert_eq!(history.len(), 11);
        assert_eq!(*history.current(), 10);

        for _ in 0_u32..10 {
            assert_eq!(history.undo(1), 1);
        }

        assert_eq!(history, History::new(0_u32));
        assert!(history.is_at_start());
    }

    #[test]
    fn undo_never_removes_initial_snapshot() {
        let mut history = History::new("start");
        history.push("a");
        assert_eq!(history.undo(5), 1);
        assert_eq!(history.undo(1), 0);
        assert_eq!(*history.current(), "start");
    }

    #[test]
    fn replace_leaves_single_element() {
        let mut history = History::new(1_i32);
        history.push(2);
        history.push(3);
        history.replace(42);
        assert_eq!(history.len(), 1);
        assert_eq!(*history.current(), 42);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![42]);
    }
}
