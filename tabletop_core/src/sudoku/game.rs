use std::collections::BTreeSet;

use rand::Rng;
use tracing::info;

use crate::sudoku::generator::generate_with;
use crate::sudoku::grid::{Grid, SIDE, is_digit};
use crate::sudoku::solver::solved;

/// 盤面の状態。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Status {
    /// 解答中。
    InProgress,
    /// ソルバーが答えを表示した。
    Revealed,
    /// プレイヤーが全マスを重複なく埋めた。
    Solved,
}

/// 入力・操作が受け付けられなかった理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PlayError {
    /// 問題として与えられたマスは書き換えられない。
    Given,
    /// 1〜9 以外の数字。
    InvalidDigit,
    /// 盤外のマス。
    OutOfRange,
    /// すでに解けている（または答えを表示済み）。
    Finished,
    /// 問題に解が無い。
    Unsolvable,
}

/// 1問の解答を管理する構造体。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    /// 現在の盤面（与えられたマス＋プレイヤーの入力）。
    board: Grid,
    /// 問題として与えられたマス。
    givens: Grid,
    /// ソルバーで答えを表示したか。
    revealed: bool,
}

impl Game {
    /// 現在の盤面を返す。
    #[inline]
    #[must_use]
    pub const fn board(&self) -> &Grid {
        &self.board
    }

    /// 指定マスを空にする。
    ///
    /// # Errors
    ///
    /// [`Game::set`] と同じ（`InvalidDigit` を除く）。
    ///
    #[inline]
    pub fn clear(&mut self, row: usize, col: usize) -> Result<Status, PlayError> {
        self.write(row, col, None)
    }

    /// 重複しているマスの番号を返す。
    #[inline]
    #[must_use]
    pub fn conflicts(&self) -> BTreeSet<usize> {
        self.board.conflicts()
    }

    /// `removals` マスを空けた新しい問題で始める。
    #[inline]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, removals: usize) -> Self {
        Self::new(generate_with(rng, removals).puzzle)
    }

    /// 問題として与えられたマスを返す。
    #[inline]
    #[must_use]
    pub const fn givens(&self) -> &Grid {
        &self.givens
    }

    /// 問題として与えられたマスかを返す。
    #[inline]
    #[must_use]
    pub fn is_given(&self, row: usize, col: usize) -> bool {
        self.givens.get(row, col).is_some()
    }

    /// `givens` を問題として始める。
    #[inline]
    #[must_use]
    pub const fn new(givens: Grid) -> Self {
        Self {
            board: givens,
            givens,
            revealed: false,
        }
    }

    /// 盤面を問題の状態に戻す。
    #[inline]
    pub fn reset(&mut self) {
        self.board = self.givens;
        self.revealed = false;
    }

    /// 指定マスに数字を書き込む。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::Finished`: すでに解けている、または答えを表示済みの場合
    /// - `PlayError::OutOfRange`: 盤外のマスの場合
    /// - `PlayError::Given`: 問題として与えられたマスの場合
    /// - `PlayError::InvalidDigit`: 1〜9 以外の数字の場合
    ///
    pub fn set(&mut self, row: usize, col: usize, digit: u8) -> Result<Status, PlayError> {
        if !is_digit(digit) {
            return Err(PlayError::InvalidDigit);
        }
        self.write(row, col, Some(digit))
    }

    /// 与えられたマスだけから解いた答えで盤面を置き換える。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::Finished`: すでに解けている、または答えを表示済みの場合
    /// - `PlayError::Unsolvable`: 問題に解が無い場合
    ///
    pub fn solve(&mut self) -> Result<Status, PlayError> {
        if self.status() != Status::InProgress {
            return Err(PlayError::Finished);
        }
        let answer = solved(&self.givens).ok_or(PlayError::Unsolvable)?;
        self.board = answer;
        self.revealed = true;
        Ok(Status::Revealed)
    }

    /// 現在の状態を返す。
    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        if self.revealed {
            Status::Revealed
        } else if self.board.is_complete() {
            Status::Solved
        } else {
            Status::InProgress
        }
    }

    /// マスを書き換える共通処理。
    fn write(&mut self, row: usize, col: usize, digit: Option<u8>) -> Result<Status, PlayError> {
        if self.status() != Status::InProgress {
            return Err(PlayError::Finished);
        }
        if row >= SIDE || col >= SIDE {
            return Err(PlayError::OutOfRange);
        }
        if self.is_given(row, col) {
            return Err(PlayError::Given);
        }

        self.board.set(row, col, digit);
        let status = self.status();
        if status == Status::Solved {
            info!("sudoku solved by the player");
        }
        Ok(status)
    }
}
