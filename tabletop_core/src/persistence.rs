use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// 保存・読み込みできる局面。
///
/// JSON で欠けている必須フィールドは serde が拒否する。`validate` は型だけでは
/// 表せない整合性（盤の大きさ、駒の座標など）を確認する。
pub trait Snapshot: Serialize + DeserializeOwned {
    /// 局面として成り立っているかを確認する。
    ///
    /// # Errors
    ///
    /// 盤面として不正な場合は、その理由を返す。
    fn validate(&self) -> Result<(), InvalidSnapshot>;
}

/// 形式は正しいが局面として不正な文書。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{reason}")]
pub struct InvalidSnapshot {
    /// 不正な理由。
    reason: String,
}

impl InvalidSnapshot {
    /// 理由を指定して生成する。
    #[inline]
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// 不正な理由を返す。
    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// 保存・読み込みの失敗。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
    /// 局面として不正。
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] InvalidSnapshot),
    /// 保存先の入出力エラー。
    #[error("snapshot store I/O failed: {0}")]
    Io(#[from] io::Error),
    /// JSON として読めない、または必須フィールドが無い。
    #[error("malformed snapshot document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 保存の結果。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SaveOutcome {
    /// 保存先の選択が取り消され、何もしなかった。
    Cancelled,
    /// 保存した。
    Saved,
}

/// バイト列を保存・取得できる保存先。
pub trait SnapshotStore {
    /// 保存済みのバイト列を返す。何も保存されていない（または選択が取り消された）なら `None`。
    ///
    /// # Errors
    ///
    /// 入出力に失敗した場合。
    fn load(&mut self) -> Result<Option<Vec<u8>>, PersistError>;

    /// バイト列を保存する。
    ///
    /// # Errors
    ///
    /// 入出力に失敗した場合。
    fn save(&mut self, bytes: &[u8]) -> Result<SaveOutcome, PersistError>;
}

/// ファイル1つを保存先とする。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileStore {
    /// 保存先のパス。
    path: PathBuf,
}

impl FileStore {
    /// `path` を保存先とする。
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 保存先のパスを返す。
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&mut self) -> Result<Option<Vec<u8>>, PersistError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved snapshot");
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<SaveOutcome, PersistError> {
        std::fs::write(&self.path, bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(SaveOutcome::Saved)
    }
}

/// メモリ上の保存先（テスト・組み込み用）。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryStore {
    /// 保存済みのバイト列。
    bytes: Option<Vec<u8>>,
    /// 保存・読み込みを常に取り消すか（ダイアログのキャンセル相当）。
    cancelled: bool,
}

impl MemoryStore {
    /// 保存・読み込みを常に取り消す保存先を作る。
    #[inline]
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            bytes: None,
            cancelled: true,
        }
    }

    /// 保存済みのバイト列を返す。
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// 空の保存先を作る。
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: None,
            cancelled: false,
        }
    }

    /// `bytes` が保存済みの保存先を作る。
    #[inline]
    #[must_use]
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            cancelled: false,
        }
    }
}

impl SnapshotStore for MemoryStore {
    #[inline]
    fn load(&mut self) -> Result<Option<Vec<u8>>, PersistError> {
        if self.cancelled {
            return Ok(None);
        }
        Ok(self.bytes.clone())
    }

    #[inline]
    fn save(&mut self, bytes: &[u8]) -> Result<SaveOutcome, PersistError> {
        if self.cancelled {
            return Ok(SaveOutcome::Cancelled);
        }
        self.bytes = Some(bytes.to_vec());
        Ok(SaveOutcome::Saved)
    }
}

/// 局面を JSON 文書にする。
///
/// # Errors
///
/// シリアライズに失敗した場合。
#[inline]
pub fn to_json<S: Snapshot>(snapshot: &S) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// JSON 文書から局面を読み、整合性を確認する。
///
/// # Errors
///
/// - `PersistError::Malformed`: JSON として読めない、または必須フィールドが無い場合
/// - `PersistError::Invalid`: 局面として不正な場合
///
pub fn from_json<S: Snapshot>(text: &str) -> Result<S, PersistError> {
    from_slice(text.as_bytes())
}

/// 局面を保存先に書き込む。
///
/// # Errors
///
/// シリアライズ、または保存先への書き込みに失敗した場合。
pub fn save<S: Snapshot, T: SnapshotStore + ?Sized>(
    store: &mut T,
    snapshot: &S,
) -> Result<SaveOutcome, PersistError> {
    let json = to_json(snapshot)?;
    store.save(json.as_bytes())
}

/// 保存先から局面を読み込む。何も保存されていなければ `None`。
///
/// # Errors
///
/// [`from_json`] と同じ。加えて保存先の読み込みに失敗した場合。
pub fn load<S: Snapshot, T: SnapshotStore + ?Sized>(store: &mut T) -> Result<Option<S>, PersistError> {
    store.load()?.map(|bytes| from_slice(&bytes)).transpose()
}

/// バイト列から局面を読み、整合性を確認する。
fn from_slice<S: Snapshot>(bytes: &[u8]) -> Result<S, PersistError> {
    let snapshot: S = serde_json::from_slice(bytes).inspect_err(|error| {
        warn!(%error, "rejected malformed snapshot");
    })?;
    snapshot.validate().inspect_err(|error| {
        warn!(%error, "rejected invalid snapshot");
    })?;
    Ok(snapshot)
}
