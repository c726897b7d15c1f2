use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

/// ログの出力形式。
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum LogFormat {
    /// 1イベント1行の JSON。
    Json,
    /// 人間向けの整形出力。
    #[default]
    Pretty,
}

impl fmt::Display for LogFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        })
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    #[inline]
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(TelemetryError::UnknownFormat(other.to_owned())),
        }
    }
}

/// ログ出力を初期化できなかった理由。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    /// すでに別のサブスクライバーが登録されている。
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
    /// 未知の出力形式。
    #[error("unknown log format {0:?} (expected \"pretty\" or \"json\")")]
    UnknownFormat(String),
}

/// 標準エラー出力へのログ出力を登録する。ライブラリ自身は呼ばない。
///
/// # Errors
///
/// `TelemetryError::AlreadyInstalled`: すでにサブスクライバーが登録されている場合
///
pub fn init(format: LogFormat, level: Level) -> Result<(), TelemetryError> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|_already| TelemetryError::AlreadyInstalled)
}
