use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::telemetry::LogFormat;

/// 設定ファイルを読めなかった理由。
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// ファイルを読めなかった。
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    /// JSON として不正、または未知のフィールドがある。
    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// AI とログの実行時設定。省略したフィールドは既定値になる。
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct EngineConfig {
    /// 五目並べ AI がルート手の後に読む深さ。
    pub gomoku_depth: u8,
    /// ログの出力形式。
    pub log_format: LogFormat,
    /// 乱数を使う AI と数独生成の種。
    pub seed: u64,
    /// 数独の問題で空けるマス数。
    pub sudoku_removals: usize,
    /// シャンチー AI がルート手の後に読む深さ。
    pub xiangqi_depth: u8,
}

impl EngineConfig {
    /// JSON 文書から読む。
    ///
    /// # Errors
    ///
    /// `ConfigError::Malformed`: JSON として不正、または未知のフィールドがある場合
    ///
    #[inline]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// JSON ファイルから読む。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `ConfigError::Io`: ファイルを読めなかった場合
    /// - `ConfigError::Malformed`: JSON として不正、または未知のフィールドがある場合
    ///
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }
}

impl Default for EngineConfig {
    #[inline]
    fn default() -> Self {
        Self {
            gomoku_depth: crate::gomoku::ai::DEFAULT_DEPTH,
            log_format: LogFormat::Pretty,
            seed: 0,
            sudoku_removals: crate::sudoku::generator::DEFAULT_REMOVALS,
            xiangqi_depth: crate::xiangqi::ai::DEFAULT_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};
    use crate::telemetry::LogFormat;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_json("{}");
        assert!(config.is_ok_and(|config| config == EngineConfig::default()));

        let defaults = EngineConfig::default();
        assert_eq!(defaults.gomoku_depth, 3);
        assert_eq!(defaults.xiangqi_depth, 2);
        assert_eq!(defaults.sudoku_removals, 40);
        assert_eq!(defaults.log_format, LogFormat::Pretty);
    }

    #[test]
    fn fields_override_defaults() {
        let config = EngineConfig::from_json(r#"{"seed": 42, "gomokuDepth": 1, "logFormat": "json"}"#);
        assert!(config.is_ok_and(|config| {
            config.seed == 42
                && config.gomoku_depth == 1
                && config.log_format == LogFormat::Json
                && config.xiangqi_depth == 2
        }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let config = EngineConfig::from_json(r#"{"depth": 9}"#);
        assert!(matches!(config, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let config = EngineConfig::from_path(std::path::Path::new("/nonexistent/tabletop.json"));
        assert!(matches!(config, Err(ConfigError::Io(_))));
    }
}
