use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

/// 恢复过程中可能出现的错误
#[derive(Debug, Error)]
pub enum RestoreError {
    /// 目标目录已存在且未开启覆盖
    #[error("{} 已存在", .0.display())]
    TargetExists(PathBuf),

    #[error("源路径不是目录：{}", .0.display())]
    SourceNotDir(PathBuf),

    /// 输出目录与源目录相同，或包含源目录
    #[error("输出路径 {} 不能包含源路径 {}", .output.display(), .gitlab.display())]
    OutputContainsSource { output: PathBuf, gitlab: PathBuf },

    #[error("{context}：{}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("无法启动 {}：{source}", .program.display())]
    GitSpawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`git {args}` 在 {} 执行失败（{status}）：{stderr}", .dir.display())]
    GitFailed {
        args: String,
        dir: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

pub type RestoreResult<T> = std::result::Result<T, RestoreError>;

impl RestoreError {
    /// 构造 `map_err` 用的闭包，附带出错路径和操作说明
    pub fn io<'a>(context: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| RestoreError::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RestoreError::TargetExists(_))
    }

    pub fn is_git_failure(&self) -> bool {
        matches!(self, RestoreError::GitSpawn { .. } | RestoreError::GitFailed { .. })
    }
}
