use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "从 GitLab 仓库存储目录恢复本地 Git 仓库", long_about = None)]
pub struct Cli {
    /// GitLab 仓库存储路径（如 git-data/repositories）
    pub gitlab_path: PathBuf,
    /// 恢复后仓库的输出路径
    pub output_path: PathBuf,
    /// 允许复用输出路径下已存在的目录
    #[arg(long)]
    pub overwrite: bool,
    /// 同时恢复 wiki 仓库（*.wiki.git）
    #[arg(short = 'w', long)]
    pub with_wiki: bool,
    /// git 可执行文件
    #[arg(long, default_value = "git")]
    pub git: PathBuf,
    /// git 命令执行失败时的处理方式
    #[arg(long, value_enum, default_value_t = GitFailurePolicy::Skip)]
    pub on_git_failure: GitFailurePolicy,
    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

/// git 命令失败（无法启动或退出码非 0）时的处理策略
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GitFailurePolicy {
    /// 立即终止整个恢复过程
    Abort,
    /// 跳过当前仓库，结束后以非 0 状态退出
    #[default]
    Skip,
    /// 仅记录警告，视为恢复成功
    Ignore,
}

pub use error::{RestoreError, RestoreResult};

pub mod error;

pub mod commands {
    pub mod restore;
}

pub mod utils {
    pub mod fs;
    pub mod git;
}
