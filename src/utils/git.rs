use crate::{RestoreError, RestoreResult};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 外部 git 命令，总是在显式指定的工作目录中执行
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Git {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 在 `dir` 中执行 git，退出码非 0 视为失败
    pub fn run(&self, dir: &Path, args: &[&str]) -> RestoreResult<()> {
        debug!("在 {} 执行 git {}", dir.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RestoreError::GitSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RestoreError::GitFailed {
                args: args.join(" "),
                dir: dir.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("git 输出：{}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }

    /// 基于已有的 .git 目录初始化工作区
    pub fn init(&self, dir: &Path) -> RestoreResult<()> {
        self.run(dir, &["init"])
    }

    /// 把工作区重置到最新提交
    pub fn reset_hard(&self, dir: &Path) -> RestoreResult<()> {
        self.run(dir, &["reset", "--hard"])
    }
}
