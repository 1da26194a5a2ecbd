use crate::utils::fs::{self as utils_fs, HideFn, META_DIR};
use crate::utils::git::Git;
use crate::{Cli, GitFailurePolicy, RestoreError, RestoreResult};
use anyhow::Context;
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// 一次恢复任务的配置，运行期间不可变
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    pub gitlab_path: PathBuf,
    pub output_path: PathBuf,
    pub overwrite: bool,
    pub with_wiki: bool,
    pub git: PathBuf,
    pub on_git_failure: GitFailurePolicy,
}

impl RestoreOptions {
    pub fn new(gitlab_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            gitlab_path: gitlab_path.into(),
            output_path: output_path.into(),
            overwrite: false,
            with_wiki: false,
            git: PathBuf::from("git"),
            on_git_failure: GitFailurePolicy::default(),
        }
    }
}

impl From<&Cli> for RestoreOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            gitlab_path: cli.gitlab_path.clone(),
            output_path: cli.output_path.clone(),
            overwrite: cli.overwrite,
            with_wiki: cli.with_wiki,
            git: cli.git.clone(),
            on_git_failure: cli.on_git_failure,
        }
    }
}

/// 恢复结果汇总
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// 已恢复的工作区目录
    pub recovered: Vec<PathBuf>,
    /// 因目标已存在而跳过的目录
    pub conflicts: Vec<PathBuf>,
    /// 未开启 --with-wiki 时跳过的 wiki 仓库（源路径）
    pub skipped_wikis: Vec<PathBuf>,
    /// git 命令失败而跳过的工作区目录
    pub git_failures: Vec<PathBuf>,
}

enum Outcome {
    Recovered(PathBuf),
    WikiSkipped,
    NotRepo,
}

/// 遍历 GitLab 存储目录并逐个恢复裸仓库
pub struct Restorer {
    options: RestoreOptions,
    source_root: PathBuf,
    output_root: PathBuf,
    git: Git,
    make_hidden: Option<HideFn>,
}

impl Restorer {
    pub fn new(options: RestoreOptions) -> RestoreResult<Self> {
        if !options.gitlab_path.is_dir() {
            return Err(RestoreError::SourceNotDir(options.gitlab_path));
        }
        let source_root = options
            .gitlab_path
            .canonicalize()
            .map_err(RestoreError::io("解析源路径失败", &options.gitlab_path))?;

        // 提前创建输出目录，以便在它位于源目录内部时遍历能跳过它
        fs::create_dir_all(&options.output_path)
            .map_err(RestoreError::io("创建输出目录失败", &options.output_path))?;
        let output_root = options
            .output_path
            .canonicalize()
            .map_err(RestoreError::io("解析输出路径失败", &options.output_path))?;
        // 否则恢复出的 .git 会被再次当作裸仓库，覆盖时还会删掉正在复制的源
        if source_root.starts_with(&output_root) {
            return Err(RestoreError::OutputContainsSource {
                output: options.output_path,
                gitlab: options.gitlab_path,
            });
        }

        Ok(Self {
            git: Git::new(&options.git),
            source_root,
            output_root,
            make_hidden: utils_fs::hidden_attribute_setter(),
            options,
        })
    }

    pub fn run(&self) -> RestoreResult<RestoreReport> {
        let mut report = RestoreReport::default();
        let mut history = Vec::new();
        self.walk(&self.source_root, &mut history, &mut report)?;
        debug_assert!(history.is_empty());
        Ok(report)
    }

    /// 深度优先遍历 `dir` 的子目录，`history` 在每个子目录处理完后恢复原状
    fn walk(&self, dir: &Path, history: &mut Vec<OsString>, report: &mut RestoreReport) -> RestoreResult<()> {
        for entry in utils_fs::subdirectories(dir) {
            if entry.path() == self.output_root {
                debug!("跳过位于源目录内的输出目录：{}", entry.path().display());
                continue;
            }

            history.push(entry.file_name().to_os_string());
            let visited = self.visit(entry.path(), history, report);
            history.pop();
            visited?;
        }
        Ok(())
    }

    fn visit(&self, path: &Path, history: &mut Vec<OsString>, report: &mut RestoreReport) -> RestoreResult<()> {
        match self.try_recover_repo(path, history) {
            Ok(Outcome::Recovered(target)) => {
                info!("已恢复 {} -> {}", path.display(), target.display());
                report.recovered.push(target);
            }
            Ok(Outcome::WikiSkipped) => {
                debug!("跳过 wiki 仓库，按普通目录继续遍历：{}", path.display());
                report.skipped_wikis.push(path.to_path_buf());
                self.walk(path, history, report)?;
            }
            Ok(Outcome::NotRepo) => self.walk(path, history, report)?,
            Err(err) if err.is_conflict() => {
                println!("{}", err);
                report
                    .conflicts
                    .push(utils_fs::restore_target(&self.options.output_path, history));
            }
            Err(err) if err.is_git_failure() && self.options.on_git_failure == GitFailurePolicy::Skip => {
                println!("{}", err);
                report
                    .git_failures
                    .push(utils_fs::restore_target(&self.options.output_path, history));
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn try_recover_repo(&self, path: &Path, history: &[OsString]) -> RestoreResult<Outcome> {
        if !utils_fs::is_bare_repo(path) {
            return Ok(Outcome::NotRepo);
        }
        if utils_fs::is_wiki_repo(path) && !self.options.with_wiki {
            return Ok(Outcome::WikiSkipped);
        }

        let target = utils_fs::restore_target(&self.options.output_path, history);
        if target.is_dir() && !self.options.overwrite {
            return Err(RestoreError::TargetExists(target));
        }

        self.recover(path, &target)?;
        Ok(Outcome::Recovered(target))
    }

    /// 复制裸仓库为 `<target>/.git`，再用 git 检出工作区
    fn recover(&self, repo: &Path, target: &Path) -> RestoreResult<()> {
        fs::create_dir_all(target).map_err(RestoreError::io("创建目标目录失败", target))?;

        let git_dir = target.join(META_DIR);
        utils_fs::remove_dir_if_exists(&git_dir)?;
        utils_fs::copy_tree(repo, &git_dir)?;

        if let Some(make_hidden) = self.make_hidden {
            if let Err(err) = make_hidden(&git_dir) {
                warn!("设置隐藏属性失败：{}：{}", git_dir.display(), err);
            }
        }

        let steps: [fn(&Git, &Path) -> RestoreResult<()>; 2] = [Git::init, Git::reset_hard];
        for step in steps {
            match step(&self.git, target) {
                Err(err) if err.is_git_failure() && self.options.on_git_failure == GitFailurePolicy::Ignore => {
                    warn!("{}", err);
                }
                result => result?,
            }
        }
        Ok(())
    }
}

/// 实现 restore 命令：恢复整个目录树并汇总结果
pub fn restore(cli: &Cli) -> anyhow::Result<RestoreReport> {
    let restorer = Restorer::new(RestoreOptions::from(cli)).context("初始化恢复任务失败")?;
    let report = restorer.run().context("恢复仓库失败")?;

    info!(
        "恢复完成：成功 {}，已存在 {}，跳过 wiki {}，git 失败 {}",
        report.recovered.len(),
        report.conflicts.len(),
        report.skipped_wikis.len(),
        report.git_failures.len()
    );

    if !report.git_failures.is_empty() {
        anyhow::bail!("{} 个仓库的 git 命令执行失败", report.git_failures.len());
    }
    Ok(report)
}
