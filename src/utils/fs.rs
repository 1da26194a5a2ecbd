use crate::{RestoreError, RestoreResult};
use log::warn;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 裸仓库目录后缀
pub const BARE_SUFFIX: &str = ".git";
/// GitLab wiki 仓库目录后缀
pub const WIKI_SUFFIX: &str = ".wiki.git";
/// 工作区内的元数据目录名
pub const META_DIR: &str = ".git";

/// 设置隐藏属性的函数
pub type HideFn = fn(&Path) -> io::Result<()>;

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(suffix.as_bytes()))
}

/// 判断目录是否为 GitLab 存储的裸仓库：
/// 以 `.git` 结尾，包含 `config` 文件和 `objects` 目录
pub fn is_bare_repo(path: &Path) -> bool {
    has_suffix(path, BARE_SUFFIX)
        && path.join("config").is_file()
        && path.join("objects").is_dir()
}

pub fn is_wiki_repo(path: &Path) -> bool {
    has_suffix(path, WIKI_SUFFIX)
}

/// 由输出根目录和遍历路径计算恢复目标目录，最后一段去掉 `.git` 后缀
pub fn restore_target(output_root: &Path, history: &[OsString]) -> PathBuf {
    let mut target = output_root.to_path_buf();
    let Some((last, parents)) = history.split_last() else {
        return target;
    };
    target.extend(parents);

    let name = Path::new(last);
    if !has_suffix(name, BARE_SUFFIX) {
        target.push(name);
    } else if last != META_DIR {
        // 后缀 .git 正好是最后一个扩展名，file_stem 只去掉它
        target.push(name.file_stem().unwrap_or(last.as_os_str()));
    }
    target
}

/// 列出目录下的直接子目录（按名称排序，不跟随符号链接）
///
/// 无法读取的条目只记录警告并跳过
pub fn subdirectories(dir: &Path) -> Vec<DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("跳过无法读取的目录项：{}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .collect()
}

/// 删除目录（不存在时忽略）
pub fn remove_dir_if_exists(path: &Path) -> RestoreResult<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            Err(RestoreError::io("删除目录失败", path)(err))
        }
        _ => Ok(()),
    }
}

/// 递归复制整个目录，保持目录结构
pub fn copy_tree(src: &Path, dst: &Path) -> RestoreResult<()> {
    fs::create_dir_all(dst).map_err(RestoreError::io("创建目录失败", dst))?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(src).to_path_buf();
            RestoreError::Io {
                context: "遍历目录失败",
                path,
                source: err.into(),
            }
        })?;
        let rel_path = entry.path().strip_prefix(src).map_err(|err| RestoreError::Io {
            context: "计算相对路径失败",
            path: entry.path().to_path_buf(),
            source: io::Error::other(err),
        })?;
        let out = dst.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).map_err(RestoreError::io("创建目录失败", &out))?;
        } else {
            fs::copy(entry.path(), &out).map_err(RestoreError::io("复制文件失败", entry.path()))?;
        }
    }

    Ok(())
}

/// 当前平台设置隐藏属性的能力（仅 Windows 提供）
#[cfg(windows)]
pub fn hidden_attribute_setter() -> Option<HideFn> {
    Some(win32::set_hidden)
}

#[cfg(not(windows))]
pub fn hidden_attribute_setter() -> Option<HideFn> {
    None
}

#[cfg(windows)]
mod win32 {
    use std::io;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::fileapi::{GetFileAttributesW, INVALID_FILE_ATTRIBUTES, SetFileAttributesW};
    use winapi::um::winnt::FILE_ATTRIBUTE_HIDDEN;

    pub fn set_hidden(path: &Path) -> io::Result<()> {
        let wide_path: Vec<u16> = path.as_os_str().encode_wide().chain(std::iter::once(0)).collect();

        let attrs = unsafe { GetFileAttributesW(wide_path.as_ptr()) };
        if attrs == INVALID_FILE_ATTRIBUTES {
            return Err(io::Error::from_raw_os_error(unsafe { GetLastError() } as i32));
        }

        let success = unsafe { SetFileAttributesW(wide_path.as_ptr(), attrs | FILE_ATTRIBUTE_HIDDEN) != 0 };
        if !success {
            return Err(io::Error::from_raw_os_error(unsafe { GetLastError() } as i32));
        }
        Ok(())
    }
}
