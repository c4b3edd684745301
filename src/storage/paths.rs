//! # 应用路径管理
//!
//! 应用数据目录为 `$XDG_DATA_HOME/qoi-viewer/`，
//! 未设置时回退到 `~/.local/share/qoi-viewer/`。

use std::path::PathBuf;
use std::sync::OnceLock;

const APP_DIR: &str = "qoi-viewer";

/// 全局单例：应用数据根目录
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 获取应用数据根目录。只读取，不主动创建。
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        resolve_data_dir(
            std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
    })
}

/// runtime.json 的完整路径
pub fn runtime_json_path() -> PathBuf {
    data_dir().join("runtime.json")
}

// ── 内部实现 ────────────────────────────────────────────────

fn resolve_data_dir(xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    // 1) $XDG_DATA_HOME/qoi-viewer（目录本身需存在）
    if let Some(xdg) = xdg.filter(|p| p.is_absolute() && p.exists()) {
        return xdg.join(APP_DIR);
    }
    // 2) ~/.local/share/qoi-viewer
    if let Some(home) = home {
        return home.join(".local").join("share").join(APP_DIR);
    }
    // 3) 可执行文件旁边
    exe_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}
