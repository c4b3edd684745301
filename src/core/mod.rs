pub mod image;
pub mod matrix;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::codec::DecodeError;

/// 启动阶段的致命错误。出现即退出进程，不做重试。
#[derive(Debug)]
pub enum ViewerError {
    /// 缺少输入文件参数，携带程序名用于打印用法。
    Usage { program: String },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Decode(DecodeError),
    /// 窗口、GL 上下文、着色器或纹理初始化失败。
    Graphics(String),
}

impl ViewerError {
    /// 进程退出码：用法 / IO 为 1，解码与图形初始化为 -1。
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } | Self::Io { .. } => 1,
            Self::Decode(_) | Self::Graphics(_) => -1,
        }
    }
}

impl Display for ViewerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage { program } => write!(f, "usage: {program} <input file>"),
            Self::Io { path, source } => {
                write!(f, "Error reading the file {}: {source}", path.display())
            }
            Self::Decode(error) => write!(
                f,
                "Failed to decode ({error}). Make sure image is valid QOI format."
            ),
            Self::Graphics(message) => write!(f, "Graphics initialization failed: {message}"),
        }
    }
}

impl Error for ViewerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode(error) => Some(error),
            Self::Usage { .. } | Self::Graphics(_) => None,
        }
    }
}

impl From<DecodeError> for ViewerError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<eframe::Error> for ViewerError {
    fn from(value: eframe::Error) -> Self {
        Self::Graphics(value.to_string())
    }
}
