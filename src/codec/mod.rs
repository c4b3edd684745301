pub mod qoi;

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::core::image::DecodedImage;

#[derive(Debug)]
pub enum DecodeError {
    Truncated,
    BadMagic,
    InvalidHeader(String),
    TooLarge { width: u32, height: u32 },
    MissingEndMarker,
    /// 非 QOI 输入交给 `image` crate 时的失败
    Image(image::ImageError),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated => write!(f, "unexpected end of data"),
            Self::BadMagic => write!(f, "missing `qoif` magic"),
            Self::InvalidHeader(detail) => write!(f, "invalid header: {detail}"),
            Self::TooLarge { width, height } => {
                write!(f, "image too large: {width}x{height}")
            }
            Self::MissingEndMarker => write!(f, "missing end-of-stream marker"),
            Self::Image(error) => write!(f, "{error}"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Image(error) => Some(error),
            _ => None,
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}

/// 解码任意受支持的图像为 RGBA8。
///
/// 以 `qoif` 开头的数据走内置 QOI 解码器，其余交给 `image` crate
/// 按内容嗅探格式（PNG、JPEG 等）。
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.starts_with(qoi::MAGIC) {
        return qoi::decode(bytes);
    }

    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}
