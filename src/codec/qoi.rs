//! # QOI ("Quite OK Image") 解码器
//!
//! 头部 14 字节：`qoif` + 大端 u32 宽高 + 通道数 + 色彩空间；
//! 之后是操作码流，最后以 7 个 `0x00` 加一个 `0x01` 结尾。
//!
//! 输出统一为 RGBA8。所有差值运算按 256 取模回绕。

use crate::core::image::DecodedImage;

use super::DecodeError;

pub const MAGIC: &[u8; 4] = b"qoif";
const HEADER_LEN: usize = 14;
const END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];
/// 防止恶意头部申请过大缓冲区
const MAX_PIXELS: u64 = 400_000_000;
/// 单个操作码最多产出的像素数（RUN 的 6 位长度上限）
const MAX_PIXELS_PER_OP: usize = 62;

const OP_INDEX: u8 = 0x00;
const OP_DIFF: u8 = 0x40;
const OP_LUMA: u8 = 0x80;
const OP_RUN: u8 = 0xc0;
const OP_RGB: u8 = 0xfe;
const OP_RGBA: u8 = 0xff;
const MASK_2: u8 = 0xc0;

type Pixel = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub colorspace: u8,
}

/// 索引表槽位：`(r*3 + g*5 + b*7 + a*11) % 64`
fn index_position(px: Pixel) -> usize {
    let [r, g, b, a] = px.map(usize::from);
    (r * 3 + g * 5 + b * 7 + a * 11) % 64
}

/// 顺序读取字节流，越界即 `Truncated`。
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Result<u8, DecodeError> {
        let (&first, rest) = self.data.split_first().ok_or(DecodeError::Truncated)?;
        self.data = rest;
        Ok(first)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let (head, rest) = self
            .data
            .split_first_chunk::<N>()
            .ok_or(DecodeError::Truncated)?;
        self.data = rest;
        Ok(*head)
    }

    fn rest(&self) -> &'a [u8] {
        self.data
    }
}

/// 初始缓冲区大小：不超过操作码流实际能产出的像素，
/// 头部谎报尺寸的小文件不会先申请一大块内存。
fn initial_capacity(pixel_count: usize, body_len: usize) -> usize {
    pixel_count
        .min(body_len.saturating_mul(MAX_PIXELS_PER_OP))
        .saturating_mul(4)
}

pub fn read_header(data: &[u8]) -> Result<Header, DecodeError> {
    let mut reader = Reader { data };
    if &reader.array::<4>()? != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let width = u32::from_be_bytes(reader.array()?);
    let height = u32::from_be_bytes(reader.array()?);
    let channels = reader.byte()?;
    let colorspace = reader.byte()?;

    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidHeader(format!(
            "image size {width}x{height}"
        )));
    }
    if !matches!(channels, 3 | 4) {
        return Err(DecodeError::InvalidHeader(format!("channels = {channels}")));
    }
    if colorspace > 1 {
        return Err(DecodeError::InvalidHeader(format!(
            "colorspace = {colorspace}"
        )));
    }
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(DecodeError::TooLarge { width, height });
    }

    Ok(Header {
        width,
        height,
        channels,
        colorspace,
    })
}

pub fn decode(data: &[u8]) -> Result<DecodedImage, DecodeError> {
    let header = read_header(data)?;
    log::debug!(
        "qoi header: {}x{}, {} channels, colorspace {}",
        header.width,
        header.height,
        header.channels,
        header.colorspace
    );
    let pixel_count = header.width as usize * header.height as usize;

    let body = &data[HEADER_LEN..];
    let mut reader = Reader { data: body };
    let mut pixels = Vec::with_capacity(initial_capacity(pixel_count, body.len()));
    let mut index: [Pixel; 64] = [[0; 4]; 64];
    let mut px: Pixel = [0, 0, 0, 255];
    let mut decoded = 0usize;

    while decoded < pixel_count {
        let tag = reader.byte()?;
        let mut run = 1usize;

        match tag {
            OP_RGB => {
                let [r, g, b] = reader.array::<3>()?;
                px = [r, g, b, px[3]];
            }
            OP_RGBA => px = reader.array::<4>()?,
            _ => match tag & MASK_2 {
                OP_INDEX => px = index[usize::from(tag)],
                OP_DIFF => {
                    px[0] = px[0].wrapping_add((tag >> 4) & 0x03).wrapping_sub(2);
                    px[1] = px[1].wrapping_add((tag >> 2) & 0x03).wrapping_sub(2);
                    px[2] = px[2].wrapping_add(tag & 0x03).wrapping_sub(2);
                }
                OP_LUMA => {
                    let next = reader.byte()?;
                    let vg = (tag & 0x3f).wrapping_sub(32);
                    px[0] = px[0].wrapping_add(vg.wrapping_sub(8).wrapping_add(next >> 4));
                    px[1] = px[1].wrapping_add(vg);
                    px[2] = px[2].wrapping_add(vg.wrapping_sub(8).wrapping_add(next & 0x0f));
                }
                // OP_RUN：6 位长度，偏置 -1
                _ => run = usize::from(tag & 0x3f) + 1,
            },
        }

        index[index_position(px)] = px;

        // 超出剩余像素的游程截断
        let run = run.min(pixel_count - decoded);
        for _ in 0..run {
            pixels.extend_from_slice(&px);
        }
        decoded += run;
    }

    if reader.rest() != END_MARKER {
        return Err(DecodeError::MissingEndMarker);
    }

    Ok(DecodedImage {
        pixels,
        width: header.width,
        height: header.height,
    })
}
