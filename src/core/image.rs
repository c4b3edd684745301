/// 解码后的 RGBA8 图像，行主序，首行为图像顶部。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    /// 宽高比（宽 / 高），加载后固定不变。
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
