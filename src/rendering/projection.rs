//! 宽高比适配：根据图像宽高比与视口宽高比推导投影矩阵，
//! 以及图像四边形在模型空间中的范围。

use crate::core::matrix::Transform;

/// 视口宽高比。宽或高为 0（窗口最小化等）时返回 `None`，调用方应跳过重算。
pub fn viewport_aspect(width: f32, height: f32) -> Option<f32> {
    (width > 0.0 && height > 0.0).then(|| width / height)
}

/// 投影矩阵：每次都从单位矩阵重新推导，不在旧值上累积。
///
/// 视口相对图像更宽时压缩 x 轴，否则压缩 y 轴。
pub fn aspect_fit(image_aspect: f32, viewport_aspect: f32) -> Transform {
    if image_aspect < viewport_aspect {
        Transform::from_scale(1.0 / viewport_aspect, 1.0, 1.0)
    } else {
        Transform::from_scale(1.0, viewport_aspect, 1.0)
    }
}

/// 图像四边形的半宽 / 半高。
///
/// 横图占满 x 方向 `-1..1`，y 方向为 `±1/aspect`；
/// 竖图占满 y 方向，x 方向为 `±aspect`。
pub fn quad_extent(image_aspect: f32) -> [f32; 2] {
    if image_aspect >= 1.0 {
        [1.0, 1.0 / image_aspect]
    } else {
        [image_aspect, 1.0]
    }
}
