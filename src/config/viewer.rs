//! # 查看器配置（ViewerConfig）
//!
//! 内置默认值来自 `assets/viewer.json`；用户可以在 runtime.json 的
//! `"viewer"` 字段里覆盖任意子集，缺省字段沿用默认值。

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::storage::runtime;

const VIEWER_JSON: &str = include_str!("../assets/viewer.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub zoom: ZoomConfig,
    /// 画布背景色 RGB
    pub background: [u8; 3],
    pub filter: TextureFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

/// 滚轮缩放参数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// 允许的最小 x 缩放
    pub min_scale: f32,
    /// 允许的最大 x 缩放
    pub max_scale: f32,
    /// 每单位滚动的缩放增量：factor = 1 + step * delta
    pub step: f32,
    /// egui 的滚动量以 point 计，除以此值得到“格数”
    pub points_per_step: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFilter {
    Linear,
    Nearest,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            zoom: ZoomConfig::default(),
            background: [26, 26, 26],
            filter: TextureFilter::Linear,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "QOI Viewer".to_string(),
            width: 500.0,
            height: 500.0,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            step: 0.1,
            points_per_step: 50.0,
        }
    }
}

impl ZoomConfig {
    /// 要求 `0 < min_scale <= 1 <= max_scale`，步长与换算值为正。
    ///
    /// 初始模型是单位矩阵，缩放 1 必须落在允许范围内。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            min_scale,
            max_scale,
            step,
            points_per_step,
        } = *self;
        // 写成取反比较，NaN 也会被拒绝
        if !(min_scale > 0.0 && min_scale <= 1.0) {
            return Err(ConfigError::InvalidZoom(format!(
                "min_scale = {min_scale}, expected 0 < min_scale <= 1"
            )));
        }
        if !(max_scale >= 1.0 && max_scale.is_finite()) {
            return Err(ConfigError::InvalidZoom(format!(
                "max_scale = {max_scale}, expected a finite value >= 1"
            )));
        }
        if !(step > 0.0 && step.is_finite()) {
            return Err(ConfigError::InvalidZoom(format!("step = {step}")));
        }
        if !(points_per_step > 0.0 && points_per_step.is_finite()) {
            return Err(ConfigError::InvalidZoom(format!(
                "points_per_step = {points_per_step}"
            )));
        }
        Ok(())
    }
}

/// 解析内置默认配置。
pub fn load_builtin_config() -> Result<ViewerConfig, ConfigError> {
    let config: ViewerConfig = serde_json::from_str(VIEWER_JSON)?;
    Ok(config)
}

/// 内置默认值 + runtime.json 覆盖。覆盖项解析失败或数值非法时只告警，
/// 整体回退到内置值，不中断启动。
pub fn load_viewer_config() -> Result<ViewerConfig, ConfigError> {
    let builtin = load_builtin_config()?;
    let Some(overrides) = runtime::load_field("viewer") else {
        return Ok(builtin);
    };
    match apply_overrides(&builtin, overrides) {
        Ok(config) => Ok(config),
        Err(error) => {
            log::warn!("ignoring viewer overrides in runtime.json: {error}");
            Ok(builtin)
        }
    }
}

/// 把 `overrides` 中出现的字段递归合并到 `base` 上。
fn apply_overrides(
    base: &ViewerConfig,
    overrides: serde_json::Value,
) -> Result<ViewerConfig, ConfigError> {
    let mut merged = serde_json::to_value(base)?;
    merge_json(&mut merged, overrides);
    let config: ViewerConfig = serde_json::from_value(merged)?;
    config.zoom.validate()?;
    Ok(config)
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builtin_matches_defaults() {
        let builtin = load_builtin_config().unwrap();
        assert_eq!(builtin, ViewerConfig::default());
        assert!(builtin.zoom.validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let base = ViewerConfig::default();
        let merged = apply_overrides(
            &base,
            json!({ "zoom": { "max_scale": 4.0 }, "filter": "nearest" }),
        )
        .unwrap();

        assert_eq!(merged.zoom.max_scale, 4.0);
        assert_eq!(merged.zoom.min_scale, base.zoom.min_scale);
        assert_eq!(merged.filter, TextureFilter::Nearest);
        assert_eq!(merged.window, base.window);
    }

    #[test]
    fn malformed_override_is_an_error() {
        let base = ViewerConfig::default();
        let result = apply_overrides(&base, json!({ "background": "grey" }));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zoom_overrides_that_exclude_identity_are_rejected() {
        let base = ViewerConfig::default();
        for zoom in [
            json!({ "min_scale": 2.0, "max_scale": 1.5 }),
            json!({ "min_scale": 1.5 }),
            json!({ "max_scale": 0.5 }),
            json!({ "min_scale": 0.0 }),
            json!({ "step": 0.0 }),
            json!({ "step": -0.1 }),
            json!({ "points_per_step": 0.0 }),
        ] {
            let result = apply_overrides(&base, json!({ "zoom": zoom.clone() }));
            assert!(
                matches!(result, Err(ConfigError::InvalidZoom(_))),
                "accepted {zoom}"
            );
        }
    }

    #[test]
    fn zoom_bounds_touching_identity_are_accepted() {
        let base = ViewerConfig::default();
        let merged = apply_overrides(
            &base,
            json!({ "zoom": { "min_scale": 1.0, "max_scale": 1.0, "step": 0.5 } }),
        )
        .unwrap();
        assert_eq!(merged.zoom.min_scale, 1.0);
        assert_eq!(merged.zoom.step, 0.5);
    }
}
