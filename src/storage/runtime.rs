//! # runtime.json 读取
//!
//! 用户覆盖配置存放在数据目录的 `runtime.json` 中，按顶层 key 分区。
//! 文件不存在或解析失败一律视为空对象。

use std::path::Path;

use serde_json::Value;

use super::paths;

/// 读取 runtime.json 中指定 key 的值，不存在返回 None。
pub fn load_field(key: &str) -> Option<Value> {
    load_field_from(&paths::runtime_json_path(), key)
}

fn load_field_from(path: &Path, key: &str) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Value>(&content) {
        Ok(mut root) => root.get_mut(key).map(Value::take),
        Err(error) => {
            log::warn!("{} is not valid JSON: {error}", path.display());
            None
        }
    }
}
