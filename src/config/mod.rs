pub mod viewer;

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    /// 数值超出可用范围，附带出错字段说明
    InvalidZoom(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(error) => write!(f, "viewer config parse failed: {error}"),
            Self::InvalidZoom(reason) => write!(f, "viewer zoom settings rejected: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(error) => Some(error),
            Self::InvalidZoom(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_viewer_config() {
        let parse = serde_json::from_str::<u8>("x").unwrap_err();
        let error = ConfigError::from(parse);
        assert!(error.to_string().starts_with("viewer config parse failed"));
        assert!(error.source().is_some());

        let zoom = ConfigError::InvalidZoom("step = 0".to_string());
        assert_eq!(zoom.to_string(), "viewer zoom settings rejected: step = 0");
        assert!(zoom.source().is_none());
    }
}
