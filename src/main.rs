mod codec;
mod config;
mod core;
mod rendering;
mod storage;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::viewer::{load_viewer_config, ViewerConfig};
use crate::core::image::DecodedImage;
use crate::core::ViewerError;
use crate::ui::app::{FailureSlot, ViewerApp};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(error) = run() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}

/// 唯一的位置参数：输入文件路径。多余参数忽略。
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<PathBuf, ViewerError> {
    let program = args.next().unwrap_or_else(|| "qoi-viewer".to_string());
    args.next()
        .map(PathBuf::from)
        .ok_or(ViewerError::Usage { program })
}

fn load_image(path: &Path) -> Result<DecodedImage, ViewerError> {
    let bytes = std::fs::read(path).map_err(|source| ViewerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = crate::codec::decode(&bytes)?;
    log::info!(
        "decoded {}: {}x{}",
        path.display(),
        image.width,
        image.height
    );
    Ok(image)
}

fn run() -> Result<(), ViewerError> {
    let path = parse_args(std::env::args())?;
    let image = load_image(&path)?;

    let config = load_viewer_config().unwrap_or_else(|error| {
        log::warn!("falling back to default config: {error}");
        ViewerConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width, config.window.height])
            .with_app_id("qoi-viewer"),
        ..Default::default()
    };

    let failure = FailureSlot::default();
    let slot = Arc::clone(&failure);
    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(ViewerApp::new(cc, image, &config, slot))),
    )?;

    let failed = failure.lock().ok().and_then(|mut slot| slot.take());
    match failed {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn missing_path_is_usage_error() {
        let err = parse_args(args(&["qoi-viewer"])).unwrap_err();
        assert!(matches!(err, ViewerError::Usage { ref program } if program == "qoi-viewer"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn first_positional_is_the_path() {
        let path = parse_args(args(&["qoi-viewer", "img.qoi", "extra"])).unwrap();
        assert_eq!(path, PathBuf::from("img.qoi"));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = load_image(Path::new("/definitely/not/here.qoi")).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn undecodable_file_is_decode_error() {
        let path = std::env::temp_dir().join(format!("qoi-viewer-bad-{}.qoi", std::process::id()));
        std::fs::write(&path, b"qoif-but-not-really").unwrap();

        let err = load_image(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ViewerError::Decode(_)));
        assert_eq!(err.exit_code(), -1);
    }
}
