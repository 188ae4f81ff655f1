//! Command-line interface for smartview
//!
//! - `smartview live`: camera loop with overlay and click-to-probe HSV values
//! - `smartview detect <image>`: one-shot detection on a still image
//! - `smartview config <path>`: write the default configuration as JSON
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` (or pass
//! `--verbose`) for per-band contour counts, `RUST_LOG=trace` for every
//! rejected contour.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use opencv::{core::Vector, highgui, imgcodecs, prelude::*};

use smartview::capture::{is_supported_image, CameraSource, FrameSource, StillImageSource};
use smartview::color::conversion::srgb_to_hex;
use smartview::{
    Detection, DetectorConfig, DetectorError, FrameDetectionPipeline, HsvFrameContext, InteractiveProbe,
    OverlayRenderer, Result,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SmartView: multi-color post-it detector",
    long_about = "Finds near-square GREEN, YELLOW and PINK post-its (or any configured HSV bands) in a camera stream or image."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (defaults to the built-in post-it bands)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging unless RUST_LOG is set
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the live camera detector
    Live {
        /// Camera index, overrides the configuration
        #[arg(long, value_name = "INDEX")]
        camera: Option<i32>,
    },
    /// Detect post-its in a still image and print them as JSON
    Detect {
        /// Input image
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Write the annotated image here
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Write the default configuration to a JSON file
    Config {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { path } => write_default_config(&path),
        Commands::Detect { image, output } => {
            let config = load_config(cli.config.as_deref())?;
            detect_image(&config, &image, output.as_deref())
        }
        Commands::Live { camera } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(index) = camera {
                config.capture.camera_index = index;
            }
            run_live(&config)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DetectorConfig> {
    match path {
        Some(path) => {
            let config = DetectorConfig::from_json_file(path)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(DetectorConfig::default_post_it()),
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DetectorError::output(format!("cannot create {}", parent.display()), e))?;
    }

    let config = DetectorConfig::default_post_it();
    config.to_json_file(path)?;

    info!("Configuration saved to {}", path.display());
    for band in &config.bands {
        info!(
            "  {:<8} H {:>3}-{:<3} S {:>3}-{:<3} V {:>3}-{:<3} draw {}",
            band.label,
            band.lower.h,
            band.upper.h,
            band.lower.s,
            band.upper.s,
            band.lower.v,
            band.upper.v,
            srgb_to_hex(band.display_color)
        );
    }
    info!(
        "  min area {:.0} px², approx {:.0}% of perimeter, kernel {}x{}, aspect {:.2}-{:.2}",
        config.processing.min_area,
        config.processing.approx_tolerance * 100.0,
        config.processing.morph_kernel_size,
        config.processing.morph_kernel_size,
        config.processing.aspect_ratio.min,
        config.processing.aspect_ratio.max
    );
    Ok(())
}

fn detect_image(config: &DetectorConfig, image: &Path, output: Option<&Path>) -> Result<()> {
    let registry = config.registry()?;
    let pipeline = FrameDetectionPipeline::new(&config.processing)?;

    if !is_supported_image(image) {
        warn!("{} has no known image extension, guessing the format from its content", image.display());
    }
    let mut source = StillImageSource::open(image)?;
    let Some(mut frame) = source.next_frame()? else {
        return Ok(());
    };

    let detections = pipeline.process(&frame, registry.bands())?;
    info!("{}: {} post-it(s) found", image.display(), detections.len());

    println!("{}", detections_json(&detections)?);

    if let Some(output) = output {
        OverlayRenderer::new(config.overlay.clone()).draw(&mut frame, &detections, &registry)?;
        let written = imgcodecs::imwrite(&output.to_string_lossy(), &frame, &Vector::<i32>::new())
            .map_err(|e| DetectorError::opencv("write annotated image", e))?;
        if written {
            info!("Annotated image saved to {}", output.display());
        } else {
            warn!("OpenCV could not encode {}", output.display());
        }
    }
    Ok(())
}

fn detections_json(detections: &[Detection]) -> Result<String> {
    serde_json::to_string_pretty(detections)
        .map_err(|e| DetectorError::output("cannot serialize detections", e))
}

fn run_live(config: &DetectorConfig) -> Result<()> {
    let registry = config.registry()?;
    let pipeline = FrameDetectionPipeline::new(&config.processing)?;
    let renderer = OverlayRenderer::new(config.overlay.clone());
    let capture = &config.capture;

    let context = Arc::new(HsvFrameContext::new());
    let probe = InteractiveProbe::new(Arc::clone(&context));

    let mut camera = CameraSource::open(capture.camera_index)?;

    let title = capture.window_title.as_str();
    highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
        .map_err(|e| DetectorError::opencv("create window", e))?;
    highgui::set_mouse_callback(
        title,
        Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
            probe.handle_mouse_event(event, x, y);
        })),
    )
    .map_err(|e| DetectorError::opencv("install mouse callback", e))?;

    let labels: Vec<&str> = registry.labels().collect();
    info!("Post-it detector started. Searching for {} squares.", labels.join(", "));
    info!("TIP: Click on any point in the image to see its HSV values in the terminal.");
    info!("Press '{}' to quit.", capture.quit_key);

    let mut empty_streak = 0u32;
    loop {
        let Some(mut frame) = camera.next_frame()? else {
            error!("Could not read frame.");
            break;
        };

        if frame.empty() {
            empty_streak += 1;
            if empty_streak >= capture.max_consecutive_empty_frames {
                error!(
                    "Camera {} delivered {} empty frames in a row, stopping",
                    camera.index(),
                    empty_streak
                );
                break;
            }
            if poll_quit(capture.frame_wait_ms, capture.quit_key)? {
                break;
            }
            continue;
        }
        empty_streak = 0;

        match pipeline.process_and_publish(&frame, registry.bands(), &context) {
            Ok(detections) => renderer.draw(&mut frame, &detections, &registry)?,
            Err(e) if e.is_recoverable() => warn!("Frame skipped: {}", e),
            Err(e) => return Err(e),
        }

        highgui::imshow(title, &frame).map_err(|e| DetectorError::opencv("show frame", e))?;

        if poll_quit(capture.frame_wait_ms, capture.quit_key)? {
            break;
        }
    }

    drop(camera);
    highgui::destroy_all_windows().map_err(|e| DetectorError::opencv("close windows", e))?;
    info!("Program finished.");
    Ok(())
}

/// Service window events for `wait_ms` and report whether the quit key was pressed
fn poll_quit(wait_ms: i32, quit_key: char) -> Result<bool> {
    let key = highgui::wait_key(wait_ms).map_err(|e| DetectorError::opencv("poll key", e))?;
    Ok(is_quit_key(key, quit_key))
}

/// `wait_key` returns -1 when no key was pressed; only the low byte names the key
fn is_quit_key(key: i32, quit_key: char) -> bool {
    key >= 0 && (key & 0xFF) as u8 == quit_key as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartview::BoundingBox;

    #[test]
    fn test_quit_key_matches_low_byte() {
        assert!(is_quit_key('q' as i32, 'q'));
        assert!(is_quit_key(0x10_0000 | 'q' as i32, 'q'));
        assert!(!is_quit_key(-1, 'q'));
        assert!(!is_quit_key('x' as i32, 'q'));
    }

    #[test]
    fn test_detections_json_lists_boxes() {
        let detections = vec![Detection {
            label: "GREEN".into(),
            bounding_box: BoundingBox::new(50, 50, 100, 100),
        }];
        let json = detections_json(&detections).unwrap();
        let parsed: Vec<Detection> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, detections);
        assert_eq!(detections_json(&[]).unwrap(), "[]");
    }
}
