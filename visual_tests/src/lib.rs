mod capture;
mod compare;

pub use capture::{capture_scene, find_scene, Scene, SCENES};
pub use compare::{compare_images, generate_diff_image, CompareResult};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualTestError {
    #[error("Failed to capture frame: {0}")]
    Capture(String),
    #[error("Failed to compare images: {0}")]
    Compare(String),
    #[error("Engine error: {0}")]
    Engine(#[from] vellum::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, VisualTestError>;

/// Configuration for a visual test
#[derive(Clone)]
pub struct VisualTestConfig {
    /// Name of the scene to render
    pub scene_name: String,
    /// Similarity threshold (0.0 to 1.0, default 0.95)
    pub similarity_threshold: f64,
}

impl Default for VisualTestConfig {
    fn default() -> Self {
        Self {
            scene_name: String::new(),
            similarity_threshold: 0.95,
        }
    }
}

/// Result of a visual test
pub struct VisualTestResult {
    /// Whether the test passed (similarity >= threshold)
    pub passed: bool,
    /// Similarity and per-channel difference against the reference
    pub comparison: CompareResult,
    /// Path to the captured frame
    pub captured_path: PathBuf,
    /// Path to the reference image
    pub reference_path: PathBuf,
    /// Path to diff image (if generated on failure)
    pub diff_path: Option<PathBuf>,
}

/// Get the path to the output directory for test artifacts
pub fn output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("output")
}

/// Get the path to a captured frame
pub fn captured_path(scene_name: &str) -> PathBuf {
    output_dir().join(format!("{}_captured.png", scene_name))
}

/// Get the path to the reference rendering of a scene
pub fn reference_path(scene_name: &str) -> PathBuf {
    output_dir().join(format!("{}_reference.png", scene_name))
}

/// Get the path to a diff image
pub fn diff_path(scene_name: &str) -> PathBuf {
    output_dir().join(format!("{}_diff.png", scene_name))
}

/// Render a scene and its reference, compare them and keep the frames
/// under [`output_dir`] for inspection.
pub fn run_visual_test(config: &VisualTestConfig) -> Result<VisualTestResult> {
    std::fs::create_dir_all(output_dir())?;

    let scene = find_scene(&config.scene_name)?;
    let reference = scene.reference()?;
    let ref_path = reference_path(scene.name);
    reference.save(&ref_path)?;
    let cap_path = captured_path(scene.name);
    let rendered = capture_scene(scene, &cap_path)?;

    let comparison = compare_images(&reference, &rendered)?;
    let passed = comparison.similarity >= config.similarity_threshold;

    let diff = if !passed {
        let diff_file = diff_path(scene.name);
        generate_diff_image(&reference, &rendered).save(&diff_file)?;
        Some(diff_file)
    } else {
        None
    };

    Ok(VisualTestResult {
        passed,
        comparison,
        captured_path: cap_path,
        reference_path: ref_path,
        diff_path: diff,
    })
}
