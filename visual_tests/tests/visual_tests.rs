use visual_tests::{run_visual_test, VisualTestConfig, SCENES};

/// Helper macro to generate visual test functions
macro_rules! visual_test {
    ($name:ident, $scene:literal, $threshold:expr) => {
        #[test]
        fn $name() {
            let result = run_visual_test(&VisualTestConfig {
                scene_name: $scene.to_string(),
                similarity_threshold: $threshold,
            })
            .expect("Visual test failed to run");

            assert!(
                result.passed,
                "Visual regression detected for '{}': similarity {:.4}% (threshold: {:.1}%), \
                 max channel difference {}, {} differing pixels\n\
                 Reference: {}\n\
                 Captured:  {}\n\
                 Diff:      {}",
                $scene,
                result.comparison.similarity * 100.0,
                $threshold * 100.0,
                result.comparison.max_channel_difference,
                result.comparison.differing_pixels,
                result.reference_path.display(),
                result.captured_path.display(),
                result
                    .diff_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "N/A".to_string())
            );
        }
    };
}

// Resampling against the image crate's filters
visual_test!(test_lanczos_horizontal, "lanczos_horizontal", 0.9);
visual_test!(test_lanczos_vertical, "lanczos_vertical", 0.9);
visual_test!(test_nearest_scaled, "nearest_scaled", 0.9);

// Document rendering against resvg
visual_test!(test_document_shapes, "document_shapes", 0.9);

#[test]
fn scene_names_are_unique() {
    let mut names: Vec<_> = SCENES.iter().map(|s| s.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), SCENES.len());
}
