use hello_camera::config::validate_config;
use hello_camera::heatmap::normalize_min_max;
use hello_camera::{CameraError, ComponentConfig, HeatmapCameraConfig};
use image::GrayImage;
use proptest::prelude::*;
use serde_json::{json, Value};

fn non_string_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        any::<f32>().prop_filter("finite", |f| f.is_finite()).prop_map(|f| json!(f)),
        prop::collection::vec(".*", 0..3).prop_map(|v| json!(v)),
    ]
}

proptest! {
    #[test]
    fn test_normalize_spans_full_range(
        (w, h, data) in (1u32..16, 1u32..16).prop_flat_map(|(w, h)| {
            (Just(w), Just(h), prop::collection::vec(any::<u8>(), (w * h) as usize))
        })
    ) {
        let gray = GrayImage::from_raw(w, h, data.clone()).unwrap();
        let out = normalize_min_max(&gray);
        prop_assert_eq!(out.dimensions(), (w, h));

        let min = *data.iter().min().unwrap();
        let max = *data.iter().max().unwrap();
        let lo = out.pixels().map(|p| p[0]).min().unwrap();
        let hi = out.pixels().map(|p| p[0]).max().unwrap();
        if min == max {
            prop_assert_eq!(hi, 0);
        } else {
            prop_assert_eq!(lo, 0);
            prop_assert_eq!(hi, 255);
        }
    }

    #[test]
    fn test_normalize_preserves_order(a in any::<u8>(), b in any::<u8>(), c in any::<u8>()) {
        let gray = GrayImage::from_raw(3, 1, vec![a, b, c]).unwrap();
        let out = normalize_min_max(&gray);
        let raw = out.as_raw();
        for (i, j) in [(0, 1), (1, 2), (0, 2)] {
            let (x, y) = (gray.as_raw()[i], gray.as_raw()[j]);
            if x <= y {
                prop_assert!(raw[i] <= raw[j]);
            } else {
                prop_assert!(raw[i] >= raw[j]);
            }
        }
    }

    #[test]
    fn test_missing_image_path_always_rejected(key in "[a-z_]{1,12}".prop_filter("not image_path", |k| k != "image_path")) {
        let config = ComponentConfig::new("cam", "rohit:hello-quest1:hello-camera")
            .with_attribute(key, "/tmp/x.png");
        prop_assert!(matches!(validate_config(&config), Err(CameraError::Config(_))));
    }

    #[test]
    fn test_non_string_image_path_always_rejected(value in non_string_value()) {
        let config = ComponentConfig::new("cam", "rohit:hello-quest1:hello-camera")
            .with_attribute("image_path", value);
        prop_assert!(matches!(validate_config(&config), Err(CameraError::Config(_))));
    }

    #[test]
    fn test_valid_path_binds_exactly(path in "[^\\s][^\\x00]{0,40}") {
        let config = ComponentConfig::new("cam", "rohit:hello-quest1:hello-camera")
            .with_attribute("image_path", path.clone());
        let parsed = HeatmapCameraConfig::from_attributes(&config.attributes).unwrap();
        prop_assert_eq!(parsed.image_path, path);
    }
}
