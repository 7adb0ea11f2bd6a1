use sketchboard::common::CommonParams;
use sketchboard::config::{API_KEY_ENV, CanvasConfig, Config};
use std::path::PathBuf;

#[test]
fn test_config_round_trip() {
    let mut config = Config {
        api_key: "sk-saved".to_string(),
        scratch_dir: Some(PathBuf::from("/tmp/sketch-scratch")),
        ..Config::default()
    };
    config.canvas.stroke_width = 12;
    config.canvas.background = "#FAFAFA".to_string();

    let serialized = config.to_toml().expect("config should serialize");
    let restored = Config::from_toml(&serialized).expect("config should parse");

    assert_eq!(restored.api_key, "sk-saved");
    assert_eq!(restored.model, config.model);
    assert_eq!(restored.scratch_dir, config.scratch_dir);
    assert_eq!(restored.canvas, config.canvas);
}

#[test]
fn test_empty_key_is_not_written() {
    let serialized = Config::default().to_toml().expect("config should serialize");
    assert!(!serialized.contains("api_key"));
}

#[test]
fn test_partial_canvas_table() {
    let config = Config::from_toml(
        r##"
language = "English"

[canvas]
stroke_color = "#0000FF"
"##,
    )
    .expect("config should parse");

    assert_eq!(config.language, "English");
    assert_eq!(config.canvas.stroke_color, "#0000FF");
    assert_eq!(config.canvas.width, CanvasConfig::default().width);
}

#[test]
fn test_invalid_toml_is_reported() {
    let err = Config::from_toml("model = ").expect_err("should not parse");
    assert!(err.to_string().contains("Invalid configuration file format"));
}

#[test]
fn test_credential_resolution() {
    let config = Config {
        api_key: "sk-file".to_string(),
        ..Config::default()
    };
    assert_eq!(config.credential(Some("sk-flag")).expose(), "sk-flag");

    // Only deterministic when the variable is absent from the test environment
    if std::env::var(API_KEY_ENV).is_err() {
        assert_eq!(config.credential(None).expose(), "sk-file");
        assert_eq!(config.credential(Some("  ")).expose(), "sk-file");
        assert!(!Config::default().credential(None).is_present());
    }
}

#[test]
fn test_settings_follow_config() {
    let config = Config {
        model: "gpt-4o".to_string(),
        image_size: "512x512".to_string(),
        language: "Català".to_string(),
        scratch_dir: Some(PathBuf::from("/tmp/sb")),
        ..Config::default()
    };
    let settings = config.settings();
    assert_eq!(settings.chat_model, "gpt-4o");
    assert_eq!(settings.image_size, "512x512");
    assert_eq!(settings.language, "Català");
    assert_eq!(settings.scratch_dir, PathBuf::from("/tmp/sb"));
}

#[test]
fn test_common_params_override() {
    let mut config = Config::default();
    let params = CommonParams {
        model: None,
        language: Some("English".to_string()),
    };
    assert!(params.apply_to_config(&mut config));
    assert_eq!(config.language, "English");
}
