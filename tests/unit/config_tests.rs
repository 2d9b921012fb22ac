// Configuration module unit tests

use std::path::PathBuf;
use watermarker::config::*;
use watermarker::constants::*;

#[test]
fn test_can_create_config_struct() {
    let _config = Config {
        server: ServerConfig {
            address: String::from("127.0.0.1"),
            port: 8080,
            max_body_size: 1024,
        },
        output: OutputConfig {
            folder: PathBuf::from("out"),
        },
        fonts: FontConfig { dir: None },
        logging: LoggingConfig {
            format: LogFormat::Pretty,
        },
    };
}

#[test]
fn test_can_deserialize_minimal_valid_yaml_config() {
    let yaml = r#"
server:
  address: "127.0.0.1"
  port: 8080
"#;
    let config: Config = serde_yaml::from_str(yaml).expect("Failed to deserialize YAML");
    assert_eq!(config.server.address, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.max_body_size, DEFAULT_MAX_BODY_SIZE);
    assert_eq!(config.output.folder, PathBuf::from(DEFAULT_OUTPUT_FOLDER));
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.server.listen_address(), "0.0.0.0:8000");
}

#[test]
fn test_output_folder_from_env() {
    std::env::set_var("WATERMARKER_UNIT_OUTPUT", "/var/lib/watermarks");
    let yaml = r#"
output:
  folder: "${WATERMARKER_UNIT_OUTPUT}"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.output.folder, PathBuf::from("/var/lib/watermarks"));
}

#[test]
fn test_rejects_port_zero() {
    let yaml = r#"
server:
  port: 0
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.contains("port"));
}

#[test]
fn test_rejects_empty_output_folder() {
    let yaml = r#"
output:
  folder: ""
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_log_format_fails_to_parse() {
    let yaml = r#"
logging:
  format: xml
"#;
    assert!(Config::from_yaml_with_env(yaml).is_err());
}

#[test]
fn test_engine_config_carries_folders() {
    let yaml = r#"
output:
  folder: "results"
fonts:
  dir: "fonts"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    let engine = config.engine_config();

    assert_eq!(engine.output_folder, PathBuf::from("results"));
    assert_eq!(engine.font_dir, Some(PathBuf::from("fonts")));
}
