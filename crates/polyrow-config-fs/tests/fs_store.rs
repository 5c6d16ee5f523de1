// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `FsConfigStore` against a scratch directory.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use polyrow_config_fs::FsConfigStore;
use polyrow_core::{CodecConfig, ConfigError, ConfigService, ConfigStore, UnknownFields};

#[test]
fn missing_file_yields_default_codec_config() {
    let dir = tempfile::tempdir().unwrap();
    let service = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
    assert_eq!(service.codec_config().unwrap(), CodecConfig::default());
}

#[test]
fn saved_config_is_read_back_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = CodecConfig {
        unknown_fields: UnknownFields::Reject,
        require_all_variants: true,
    };
    ConfigService::new(FsConfigStore::at(dir.path()).unwrap())
        .save(CodecConfig::KEY, &config)
        .unwrap();

    let text = std::fs::read_to_string(dir.path().join("codec.json")).unwrap();
    assert!(text.contains("\"unknown_fields\": \"reject\""));

    let reopened = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
    assert_eq!(reopened.codec_config().unwrap(), config);
}

#[test]
fn hand_written_json_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("codec.json"),
        br#"{ "require_all_variants": true }"#,
    )
    .unwrap();
    let config = ConfigService::new(FsConfigStore::at(dir.path()).unwrap())
        .codec_config()
        .unwrap();
    assert!(config.require_all_variants);
    assert_eq!(config.unknown_fields, UnknownFields::Ignore);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("codec.json"), b"{ unknown_fields: reject").unwrap();
    let err = ConfigService::new(FsConfigStore::at(dir.path()).unwrap())
        .codec_config()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn keys_cannot_escape_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::at(dir.path().join("nested")).unwrap();
    assert!(store.base().is_dir());
    assert!(matches!(
        store.save_raw("../codec", b"{}"),
        Err(ConfigError::Other(_))
    ));
    assert!(matches!(store.load_raw("codec"), Err(ConfigError::NotFound)));
}
