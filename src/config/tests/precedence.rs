//! Tests for configuration layer precedence.

use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::build_config_from_layers;
use crate::config::{
    DEFAULT_BIND_ADDRESS, DEFAULT_GITHUB_API_BASE, DEFAULT_GITHUB_OAUTH_BASE,
    DEFAULT_PUBLIC_ORIGIN,
};

#[rstest]
#[case::file_overrides_defaults(
    vec![("defaults", json!({"database_url": "default-db"})), ("file", json!({"database_url": "file-db"}))],
    "database_url",
    "file-db",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![("file", json!({"token_key": "file-key"})), ("environment", json!({"token_key": "env-key"}))],
    "token_key",
    "env-key",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![("environment", json!({"bind_address": "0.0.0.0:1"})), ("cli", json!({"bind_address": "0.0.0.0:2"}))],
    "bind_address",
    "0.0.0.0:2",
    "CLI should override environment"
)]
#[case::github_client_id_full_chain(
    vec![
        ("defaults", json!({"github_client_id": "default-id"})),
        ("file", json!({"github_client_id": "file-id"})),
        ("environment", json!({"github_client_id": "env-id"})),
        ("cli", json!({"github_client_id": "cli-id"}))
    ],
    "github_client_id",
    "cli-id",
    "CLI should win for github_client_id"
)]
fn test_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] field: &str,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let config = build_config_from_layers(&layers);

    let actual = match field {
        "database_url" => config.database_url.as_deref(),
        "token_key" => config.token_key.as_deref(),
        "bind_address" => Some(config.bind_address.as_str()),
        "github_client_id" => config.github_client_id.as_deref(),
        _ => panic!("unknown field: {field}"),
    };

    assert_eq!(actual, Some(expected), "{message}");
}

#[rstest]
fn defaults_apply_when_no_sources_provided() {
    let config = build_config_from_layers(&[("defaults", json!({"log_json": false}))]);

    assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    assert_eq!(config.public_origin, DEFAULT_PUBLIC_ORIGIN);
    assert_eq!(config.github_api_base, DEFAULT_GITHUB_API_BASE);
    assert_eq!(config.github_oauth_base, DEFAULT_GITHUB_OAUTH_BASE);
    assert!(config.database_url.is_none(), "database_url should be None");
    assert!(config.token_key.is_none(), "token_key should be None");
    assert!(!config.migrate_db, "migrate_db should default to false");
    assert!(!config.log_json, "log_json should default to false");
}

#[rstest]
fn partial_overrides_preserve_lower_values() {
    let config = build_config_from_layers(&[
        (
            "file",
            json!({"github_client_id": "file-id", "github_client_secret": "file-secret"}),
        ),
        ("cli", json!({"github_client_id": "cli-id"})),
    ]);

    assert_eq!(config.github_client_id.as_deref(), Some("cli-id"));
    assert_eq!(
        config.github_client_secret.as_deref(),
        Some("file-secret"),
        "file secret should be preserved"
    );
}

#[rstest]
fn migrate_db_layer_precedence_defaults_file_environment_cli() {
    let config = build_config_from_layers(&[
        ("defaults", json!({"migrate_db": false})),
        ("file", json!({"migrate_db": true})),
        ("environment", json!({"migrate_db": false})),
        ("cli", json!({"migrate_db": true})),
    ]);

    assert!(config.migrate_db, "CLI layer should win for migrate_db");
}
