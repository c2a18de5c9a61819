//! Checks that the compose files hand both services one shared environment.

use std::path::PathBuf;

use procmine::testkit::config;

fn deploy_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("deploy").join(name)
}

fn env_example() -> Vec<(String, String)> {
    dotenvy::from_path_iter(deploy_file(".env.example"))
        .expect("read .env.example")
        .collect::<Result<_, _>>()
        .expect("parse .env.example")
}

#[test]
fn dashboard_reads_api_url_from_the_shared_env_file() {
    let vars = env_example();
    let pairs: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let settings = config::settings(&pairs);
    assert_eq!(settings.api_url, "http://api:8000");
}

#[test]
fn compose_does_not_override_shared_variables() {
    let compose = std::fs::read_to_string(deploy_file("docker-compose.yml")).unwrap();
    for key in ["API_URL", "DATABASE_URL", "SECRET_KEY"] {
        assert!(
            !compose.contains(key),
            "{key} must come from the shared env file only"
        );
    }
    assert_eq!(compose.matches("env_file: ../.env").count(), 2);
}

#[test]
fn shared_env_file_leaves_listen_addresses_to_each_service() {
    let vars = env_example();
    assert!(vars.iter().all(|(k, _)| k != "BIND_ADDR"));

    let pairs: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let settings = config::settings(&pairs);
    assert_ne!(
        settings.api_bind().unwrap(),
        settings.dashboard_bind().unwrap()
    );
}
