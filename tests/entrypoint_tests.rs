//! Entrypoint procedure over real adapters: TCP probe, migrators and a
//! recording launcher.

mod harness;

use tokio::net::TcpListener;

use harness::temp_db::TempDb;
use procmine::adapter::outbound::tcp::TcpProbe;
use procmine::domain::Endpoint;
use procmine::error::Error;
use procmine::infrastructure::entrypoint::Entrypoint;
use procmine::infrastructure::factory::migrator_for;
use procmine::port::{EventStore, StartupCommand};
use procmine::testkit::config;
use procmine::testkit::doubles::RecordingLauncher;

fn serve_command() -> StartupCommand {
    StartupCommand::from_argv(vec!["procmine".into(), "serve".into()]).unwrap()
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn embedded_database_is_migrated_before_launch() {
    let db = TempDb::create("entry-embedded");
    let settings = config::settings(&[("DATABASE_URL", &db.url())]);
    let target = settings.database_target().unwrap();
    let migrator = migrator_for(&settings, &target, None).unwrap();
    let launcher = RecordingLauncher::new();

    let report = Entrypoint::new(&settings, &TcpProbe, migrator, &launcher)
        .run(&target, serve_command())
        .await
        .unwrap();

    assert!(report.readiness.is_none());
    assert_eq!(report.applied_migrations.len(), 1);
    assert_eq!(launcher.launched(), vec![serve_command()]);
    db.store().ping().await.unwrap();
}

#[tokio::test]
async fn second_run_applies_nothing() {
    let db = TempDb::create("entry-idempotent");
    let settings = config::settings(&[("DATABASE_URL", &db.url())]);
    let target = settings.database_target().unwrap();
    let launcher = RecordingLauncher::new();

    for expected in [1, 0] {
        let migrator = migrator_for(&settings, &target, None).unwrap();
        let report = Entrypoint::new(&settings, &TcpProbe, migrator, &launcher)
            .setup(&target)
            .await
            .unwrap();
        assert_eq!(report.applied_migrations.len(), expected);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn networked_database_waits_then_runs_the_migrate_command() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let marker = tempfile::tempdir().unwrap();
    let marker_path = marker.path().join("migrated");
    let migrate = format!("echo \"$DB_HOST:$DB_PORT\" > {}", marker_path.display());

    let settings = config::settings(&[
        ("DATABASE_URL", "postgres://app:secret@db/app"),
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", &port),
        ("MIGRATE_COMMAND", &migrate),
    ]);
    let target = settings.database_target().unwrap();
    let migrator = migrator_for(&settings, &target, None).unwrap();
    let launcher = RecordingLauncher::new();

    let report = Entrypoint::new(&settings, &TcpProbe, migrator, &launcher)
        .run(&target, serve_command())
        .await
        .unwrap();

    let ready = report.readiness.unwrap();
    assert_eq!(ready.endpoint, Endpoint::new("127.0.0.1", port.parse().unwrap()));
    assert!(!ready.via_fallback);
    let written = std::fs::read_to_string(&marker_path).unwrap();
    assert_eq!(written.trim(), format!("127.0.0.1:{port}"));
    assert_eq!(launcher.launched().len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn rejected_migration_is_not_a_readiness_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let settings = config::settings(&[
        ("DATABASE_URL", "postgres://db/app"),
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", &port),
    ]);
    let target = settings.database_target().unwrap();
    let migrator = migrator_for(&settings, &target, Some("exit 7")).unwrap();
    let launcher = RecordingLauncher::new();

    let err = Entrypoint::new(&settings, &TcpProbe, migrator, &launcher)
        .run(&target, serve_command())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Migration(_)));
    assert_eq!(err.exit_code(), 4);
    assert!(launcher.launched().is_empty());
}

#[tokio::test]
async fn closed_ports_exhaust_the_poll() {
    let port = closed_port().to_string();
    let settings = config::settings(&[
        ("DATABASE_URL", "postgres://db/app"),
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", &port),
        ("DB_FALLBACK_HOST", "127.0.0.1"),
        ("MIGRATE_COMMAND", "true"),
    ]);
    let target = settings.database_target().unwrap();
    let migrator = migrator_for(&settings, &target, None).unwrap();
    let launcher = RecordingLauncher::new();

    let err = Entrypoint::new(&settings, &TcpProbe, migrator, &launcher)
        .run(&target, serve_command())
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains(&format!("127.0.0.1:{port}")));
    assert!(launcher.launched().is_empty());
}

#[test]
fn networked_database_without_migrate_command_is_a_config_error() {
    let settings = config::settings(&[("DATABASE_URL", "mysql://db/app")]);
    let target = settings.database_target().unwrap();
    let err = migrator_for(&settings, &target, None).err().unwrap();
    assert_eq!(Error::from(err).exit_code(), 2);
}
