use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use docknet_core::{
    DocknetManager, DocknetOperState, DriverNames, MemoryStateDriver, NetworkCreateRequest,
    NetworkHandle, NetworkRuntime, WatchEvent,
};

use crate::commands::binding::render_bindings;
use crate::commands::watch::describe_event;
use crate::commands::{BindingCommand, NameCommand, OutputFormat};
use crate::context::AppContext;
use crate::settings::{Settings, SettingsError};

/// Runtime that hands out sequential network ids
#[derive(Default)]
struct StubRuntime {
    created: Mutex<Vec<NetworkCreateRequest>>,
}

#[async_trait]
impl NetworkRuntime for StubRuntime {
    async fn inspect_network(&self, _name: &str) -> Result<Option<NetworkHandle>> {
        Ok(None)
    }

    async fn create_network(&self, request: &NetworkCreateRequest) -> Result<NetworkHandle> {
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok(NetworkHandle {
            id: format!("net-{}", created.len()),
            driver: request.driver.clone(),
        })
    }

    async fn remove_network(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}

fn manager() -> (Arc<StubRuntime>, Arc<DocknetManager>) {
    let runtime = Arc::new(StubRuntime::default());
    let manager = DocknetManager::new(
        runtime.clone(),
        Arc::new(MemoryStateDriver::new()),
        DriverNames::default(),
    );
    (runtime, Arc::new(manager))
}

fn settings_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_render_decoded_text() {
    let out = NameCommand::new()
        .render_decoded("web__db.acme", OutputFormat::Text)
        .unwrap();

    assert!(out.contains("Tenant:    acme"));
    assert!(out.contains("Network:   db"));
    assert!(out.contains("Service:   web"));

    let out = NameCommand::new()
        .render_decoded("db", OutputFormat::Text)
        .unwrap();
    assert!(out.contains("Tenant:    default"));
    assert!(out.contains("Service:   -"));
}

#[test]
fn test_render_decoded_json() {
    let out = NameCommand::new()
        .render_decoded("web/db", OutputFormat::Json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["tenant"], "default");
    assert_eq!(value["network"], "db");
    assert_eq!(value["service"], "web");
}

#[test]
fn test_render_decoded_rejects_invalid_name() {
    let err = NameCommand::new()
        .render_decoded("a/b/c", OutputFormat::Text)
        .unwrap_err();
    assert!(err.to_string().contains("a/b/c"));
}

#[test]
fn test_render_bindings() {
    let bindings = vec![
        DocknetOperState::new("acme", "db", "", "net-1"),
        DocknetOperState::new("acme", "web", "api", "net-2"),
    ];

    let text = render_bindings(&bindings, OutputFormat::Text).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Tenant"));
    assert!(lines[2].contains("net-1"));
    assert!(lines[2].contains(" - "));
    assert!(lines[3].contains("api"));

    let json = render_bindings(&bindings, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[1]["docknetUUID"], "net-2");
    assert_eq!(value[1]["serviceName"], "api");
}

#[test]
fn test_describe_event() {
    let oper = DocknetOperState::new("acme", "db", "", "net-1");

    let created = WatchEvent {
        key: oper.id.clone(),
        prev: None,
        current: Some(oper.clone()),
    };
    assert_eq!(describe_event(&created), "created  acme.db. -> net-1");

    let deleted = WatchEvent {
        key: oper.id.clone(),
        prev: Some(oper),
        current: None,
    };
    assert_eq!(describe_event(&deleted), "deleted  acme.db. -> net-1");
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.drivers(), DriverNames::default());
}

#[test]
fn test_settings_load_from_file() {
    let file = settings_file(
        r#"
docker_url = "tcp://10.0.0.5:2375"
state_dir = ""
network_driver = "contiv"
watch_interval_ms = 100
"#,
    );

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.docker_url, "tcp://10.0.0.5:2375");
    assert!(settings.state_dir.is_empty());
    assert_eq!(settings.network_driver, "contiv");
    assert_eq!(settings.ipam_driver, Settings::default().ipam_driver);
    assert_eq!(settings.watch_interval().as_millis(), 100);
}

#[test]
fn test_settings_load_errors() {
    let missing = std::path::Path::new("/nonexistent/docknet.toml");
    assert!(matches!(
        Settings::load(Some(missing)),
        Err(SettingsError::MissingFile(_))
    ));

    let file = settings_file("request_timeout_secs = 0\n");
    assert!(matches!(
        Settings::load(Some(file.path())),
        Err(SettingsError::Invalid { .. })
    ));
}

#[tokio::test]
async fn test_binding_command_create_and_list() {
    let (runtime, manager) = manager();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config
        .write_all(
            br#"{
                "tenant": "acme",
                "networkName": "db",
                "pktTagType": "vlan",
                "pktTag": 100,
                "subnet": "10.1.1.0/24"
            }"#,
        )
        .unwrap();

    let command = BindingCommand::new(manager.clone());
    command
        .create("acme", "db", "", config.path())
        .await
        .unwrap();
    command.list(OutputFormat::Text).await.unwrap();

    assert_eq!(runtime.created.lock().unwrap()[0].name, "db.acme");
    let bindings = manager.list_bindings().await.unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].docknet_uuid, "net-1");

    command.find("net-1", OutputFormat::Json).await.unwrap();
    assert!(command.find("net-9", OutputFormat::Json).await.is_err());
}

#[tokio::test]
async fn test_binding_command_rejects_bad_config() {
    let (runtime, manager) = manager();
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config.write_all(b"{ not json").unwrap();

    let command = BindingCommand::new(manager);
    assert!(command
        .create("acme", "db", "", config.path())
        .await
        .is_err());
    assert!(command
        .create("acme", "db", "", std::path::Path::new("/nonexistent.json"))
        .await
        .is_err());
    assert!(runtime.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_with_memory_state() {
    let settings = Settings {
        state_dir: String::new(),
        network_driver: "contiv".to_string(),
        ..Settings::default()
    };

    let context = AppContext::bootstrap(settings).unwrap();
    assert_eq!(context.manager.drivers().network, "contiv");
    assert!(context.manager.list_bindings().await.unwrap().is_empty());
}

#[test]
fn test_bootstrap_rejects_unix_socket() {
    let settings = Settings {
        docker_url: "unix:///var/run/docker.sock".to_string(),
        ..Settings::default()
    };

    let err = AppContext::bootstrap(settings).err().unwrap();
    let chain = format!("{:#}", err);
    assert!(chain.contains("expose the daemon on TCP"), "{}", chain);
}
