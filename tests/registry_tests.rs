//! End-to-end tests for the connection registry: file resolution,
//! interactive fill, and both cache layers, with a mock driver and
//! scripted prompt input.

use dbconns::config::{ConnectParams, ConnectionConfig};
use dbconns::driver::{Driver, Globals, Handle};
use dbconns::error::Error;
use dbconns::prompt::ScriptedIo;
use dbconns::registry::ConnectionRegistry;
use dbconns::resolver::{CONFIG_FILE, CONFIG_FILE_HIDDEN, ConfigResolver};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct MockGlobals;

impl Globals for MockGlobals {
    fn get(&self, _key: &str, _subscripts: &[&str]) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }

    fn set(&self, _value: &Value, _key: &str, _subscripts: &[&str]) -> anyhow::Result<()> {
        Ok(())
    }

    fn kill(&self, _key: &str, _subscripts: &[&str]) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct MockDriver {
    connects: AtomicUsize,
    last_params: Mutex<Option<ConnectParams>>,
}

impl MockDriver {
    fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn last_params(&self) -> ConnectParams {
        self.last_params
            .lock()
            .unwrap()
            .clone()
            .expect("no connection was made")
    }
}

impl Driver for MockDriver {
    fn connect(&self, params: &ConnectParams) -> anyhow::Result<Handle> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        Ok(Arc::new(MockGlobals))
    }
}

struct FailingDriver;

impl Driver for FailingDriver {
    fn connect(&self, _params: &ConnectParams) -> anyhow::Result<Handle> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

struct Fixture {
    driver: Arc<MockDriver>,
    io: Arc<Mutex<ScriptedIo>>,
    registry: ConnectionRegistry,
    _temp: TempDir,
}

/// Registry rooted in a temp dir containing one config file, with the
/// given scripted responses queued.
fn fixture(config_file: &str, responses: &[&str]) -> Fixture {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE), config_file).unwrap();

    let driver = Arc::new(MockDriver::default());
    let io = Arc::new(Mutex::new(ScriptedIo::with_responses(
        responses.iter().copied(),
    )));

    let registry = ConnectionRegistry::new(driver.clone())
        .unwrap()
        .with_resolver(ConfigResolver::with_roots(temp.path(), None))
        .with_io(io.clone())
        .with_default_name("default");

    Fixture {
        driver,
        io,
        registry,
        _temp: temp,
    }
}

const DEV_SECTION: &str = "\
[dev]
hostname = db.example.com
port = 2001
namespace = APP
username = alice
confirm = no
";

#[test]
fn test_get_named_resolves_and_prompts_for_missing_fields() {
    let fx = fixture(DEV_SECTION, &["s3cret"]);

    fx.registry.get_named(Some("dev")).unwrap();

    assert_eq!(fx.driver.connect_count(), 1);
    let params = fx.driver.last_params();
    assert_eq!(params.host, "db.example.com");
    assert_eq!(params.port, 2001);
    assert_eq!(params.namespace, "APP");
    assert_eq!(params.user, "alice");
    assert_eq!(params.password.expose(), "s3cret");
}

#[test]
fn test_second_get_named_returns_identical_handle_without_prompting() {
    let fx = fixture(DEV_SECTION, &["s3cret"]);

    let first = fx.registry.get_named(Some("dev")).unwrap();
    let printed = fx.io.lock().unwrap().transcript().len();

    let second = fx.registry.get_named(Some("dev")).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fx.driver.connect_count(), 1);
    // No further prompting or output on the cached path.
    assert_eq!(fx.io.lock().unwrap().transcript().len(), printed);
}

#[test]
fn test_get_named_default_name() {
    let fx = fixture(
        "[default]\nhostname = h\nusername = u\nconfirm = off\n",
        &["pw"],
    );

    let handle = fx.registry.get_named(None).unwrap();
    let again = fx.registry.get_named(Some("default")).unwrap();
    assert!(Arc::ptr_eq(&handle, &again));
}

#[test]
fn test_get_named_unknown_name_is_not_found() {
    let fx = fixture(DEV_SECTION, &[]);

    match fx.registry.get_named(Some("missing")) {
        Err(Error::NotFound(name)) => assert_eq!(name, "missing"),
        other => panic!("expected NotFound, got {:?}", other.map(|_| "handle")),
    }
    assert_eq!(fx.driver.connect_count(), 0);
}

#[test]
fn test_profiles_differing_only_by_password_share_a_handle() {
    // The identity key deliberately excludes the password, so the second
    // profile reuses whichever connection materialized first.
    let fx = fixture("", &[]);

    let mut first = ConnectionConfig::new()
        .with_username("alice")
        .with_password("first");
    let mut second = ConnectionConfig::new()
        .with_username("alice")
        .with_password("second");

    let a = fx.registry.set_from_config(&mut first, Some("a")).unwrap();
    let b = fx.registry.set_from_config(&mut second, Some("b")).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(fx.driver.connect_count(), 1);
    assert_eq!(fx.driver.last_params().password.expose(), "first");
}

#[test]
fn test_cached_identity_short_circuits_prompting() {
    let fx = fixture("", &[]);

    let mut filled = ConnectionConfig::new()
        .with_username("alice")
        .with_password("pw");
    fx.registry.set_from_config(&mut filled, Some("a")).unwrap();
    let printed = fx.io.lock().unwrap().transcript().len();

    // Same identity, nothing pre-filled beyond the username: the cache
    // hit must come before any prompting.
    let mut sparse = ConnectionConfig::new().with_username("alice");
    let handle = sparse.get_connection(&fx.registry).unwrap();

    assert_eq!(fx.driver.connect_count(), 1);
    assert!(!sparse.is_filled());
    assert_eq!(fx.io.lock().unwrap().transcript().len(), printed);
    drop(handle);
}

#[test]
fn test_masked_confirmation_mismatch_reprompts() {
    // confirm defaults to true when the section does not set it, so the
    // password is entered twice; the first pair disagrees.
    let fx = fixture(
        "[dev]\nhostname = h\nusername = alice\n",
        &["one", "two", "  s3cret  ", "  s3cret  "],
    );

    fx.registry.get_named(Some("dev")).unwrap();

    assert_eq!(fx.driver.last_params().password.expose(), "s3cret");
    let io = fx.io.lock().unwrap();
    assert_eq!(io.remaining(), 0);
    assert!(
        io.transcript()
            .iter()
            .any(|line| line == "Values don't match. Try again.")
    );
}

#[test]
fn test_set_named_bypasses_resolution() {
    let fx = fixture("", &[]);

    let handle: Handle = Arc::new(MockGlobals);
    fx.registry.set_named(Some("injected"), handle.clone());

    let fetched = fx.registry.get_named(Some("injected")).unwrap();
    assert!(Arc::ptr_eq(&handle, &fetched));
    assert_eq!(fx.driver.connect_count(), 0);
}

#[test]
fn test_close_is_a_silent_no_op() {
    let fx = fixture(DEV_SECTION, &["s3cret"]);

    let handle = fx.registry.get_named(Some("dev")).unwrap();
    fx.registry.close(Some("dev")).unwrap();

    // The binding survives; close does not evict.
    let again = fx.registry.get_named(Some("dev")).unwrap();
    assert!(Arc::ptr_eq(&handle, &again));
    fx.registry.close(Some("never-bound")).unwrap();
}

#[test]
fn test_driver_errors_pass_through() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE_HIDDEN), DEV_SECTION).unwrap();

    let registry = ConnectionRegistry::new(Arc::new(FailingDriver))
        .unwrap()
        .with_resolver(ConfigResolver::with_roots(temp.path(), None))
        .with_io(Arc::new(Mutex::new(ScriptedIo::with_responses(["pw"]))));

    match registry.get_named(Some("dev")) {
        Err(Error::Driver(err)) => assert_eq!(err.to_string(), "connection refused"),
        other => panic!("expected driver error, got {:?}", other.map(|_| "handle")),
    }
}

#[test]
fn test_handle_surface_passes_through() {
    let fx = fixture(DEV_SECTION, &["s3cret"]);
    let handle = fx.registry.get_named(Some("dev")).unwrap();

    handle
        .set(&Value::String("hello".into()), "greeting", &["en"])
        .unwrap();
    assert!(handle.get("greeting", &["en"]).unwrap().is_none());
    handle.kill("greeting", &[]).unwrap();
}
