//! Integration tests for the server list loader
//!
//! These tests serve fixture feeds from a local mock HTTP server and drive
//! the loader through its public API.

mod helpers;

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use helpers::{load_fixture, loader_for, RecordingDelegate, LIST_PATH};
use mockito::Server;
use rstest::rstest;
use server_list::{
    ChannelDelegate, IndexError, IndexPath, LoadError, LoadEvent, LoadPhase, LoaderConfig,
    PublicServerList,
};

fn serve_fixture(server: &mut mockito::ServerGuard, fixture: &str) -> mockito::Mock {
    server
        .mock("GET", LIST_PATH)
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(load_fixture(fixture))
        .create()
}

#[test]
fn test_scenario_feed_blocking() {
    let mut server = Server::new();
    let mock = serve_fixture(&mut server, "nested_scenario.xml");

    let list = loader_for(&server);
    list.load_blocking().expect("load should succeed");
    mock.assert();

    assert!(list.load_completed());
    assert_eq!(list.number_of_continents(), 2);
    assert_eq!(list.continent_name_at_index(0).unwrap(), "Europe");
    assert_eq!(list.continent_name_at_index(1).unwrap(), "North America");
    assert_eq!(list.number_of_countries_at_continent_index(0), Ok(2));
    assert_eq!(list.number_of_countries_at_continent_index(1), Ok(1));

    let germany = list.country_at_index_path(IndexPath::new(0, 0)).unwrap();
    assert_eq!(germany.code, "DE");
    assert_eq!(germany.name, "Germany");
    assert_eq!(germany.server_count(), 2);

    let us = list.country_at_index_path(IndexPath::new(1, 0)).unwrap();
    assert_eq!(us.name, "United States");
    assert_eq!(us.server_count(), 3);
}

#[test]
fn test_background_load_notifies_delegate_once() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "nested_scenario.xml");

    let list = loader_for(&server);
    let delegate = RecordingDelegate::new();
    list.set_delegate(delegate.clone());

    list.load();
    list.wait();

    assert_eq!(delegate.loaded(), 1);
    assert_eq!(delegate.failed(), 0);
    assert_eq!(*delegate.continents_seen.lock().unwrap(), Some(2));
    assert_eq!(list.phase(), LoadPhase::Loaded);
}

#[test]
fn test_http_500_fails_once_and_leaves_model_empty() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", LIST_PATH)
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create();

    let list = loader_for(&server);
    let (delegate, events) = ChannelDelegate::new();
    let delegate = Arc::new(delegate);
    list.set_delegate(delegate.clone());

    list.load();
    let event = events
        .recv_timeout(Duration::from_secs(10))
        .expect("failure callback should fire");
    list.wait();

    assert_eq!(event, LoadEvent::Failed(LoadError::HttpStatus(500)));
    assert!(events.try_recv().is_err(), "exactly one callback per load");
    assert!(!list.load_completed());
    assert_eq!(list.phase(), LoadPhase::Failed);
    assert_eq!(list.number_of_continents(), 0);
    assert!(list.model().is_none());
    mock.assert();
}

#[rstest]
#[case(404)]
#[case(503)]
fn test_non_success_status(#[case] status: usize) {
    let mut server = Server::new();
    let _mock = server.mock("GET", LIST_PATH).with_status(status).create();

    let list = loader_for(&server);
    let result = list.load_blocking();

    assert_eq!(result, Err(LoadError::HttpStatus(status as u16)));
    assert!(result.unwrap_err().is_transport());
}

#[test]
fn test_malformed_body_is_parse_error() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "malformed.xml");

    let list = loader_for(&server);
    let delegate = RecordingDelegate::new();
    list.set_delegate(delegate.clone());

    let result = list.load_blocking();

    assert!(matches!(result, Err(LoadError::Parse(_))));
    assert_eq!(delegate.failed(), 1);
    assert_eq!(delegate.loaded(), 0);
    assert!(matches!(delegate.last_error(), Some(LoadError::Parse(_))));
    assert!(!list.load_completed());
}

#[test]
fn test_stray_server_is_dropped_and_load_succeeds() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "stray_server.xml");

    let list = loader_for(&server);
    list.load_blocking().unwrap();

    assert_eq!(list.number_of_continents(), 1);
    let netherlands = list.country_at_index_path(IndexPath::new(0, 0)).unwrap();
    assert_eq!(netherlands.name, "Netherlands");
    let names: Vec<_> = netherlands.servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Amsterdam", "Rotterdam"]);
}

#[test]
fn test_flat_feed_from_real_service_layout() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "flat_feed.xml");

    let list = loader_for(&server);
    list.load_blocking().unwrap();

    assert_eq!(list.continent_name_at_index(0).unwrap(), "Asia");
    assert_eq!(list.continent_name_at_index(1).unwrap(), "Oceania");
    let japan = list.country_at_index_path(IndexPath::new(0, 0)).unwrap();
    assert_eq!(japan.name, "Japan");
    assert_eq!(japan.server_count(), 2);
    assert_eq!(japan.servers[1].port, 64740);
}

#[test]
fn test_reload_keeps_ordering_stable() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", LIST_PATH)
        .with_status(200)
        .with_body(load_fixture("nested_scenario.xml"))
        .expect(2)
        .create();

    let list = loader_for(&server);
    list.load_blocking().unwrap();
    let first = list.model().unwrap();

    list.load_blocking().unwrap();
    let second = list.model().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[test]
fn test_failed_reload_keeps_previous_model() {
    let mut server = Server::new();
    let _ok = serve_fixture(&mut server, "nested_scenario.xml");

    let list = loader_for(&server);
    list.load_blocking().unwrap();
    let before = list.model().unwrap();

    server.reset();
    let _fail = server.mock("GET", LIST_PATH).with_status(500).create();

    assert_eq!(list.load_blocking(), Err(LoadError::HttpStatus(500)));
    assert!(!list.load_completed());
    assert_eq!(list.phase(), LoadPhase::Failed);
    assert_eq!(list.number_of_continents(), 2);
    assert_eq!(*list.model().unwrap(), *before);
}

#[test]
fn test_accessors_out_of_range() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "nested_scenario.xml");
    let list = loader_for(&server);

    // Before any load
    assert_eq!(
        list.continent_name_at_index(0),
        Err(IndexError::Continent { index: 0, count: 0 })
    );
    assert!(list.country_at_index_path(IndexPath::new(0, 0)).is_err());

    list.load_blocking().unwrap();

    assert_eq!(
        list.continent_name_at_index(2),
        Err(IndexError::Continent { index: 2, count: 2 })
    );
    assert!(list.continent_name_at_index(usize::MAX).is_err());
    assert!(list.number_of_countries_at_continent_index(2).is_err());
    assert_eq!(
        list.country_at_index_path(IndexPath::new(1, 1)),
        Err(IndexError::Country { continent: 1, index: 1, count: 1 })
    );
    assert!(list.country_at_index_path(IndexPath::new(usize::MAX, 0)).is_err());
}

#[test]
fn test_connection_refused_is_transport_error() {
    let list = PublicServerList::with_config(
        LoaderConfig::new()
            .with_url("http://127.0.0.1:1/list2.cgi")
            .with_connect_timeout(Duration::from_secs(2)),
    );
    let delegate = RecordingDelegate::new();
    list.set_delegate(delegate.clone());

    let result = list.load_blocking();

    assert!(result.unwrap_err().is_transport());
    assert_eq!(delegate.failed(), 1);
    assert_eq!(list.number_of_continents(), 0);
}

#[test]
fn test_slow_body_times_out() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", LIST_PATH)
        .with_status(200)
        .with_chunked_body(|w| {
            w.write_all(b"<list><continent code=\"EU\">")?;
            thread::sleep(Duration::from_secs(3));
            w.write_all(b"</continent></list>")
        })
        .create();

    let list = PublicServerList::with_config(
        LoaderConfig::new()
            .with_url(format!("{}{}", server.url(), LIST_PATH))
            .with_timeout(Duration::from_millis(500)),
    );

    let result = list.load_blocking();
    assert!(result.unwrap_err().is_transport());
    assert_eq!(list.phase(), LoadPhase::Failed);
}

#[test]
fn test_cancel_suppresses_callback() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", LIST_PATH)
        .with_status(200)
        .with_chunked_body(|w| {
            w.write_all(b"<list><continent code=\"EU\">")?;
            thread::sleep(Duration::from_millis(500));
            w.write_all(b"<country code=\"DE\"/></continent></list>")
        })
        .create();

    let list = loader_for(&server);
    let delegate = RecordingDelegate::new();
    list.set_delegate(delegate.clone());

    list.load();
    assert_eq!(list.phase(), LoadPhase::Loading);
    thread::sleep(Duration::from_millis(100));
    assert!(list.cancel());
    list.wait();

    assert_eq!(delegate.total(), 0);
    assert_eq!(list.phase(), LoadPhase::Idle);
    assert!(list.model().is_none());
}

#[test]
fn test_overlapping_load_is_ignored() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", LIST_PATH)
        .with_status(200)
        .with_chunked_body(|w| {
            thread::sleep(Duration::from_millis(300));
            w.write_all(b"<list><continent code=\"EU\"/></list>")
        })
        .expect(1)
        .create();

    let list = loader_for(&server);
    let delegate = RecordingDelegate::new();
    list.set_delegate(delegate.clone());

    list.load();
    list.load();
    assert_eq!(list.load_blocking(), Err(LoadError::AlreadyLoading));
    list.wait();

    assert_eq!(delegate.loaded(), 1);
    assert_eq!(delegate.total(), 1);
    mock.assert();
}

#[test]
fn test_dropped_delegate_is_not_called() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "nested_scenario.xml");

    let list = loader_for(&server);
    let delegate = RecordingDelegate::new();
    list.set_delegate(delegate.clone());
    assert!(list.delegate().is_some());
    drop(delegate);
    assert!(list.delegate().is_none());

    list.load_blocking().unwrap();
    assert!(list.load_completed());
}

#[test]
fn test_replacing_delegate() {
    let mut server = Server::new();
    let _mock = serve_fixture(&mut server, "nested_scenario.xml");

    let list = loader_for(&server);
    let first = RecordingDelegate::new();
    let second = RecordingDelegate::new();
    list.set_delegate(first.clone());
    list.set_delegate(second.clone());

    list.load_blocking().unwrap();

    assert_eq!(first.total(), 0);
    assert_eq!(second.loaded(), 1);
}
