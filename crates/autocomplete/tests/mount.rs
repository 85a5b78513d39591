use autocomplete::{
    AutocompleteError, ControllerFactories, ControllerHost, Key, MountError, MountPoint,
    OptionSource, Phase, UiEvent, autocomplete_factory,
};
use bus::{CoreCommand, CoreEvent};
use core_types::ResourceKind;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use url::Url;

const LOCAL_FORM: &str = r#"
<form action="/orders">
  <div data-controller="autocomplete" data-autocomplete-delay-value="100">
    <input type="text" data-autocomplete-target="input" value="Banana">
    <input type="hidden" name="order[fruit_id]" data-autocomplete-target="hidden" value="2">
    <input type="hidden" name="order[fruit_name]" data-autocomplete-target="hiddenText" value="Banana">
    <button type="button" data-autocomplete-target="clearButton">&times;</button>
    <ul id="fruit-results" data-autocomplete-target="results" hidden></ul>
    <script type="application/json" data-autocomplete-target="dataList">
      [{"value": 1, "text": "Apple"}, {"value": 2, "text": "Banana"}, {"value": 3, "text": "Coconut"}]
    </script>
  </div>
</form>
"#;

const REMOTE_FORM: &str = r#"
<div data-controller="autocomplete"
     data-autocomplete-url-value="/members/search?scope=active"
     data-autocomplete-min-length-value="2"
     data-autocomplete-query-param-value="term">
  <input type="text" data-autocomplete-target="input">
  <input type="hidden" name="member_id" data-autocomplete-target="hidden">
  <ul id="member-results" data-autocomplete-target="results"></ul>
</div>
"#;

fn factories() -> ControllerFactories {
    ControllerFactories::new().with("autocomplete", autocomplete_factory())
}

#[test]
fn scan_finds_mount_points_and_targets() {
    let roots = markup::parse_fragment(LOCAL_FORM);
    let points = MountPoint::scan(&roots);
    assert_eq!(points.len(), 1);
    let point = &points[0];
    assert_eq!(point.controller(), "autocomplete");
    assert_eq!(point.value("delay"), Some("100"));
    assert_eq!(
        point.target("results").and_then(|n| n.attr("id")),
        Some("fruit-results")
    );
    assert!(point.target("missing").is_none());
}

#[test]
fn mounts_local_control_from_markup() {
    let roots = markup::parse_fragment(LOCAL_FORM);
    let mut host = ControllerHost::new(factories());
    assert!(host.mount_all(&roots).is_empty());

    let handle = host.autocompletes().next().unwrap().clone();
    assert_eq!(handle.get_value(), "2");
    assert_eq!(handle.display_text(), "Banana");
    assert_eq!(handle.get_options().len(), 3);
    handle.with(|ac| {
        assert_eq!(ac.source(), &OptionSource::Local);
        assert_eq!(ac.phase(), Phase::Committed);
        assert_eq!(ac.config().debounce_ms, 100);
        assert!(ac.value_model().clear_button_enabled());
        assert_eq!(ac.popup().results_id(), "fruit-results");
    });
    assert_eq!(
        handle.form_entries(),
        vec![
            ("order[fruit_id]".to_string(), "2".to_string()),
            ("order[fruit_name]".to_string(), "Banana".to_string())
        ]
    );

    let t0 = Instant::now();
    handle.handle_event(UiEvent::Input("co".into()), t0).unwrap();
    assert_eq!(host.next_deadline(), Some(t0 + Duration::from_millis(100)));
    assert!(host.tick(t0 + Duration::from_millis(100)).is_empty());

    handle.handle_event(UiEvent::KeyDown(Key::ArrowDown), t0).unwrap();
    handle.handle_event(UiEvent::KeyDown(Key::Enter), t0).unwrap();
    assert_eq!(handle.get_value(), "3");
    assert_eq!(handle.display_text(), "Coconut");
}

#[test]
fn remote_control_round_trip_through_host() {
    let roots = markup::parse_fragment(REMOTE_FORM);
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    let mut host = ControllerHost::new(factories())
        .with_document_url(Url::parse("https://club.test/events/new").unwrap());
    host.set_bus_sender(cmd_tx);
    assert!(host.mount_all(&roots).is_empty());

    let handle = host.autocompletes().next().unwrap().clone();
    let t0 = Instant::now();
    handle.handle_event(UiEvent::Input("jo".into()), t0).unwrap();
    assert!(host.tick(t0 + Duration::from_millis(300)).is_empty());

    let (control_id, request_id, url) = match cmd_rx.try_recv().unwrap() {
        CoreCommand::FetchQuery {
            control_id,
            request_id,
            url,
        } => (control_id, request_id, url),
        other => panic!("unexpected command: {other:?}"),
    };
    assert_eq!(url, "https://club.test/members/search?scope=active&term=jo");

    evt_tx
        .send(CoreEvent::QueryLoaded {
            control_id,
            request_id,
            kind: ResourceKind::QueryRows,
            url,
            status: 200,
            body: r#"<ul>
                <li role="option" data-ac-value="17">Jo March</li>
                <li role="option" data-ac-value="18" aria-disabled="true">Joan (inactive)</li>
              </ul>"#
                .to_string(),
        })
        .unwrap();
    assert!(host.pump(&evt_rx).is_empty());

    handle.with(|ac| {
        assert_eq!(ac.phase(), Phase::HasResults);
        assert_eq!(ac.popup().rows().len(), 2);
        assert_eq!(ac.popup().rows()[0].id, "member-results-option-1");
    });

    handle.handle_event(UiEvent::KeyDown(Key::ArrowDown), t0).unwrap();
    handle.handle_event(UiEvent::KeyDown(Key::ArrowDown), t0).unwrap();
    handle.handle_event(UiEvent::KeyDown(Key::Enter), t0).unwrap();
    assert_eq!(handle.get_value(), "17");
    assert_eq!(handle.display_text(), "Jo March");
}

#[test]
fn transport_errors_surface_from_pump() {
    let roots = markup::parse_fragment(REMOTE_FORM);
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    let mut host = ControllerHost::new(factories())
        .with_document_url(Url::parse("https://club.test/").unwrap());
    host.set_bus_sender(cmd_tx);
    host.mount_all(&roots);

    let handle = host.autocompletes().next().unwrap().clone();
    let t0 = Instant::now();
    handle.handle_event(UiEvent::Input("jo".into()), t0).unwrap();
    host.tick(t0 + Duration::from_secs(1));
    let Ok(CoreCommand::FetchQuery {
        control_id,
        request_id,
        url,
    }) = cmd_rx.try_recv()
    else {
        panic!("expected a fetch");
    };

    evt_tx
        .send(CoreEvent::QueryFailed {
            control_id,
            request_id,
            kind: ResourceKind::QueryRows,
            url,
            error: "connection reset".into(),
        })
        .unwrap();
    let errors = host.pump(&evt_rx);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], AutocompleteError::Transport(_)));
    assert_eq!(handle.display_text(), "jo");
}

#[test]
fn mount_errors_are_reported_per_point() {
    let markup = r#"
      <div data-controller="autocomplete">
        <input data-autocomplete-target="input">
        <ul data-autocomplete-target="results"></ul>
      </div>
      <div data-controller="autocomplete">
        <input data-autocomplete-target="input">
        <input type="hidden" data-autocomplete-target="hidden">
        <ul data-autocomplete-target="results"></ul>
        <script data-autocomplete-target="dataList">[{"value": 1</script>
      </div>
      <div data-controller="autocomplete" data-autocomplete-min-length-value="lots">
        <input data-autocomplete-target="input">
        <input type="hidden" data-autocomplete-target="hidden">
        <ul data-autocomplete-target="results"></ul>
      </div>
      <div data-controller="clipboard"></div>
    "#;
    let roots = markup::parse_fragment(markup);
    let mut host = ControllerHost::new(factories());
    let errors = host.mount_all(&roots);

    assert_eq!(errors.len(), 4);
    assert!(matches!(
        errors[0],
        MountError::MissingTarget { target: "hidden", .. }
    ));
    assert!(matches!(errors[1], MountError::OptionList(_)));
    assert!(matches!(errors[2], MountError::Config(_)));
    assert!(matches!(errors[3], MountError::UnknownController(ref name) if name == "clipboard"));
    assert_eq!(host.controllers().len(), 0);
}

#[test]
fn hidden_mount_element_starts_disabled() {
    let markup = r#"
      <div data-controller="ac" hidden>
        <input data-ac-target="input">
        <input type="hidden" name="tag" data-ac-target="hidden" value="x">
        <ul data-ac-target="results"></ul>
        <script data-ac-target="dataList">[]</script>
      </div>
    "#;
    let roots = markup::parse_fragment(markup);
    let mut host = ControllerHost::new(ControllerFactories::new().with("ac", autocomplete_factory()));
    assert!(host.mount_all(&roots).is_empty());

    let handle = host.autocompletes().next().unwrap();
    assert!(handle.is_hidden());
    assert!(handle.is_disabled());
    assert!(handle.form_entries().is_empty());
    assert_eq!(host.controllers()[0].name(), "ac");
}

#[test]
fn unmount_all_detaches_controls() {
    let roots = markup::parse_fragment(LOCAL_FORM);
    let mut host = ControllerHost::new(factories());
    host.mount_all(&roots);
    let handle = host.autocompletes().next().unwrap().clone();

    host.unmount_all();
    assert!(host.controllers().is_empty());
    assert!(!handle.with(|ac| ac.is_attached()));
    assert_eq!(handle.next_deadline(), None);
}
