//! Values flowing from types to the entries derived from them.

mod common;

use common::recorder::Recorder;
use common::scenarios::{p, ScenarioBuilder};
use wsf_proxy::BasicData;

#[test]
fn type_write_reaches_inherited_instances_only() {
    let proxy = ScenarioBuilder::new()
        .platform_type("FIGHTER", "WSF_PLATFORM")
        .platform("P1", "FIGHTER")
        .platform("P2", "FIGHTER")
        .build();
    assert!(proxy.node(p("/platform/P2/icon")).assign(BasicData::from("custom")));
    let events = Recorder::attach(&proxy);

    assert!(proxy.node(p("/platformType/FIGHTER/icon")).assign(BasicData::from("f-16")));

    let p1_icon = proxy.node(p("/platform/P1/icon"));
    assert_eq!(p1_icon.get::<String>().as_deref(), Some("f-16"));
    assert!(p1_icon.is_inherited());
    let p2_icon = proxy.node(p("/platform/P2/icon"));
    assert_eq!(p2_icon.get::<String>().as_deref(), Some("custom"));
    assert!(!p2_icon.is_inherited());

    let touched: Vec<String> = events.after().iter().map(|ev| ev.path.to_string()).collect();
    assert!(touched.contains(&"/platformType/FIGHTER/icon".to_string()));
    assert!(touched.contains(&"/platform/P1/icon".to_string()));
    assert!(!touched.contains(&"/platform/P2/icon".to_string()));
}

#[test]
fn propagation_crosses_type_levels() {
    let proxy = ScenarioBuilder::new()
        .platform_type("FIGHTER", "WSF_PLATFORM")
        .platform_type("ACE", "FIGHTER")
        .platform("P1", "ACE")
        .build();
    assert!(proxy.node(p("/platformType/FIGHTER/side")).assign(BasicData::from("blue")));
    assert_eq!(proxy.node(p("/platformType/ACE/side")).get::<String>().as_deref(), Some("blue"));
    assert_eq!(proxy.node(p("/platform/P1/side")).get::<String>().as_deref(), Some("blue"));
    assert_eq!(
        proxy.node(p("/platform/P1")).inheritance_chain(),
        vec![p("/platformType/ACE"), p("/platformType/FIGHTER"), p("/platformType/WSF_PLATFORM")]
    );
}

#[test]
fn reset_restores_inherited_value() {
    let proxy = ScenarioBuilder::new()
        .platform_type("FIGHTER", "WSF_PLATFORM")
        .platform("P1", "FIGHTER")
        .build();
    assert!(proxy.node(p("/platformType/FIGHTER/icon")).assign(BasicData::from("f-16")));
    let icon = proxy.node(p("/platform/P1/icon"));
    assert!(icon.assign(BasicData::from("mine")));
    assert!(!icon.is_inherited());

    assert!(icon.reset_to_inherited_value());
    assert_eq!(icon.get::<String>().as_deref(), Some("f-16"));
    assert!(icon.is_inherited());
    assert!(!icon.reset_to_inherited_value());

    // inherited again, so later type writes arrive
    assert!(proxy.node(p("/platformType/FIGHTER/icon")).assign(BasicData::from("f-22")));
    assert_eq!(icon.get::<String>().as_deref(), Some("f-22"));
}

#[test]
fn rebasing_refuses_cycles() {
    let proxy = ScenarioBuilder::new()
        .platform_type("A", "WSF_PLATFORM")
        .platform_type("B", "A")
        .build();
    let events = Recorder::attach(&proxy);
    let a = proxy.node(p("/platformType/A"));
    assert!(!proxy.set_base(&p("/platformType/A"), Some(p("/platformType/B"))));
    assert_eq!(a.base_path(), Some(p("/platformType/WSF_PLATFORM")));
    assert!(events.is_empty());
}

#[test]
fn rebasing_pulls_new_type_values() {
    let proxy = ScenarioBuilder::new()
        .platform_type("RED", "WSF_PLATFORM")
        .platform_type("BLUE", "WSF_PLATFORM")
        .platform("P1", "RED")
        .build();
    assert!(proxy.node(p("/platformType/RED/side")).assign(BasicData::from("red")));
    assert!(proxy.node(p("/platformType/BLUE/side")).assign(BasicData::from("blue")));
    assert!(proxy.node(p("/platformType/BLUE/icon")).assign(BasicData::from("tank")));
    let p1 = proxy.node(p("/platform/P1"));
    assert!(p1.assign_attribute("icon", BasicData::from("own")));

    assert!(p1.update_parent_path(p("/platformType/BLUE")));
    assert_eq!(p1.get_attr::<String>("side").as_deref(), Some("blue"));
    assert_eq!(p1.get_attr::<String>("icon").as_deref(), Some("own"));
    assert_eq!(p1.type_name().as_deref(), Some("BLUE"));
}

#[test]
fn removing_a_type_leaves_instances_readable() {
    let proxy = ScenarioBuilder::new()
        .platform_type("FIGHTER", "WSF_PLATFORM")
        .platform("P1", "FIGHTER")
        .build();
    assert!(proxy.node(p("/platformType/FIGHTER/side")).assign(BasicData::from("blue")));
    assert!(proxy.root().at_key("platformType").remove_child("FIGHTER"));
    assert_eq!(proxy.node(p("/platform/P1/side")).get::<String>().as_deref(), Some("blue"));
}
