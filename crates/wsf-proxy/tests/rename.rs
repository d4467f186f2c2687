//! Renaming catalog entries.

mod common;

use common::recorder::Recorder;
use common::scenarios::{p, ScenarioBuilder};
use wsf_proxy::pm::{PmNode, PmZoneDefinition};
use wsf_proxy::{BasicData, ChangeKind, ChangePhase};

#[test]
fn rename_moves_entry_and_emits_moved_pair() {
    let proxy = ScenarioBuilder::new()
        .platform("P1", "WSF_PLATFORM")
        .platform("P3", "WSF_PLATFORM")
        .build();
    proxy.node(p("/platform/P1/side")).assign(BasicData::from("blue"));
    let seq = proxy.sequence_number();
    let events = Recorder::attach(&proxy);

    let mut node = proxy.node(p("/platform/P1"));
    assert!(node.rename("P2"));

    assert_eq!(node.path_string(), "/platform/P2");
    assert_eq!(node.get_attr::<String>("side").as_deref(), Some("blue"));
    assert!(proxy.node(p("/platform/P1")).is_null());
    assert!(proxy.sequence_number() > seq);
    assert_eq!(proxy.renames(), vec![(p("/platform/P1"), p("/platform/P2"))]);

    let moved: Vec<_> = events
        .events()
        .into_iter()
        .filter(|ev| ev.kind == ChangeKind::ChildMoved)
        .collect();
    assert_eq!(moved.len(), 2);
    assert_eq!(moved[0].phase, ChangePhase::Before);
    assert_eq!(moved[1].phase, ChangePhase::After);
    for ev in &moved {
        assert_eq!(ev.path, p("/platform/P1"));
        assert_eq!(ev.aux.as_deref(), Some("P2"));
    }

    // declaration order is kept
    let names = proxy.root().at_key("platform").child_keys();
    let names: Vec<_> = names.iter().filter_map(|k| k.as_name()).collect();
    assert_eq!(names, vec!["P2", "P3"]);
}

#[test]
fn rename_to_taken_name_changes_nothing() {
    let proxy = ScenarioBuilder::new()
        .platform("P1", "WSF_PLATFORM")
        .platform("P2", "WSF_PLATFORM")
        .build();
    let seq = proxy.sequence_number();
    let events = Recorder::attach(&proxy);

    let mut node = proxy.node(p("/platform/P1"));
    assert!(!node.rename("P2"));
    assert!(!node.rename(""));
    assert_eq!(node.path_string(), "/platform/P1");
    assert!(events.is_empty());
    assert_eq!(proxy.sequence_number(), seq);
    assert!(proxy.renames().is_empty());
}

#[test]
fn rename_refuses_predefined_and_non_catalog_entries() {
    let proxy = ScenarioBuilder::new().platform("P1", "WSF_PLATFORM").build();
    let events = Recorder::attach(&proxy);

    let mut predefined = proxy.node(p("/moverType/WSF_AIR_MOVER"));
    assert!(!predefined.rename("JET"));
    assert!(!proxy.node(p("/moverType/WSF_AIR_MOVER")).is_null());

    let mut attr = proxy.node(p("/platform/P1/side"));
    assert!(!attr.is_renamable());
    assert!(!attr.rename("team"));
    assert!(events.is_empty());
}

#[test]
fn rename_platform_updates_commanders() {
    let b = ScenarioBuilder::new()
        .platform("LEAD", "WSF_PLATFORM")
        .platform("WING", "WSF_PLATFORM")
        .platform("OTHER", "WSF_PLATFORM")
        .commander("WING", "default", "LEAD")
        .commander("OTHER", "default", "WING");
    let events = Recorder::attach(b.proxy());

    let mut lead = b.find("LEAD").node().clone();
    assert!(lead.rename("BOSS"));

    let wing = b.find("WING");
    assert_eq!(
        wing.command_chains().find("default").unwrap().commander_name().as_deref(),
        Some("BOSS")
    );
    assert_eq!(wing.commander("default").unwrap().name(), "BOSS");
    assert_eq!(b.find("OTHER").commander("default").unwrap().name(), "WING");
    assert_eq!(events.count(ChangeKind::AttributeChanged), 2);
}

#[test]
fn rename_type_repoints_derived_bases() {
    let b = ScenarioBuilder::new()
        .platform_type("FIGHTER", "WSF_PLATFORM")
        .platform_type("ACE", "FIGHTER")
        .platform("P1", "FIGHTER")
        .platform("P2", "ACE");
    let proxy = b.build();
    assert!(proxy.node(p("/platformType/FIGHTER/icon")).assign(BasicData::from("f-16")));

    let mut fighter = proxy.node(p("/platformType/FIGHTER"));
    assert!(fighter.rename("STRIKER"));

    assert_eq!(proxy.node(p("/platform/P1")).base_path(), Some(p("/platformType/STRIKER")));
    assert_eq!(proxy.node(p("/platformType/ACE")).base_path(), Some(p("/platformType/STRIKER")));
    assert_eq!(proxy.base_of(&p("/platform/P1")), Some(p("/platformType/STRIKER")));

    // inheritance still flows through the renamed type
    assert!(proxy
        .node(p("/platformType/STRIKER/icon"))
        .assign(BasicData::from("f-35")));
    assert_eq!(proxy.node(p("/platform/P1/icon")).get::<String>().as_deref(), Some("f-35"));
    assert_eq!(proxy.node(p("/platform/P2/icon")).get::<String>().as_deref(), Some("f-35"));
}

#[test]
fn rename_platform_local_zone() {
    let b = ScenarioBuilder::new().platform("P1", "WSF_PLATFORM");
    let zone: PmZoneDefinition = b.find("P1").zones().add_default("Z1", "ZoneDefinition").unwrap();
    let mut node = zone.node().clone();
    assert!(node.rename("Z2"));
    assert!(b.find("P1").zones().find("Z2").is_some());
    assert!(b.find("P1").zones().find("Z1").is_none());
}

#[test]
fn cursors_to_unrelated_entries_survive_rename() {
    let proxy = ScenarioBuilder::new()
        .platform("P1", "WSF_PLATFORM")
        .platform("P2", "WSF_PLATFORM")
        .build();
    let side = proxy.node(p("/platform/P2/side"));
    assert!(side.assign(BasicData::from("red")));

    let mut p1 = proxy.node(p("/platform/P1"));
    assert!(p1.rename("P9"));
    assert_eq!(side.get::<String>().as_deref(), Some("red"));
    assert_eq!(side.path_string(), "/platform/P2/side");

    // a stale cursor at the old path resolves to nothing
    let stale = proxy.node(p("/platform/P1/side"));
    assert!(stale.is_null());
}
