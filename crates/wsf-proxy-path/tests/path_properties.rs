use proptest::prelude::*;
use wsf_proxy_path::{Key, Path};

fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_/~ ]{0,8}".prop_map(Key::Name),
        "[0-9]{1,4}".prop_map(Key::Name),
        (0usize..64).prop_map(Key::Index),
    ]
}

fn path_strategy() -> impl Strategy<Value = Path> {
    prop::collection::vec(key_strategy(), 0..6).prop_map(Path::from_iter)
}

proptest! {
    #[test]
    fn pointer_text_parses_back_to_same_path(path in path_strategy()) {
        let text = path.to_string();
        let parsed: Path = text.parse().expect("rendered pointer must parse");
        prop_assert_eq!(parsed, path);
    }

    #[test]
    fn joined_paths_keep_prefix(a in path_strategy(), b in path_strategy()) {
        let joined = a.join(&b);
        prop_assert!(a.is_prefix_of(&joined));
        prop_assert_eq!(joined.strip_prefix(&a), Some(b.clone()));
        prop_assert_eq!(joined.len(), a.len() + b.len());
    }

    #[test]
    fn replace_prefix_moves_whole_subtree(
        prefix in path_strategy(),
        suffix in path_strategy(),
        target in path_strategy(),
    ) {
        let old = prefix.join(&suffix);
        let moved = old.replace_prefix(&prefix, &target).expect("prefix must match");
        prop_assert!(target.is_prefix_of(&moved));
        prop_assert_eq!(moved.strip_prefix(&target), Some(suffix));
    }

    #[test]
    fn descendants_sort_directly_after_prefix(
        prefix in path_strategy(),
        others in prop::collection::vec(path_strategy(), 0..12),
    ) {
        let mut all = others;
        all.push(prefix.clone());
        all.sort();
        all.dedup();
        let start = all.iter().position(|p| *p == prefix).expect("prefix present");
        let run = all[start..].iter().take_while(|p| prefix.is_prefix_of(p)).count();
        let total = all.iter().filter(|p| prefix.is_prefix_of(p)).count();
        prop_assert_eq!(run, total);
    }
}

#[test]
fn numeric_map_keys_match_parsed_pointers() {
    let built = Path::root().with_attr("platform").with_map_key("100").with_attr("side");
    let parsed: Path = "/platform/100/side".parse().unwrap();
    assert_eq!(built, parsed);
    assert_eq!(built.cmp(&parsed), std::cmp::Ordering::Equal);

    let mut index = std::collections::BTreeMap::new();
    index.insert(built.clone(), "side");
    assert_eq!(index.get(&parsed), Some(&"side"));

    let old: Path = "/platform/100".parse().unwrap();
    let new = Path::root().with_attr("platform").with_map_key("200");
    assert_eq!(built.replace_prefix(&old, &new).unwrap().to_string(), "/platform/200/side");
}

#[test]
fn serde_uses_pointer_strings() {
    let path = Path::root()
        .with_attr("platform")
        .with_map_key("P1")
        .with_attr("mover");
    let encoded = serde_json::to_string(&path).unwrap();
    assert_eq!(encoded, "\"/platform/P1/mover\"");
    let decoded: Path = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, path);
}

#[test]
fn serde_rejects_relative_pointer() {
    let err = serde_json::from_str::<Path>("\"platform\"");
    assert!(err.is_err());
}
