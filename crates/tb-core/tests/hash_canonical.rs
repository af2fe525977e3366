use std::collections::HashMap;

use proptest::prelude::*;
use serde::Serialize;
use serde_json::json;
use tb_core::{stable_hash, to_canonical_json_string, TbError, DEFAULT_HASH_LENGTH};

#[derive(Serialize)]
struct Extents {
    ny: u32,
    nx: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Boundary {
    Open,
}

#[derive(Serialize)]
struct Sample {
    lattice: &'static str,
    extents: Extents,
    boundary: Boundary,
    t: f64,
}

#[test]
fn canonical_text_sorts_keys_at_every_level() {
    let sample = Sample {
        lattice: "square",
        extents: Extents { ny: 4, nx: 3 },
        boundary: Boundary::Open,
        t: 1.0,
    };
    let text = to_canonical_json_string(&sample).expect("canonical");
    assert_eq!(
        text,
        r#"{"boundary":"open","extents":{"nx":3,"ny":4},"lattice":"square","t":1.0}"#
    );
}

#[test]
fn hash_length_bounds_are_enforced() {
    let value = json!({"a": 1});
    for length in [0, 5, 33, 64] {
        let err = stable_hash(&value, length).expect_err("out of range");
        assert!(matches!(err, TbError::Validation(_)));
        assert_eq!(err.code(), "tb_core.hash_length");
    }
    for length in 6..=32 {
        let hash = stable_hash(&value, length).expect("in range");
        assert_eq!(hash.len(), length);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn truncation_is_a_prefix_of_the_full_digest() {
    let value = json!({"nx": 3, "ny": 3});
    let full = tb_core::full_digest(&value).expect("digest");
    assert_eq!(full.len(), 64);
    let short = stable_hash(&value, DEFAULT_HASH_LENGTH).expect("hash");
    assert!(full.starts_with(&short));
}

#[test]
fn single_field_mutations_change_the_hash() {
    let base = json!({"nx": 3, "ny": 3, "t": 1.0, "boundary": "open"});
    let base_hash = stable_hash(&base, DEFAULT_HASH_LENGTH).expect("hash");
    let mutations = [
        json!({"nx": 4, "ny": 3, "t": 1.0, "boundary": "open"}),
        json!({"nx": 3, "ny": 4, "t": 1.0, "boundary": "open"}),
        json!({"nx": 3, "ny": 3, "t": 1.5, "boundary": "open"}),
        json!({"nx": 3, "ny": 3, "t": 1.0, "boundary": "periodic"}),
    ];
    for mutated in mutations {
        assert_ne!(stable_hash(&mutated, DEFAULT_HASH_LENGTH).expect("hash"), base_hash);
    }
}

proptest! {
    #[test]
    fn insertion_order_never_changes_the_hash(
        entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i32>(), 1..12)
    ) {
        let forward: HashMap<String, i32> = entries.clone().into_iter().collect();
        let mut reversed = HashMap::new();
        for (key, value) in entries.into_iter().rev() {
            reversed.insert(key, value);
        }
        prop_assert_eq!(
            stable_hash(&forward, 16).unwrap(),
            stable_hash(&reversed, 16).unwrap()
        );
    }
}
