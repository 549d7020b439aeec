//! Config deep-merger for nested JSON-shaped trees
//!
//! Merging `incoming` into `base` runs three phases in order:
//!
//! 1. Structural merge. Objects present on both sides merge key by key,
//!    anything else in `incoming` replaces the base value.
//! 2. Leaf propagation. Every leaf written by `incoming` is recorded as a
//!    `(path, value)` pair and then written to every other place in the
//!    merged tree where the same key path occurs, including objects nested
//!    in arrays. Sibling branches that duplicate a sub-config stay in sync.
//! 3. Remap. For each `dest <- source` entry of the remap table, a value
//!    found at `source` in `incoming` overwrites `dest` in the result.
//!
//! Inputs are never mutated; the result is built from deep copies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Key matching mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    #[serde(default)]
    pub case_insensitive: bool,
}

impl MergeOptions {
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

/// One `dest <- source` pair of dot-delimited paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapEntry {
    pub dest: String,
    pub source: String,
}

impl RemapEntry {
    pub fn new(dest: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            source: source.into(),
        }
    }
}

/// Ordered remap table, applied after propagation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemapTable {
    entries: Vec<RemapEntry>,
}

impl RemapTable {
    pub fn new(entries: Vec<RemapEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RemapEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RemapEntry> for RemapTable {
    fn from_iter<I: IntoIterator<Item = RemapEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

type LeafUpdate = (Vec<String>, Value);

#[derive(Debug, Clone, Copy, Default)]
pub struct DeepMerger {
    options: MergeOptions,
}

impl DeepMerger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn merge(&self, base: &Value, incoming: &Value, remap: &RemapTable) -> Value {
        let mut merged = base.clone();

        if let Value::Object(src) = incoming {
            if let Some(dst) = merged.as_object_mut() {
                self.merge_objects(dst, src);
            } else if !src.is_empty() {
                merged = incoming.clone();
            }
        } else {
            merged = incoming.clone();
        }

        let mut updates = Vec::new();
        self.collect_leaves(&mut Vec::new(), incoming, &mut updates);
        for (path, value) in &updates {
            self.propagate(&mut merged, path, value);
        }

        let mut remapped = 0usize;
        for entry in remap.entries() {
            if let Some(value) = self.lookup(incoming, &entry.source) {
                if !value.is_null() {
                    self.assign(&mut merged, &entry.dest, value.clone());
                    remapped += 1;
                }
            }
        }

        debug!(
            leaf_updates = updates.len(),
            remapped,
            "Merged configuration trees"
        );
        merged
    }

    fn norm(&self, key: &str) -> String {
        if self.options.case_insensitive {
            key.to_lowercase()
        } else {
            key.to_string()
        }
    }

    /// Existing key in `map` matching `key` under the active normalization
    fn find_key(&self, map: &Map<String, Value>, key: &str) -> Option<String> {
        let wanted = self.norm(key);
        map.keys().find(|existing| self.norm(existing) == wanted).cloned()
    }

    fn merge_objects(&self, dst: &mut Map<String, Value>, src: &Map<String, Value>) {
        for (key, incoming) in src {
            let target = self.find_key(dst, key).unwrap_or_else(|| key.clone());
            if let (Some(Value::Object(existing)), Value::Object(nested)) =
                (dst.get_mut(&target), incoming)
            {
                self.merge_objects(existing, nested);
                continue;
            }
            dst.insert(target, incoming.clone());
        }
    }

    /// Every non-object value under `node`, with its normalized key path
    fn collect_leaves(&self, path: &mut Vec<String>, node: &Value, out: &mut Vec<LeafUpdate>) {
        match node {
            Value::Object(map) => {
                for (key, value) in map {
                    path.push(self.norm(key));
                    self.collect_leaves(path, value, out);
                    path.pop();
                }
            }
            leaf => {
                if !path.is_empty() {
                    out.push((path.clone(), leaf.clone()));
                }
            }
        }
    }

    /// Write `value` at every occurrence of `path` below `node`
    fn propagate(&self, node: &mut Value, path: &[String], value: &Value) {
        let (Value::Object(map), Some((head, tail))) = (node, path.split_first()) else {
            return;
        };

        for (key, child) in map.iter_mut() {
            if self.norm(key) == *head {
                if tail.is_empty() {
                    *child = value.clone();
                    continue;
                }
                self.propagate(child, tail, value);
            }
            if child.is_object() {
                self.propagate(child, path, value);
            } else if let Value::Array(items) = child {
                for item in items.iter_mut().filter(|item| item.is_object()) {
                    self.propagate(item, path, value);
                }
            }
        }
    }

    /// Value at a dot-delimited path, `None` when any segment is missing
    pub fn lookup<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(root, |node, segment| {
            let map = node.as_object()?;
            let key = self.find_key(map, segment)?;
            map.get(&key)
        })
    }

    /// Set a dot-delimited path, creating objects along the way
    pub fn assign(&self, root: &mut Value, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut node = root;
        for segment in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Some(map) = node.as_object_mut() else {
                return;
            };
            let key = self
                .find_key(map, segment)
                .unwrap_or_else(|| (*segment).to_string());
            node = map
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
        }

        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            let key = self.find_key(map, last).unwrap_or_else(|| (*last).to_string());
            map.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn merge(base: Value, incoming: Value) -> Value {
        DeepMerger::default().merge(&base, &incoming, &RemapTable::default())
    }

    #[test]
    fn test_structural_merge() {
        let merged = merge(
            json!({"a": {"x": 1, "y": 2}, "b": [1, 2], "c": "keep"}),
            json!({"a": {"y": 3, "z": 4}, "b": [9]}),
        );
        assert_eq!(
            merged,
            json!({"a": {"x": 1, "y": 3, "z": 4}, "b": [9], "c": "keep"})
        );
    }

    #[test]
    fn test_scalar_replaces_object_and_back() {
        let merged = merge(json!({"a": {"x": 1}, "b": 1}), json!({"a": 5, "b": {"y": 2}}));
        assert_eq!(merged, json!({"a": 5, "b": {"y": 2}}));
    }

    #[test]
    fn test_leaf_propagates_to_sibling_branches() {
        let base = json!({
            "params": {"alpha": 0.1},
            "brands": {
                "brand1": {"params": {"alpha": 0.1}},
                "brand2": {"params": {"alpha": 0.1, "beta": 2}}
            },
            "runs": [{"params": {"alpha": 0.1}}, "text"]
        });
        let merged = merge(base, json!({"params": {"alpha": 0.5}}));
        assert_eq!(merged["params"]["alpha"], json!(0.5));
        assert_eq!(merged["brands"]["brand1"]["params"]["alpha"], json!(0.5));
        assert_eq!(merged["brands"]["brand2"]["params"]["alpha"], json!(0.5));
        assert_eq!(merged["brands"]["brand2"]["params"]["beta"], json!(2));
        assert_eq!(merged["runs"][0]["params"]["alpha"], json!(0.5));
        assert_eq!(merged["runs"][1], json!("text"));
    }

    #[test]
    fn test_propagation_follows_the_full_incoming_path() {
        let base = json!({
            "brand1": {"params": {"alpha": 0.1}},
            "brand2": {"params": {"alpha": 0.1}}
        });
        let merged = merge(base, json!({"brand1": {"params": {"alpha": 0.5}}}));
        assert_eq!(merged["brand1"]["params"]["alpha"], json!(0.5));
        assert_eq!(merged["brand2"]["params"]["alpha"], json!(0.1));
    }

    #[test]
    fn test_propagation_matches_path_suffix_at_any_depth() {
        let base = json!({"top": {"alpha": 1}, "deep": {"nested": {"alpha": 1}}});
        let merged = merge(base, json!({"alpha": 7}));
        assert_eq!(merged["alpha"], json!(7));
        assert_eq!(merged["top"]["alpha"], json!(7));
        assert_eq!(merged["deep"]["nested"]["alpha"], json!(7));
    }

    #[test]
    fn test_case_insensitive_keys() {
        let merger = DeepMerger::new(MergeOptions::case_insensitive());
        let merged = merger.merge(
            &json!({"Model": {"Alpha": 1}, "nested": {"MODEL": {"alpha": 1}}}),
            &json!({"model": {"ALPHA": 2}}),
            &RemapTable::default(),
        );
        assert_eq!(
            merged,
            json!({"Model": {"Alpha": 2}, "nested": {"MODEL": {"alpha": 2}}})
        );
    }

    #[test]
    fn test_remap_copies_from_incoming() {
        let remap = RemapTable::new(vec![
            RemapEntry::new("model.n_months", "payload.occp_length"),
            RemapEntry::new("model.missing", "payload.absent"),
        ]);
        let merged = DeepMerger::default().merge(
            &json!({"model": {"n_months": 1}}),
            &json!({"payload": {"occp_length": 3}}),
            &remap,
        );
        assert_eq!(merged["model"]["n_months"], json!(3));
        assert!(merged["model"].get("missing").is_none());
    }

    #[test]
    fn test_assign_creates_intermediate_objects() {
        let merger = DeepMerger::default();
        let mut root = json!({"a": 1});
        merger.assign(&mut root, "a.b.c", json!(true));
        assert_eq!(root, json!({"a": {"b": {"c": true}}}));
        assert_eq!(merger.lookup(&root, "a.b.c"), Some(&json!(true)));
        assert_eq!(merger.lookup(&root, "a.x"), None);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let base = json!({"a": {"b": 1}, "c": {"b": 1}});
        let incoming = json!({"a": {"b": 2}});
        let base_copy = base.clone();
        let incoming_copy = incoming.clone();
        let _ = DeepMerger::default().merge(&base, &incoming, &RemapTable::default());
        assert_eq!(base, base_copy);
        assert_eq!(incoming, incoming_copy);
    }

    fn arb_tree() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                proptest::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
        .prop_map(|tree| match tree {
            Value::Object(_) => tree,
            other => json!({ "root": other }),
        })
    }

    proptest! {
        #[test]
        fn prop_empty_incoming_is_identity(base in arb_tree()) {
            let merged = merge(base.clone(), json!({}));
            prop_assert_eq!(merged, base);
        }

        #[test]
        fn prop_update_reaches_every_equal_location(
            branch in "[e-z]{1,3}",
            value in any::<i64>(),
            updated in any::<i64>(),
        ) {
            let base = json!({
                "shared": {"leaf": value},
                branch.clone(): {"shared": {"leaf": value}}
            });
            let merged = merge(base, json!({"shared": {"leaf": updated}}));
            prop_assert_eq!(&merged["shared"]["leaf"], &json!(updated));
            prop_assert_eq!(&merged[branch.as_str()]["shared"]["leaf"], &json!(updated));
        }
    }
}
