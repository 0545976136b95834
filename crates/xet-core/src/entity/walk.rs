use serde_json::{Map, Value};

use super::Entity;
use crate::urls::is_prefixed_id;

/// Keys that may hold an entity id, checked in order.
pub const ID_KEYS: &[&str] = &["id", "resource_id", "spu_id", "src_id", "rid"];

/// Keys that may hold a display name, checked in order.
pub const TITLE_KEYS: &[&str] = &[
    "title",
    "product_name",
    "name",
    "resource_title",
    "course_title",
];

/// Entities found by one walk plus how much of the tree was cut off.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub entities: Vec<Entity>,
    /// Containers at `max_depth` whose children were not visited.
    pub truncated: usize,
}

/// Scan `root` for objects whose id is one of `prefixes` followed by word
/// characters. Anything else under an id key is not an entity.
///
/// Iterative depth-first traversal: entities come out in document
/// pre-order, and containers deeper than `max_depth` are skipped instead of
/// recursed into.
pub fn walk_entities(root: &Value, prefixes: &[&str], max_depth: usize) -> WalkOutcome {
    let mut out = WalkOutcome::default();
    let mut stack: Vec<(&Value, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        let children: Vec<&Value> = match node {
            Value::Object(map) => {
                if let Some(entity) = entity_from_object(map, prefixes) {
                    out.entities.push(entity);
                }
                map.values().filter(|v| is_container(v)).collect()
            }
            Value::Array(items) => items.iter().filter(|v| is_container(v)).collect(),
            _ => continue,
        };
        if children.is_empty() {
            continue;
        }
        if depth >= max_depth {
            out.truncated += 1;
            continue;
        }
        // Reversed so the first child is popped first.
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }

    if out.truncated > 0 {
        tracing::debug!(truncated = out.truncated, max_depth, "entity walk hit depth cap");
    }
    out
}

fn is_container(v: &Value) -> bool {
    matches!(v, Value::Object(_) | Value::Array(_))
}

fn entity_from_object(map: &Map<String, Value>, prefixes: &[&str]) -> Option<Entity> {
    let id = ID_KEYS.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .filter(|v| is_prefixed_id(v, prefixes))
    })?;
    let title = TITLE_KEYS.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    });
    Some(Entity {
        id: id.to_string(),
        title: title.map(str::to_string),
        raw: Value::Object(map.clone()),
    })
}
