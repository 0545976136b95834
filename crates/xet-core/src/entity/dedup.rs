use std::collections::HashMap;

use super::Entity;

/// Collapse entities sharing an id.
///
/// The kept variant is the one with a non-empty title, or a longer one when
/// both have titles. Output order is the first-seen order of each id.
pub fn unique_by_id(items: Vec<Entity>) -> Vec<Entity> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut best: Vec<Entity> = Vec::new();

    for item in items {
        if item.id.is_empty() {
            continue;
        }
        match index.get(&item.id) {
            None => {
                index.insert(item.id.clone(), best.len());
                best.push(item);
            }
            Some(&i) => {
                if item.title_len() > best[i].title_len() {
                    best[i] = item;
                }
            }
        }
    }
    best
}
