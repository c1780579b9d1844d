use std::collections::HashSet;
use std::hash::Hash;

/// Removes repeated elements, keeping the first occurrence of each in order.
pub(crate) fn stable_unique<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Pushes `value` unless it is already present.
pub(crate) fn push_unique<T: PartialEq>(items: &mut Vec<T>, value: T) {
    if !items.contains(&value) {
        items.push(value);
    }
}
