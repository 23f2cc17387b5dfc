//! Single-element list moves and the selection-index repair that must
//! follow every structural change to the project list.
//!
//! The selection is `Option<usize>`; after any of these rules it is either
//! `None` or a valid index into the list.

/// Move the element at `from` to position `to`, shifting the elements in
/// between by one. Returns `false` (list untouched) when either index is out
/// of range or `from == to`.
pub fn reorder<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let picked = list.remove(from);
    list.insert(to, picked);
    true
}

/// Selection after removing the item at `removed`; `new_len` is the list
/// length after removal.
pub fn after_delete(active: Option<usize>, removed: usize, new_len: usize) -> Option<usize> {
    if new_len == 0 {
        return None;
    }
    match active {
        Some(a) if a > removed => Some(a - 1),
        // The slot's new occupant (or the head of the list) takes over
        Some(a) if a == removed => Some(0),
        other => other,
    }
}

/// Selection after a successful `reorder(list, from, to)`.
pub fn after_move(active: Option<usize>, from: usize, to: usize) -> Option<usize> {
    let a = active?;
    Some(if a == from {
        to
    } else if from < a && a <= to {
        a - 1
    } else if to <= a && a < from {
        a + 1
    } else {
        a
    })
}

/// Selection after appending to a list that had `old_len` items.
pub fn after_append(active: Option<usize>, old_len: usize) -> Option<usize> {
    active.or(Some(old_len))
}

/// Whether `active` is `None` or points into a list of `len` items.
pub fn selection_valid(active: Option<usize>, len: usize) -> bool {
    active.is_none_or(|a| a < len)
}
