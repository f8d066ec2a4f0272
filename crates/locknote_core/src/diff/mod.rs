//! Minimal list-update computation between two ordered snapshots.
//!
//! # Responsibility
//! - Match items by identity with the Myers O((N+M)·D) LCS algorithm.
//! - Turn the match into `Insert`/`Remove`/`Move`/`Change` operations that a
//!   renderer applies one after another.
//!
//! # Invariants
//! - Every position is valid for the list as it is when that operation is
//!   applied; applying all operations to `old` yields `new`.
//! - Operations are emitted walking both lists from the end, so untouched
//!   prefixes keep their original positions for as long as possible.
//! - Identity-equal items whose contents are equal produce no operation.

pub mod adapter;

use crate::model::note::Note;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// One rendering operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListUpdate {
    /// Insert `new[new_index]` at `position`.
    Insert { position: usize, new_index: usize },
    /// Remove the row at `position`.
    Remove { position: usize },
    /// Take the row at `from` out and put it back so it ends up at `to`.
    Move { from: usize, to: usize },
    /// Rebind the row at `position` to `new[new_index]`.
    Change { position: usize, new_index: usize },
}

/// Diffs two note snapshots: same item iff `id` matches, unchanged iff every
/// field matches.
pub fn diff_notes(old: &[Note], new: &[Note]) -> Vec<ListUpdate> {
    diff_by(old, new, |note| note.id)
}

/// Diffs two lists keyed by `key`; contents are compared with `PartialEq`.
pub fn diff_by<T, K, F>(old: &[T], new: &[T], key: F) -> Vec<ListUpdate>
where
    T: PartialEq,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let old_keys: Vec<K> = old.iter().map(&key).collect();
    let new_keys: Vec<K> = new.iter().map(&key).collect();
    let matches = myers_matches(&old_keys, &new_keys);
    let plan = MovePlan::new(&old_keys, &new_keys, &matches);

    let mut working: Vec<Slot> = (0..old.len()).map(Slot::Old).collect();
    let mut updates = Vec::new();

    let mut anchors = matches;
    anchors.push((old.len(), new.len()));

    for idx in (0..anchors.len()).rev() {
        let (anchor_x, anchor_y) = anchors[idx];
        let (gap_x, gap_y) = match idx.checked_sub(1) {
            Some(prev) => (anchors[prev].0 + 1, anchors[prev].1 + 1),
            None => (0, 0),
        };

        if anchor_x < old.len() && old[anchor_x] != new[anchor_y] {
            updates.push(ListUpdate::Change {
                position: position_of(&working, Slot::Old(anchor_x)),
                new_index: anchor_y,
            });
        }

        for x in (gap_x..anchor_x).rev() {
            if plan.moved_old[x] {
                continue;
            }
            let position = position_of(&working, Slot::Old(x));
            working.remove(position);
            updates.push(ListUpdate::Remove { position });
        }

        for y in (gap_y..anchor_y).rev() {
            let successor = match plan.slots_for_new.get(y + 1) {
                Some(slot) => position_of(&working, *slot),
                None => working.len(),
            };

            match plan.slots_for_new[y] {
                Slot::New(_) => {
                    working.insert(successor, Slot::New(y));
                    updates.push(ListUpdate::Insert {
                        position: successor,
                        new_index: y,
                    });
                }
                slot @ Slot::Old(x) => {
                    let from = position_of(&working, slot);
                    let to = if from < successor {
                        successor - 1
                    } else {
                        successor
                    };
                    if from != to {
                        working.remove(from);
                        working.insert(to, slot);
                        updates.push(ListUpdate::Move { from, to });
                    }
                    if old[x] != new[y] {
                        updates.push(ListUpdate::Change {
                            position: to,
                            new_index: y,
                        });
                    }
                }
            }
        }
    }

    updates
}

/// Replays `updates` on a copy of `old`.
///
/// Returns `None` when an operation does not fit the list it is applied to.
pub fn apply_updates<T: Clone>(old: &[T], new: &[T], updates: &[ListUpdate]) -> Option<Vec<T>> {
    let mut items = old.to_vec();
    for update in updates {
        match *update {
            ListUpdate::Insert {
                position,
                new_index,
            } => {
                if position > items.len() {
                    return None;
                }
                items.insert(position, new.get(new_index)?.clone());
            }
            ListUpdate::Remove { position } => {
                if position >= items.len() {
                    return None;
                }
                items.remove(position);
            }
            ListUpdate::Move { from, to } => {
                if from >= items.len() || to >= items.len() {
                    return None;
                }
                let item = items.remove(from);
                items.insert(to, item);
            }
            ListUpdate::Change {
                position,
                new_index,
            } => {
                *items.get_mut(position)? = new.get(new_index)?.clone();
            }
        }
    }
    Some(items)
}

/// Row identity while replaying: an original row or a freshly inserted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Old(usize),
    New(usize),
}

/// Where each `new` row comes from.
struct MovePlan {
    /// `Old(x)` for rows kept by the LCS or moved from `old[x]`, else `New(y)`.
    slots_for_new: Vec<Slot>,
    /// Old rows outside the LCS that reappear elsewhere in `new`.
    moved_old: Vec<bool>,
}

impl MovePlan {
    fn new<K: Eq + Hash>(old_keys: &[K], new_keys: &[K], matches: &[(usize, usize)]) -> Self {
        let mut slots_for_new: Vec<Slot> = (0..new_keys.len()).map(Slot::New).collect();
        let mut old_in_lcs = vec![false; old_keys.len()];
        for &(x, y) in matches {
            slots_for_new[y] = Slot::Old(x);
            old_in_lcs[x] = true;
        }

        let mut unmatched_new: HashMap<&K, VecDeque<usize>> = HashMap::new();
        for (y, key) in new_keys.iter().enumerate() {
            if matches!(slots_for_new[y], Slot::New(_)) {
                unmatched_new.entry(key).or_default().push_back(y);
            }
        }

        let mut moved_old = vec![false; old_keys.len()];
        for (x, key) in old_keys.iter().enumerate() {
            if old_in_lcs[x] {
                continue;
            }
            if let Some(y) = unmatched_new.get_mut(key).and_then(VecDeque::pop_front) {
                slots_for_new[y] = Slot::Old(x);
                moved_old[x] = true;
            }
        }

        Self {
            slots_for_new,
            moved_old,
        }
    }
}

fn position_of(working: &[Slot], slot: Slot) -> usize {
    working
        .iter()
        .position(|current| *current == slot)
        .unwrap_or(working.len())
}

/// Myers greedy shortest-edit-script search; returns LCS pairs `(old, new)`
/// in ascending order.
fn myers_matches<K: Eq>(old: &[K], new: &[K]) -> Vec<(usize, usize)> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }

    let offset = max + 1;
    let at = |k: isize| (k + offset) as usize;
    let mut frontier = vec![0_isize; (2 * max + 3) as usize];
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        trace.push(frontier.clone());
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && frontier[at(k - 1)] < frontier[at(k + 1)]) {
                frontier[at(k + 1)]
            } else {
                frontier[at(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            frontier[at(k)] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut matches = Vec::new();
    let (mut x, mut y) = (n, m);
    for (d, snapshot) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let prev_k = if k == -d || (k != d && snapshot[at(k - 1)] < snapshot[at(k + 1)]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = snapshot[at(prev_k)];
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            matches.push((x as usize, y as usize));
        }
        if d > 0 {
            x = prev_x;
            y = prev_y;
        }
    }
    matches.reverse();
    matches
}

#[cfg(test)]
mod tests {
    use super::{apply_updates, diff_by, diff_notes, myers_matches, ListUpdate};
    use crate::model::note::Note;

    fn note(id: i64, title: &str, timestamp: i64) -> Note {
        Note::with_timestamp(title, "body", timestamp).with_id(id)
    }

    fn assert_replays(old: &[char], new: &[char]) -> Vec<ListUpdate> {
        let updates = diff_by(old, new, |item| *item);
        let replayed = apply_updates(old, new, &updates).expect("updates fit");
        assert_eq!(replayed, new, "updates {updates:?}");
        updates
    }

    #[test]
    fn inserts_new_and_removes_missing_without_touching_unchanged() {
        let old = vec![note(1, "A", 1), note(2, "B", 2)];
        let new = vec![note(2, "B", 2), note(3, "C", 3)];

        let updates = diff_notes(&old, &new);
        assert_eq!(
            updates,
            vec![
                ListUpdate::Insert {
                    position: 2,
                    new_index: 1
                },
                ListUpdate::Remove { position: 0 },
            ]
        );
        assert_eq!(apply_updates(&old, &new, &updates), Some(new));
    }

    #[test]
    fn edited_note_yields_single_change() {
        let old = vec![note(1, "A", 1), note(2, "B", 2)];
        let mut new = old.clone();
        new[1].title = "B2".to_string();

        assert_eq!(
            diff_notes(&old, &new),
            vec![ListUpdate::Change {
                position: 1,
                new_index: 1
            }]
        );
    }

    #[test]
    fn edit_that_bumps_timestamp_moves_and_changes_row() {
        let old = vec![note(3, "C", 30), note(2, "B", 20), note(1, "A", 10)];
        let new = vec![note(1, "A edited", 40), note(3, "C", 30), note(2, "B", 20)];

        let updates = diff_notes(&old, &new);
        assert_eq!(
            updates,
            vec![
                ListUpdate::Move { from: 2, to: 0 },
                ListUpdate::Change {
                    position: 0,
                    new_index: 0
                },
            ]
        );
        assert_eq!(apply_updates(&old, &new, &updates), Some(new));
    }

    #[test]
    fn identical_lists_produce_no_updates() {
        let old = vec![note(1, "A", 1), note(2, "B", 2)];
        assert!(diff_notes(&old, &old.clone()).is_empty());
    }

    #[test]
    fn swap_is_a_single_move() {
        let updates = assert_replays(&['a', 'b'], &['b', 'a']);
        assert_eq!(updates.len(), 1);
        assert!(matches!(updates[0], ListUpdate::Move { .. }));
    }

    #[test]
    fn empty_edges_are_pure_inserts_or_removes() {
        let inserts = assert_replays(&[], &['a', 'b', 'c']);
        assert!(inserts
            .iter()
            .all(|update| matches!(update, ListUpdate::Insert { .. })));

        let removes = assert_replays(&['a', 'b', 'c'], &[]);
        assert_eq!(removes.len(), 3);
        assert!(removes
            .iter()
            .all(|update| matches!(update, ListUpdate::Remove { .. })));
    }

    #[test]
    fn mixed_edits_replay_to_new_list() {
        assert_replays(
            &['a', 'b', 'c', 'd', 'e', 'f'],
            &['f', 'b', 'x', 'd', 'a', 'y'],
        );
        assert_replays(&['a', 'b', 'c'], &['c', 'b', 'a']);
        assert_replays(&['a', 'b', 'c', 'd'], &['d', 'x', 'a', 'c']);
    }

    #[test]
    fn myers_finds_longest_common_subsequence() {
        let old: Vec<char> = "abcabba".chars().collect();
        let new: Vec<char> = "cbabac".chars().collect();
        let matches = myers_matches(&old, &new);
        assert_eq!(matches.len(), 4);
        assert!(matches.windows(2).all(|pair| pair[0].0 < pair[1].0 && pair[0].1 < pair[1].1));
        for (x, y) in matches {
            assert_eq!(old[x], new[y]);
        }
    }

    #[test]
    fn apply_updates_rejects_out_of_range_operations() {
        let result = apply_updates(&['a'], &['a'], &[ListUpdate::Remove { position: 3 }]);
        assert!(result.is_none());
    }
}
