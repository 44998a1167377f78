//! Prefix cache of previously sampled paths.
//!
//! A trie keyed by choice id. Each node's child table is allocated lazily and
//! sized to the branching width of the decision point at that depth, so the
//! cache costs memory proportional to the explored part of the tree only.
//!
//! The cache lets the engine skip expensive recomputation (constraint
//! solving) on prefixes it has definitely executed before. Whether or not the
//! engine uses it must not change the logical outcome of a run.

use sampling_core::{Choice, Path, PathStep, ROOT_CHOICE};
use thiserror::Error;

const EMPTY: u32 = u32::MAX;

/// Errors that can occur when inserting into the trie.
#[derive(Debug, Error)]
pub enum TrieError {
    #[error("Choice {choice} at depth {depth} is outside the decision width {width}")]
    ChoiceOutOfRange {
        depth: usize,
        choice: Choice,
        width: usize,
    },

    #[error("Prefix trie node arena exhausted")]
    ArenaExhausted,
}

/// Index for the node stored at arena position `len`. `EMPTY` is reserved.
fn node_index(len: usize) -> Result<u32, TrieError> {
    u32::try_from(len)
        .ok()
        .filter(|&id| id != EMPTY)
        .ok_or(TrieError::ArenaExhausted)
}

#[derive(Debug, Clone)]
struct TrieNode {
    choice: Choice,
    // Back-reference only; used to rebuild paths from a node
    parent: u32,
    next: Option<Vec<u32>>,
    flagged: bool,
}

impl TrieNode {
    fn new(choice: Choice, parent: u32) -> Self {
        Self {
            choice,
            parent,
            next: None,
            flagged: false,
        }
    }
}

/// Trie of completed sample paths.
#[derive(Debug, Clone, Default)]
pub struct PrefixTrie {
    /// Arena of trie nodes; index 0 is the root once anything was added
    nodes: Vec<TrieNode>,
    flagged: usize,
    last_added: Option<u32>,
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a completed path and flag its final node.
    ///
    /// Intermediate nodes are created as needed. Re-adding a path that is
    /// already flagged leaves the flag count unchanged.
    pub fn add_path(&mut self, steps: &[PathStep]) -> Result<(), TrieError> {
        // Validate everything first so a bad step leaves the trie untouched
        for (depth, step) in steps.iter().enumerate() {
            if step.choice < 0 || step.choice as usize >= step.width {
                return Err(TrieError::ChoiceOutOfRange {
                    depth,
                    choice: step.choice,
                    width: step.width,
                });
            }
        }

        if self.nodes.is_empty() {
            self.allocate(TrieNode::new(ROOT_CHOICE, EMPTY))?;
        }

        let mut current = 0u32;
        for step in steps {
            let slot = step.choice as usize;
            let existing = {
                let next = self.nodes[current as usize]
                    .next
                    .get_or_insert_with(|| vec![EMPTY; step.width]);
                if next.len() < step.width {
                    next.resize(step.width, EMPTY);
                }
                next[slot]
            };

            current = if existing != EMPTY {
                existing
            } else {
                let id = self.allocate(TrieNode::new(step.choice, current))?;
                if let Some(next) = self.nodes[current as usize].next.as_mut() {
                    next[slot] = id;
                }
                id
            };
        }

        let node = &mut self.nodes[current as usize];
        if !node.flagged {
            node.flagged = true;
            self.flagged += 1;
        }
        self.last_added = Some(current);
        Ok(())
    }

    fn allocate(&mut self, node: TrieNode) -> Result<u32, TrieError> {
        let id = node_index(self.nodes.len())?;
        self.nodes.push(node);
        Ok(id)
    }

    /// True iff `path` was added before (exactly, not merely as a prefix).
    pub fn is_cached(&self, path: &Path) -> bool {
        self.find(path)
            .map(|id| self.nodes[id as usize].flagged)
            .unwrap_or(false)
    }

    /// True if `path` is a prefix of some added path (or an added path).
    pub fn contains_prefix(&self, path: &Path) -> bool {
        self.find(path).is_some()
    }

    fn find(&self, path: &Path) -> Option<u32> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut current = 0u32;
        for choice in path.iter() {
            if choice < 0 {
                return None;
            }
            let next = self.nodes[current as usize].next.as_ref()?;
            match next.get(choice as usize) {
                Some(&id) if id != EMPTY => current = id,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Path of the most recently added entry.
    pub fn last_added(&self) -> Option<Path> {
        let mut current = self.last_added?;
        let mut choices = Vec::new();
        while current != 0 {
            let node = &self.nodes[current as usize];
            choices.push(node.choice);
            current = node.parent;
        }
        choices.reverse();
        Some(Path::from_choices(choices))
    }

    /// Number of flagged (completed) paths.
    pub fn number_of_flagged(&self) -> usize {
        self.flagged
    }

    pub fn is_empty(&self) -> bool {
        self.flagged == 0
    }

    /// Number of trie nodes currently allocated.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop the whole structure.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.flagged = 0;
        self.last_added = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(choices: &[Choice], width: usize) -> Vec<PathStep> {
        choices.iter().map(|&c| PathStep::new(c, width)).collect()
    }

    fn count_flagged(trie: &PrefixTrie) -> usize {
        trie.nodes.iter().filter(|n| n.flagged).count()
    }

    #[test]
    fn test_empty_trie() {
        let trie = PrefixTrie::new();
        assert!(trie.is_empty());
        assert!(!trie.is_cached(&Path::new()));
        assert!(!trie.contains_prefix(&Path::new()));
        assert!(trie.last_added().is_none());
    }

    #[test]
    fn test_round_trip() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&steps(&[0, 1, 1], 2)).unwrap();

        assert!(trie.is_cached(&Path::from(vec![0, 1, 1])));
        assert_eq!(trie.number_of_flagged(), 1);
        assert_eq!(trie.last_added(), Some(Path::from(vec![0, 1, 1])));
    }

    #[test]
    fn test_prefixes_and_extensions_are_not_cached() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&steps(&[0, 1, 1], 2)).unwrap();

        for other in [vec![], vec![0], vec![0, 1], vec![0, 1, 1, 0], vec![1, 1, 1]] {
            assert!(!trie.is_cached(&Path::from(other)));
        }

        assert!(trie.contains_prefix(&Path::from(vec![0, 1])));
        assert!(!trie.contains_prefix(&Path::from(vec![1])));
        assert!(!trie.contains_prefix(&Path::from(vec![0, 5])));
        assert!(!trie.contains_prefix(&Path::from(vec![-1])));
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&steps(&[0, 0], 2)).unwrap();
        trie.add_path(&steps(&[0, 1], 2)).unwrap();

        // root + [0] + [0,0] + [0,1]
        assert_eq!(trie.node_count(), 4);
        assert!(trie.is_cached(&Path::from(vec![0, 0])));
        assert!(trie.is_cached(&Path::from(vec![0, 1])));
        assert!(!trie.is_cached(&Path::from(vec![0])));
    }

    #[test]
    fn test_flag_count_matches_flags() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&steps(&[1, 0], 2)).unwrap();
        trie.add_path(&steps(&[1, 0], 2)).unwrap();
        trie.add_path(&steps(&[1], 2)).unwrap();
        trie.add_path(&steps(&[2, 2, 2], 3)).unwrap();

        assert_eq!(trie.number_of_flagged(), 3);
        assert_eq!(trie.number_of_flagged(), count_flagged(&trie));
    }

    #[test]
    fn test_empty_path_flags_root() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&[]).unwrap();

        assert!(trie.is_cached(&Path::new()));
        assert_eq!(trie.last_added(), Some(Path::new()));
    }

    #[test]
    fn test_mixed_widths() {
        let mut trie = PrefixTrie::new();
        let path = vec![PathStep::new(2, 3), PathStep::new(0, 1), PathStep::new(4, 5)];
        trie.add_path(&path).unwrap();

        assert!(trie.is_cached(&Path::from(vec![2, 0, 4])));
        assert!(!trie.is_cached(&Path::from(vec![2, 0, 3])));
    }

    #[test]
    fn test_out_of_range_choice_rejected_without_mutation() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&steps(&[0], 2)).unwrap();
        let nodes_before = trie.node_count();

        let err = trie
            .add_path(&[PathStep::new(1, 2), PathStep::new(3, 2)])
            .unwrap_err();
        assert!(matches!(
            err,
            TrieError::ChoiceOutOfRange {
                depth: 1,
                choice: 3,
                width: 2
            }
        ));
        assert_eq!(trie.node_count(), nodes_before);
        assert_eq!(trie.number_of_flagged(), 1);
    }

    #[test]
    fn test_clear() {
        let mut trie = PrefixTrie::new();
        trie.add_path(&steps(&[0, 1], 2)).unwrap();
        trie.add_path(&steps(&[1, 1], 2)).unwrap();

        trie.clear();

        assert!(trie.is_empty());
        assert_eq!(trie.number_of_flagged(), 0);
        assert_eq!(trie.node_count(), 0);
        assert!(!trie.is_cached(&Path::from(vec![0, 1])));
        assert!(!trie.contains_prefix(&Path::new()));
        assert!(trie.last_added().is_none());

        // Usable again after clearing
        trie.add_path(&steps(&[1], 2)).unwrap();
        assert!(trie.is_cached(&Path::from(vec![1])));
    }

    #[test]
    fn test_node_index_reserves_empty_sentinel() {
        assert_eq!(node_index(0).unwrap(), 0);
        assert_eq!(node_index(EMPTY as usize - 1).unwrap(), EMPTY - 1);
        assert!(matches!(
            node_index(EMPTY as usize),
            Err(TrieError::ArenaExhausted)
        ));
    }
}
