//! Choice sequences.
//!
//! A `Path` is the ordered list of choice ids taken from the root to some
//! point of the decision tree. A `DecisionTrace` additionally remembers the
//! branching width offered at each step, which the prefix cache needs to size
//! its child tables.

use std::fmt;

/// Identifier of one eligible choice at a decision point.
pub type Choice = i32;

/// Choice recorded on the root node (no edge leads into it).
pub const ROOT_CHOICE: Choice = -1;

/// Ordered sequence of choices from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    choices: Vec<Choice>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_choices(choices: Vec<Choice>) -> Self {
        Self { choices }
    }

    /// Number of choices on the path.
    #[inline]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Choice taken at `depth`, if the path is that long.
    #[inline]
    pub fn get(&self, depth: usize) -> Option<Choice> {
        self.choices.get(depth).copied()
    }

    pub fn push(&mut self, choice: Choice) {
        self.choices.push(choice);
    }

    pub fn pop(&mut self) -> Option<Choice> {
        self.choices.pop()
    }

    /// Returns true if `other` is a prefix of this path.
    ///
    /// Every path is a prefix of itself and the empty path is a prefix of
    /// every path.
    pub fn is_prefix(&self, other: &Path) -> bool {
        other.len() <= self.len() && self.choices[..other.len()] == other.choices[..]
    }

    pub fn as_slice(&self) -> &[Choice] {
        &self.choices
    }

    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.choices.iter().copied()
    }
}

impl From<Vec<Choice>> for Path {
    fn from(choices: Vec<Choice>) -> Self {
        Self::from_choices(choices)
    }
}

impl FromIterator<Choice> for Path {
    fn from_iter<I: IntoIterator<Item = Choice>>(iter: I) -> Self {
        Self {
            choices: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, choice) in self.choices.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", choice)?;
        }
        write!(f, "]")
    }
}

/// One step of a trace: the choice taken and how many choices the decision
/// point offered in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub choice: Choice,
    pub width: usize,
}

impl PathStep {
    pub fn new(choice: Choice, width: usize) -> Self {
        Self { choice, width }
    }
}

/// Decisions taken so far along the current sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionTrace {
    steps: Vec<PathStep>,
}

impl DecisionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, choice: Choice, width: usize) {
        self.steps.push(PathStep::new(choice, width));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Choice ids only, dropping the widths.
    pub fn path(&self) -> Path {
        self.steps.iter().map(|s| s.choice).collect()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

impl From<Vec<PathStep>> for DecisionTrace {
    fn from(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}
