use std::collections::HashSet;

use crate::error::Kind as ErrorKind;

/// Generator of unique label names. Tracks every label in the output program, both the ones
/// synthesized by the translator and the ones declared by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocator {
    /// Labels already present in the output program
    issued: HashSet<String>,
    /// Suffix of the next synthesized label
    counter: u32,
}

impl Allocator {
    /// Creates an allocator whose first synthesized label uses the given counter value
    #[cfg(test)]
    pub(crate) fn starting_at(counter: u32) -> Self {
        Self {
            issued: HashSet::new(),
            counter,
        }
    }

    /// Creates a new label with the form `<unit>_<line>_<purpose>_<counter>`, guaranteed to be
    /// different from all the labels previously issued or declared
    ///
    /// # Parameters
    ///
    /// * `unit`: name of the translation unit
    /// * `line`: source line of the command requesting the label
    /// * `purpose`: short description of what the label is used for
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::LabelsExhausted`] if the counter overflows
    pub fn allocate(
        &mut self,
        unit: &str,
        line: usize,
        purpose: &str,
    ) -> Result<String, ErrorKind> {
        loop {
            let n = self.counter;
            self.counter = n.checked_add(1).ok_or(ErrorKind::LabelsExhausted)?;
            let label = format!("{unit}_{line}_{purpose}_{n}");
            if self.issued.insert(label.clone()) {
                return Ok(label);
            }
        }
    }

    /// Registers a label declared by the user, so that no synthesized label collides with it.
    /// Returns whether the label wasn't present before
    ///
    /// # Parameters
    ///
    /// * `label`: name of the label
    pub fn declare(&mut self, label: &str) -> bool {
        self.issued.insert(label.to_owned())
    }

    /// Checks if a label is present in the output program
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.issued.contains(label)
    }

    /// Gets the amount of labels present in the output program
    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Checks if no label has been issued or declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::{Allocator, ErrorKind};

    #[test]
    fn allocate() {
        let mut labels = Allocator::default();
        assert_eq!(labels.allocate("Main", 3, "eq"), Ok("Main_3_eq_0".into()));
        assert_eq!(labels.allocate("Main", 3, "noteq"), Ok("Main_3_noteq_1".into()));
        assert_eq!(labels.allocate("Sys", 10, "return"), Ok("Sys_10_return_2".into()));
        assert_eq!(labels.len(), 3);
        assert!(labels.contains("Main_3_eq_0"));
    }

    #[test]
    fn skip_declared() {
        let mut labels = Allocator::default();
        assert!(labels.declare("Main_1_lt_0"));
        assert!(labels.declare("Main_1_lt_1"));
        assert!(!labels.declare("Main_1_lt_1"));
        assert_eq!(labels.allocate("Main", 1, "lt"), Ok("Main_1_lt_2".into()));
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn declared_after_allocation() {
        let mut labels = Allocator::default();
        let label = labels.allocate("Main", 1, "gt").unwrap();
        assert!(!labels.declare(&label));
    }

    #[test]
    fn exhausted() {
        let mut labels = Allocator::starting_at(u32::MAX - 1);
        let last = format!("A_1_x_{}", u32::MAX - 1);
        assert_eq!(labels.allocate("A", 1, "x"), Ok(last));
        assert_eq!(labels.allocate("A", 1, "x"), Err(ErrorKind::LabelsExhausted));
        assert_eq!(labels.allocate("A", 2, "y"), Err(ErrorKind::LabelsExhausted));
    }
}
