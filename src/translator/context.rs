use super::label::Allocator;
use crate::error::Kind as ErrorKind;

/// State shared by all the commands translated in a single job
///
/// A new context must be created for each job, and passed to every translation call of that job
#[derive(Debug, Clone, Default)]
pub struct TranslationContext {
    /// Name of the translation unit being translated
    unit: String,
    /// Source line of the command being translated
    line: usize,
    /// Labels present in the output program
    labels: Allocator,
}

impl TranslationContext {
    /// Creates a new context for a job
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new context with the given label allocator state
    #[cfg(test)]
    pub(crate) fn with_labels(labels: Allocator) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    /// Starts translating a new translation unit
    ///
    /// # Parameters
    ///
    /// * `name`: name of the unit, used to scope its static variables
    pub fn begin_unit(&mut self, name: impl Into<String>) {
        self.unit = name.into();
        self.line = 0;
    }

    /// Sets the source line of the command about to be translated
    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    /// Gets the name of the current translation unit
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Gets the source line of the current command
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Creates a new label unique in the whole output program, scoped to the current unit and line
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::LabelsExhausted`] if there are no more labels available
    pub fn unique_label(&mut self, purpose: &str) -> Result<String, ErrorKind> {
        self.labels.allocate(&self.unit, self.line, purpose)
    }

    /// Registers a label declared by the user
    pub fn declare_label(&mut self, label: &str) {
        self.labels.declare(label);
    }

    /// Gets the labels present in the output program
    #[must_use]
    pub const fn labels(&self) -> &Allocator {
        &self.labels
    }
}
