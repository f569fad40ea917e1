/// What the reader does with a structurally invalid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log and drop the malformed 4-line group; a truncated tail ends the stream.
    Skip,
    /// Return the first error to the caller, which aborts the sample.
    Return,
}

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub error_policy: ErrorPolicy,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Return,
        }
    }
}
