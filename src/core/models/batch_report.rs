/// Outcome of a batch that ran to completion.
///
/// Aborted batches never produce a report; they surface the error
/// that stopped them instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub transferred: usize,
    pub skipped: usize,
}
