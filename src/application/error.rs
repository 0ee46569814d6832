// Errors surfaced by the machine use cases

#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("Lathe M{0} not found")]
    UnknownMachine(i64),

    #[error("No data found for Lathe M{0}")]
    EmptyWindow(i64),

    #[error("record source failed: {0:#}")]
    Source(#[from] anyhow::Error),
}

impl MachineError {
    /// Both "no collection" and "no records" read as not found to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MachineError::UnknownMachine(_) | MachineError::EmptyWindow(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MachineError::UnknownMachine(_) => "unknown_machine",
            MachineError::EmptyWindow(_) => "empty_window",
            MachineError::Source(_) => "source",
        }
    }
}
