mod interaction;
mod shell;

pub use interaction::{AxiomViolation, InteractionOutcome, PairFinding, ShellInteraction};
pub use shell::ValidateShell;
