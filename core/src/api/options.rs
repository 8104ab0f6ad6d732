//! Configuration options for the QBISA virtual machine.

/// How quantum instructions interpret their register-index operands.
///
/// The reference behavior decodes the index but always acts on the first
/// register. `Addressed` honors the operand instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegisterAddressing {
    /// `QSUP`/`QENT` always act on register 0.
    #[default]
    First,
    /// `QSUP`/`QENT` act on the registers named by their operands.
    Addressed,
}

/// Configuration options for program execution.
///
/// These options control randomness, resource limits and addressing
/// behavior during execution.
///
/// # Example
///
/// ```
/// use qbisa_core::api::{ExecutionOptions, RegisterAddressing};
///
/// let options = ExecutionOptions {
///     seed: Some(42),
///     max_steps: Some(10_000),
///     register_addressing: RegisterAddressing::Addressed,
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Seed for the random source used by `QMEAS` and `MUTATE`.
    ///
    /// `None` seeds from system entropy (requires the `std` feature; without
    /// it a fixed seed of 0 is used).
    ///
    /// Default: None
    pub seed: Option<u64>,

    /// Maximum number of instructions executed by one `execute()` call.
    ///
    /// Set to `None` for unlimited steps (jump cycles will never terminate!).
    ///
    /// Default: None
    pub max_steps: Option<usize>,

    /// Register addressing mode for quantum instructions.
    ///
    /// Default: `RegisterAddressing::First`
    pub register_addressing: RegisterAddressing,
}
