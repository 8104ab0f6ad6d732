use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use super::{Machine, Program, VmError};
use crate::{api::ExecutionOptions, organism::OrganismState};

/// The QBISA virtual machine.
///
/// Owns a program, the machine state it mutates and the random source used
/// by `QMEAS` and `MUTATE`. Execution requires `&mut self`, so one instance
/// cannot run concurrently; build one `Vm` per concurrent execution.
///
/// # Example
///
/// ```
/// use qbisa_core::{ExecutionOptions, Vm, compile};
///
/// let program = compile("QINIT QSUP PHI_CALC EVOLVE");
/// let mut vm = Vm::with_options(program, ExecutionOptions::default());
/// let state = vm.execute().unwrap();
/// assert_eq!(state.generation, 1);
/// assert_eq!(vm.machine().registers().len(), 1);
/// ```
pub struct Vm {
    program: Program,
    machine: Machine,
    rng: StdRng,
    options: ExecutionOptions,
}

impl Vm {
    /// Create a VM with default options and an entropy-seeded random source.
    #[cfg(feature = "std")]
    pub fn new(program: Program) -> Self {
        Self::with_options(program, ExecutionOptions::default())
    }

    pub fn with_options(program: Program, options: ExecutionOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => entropy_rng(),
        };
        Vm {
            program,
            machine: Machine::with_addressing(options.register_addressing),
            rng,
            options,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Replace the program while keeping the machine state.
    ///
    /// The next `execute()` runs the new program against the current stack,
    /// heap, registers and organism.
    pub fn load(&mut self, program: Program) -> Program {
        core::mem::replace(&mut self.program, program)
    }

    /// Run the program from offset 0 until `RET` at top level, the last
    /// cell dying, or the end of the program.
    ///
    /// Returns a snapshot of the organism state at termination. State is kept
    /// between calls, so executing again continues from the mutated organism.
    pub fn execute(&mut self) -> Result<OrganismState, VmError> {
        debug!(len = self.program.len(), "executing program");
        self.machine.start();

        let mut steps: usize = 0;
        while self.machine.is_running() && self.machine.pc() < self.program.len() {
            if let Some(limit) = self.options.max_steps {
                if steps >= limit {
                    debug!(limit, pc = self.machine.pc(), "step limit reached");
                    return Err(VmError::StepLimitExceeded { limit });
                }
            }
            let instruction = self.program.decode_at(self.machine.pc()).inspect_err(|e| {
                debug!(error = %e, "decode failed");
            })?;
            self.machine.step(instruction, &mut self.rng).inspect_err(|e| {
                debug!(error = %e, "execution failed");
            })?;
            steps += 1;
        }

        let organism = self.machine.organism();
        debug!(
            steps,
            generation = organism.generation,
            fitness = organism.fitness,
            "program finished"
        );
        Ok(organism.clone())
    }
}

#[cfg(feature = "std")]
fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

#[cfg(not(feature = "std"))]
fn entropy_rng() -> StdRng {
    tracing::warn!("no entropy source without the std feature; seeding with 0");
    StdRng::seed_from_u64(0)
}
