//! Budgeted execution.

use emu_core::Bus;

use crate::Mos6502;

/// How much work `run` may do before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Stop once the cycle counter has advanced by at least this many
    /// cycles. The last instruction may overshoot.
    Cycles(u64),
    /// Stop after this many instructions.
    Instructions(u64),
}

/// Why execution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    BudgetExhausted,
    /// A bus read of `address` raised the halt signal.
    Halted { address: u16 },
    /// An undefined opcode under [`crate::IllegalOpcodePolicy::Stop`].
    IllegalOpcode { opcode: u8, pc: u16 },
}

/// Summary of one `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Final value of the caller's cycle counter.
    pub cycles: u64,
    /// Instructions (and interrupt entries) completed during this call.
    pub instructions: u64,
    pub reason: StopReason,
}

impl<B: Bus> Mos6502<B> {
    /// Run until the budget is spent or execution stops.
    ///
    /// `cycles` is the caller's running counter; it is only ever added to,
    /// saturating at `u64::MAX`. Every outcome leaves the CPU stopped,
    /// including a spent budget: resume with `set_pc` or `reset`. A CPU
    /// that has already stopped returns its stop reason immediately without
    /// touching the bus.
    ///
    /// ```
    /// use emu_core::{HaltOn, SimpleBus, halt_at};
    /// use mos_6502::{Budget, Mos6502, StopReason};
    ///
    /// let mut bus = SimpleBus::new();
    /// // INX; BNE -3; LDA $FFFF
    /// bus.load(0x0200, &[0xE8, 0xD0, 0xFD, 0xAD, 0xFF, 0xFF]);
    /// let mut cpu = Mos6502::new(HaltOn::new(bus, halt_at(0xFFFF)));
    /// cpu.set_pc(0x0200);
    ///
    /// let mut cycles = 0;
    /// let outcome = cpu.run(Budget::Cycles(1_000_000), &mut cycles);
    /// assert_eq!(outcome.reason, StopReason::Halted { address: 0xFFFF });
    /// assert_eq!(cycles, 1279);
    /// ```
    pub fn run(&mut self, budget: Budget, cycles: &mut u64) -> RunOutcome {
        let start = *cycles;
        let mut instructions = 0;

        let reason = loop {
            if let Some(reason) = self.stop_reason() {
                break reason;
            }
            let spent = match budget {
                // A saturated counter can no longer advance.
                Budget::Cycles(limit) => *cycles - start >= limit || *cycles == u64::MAX,
                Budget::Instructions(limit) => instructions >= limit,
            };
            if spent {
                self.stop(StopReason::BudgetExhausted);
                break StopReason::BudgetExhausted;
            }

            // On error step() records the stop reason; the next pass reports it.
            if let Ok(n) = self.step() {
                *cycles = cycles.saturating_add(u64::from(n));
                instructions += 1;
            }
        };

        log::debug!(
            "run stopped: {reason:?} after {instructions} instructions, {} cycles",
            *cycles - start
        );

        RunOutcome {
            cycles: *cycles,
            instructions,
            reason,
        }
    }
}
