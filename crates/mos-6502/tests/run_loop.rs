//! End-to-end runs: budgets, the halt signal and stop/restart.

use emu_core::{Bus, Halt, HaltOn, Observable, SimpleBus, Value, halt_at};
use mos_6502::{Budget, Config, IllegalOpcodePolicy, Mos6502, StepError, StopReason};

const ORIGIN: u16 = 0xF000;
const BUDGET: Budget = Budget::Cycles(1_000_000);

type HaltingBus = HaltOn<SimpleBus, fn(u16) -> bool>;

fn sentinel(address: u16) -> bool {
    address == 0xFFFF
}

/// Load `program` at $F000 behind a bus that halts on reads of $FFFF.
fn machine(program: &[u8]) -> Mos6502<HaltingBus> {
    let mut ram = SimpleBus::new();
    ram.load(ORIGIN, program);
    let mut cpu = Mos6502::new(HaltOn::new(ram, sentinel as fn(u16) -> bool));
    cpu.set_pc(ORIGIN);
    cpu
}

#[test]
fn add_and_store_then_halt() {
    let mut cpu = machine(&[
        0xA9, 0x05, // LDA #$05
        0x69, 0x03, // ADC #$03
        0x85, 0x00, // STA $00
        0xAD, 0xFF, 0xFF, // LDA $FFFF
    ]);

    let mut cycles = 0;
    let outcome = cpu.run(BUDGET, &mut cycles);

    assert_eq!(outcome.reason, StopReason::Halted { address: 0xFFFF });
    assert_eq!(outcome.instructions, 3);
    assert_eq!(cycles, 2 + 2 + 3, "halting instruction adds no cycles");
    assert_eq!(cpu.a(), 0x08);
    assert!(!cpu.carry());
    assert!(!cpu.zero());
    assert!(!cpu.negative());
    assert_eq!(cpu.bus().inner().peek(0x0000), 0x08);
}

#[test]
fn inx_bne_loop_runs_256_times() {
    let mut cpu = machine(&[
        0xE8, // INX
        0xD0, 0xFD, // BNE -3
        0xAD, 0xFF, 0xFF, // LDA $FFFF
    ]);

    let mut cycles = 0;
    let outcome = cpu.run(BUDGET, &mut cycles);

    assert_eq!(outcome.reason, StopReason::Halted { address: 0xFFFF });
    assert_eq!(outcome.instructions, 512);
    assert_eq!(cycles, 256 * 2 + 255 * 3 + 2);
    assert_eq!(cpu.x(), 0);
    assert!(cpu.zero());
}

#[test]
fn zero_filled_memory_halts_through_brk_vector() {
    // Nothing loaded: $F000 is BRK, whose vector fetch reads $FFFF.
    let mut cpu = machine(&[]);
    cpu.set_sp(0xFF);

    let mut cycles = 0;
    let outcome = cpu.run(BUDGET, &mut cycles);

    assert_eq!(outcome.reason, StopReason::Halted { address: 0xFFFF });
    assert_eq!(cycles, 0);
    // Pushes and I happened before the halting read.
    assert_eq!(cpu.sp(), 0xFC);
    assert!(cpu.interrupt_disable());
    assert_eq!(cpu.bus().inner().peek(0x01FF), 0xF0);
    assert_eq!(cpu.bus().inner().peek(0x01FE), 0x02);
}

#[test]
fn cycle_counter_accumulates_across_runs() {
    let mut cpu = machine(&[0xEA; 16]);
    let mut cycles = 1_000;

    let first = cpu.run(Budget::Instructions(3), &mut cycles);
    assert_eq!(first.reason, StopReason::BudgetExhausted);
    assert_eq!(first.cycles, 1_006);

    // A spent budget stops the CPU; re-arm at the current PC.
    cpu.set_pc(cpu.pc());
    let second = cpu.run(Budget::Cycles(4), &mut cycles);
    assert_eq!(second.instructions, 2);
    assert_eq!(cycles, 1_010);
    assert_eq!(cpu.pc(), ORIGIN + 5);
}

#[test]
fn cycle_budget_overshoots_on_last_instruction() {
    // LDA $1234 (4 cycles) twice.
    let mut cpu = machine(&[0xAD, 0x34, 0x12, 0xAD, 0x34, 0x12]);
    let mut cycles = 0;

    let outcome = cpu.run(Budget::Cycles(5), &mut cycles);

    assert_eq!(outcome.reason, StopReason::BudgetExhausted);
    assert_eq!(outcome.instructions, 2);
    assert_eq!(cycles, 8);
}

#[test]
fn stopped_cpu_stays_stopped_until_pc_is_set() {
    let mut cpu = machine(&[0xAD, 0xFF, 0xFF, 0xE8]);
    let mut cycles = 0;

    cpu.run(BUDGET, &mut cycles);
    assert_eq!(cpu.pc(), 0xF003);

    let again = cpu.run(BUDGET, &mut cycles);
    assert_eq!(again.reason, StopReason::Halted { address: 0xFFFF });
    assert_eq!(again.instructions, 0);
    assert_eq!(cpu.step(), Err(StepError::Stopped));
    assert_eq!(cpu.query("halted"), Some(Value::Bool(true)));

    // Resume at the INX after the halting load.
    cpu.set_pc(0xF003);
    assert_eq!(cpu.step(), Ok(2));
    assert_eq!(cpu.x(), 1);
}

#[test]
fn reset_restarts_from_vector() {
    let mut ram = SimpleBus::new();
    ram.load(0xFFFC, &[0x00, 0xF0]);
    ram.load(0xF000, &[0xA2, 0x07, 0x02]); // LDX #$07; illegal
    let mut cpu = Mos6502::new(ram);
    cpu.reset().unwrap();

    let mut cycles = 0;
    let outcome = cpu.run(BUDGET, &mut cycles);
    assert_eq!(
        outcome.reason,
        StopReason::IllegalOpcode {
            opcode: 0x02,
            pc: 0xF002
        }
    );
    assert_eq!(cpu.pc(), 0xF002);

    cpu.reset().unwrap();
    assert_eq!(cpu.pc(), 0xF000);
    assert_eq!(cpu.x(), 0);
    assert!(cpu.stop_reason().is_none());
}

#[test]
fn illegal_opcodes_as_nops_run_to_budget() {
    let config = Config {
        illegal_opcodes: IllegalOpcodePolicy::Nop,
        ..Config::default()
    };
    let mut ram = SimpleBus::new();
    ram.load(0x0000, &[0x02; 8]);
    let mut cpu = Mos6502::with_config(ram, config);

    let mut cycles = 0;
    let outcome = cpu.run(Budget::Instructions(8), &mut cycles);

    assert_eq!(outcome.reason, StopReason::BudgetExhausted);
    assert_eq!(cycles, 16);
    assert_eq!(cpu.pc(), 8);
}

#[test]
fn custom_halt_predicate() {
    // Halt on any read of the I/O page instead of the sentinel.
    let mut ram = SimpleBus::new();
    ram.load(0x0200, &[0xA9, 0x01, 0x8D, 0x20, 0xD0, 0xAD, 0x20, 0xD0]);
    let bus = HaltOn::new(ram, |address: u16| (0xD000..0xE000).contains(&address));
    let mut cpu = Mos6502::new(bus);
    cpu.set_pc(0x0200);

    let mut cycles = 0;
    let outcome = cpu.run(BUDGET, &mut cycles);

    assert_eq!(outcome.reason, StopReason::Halted { address: 0xD020 });
    assert_eq!(cycles, 2 + 4, "writes pass through, the read halts");
    assert_eq!(cpu.bus().inner().peek(0xD020), 0x01);
}

#[test]
fn borrowed_bus() {
    let mut ram = SimpleBus::new();
    ram.load(0x0000, &[0xA9, 0x2A, 0x85, 0x80]);
    {
        let mut cpu = Mos6502::new(&mut ram);
        let mut cycles = 0;
        cpu.run(Budget::Instructions(2), &mut cycles);
        assert_eq!(cycles, 5);
    }
    assert_eq!(ram.peek(0x0080), 0x2A);
}

#[test]
fn spent_budget_needs_new_pc() {
    let mut cpu = machine(&[0xE8, 0xE8, 0xE8]); // INX x3
    let mut cycles = 0;

    let first = cpu.run(Budget::Instructions(1), &mut cycles);
    assert_eq!(first.reason, StopReason::BudgetExhausted);

    let again = cpu.run(Budget::Instructions(1), &mut cycles);
    assert_eq!(again.reason, StopReason::BudgetExhausted);
    assert_eq!(again.instructions, 0, "no code runs without a new PC");
    assert_eq!(cpu.step(), Err(StepError::Stopped));
    assert_eq!(cpu.x(), 1);
    assert_eq!(cpu.query("halted"), Some(Value::Bool(true)));

    cpu.set_pc(0xF001);
    let resumed = cpu.run(Budget::Instructions(2), &mut cycles);
    assert_eq!(resumed.instructions, 2);
    assert_eq!(cpu.x(), 3);
    assert_eq!(cycles, 6);
}

#[test]
fn halt_at_helper_matches_sentinel() {
    let mut bus = HaltOn::new(SimpleBus::new(), halt_at(0xFFFF));
    assert_eq!(bus.read(0xFFFF), Err(Halt::at(0xFFFF)));
    assert_eq!(bus.read(0xFFFE), Ok(0));
}

#[test]
fn nmi_handler_returns_to_interrupted_code() {
    let mut cpu = machine(&[
        0xE8, // INX                @ $F000
        0xE8, // INX                @ $F001
        0xAD, 0xFF, 0xFF, // LDA $FFFF  @ $F002
    ]);
    cpu.bus_mut().inner_mut().load(0xFFFA, &[0x00, 0x30]);
    cpu.bus_mut().inner_mut().load(0x3000, &[0xC8, 0x40]); // INY; RTI
    cpu.set_sp(0xFF);

    cpu.step().unwrap();
    cpu.nmi();

    let mut cycles = 0;
    let outcome = cpu.run(BUDGET, &mut cycles);

    assert_eq!(outcome.reason, StopReason::Halted { address: 0xFFFF });
    assert_eq!(cycles, 7 + 2 + 6 + 2);
    assert_eq!(cpu.x(), 2);
    assert_eq!(cpu.y(), 1);
    assert_eq!(cpu.sp(), 0xFF);
}
