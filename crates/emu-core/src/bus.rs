//! Memory bus interface and the halt control event.

use thiserror::Error;

/// Raised by a bus read to stop execution immediately.
///
/// This is a control event, not a fault. The CPU propagates it out of the
/// current instruction without making any further bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("bus halted execution on read of ${address:04X}")]
pub struct Halt {
    /// Address whose read raised the halt.
    pub address: u16,
}

impl Halt {
    #[must_use]
    pub const fn at(address: u16) -> Self {
        Self { address }
    }
}

/// Memory bus interface.
///
/// The CPU reaches the 64K address space only through this trait, one byte
/// per call. Implementations must accept every 16-bit address.
pub trait Bus {
    /// Read a byte from the given address, or halt execution.
    fn read(&mut self, address: u16) -> Result<u8, Halt>;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn read(&mut self, address: u16) -> Result<u8, Halt> {
        (**self).read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        (**self).write(address, value);
    }
}

/// Flat 64KB RAM. Never halts.
#[derive(Clone)]
pub struct SimpleBus {
    ram: Box<[u8]>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimpleBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleBus").finish_non_exhaustive()
    }
}

impl SimpleBus {
    /// Create a zero-filled 64KB address space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x1_0000].into_boxed_slice(),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read memory without going through the bus contract.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    /// Whole address space as a slice (for dumps).
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.ram
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> Result<u8, Halt> {
        Ok(self.ram[address as usize])
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }
}

/// Wraps a bus and raises [`Halt`] whenever `predicate` accepts a read address.
///
/// Writes always pass through. The halting read never reaches the inner bus.
#[derive(Debug, Clone)]
pub struct HaltOn<B, P> {
    inner: B,
    predicate: P,
}

impl<B, P> HaltOn<B, P>
where
    B: Bus,
    P: FnMut(u16) -> bool,
{
    #[must_use]
    pub fn new(inner: B, predicate: P) -> Self {
        Self { inner, predicate }
    }

    #[must_use]
    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B, P> Bus for HaltOn<B, P>
where
    B: Bus,
    P: FnMut(u16) -> bool,
{
    fn read(&mut self, address: u16) -> Result<u8, Halt> {
        if (self.predicate)(address) {
            return Err(Halt::at(address));
        }
        self.inner.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.inner.write(address, value);
    }
}

/// Predicate that halts on reads of a single sentinel address.
///
/// `halt_at(0xFFFF)` is the usual harness convention: programs stop by
/// reading the top of the address space.
#[must_use]
pub fn halt_at(sentinel: u16) -> impl FnMut(u16) -> bool + Clone {
    move |address| address == sentinel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_bus_load_wraps() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFE, &[1, 2, 3]);
        assert_eq!(bus.peek(0xFFFE), 1);
        assert_eq!(bus.peek(0xFFFF), 2);
        assert_eq!(bus.peek(0x0000), 3);
    }

    #[test]
    fn halt_on_sentinel_only() {
        let mut bus = HaltOn::new(SimpleBus::new(), halt_at(0xFFFF));
        bus.write(0xFFFF, 0x42);
        assert_eq!(bus.read(0xFFFE), Ok(0));
        assert_eq!(bus.read(0xFFFF), Err(Halt::at(0xFFFF)));
        // The write still landed in the inner bus.
        assert_eq!(bus.inner().peek(0xFFFF), 0x42);
    }

    #[test]
    fn halt_on_custom_predicate() {
        let mut reads = 0;
        let mut bus = HaltOn::new(SimpleBus::new(), |addr: u16| {
            reads += 1;
            addr >= 0xD000
        });
        assert!(bus.read(0x1234).is_ok());
        assert_eq!(bus.read(0xD020), Err(Halt::at(0xD020)));
        assert_eq!(reads, 2);
    }

    #[test]
    fn halt_display_names_address() {
        assert_eq!(
            Halt::at(0xFFFF).to_string(),
            "bus halted execution on read of $FFFF"
        );
    }
}
