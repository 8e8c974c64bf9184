//! Passive bus monitor
//!
//! Decodes what a logic analyzer clipped onto SCL/SDA would see: START
//! and STOP conditions, and 9-bit frames (8 data bits MSB first plus the
//! acknowledge bit) sampled on every rising clock edge.

use heapless::Vec;

/// Maximum number of recorded events
pub const MAX_EVENTS: usize = 128;

/// One decoded bus event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireEvent {
    /// SDA fell while SCL was high
    Start,
    /// SDA rose while SCL was high
    Stop,
    /// Eight data bits followed by the acknowledge bit
    Byte {
        /// Data bits, first sampled bit in the MSB
        value: u8,
        /// Acknowledge bit was low
        ack: bool,
    },
}

impl WireEvent {
    /// An acknowledged byte
    pub const fn ack(value: u8) -> Self {
        WireEvent::Byte { value, ack: true }
    }

    /// A byte followed by no-acknowledge
    pub const fn nak(value: u8) -> Self {
        WireEvent::Byte { value, ack: false }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BusMonitor {
    events: Vec<WireEvent, MAX_EVENTS>,
    /// Inside a START..STOP frame
    active: bool,
    bits: u8,
    shift: u16,
    /// Level transitions seen on either line
    edges: u32,
}

impl BusMonitor {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::new(),
            active: false,
            bits: 0,
            shift: 0,
            edges: 0,
        }
    }

    pub(crate) fn events(&self) -> &[WireEvent] {
        &self.events
    }

    pub(crate) fn edges(&self) -> u32 {
        self.edges
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.edges = 0;
    }

    fn record(&mut self, event: WireEvent) {
        // A full log only loses the tail; tests keep well below the limit
        let _ = self.events.push(event);
    }

    pub(crate) fn on_start(&mut self) {
        self.edges += 1;
        self.active = true;
        self.bits = 0;
        self.shift = 0;
        self.record(WireEvent::Start);
    }

    pub(crate) fn on_stop(&mut self) {
        self.edges += 1;
        self.active = false;
        self.record(WireEvent::Stop);
    }

    /// SDA changed while SCL was low
    pub(crate) fn on_data_change(&mut self) {
        self.edges += 1;
    }

    pub(crate) fn on_clock_rising(&mut self, sda: bool) {
        self.edges += 1;
        if !self.active {
            return;
        }
        self.shift = (self.shift << 1) | u16::from(sda);
        self.bits += 1;
        if self.bits == 9 {
            let value = (self.shift >> 1) as u8;
            let ack = self.shift & 1 == 0;
            self.record(WireEvent::Byte { value, ack });
            self.bits = 0;
            self.shift = 0;
        }
    }

    pub(crate) fn on_clock_falling(&mut self) {
        self.edges += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_byte(monitor: &mut BusMonitor, byte: u8, ack: bool) {
        for bit in (0..8).rev() {
            monitor.on_clock_rising(byte & (1 << bit) != 0);
            monitor.on_clock_falling();
        }
        monitor.on_clock_rising(!ack);
        monitor.on_clock_falling();
    }

    #[test]
    fn test_decodes_frame() {
        let mut monitor = BusMonitor::new();
        monitor.on_start();
        clock_byte(&mut monitor, 0xA0, true);
        clock_byte(&mut monitor, 0x5A, false);
        monitor.on_stop();

        assert_eq!(
            monitor.events(),
            &[
                WireEvent::Start,
                WireEvent::ack(0xA0),
                WireEvent::nak(0x5A),
                WireEvent::Stop
            ]
        );
    }

    #[test]
    fn test_ignores_clocks_outside_frame() {
        let mut monitor = BusMonitor::new();
        clock_byte(&mut monitor, 0xFF, true);
        assert!(monitor.events().is_empty());
        assert_eq!(monitor.edges(), 18);
    }

    #[test]
    fn test_repeated_start_discards_partial_bits() {
        let mut monitor = BusMonitor::new();
        monitor.on_start();
        monitor.on_clock_rising(true);
        monitor.on_start();
        clock_byte(&mut monitor, 0xA1, true);

        assert_eq!(
            monitor.events(),
            &[WireEvent::Start, WireEvent::Start, WireEvent::ack(0xA1)]
        );
    }
}
