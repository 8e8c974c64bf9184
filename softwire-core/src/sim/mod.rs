//! Simulated open-drain bus
//!
//! A single-threaded model of an I2C bus with one slave attached. Each
//! line's level is the wired-AND of everything pulling on it: the master
//! (through [`SimLine`]), the [`SimSlave`], and injected faults. Every
//! level change is fed to the slave and to a passive monitor that records
//! [`WireEvent`]s.
//!
//! ```
//! use softwire_core::sim::{SimBus, SimSlave, WireEvent};
//! use softwire_core::{SoftI2c, Timing};
//!
//! let sim = SimBus::new(SimSlave::new(0x20));
//! let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());
//! assert_eq!(i2c.probe(0x20), Ok(true));
//! assert_eq!(
//!     sim.events().as_slice(),
//!     &[WireEvent::Start, WireEvent::ack(0x40), WireEvent::Stop]
//! );
//! ```

mod monitor;
mod slave;

use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use softwire_hal::OpenDrainLine;

pub use monitor::{WireEvent, MAX_EVENTS};
pub use slave::{SimSlave, MEMORY_SIZE};

use monitor::BusMonitor;

/// Bus signal selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Clock line
    Scl,
    /// Data line
    Sda,
}

struct SimState {
    /// Master has released SCL
    master_scl: bool,
    /// Master has released SDA
    master_sda: bool,
    /// Observed levels
    scl: bool,
    sda: bool,
    slave: SimSlave,
    monitor: BusMonitor,
    /// Clock samples the slave holds SCL low for at each acknowledge
    stretch_polls: u32,
    stretch_remaining: u32,
    stuck: Option<Signal>,
    elapsed_ns: u64,
}

impl SimState {
    fn scl_level(&self) -> bool {
        self.master_scl && self.stretch_remaining == 0 && self.stuck != Some(Signal::Scl)
    }

    fn sda_level(&self) -> bool {
        self.master_sda && !self.slave.holds_sda() && self.stuck != Some(Signal::Sda)
    }

    /// Propagate level changes until the bus is stable
    fn settle(&mut self) {
        loop {
            let scl = self.scl_level();
            let sda = self.sda_level();

            if scl != self.scl {
                self.scl = scl;
                if scl {
                    self.monitor.on_clock_rising(self.sda);
                    self.slave.on_clock_rising(self.sda);
                } else {
                    self.monitor.on_clock_falling();
                    if self.slave.on_clock_falling() {
                        self.stretch_remaining = self.stretch_polls;
                    }
                }
            } else if sda != self.sda {
                self.sda = sda;
                match (self.scl, sda) {
                    (true, false) => {
                        self.monitor.on_start();
                        self.slave.on_start();
                    }
                    (true, true) => {
                        self.monitor.on_stop();
                        self.slave.on_stop();
                    }
                    (false, _) => self.monitor.on_data_change(),
                }
            } else {
                break;
            }
        }
    }

    fn set_master(&mut self, signal: Signal, released: bool) {
        match signal {
            Signal::Scl => self.master_scl = released,
            Signal::Sda => self.master_sda = released,
        }
        self.settle();
    }

    fn sample(&mut self, signal: Signal) -> bool {
        match signal {
            Signal::Scl => {
                let level = self.scl;
                if self.stretch_remaining > 0 && self.master_scl {
                    self.stretch_remaining -= 1;
                    self.settle();
                }
                level
            }
            Signal::Sda => self.sda,
        }
    }
}

/// Simulated bus with one attached slave
pub struct SimBus {
    state: RefCell<SimState>,
}

impl SimBus {
    /// Create an idle bus (both lines high) with `slave` attached
    pub fn new(slave: SimSlave) -> Self {
        Self {
            state: RefCell::new(SimState {
                master_scl: true,
                master_sda: true,
                scl: true,
                sda: true,
                slave,
                monitor: BusMonitor::new(),
                stretch_polls: 0,
                stretch_remaining: 0,
                stuck: None,
                elapsed_ns: 0,
            }),
        }
    }

    /// Master-side handle to the clock line
    pub fn scl(&self) -> SimLine<'_> {
        SimLine {
            bus: self,
            signal: Signal::Scl,
        }
    }

    /// Master-side handle to the data line
    pub fn sda(&self) -> SimLine<'_> {
        SimLine {
            bus: self,
            signal: Signal::Sda,
        }
    }

    /// Delay provider that advances simulated time
    pub fn delay(&self) -> SimDelay<'_> {
        SimDelay { bus: self }
    }

    /// Make the slave hold SCL low for `polls` clock samples each time it
    /// acknowledges a byte
    pub fn set_clock_stretch(&self, polls: u32) {
        self.state.borrow_mut().stretch_polls = polls;
    }

    /// Pin a line low permanently (`Some`) or remove the fault (`None`)
    pub fn set_stuck(&self, stuck: Option<Signal>) {
        let mut state = self.state.borrow_mut();
        state.stuck = stuck;
        state.settle();
    }

    /// Events decoded since creation or the last [`clear_events`](Self::clear_events)
    pub fn events(&self) -> Vec<WireEvent, MAX_EVENTS> {
        let state = self.state.borrow();
        let mut events = Vec::new();
        // Same capacity on both sides
        let _ = events.extend_from_slice(state.monitor.events());
        events
    }

    /// Number of level transitions on either line
    pub fn edge_count(&self) -> u32 {
        self.state.borrow().monitor.edges()
    }

    /// Forget recorded events and edges
    pub fn clear_events(&self) {
        self.state.borrow_mut().monitor.clear();
    }

    /// Simulated time spent in delays
    pub fn elapsed_ns(&self) -> u64 {
        self.state.borrow().elapsed_ns
    }

    /// Current observed level of a line
    pub fn level(&self, signal: Signal) -> bool {
        let state = self.state.borrow();
        match signal {
            Signal::Scl => state.scl,
            Signal::Sda => state.sda,
        }
    }

    /// Inspect or modify the attached slave
    pub fn with_slave<R>(&self, f: impl FnOnce(&mut SimSlave) -> R) -> R {
        f(&mut self.state.borrow_mut().slave)
    }
}

/// Master's connection to one simulated line
#[derive(Clone, Copy)]
pub struct SimLine<'a> {
    bus: &'a SimBus,
    signal: Signal,
}

impl OpenDrainLine for SimLine<'_> {
    fn release(&mut self) {
        self.bus.state.borrow_mut().set_master(self.signal, true);
    }

    fn drive_low(&mut self) {
        self.bus.state.borrow_mut().set_master(self.signal, false);
    }

    fn is_high(&mut self) -> bool {
        self.bus.state.borrow_mut().sample(self.signal)
    }
}

impl embedded_hal::digital::ErrorType for SimLine<'_> {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for SimLine<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.release();
        Ok(())
    }
}

impl embedded_hal::digital::InputPin for SimLine<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(OpenDrainLine::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!OpenDrainLine::is_high(self))
    }
}

/// Delay that only advances the simulated clock
#[derive(Clone, Copy)]
pub struct SimDelay<'a> {
    bus: &'a SimBus,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.state.borrow_mut().elapsed_ns += u64::from(ns);
    }
}
