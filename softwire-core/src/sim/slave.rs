//! Simulated slave device
//!
//! Behaves like a small 24Cxx-style EEPROM: the first byte of a write
//! sets the register pointer, further bytes are stored at the pointer,
//! reads return bytes from the pointer. The pointer auto-increments and
//! wraps at the end of memory.

/// Size of the simulated memory
pub const MEMORY_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for START
    Idle,
    /// Shifting in a byte from the master
    Receive { address: bool, bits: u8, value: u8 },
    /// Driving our acknowledge bit during the 9th clock
    AckOut { ack: bool, read: bool },
    /// Shifting a byte out to the master
    Transmit { bits: u8, value: u8 },
    /// Sampling the master's acknowledge bit
    AckIn { acked: bool },
    /// Not addressed, or the master ended the read; wait for START/STOP
    Ignore,
}

/// Simulated I2C slave
#[derive(Debug, Clone)]
pub struct SimSlave {
    address: u8,
    memory: [u8; MEMORY_SIZE],
    pointer: u8,
    phase: Phase,
    sda_low: bool,
    /// Data bytes accepted in the current write transfer
    data_index: usize,
    nak_data_at: Option<usize>,
    master_acks: u32,
    master_naks: u32,
}

impl SimSlave {
    /// Create a slave answering to a 7-bit address, memory zeroed
    pub fn new(address: u8) -> Self {
        Self {
            address,
            memory: [0; MEMORY_SIZE],
            pointer: 0,
            phase: Phase::Idle,
            sda_low: false,
            data_index: 0,
            nak_data_at: None,
            master_acks: 0,
            master_naks: 0,
        }
    }

    /// Preload memory starting at offset 0
    pub fn with_memory(mut self, contents: &[u8]) -> Self {
        for (cell, &byte) in self.memory.iter_mut().zip(contents) {
            *cell = byte;
        }
        self
    }

    /// Refuse the data byte at `index` (0-based) of every write transfer
    ///
    /// Index 0 is the register pointer byte.
    pub fn with_nak_at(mut self, index: usize) -> Self {
        self.nak_data_at = Some(index);
        self
    }

    /// Address this slave answers to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current register pointer
    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    /// Simulated memory
    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    /// Acknowledges the master sent after bytes we transmitted
    pub fn master_acks(&self) -> u32 {
        self.master_acks
    }

    /// No-acknowledges the master sent after bytes we transmitted
    pub fn master_naks(&self) -> u32 {
        self.master_naks
    }

    /// Whether the slave is pulling SDA low right now
    pub(crate) fn holds_sda(&self) -> bool {
        self.sda_low
    }

    pub(crate) fn on_start(&mut self) {
        self.phase = Phase::Receive {
            address: true,
            bits: 0,
            value: 0,
        };
        self.sda_low = false;
        self.data_index = 0;
    }

    pub(crate) fn on_stop(&mut self) {
        self.phase = Phase::Idle;
        self.sda_low = false;
    }

    pub(crate) fn on_clock_rising(&mut self, sda: bool) {
        match &mut self.phase {
            Phase::Receive { bits, value, .. } if *bits < 8 => {
                *value = (*value << 1) | u8::from(sda);
                *bits += 1;
            }
            Phase::AckIn { acked } => *acked = !sda,
            _ => {}
        }
    }

    /// Returns `true` when the slave has just started driving an
    /// acknowledge bit, the moment a slow device would stretch the clock
    pub(crate) fn on_clock_falling(&mut self) -> bool {
        match self.phase {
            Phase::Receive {
                address,
                bits: 8,
                value,
            } => {
                let (ack, read) = if address {
                    (value >> 1 == self.address, value & 1 == 1)
                } else {
                    (self.accept(value), false)
                };
                self.phase = Phase::AckOut { ack, read };
                self.sda_low = ack;
                ack
            }
            Phase::AckOut { ack: false, .. } => {
                self.phase = Phase::Ignore;
                self.sda_low = false;
                false
            }
            Phase::AckOut { ack: true, read } => {
                if read {
                    self.load_next();
                } else {
                    self.phase = Phase::Receive {
                        address: false,
                        bits: 0,
                        value: 0,
                    };
                    self.sda_low = false;
                }
                false
            }
            Phase::Transmit { bits, value } => {
                let bits = bits + 1;
                if bits == 8 {
                    self.phase = Phase::AckIn { acked: false };
                    self.sda_low = false;
                } else {
                    self.phase = Phase::Transmit { bits, value };
                    self.sda_low = (value << bits) & 0x80 == 0;
                }
                false
            }
            Phase::AckIn { acked } => {
                if acked {
                    self.master_acks += 1;
                    self.load_next();
                } else {
                    self.master_naks += 1;
                    self.phase = Phase::Ignore;
                    self.sda_low = false;
                }
                false
            }
            Phase::Idle | Phase::Receive { .. } | Phase::Ignore => false,
        }
    }

    /// Handle a received data byte; returns whether it is acknowledged
    fn accept(&mut self, byte: u8) -> bool {
        let index = self.data_index;
        if self.nak_data_at == Some(index) {
            return false;
        }
        if index == 0 {
            self.pointer = byte;
        } else {
            self.memory[usize::from(self.pointer)] = byte;
            self.pointer = self.pointer.wrapping_add(1);
        }
        self.data_index += 1;
        true
    }

    /// Fetch the byte at the pointer and put its MSB on SDA
    fn load_next(&mut self) {
        let value = self.memory[usize::from(self.pointer)];
        self.pointer = self.pointer.wrapping_add(1);
        self.phase = Phase::Transmit { bits: 0, value };
        self.sda_low = value & 0x80 == 0;
    }
}
