//! Property tests for the wire-level protocol
//!
//! Every transfer runs against the simulated bus; the monitor decodes what
//! actually appeared on the lines independently of the engine.

use proptest::prelude::*;
use softwire_core::sim::{SimBus, SimSlave, WireEvent, MEMORY_SIZE};
use softwire_core::wire::RX_BUFFER_LENGTH;
use softwire_core::{Error, RxBuffer, SoftI2c, Timing};

const SLAVE: u8 = 0x50;

fn other_address() -> impl Strategy<Value = u8> {
    (0u8..0x80).prop_filter("must not be the slave", |a| *a != SLAVE)
}

fn memory() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), MEMORY_SIZE)
}

proptest! {
    /// A fully acknowledged write is the address byte, the data, then STOP
    #[test]
    fn write_appears_on_the_wire(data in proptest::collection::vec(any::<u8>(), 1..24)) {
        let sim = SimBus::new(SimSlave::new(SLAVE));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        prop_assert_eq!(i2c.write(SLAVE, &data), Ok(()));

        let mut expected = vec![WireEvent::Start, WireEvent::ack(SLAVE << 1)];
        expected.extend(data.iter().map(|&b| WireEvent::ack(b)));
        expected.push(WireEvent::Stop);
        let events = sim.events();
        prop_assert_eq!(events.as_slice(), expected.as_slice());

        // first byte is the register pointer, the rest lands in memory
        let start = usize::from(data[0]);
        let stored = sim.with_slave(|s| {
            (0..data.len() - 1)
                .map(|i| s.memory()[(start + i) % MEMORY_SIZE])
                .collect::<Vec<_>>()
        });
        prop_assert_eq!(stored.as_slice(), &data[1..]);
    }

    /// Nothing follows a refused address byte except STOP
    #[test]
    fn address_nak_stops_immediately(
        address in other_address(),
        data in proptest::collection::vec(any::<u8>(), 0..8),
    ) {
        let sim = SimBus::new(SimSlave::new(SLAVE));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        let result = i2c.write(address, &data);
        if data.is_empty() {
            prop_assert_eq!(result, Ok(()));
            prop_assert!(sim.events().is_empty());
        } else {
            prop_assert_eq!(result, Err(Error::NoAckAddress));
            let events = sim.events();
            prop_assert_eq!(
                events.as_slice(),
                &[WireEvent::Start, WireEvent::nak(address << 1), WireEvent::Stop]
            );
        }
    }

    /// Reads ACK every byte but the last, which is NAKed
    #[test]
    fn read_ack_pattern(contents in memory(), pointer in any::<u8>(), count in 1usize..=16) {
        let sim = SimBus::new(SimSlave::new(SLAVE).with_memory(&contents));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        let mut buf = vec![0u8; count];
        prop_assert_eq!(i2c.write_read(SLAVE, &[pointer], &mut buf), Ok(count));

        let expected: Vec<u8> = (0..count)
            .map(|i| contents[(usize::from(pointer) + i) % MEMORY_SIZE])
            .collect();
        prop_assert_eq!(&buf, &expected);
        prop_assert_eq!(sim.with_slave(|s| (s.master_acks(), s.master_naks())), (count as u32 - 1, 1));

        let events = sim.events();
        let data_events = &events[5..events.len() - 1];
        for (i, event) in data_events.iter().enumerate() {
            let want = if i + 1 == count {
                WireEvent::nak(expected[i])
            } else {
                WireEvent::ack(expected[i])
            };
            prop_assert_eq!(event, &want);
        }
    }

    /// A data NAK reports exactly how many bytes got through
    #[test]
    fn data_nak_reports_written(
        data in proptest::collection::vec(any::<u8>(), 1..16),
        nak_at in 0usize..16,
    ) {
        let sim = SimBus::new(SimSlave::new(SLAVE).with_nak_at(nak_at));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

        let result = i2c.write(SLAVE, &data);
        if nak_at < data.len() {
            prop_assert_eq!(result, Err(Error::NoAckData { written: nak_at }));
        } else {
            prop_assert_eq!(result, Ok(()));
        }
        let events = sim.events();
        prop_assert_eq!(events.last(), Some(&WireEvent::Stop));
    }

    /// Clock stretching within the wait bound is invisible to the caller
    #[test]
    fn stretch_within_bound(stretch in 0u32..=64, data in proptest::collection::vec(any::<u8>(), 1..4)) {
        let sim = SimBus::new(SimSlave::new(SLAVE));
        sim.set_clock_stretch(stretch);
        let timing = Timing::default().with_max_wait_polls(64);
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);

        prop_assert_eq!(i2c.write(SLAVE, &data), Ok(()));
    }

    /// Stretching past the bound fails with BusStuck instead of hanging
    #[test]
    fn stretch_past_bound(stretch in 65u32..1_000) {
        let sim = SimBus::new(SimSlave::new(SLAVE));
        sim.set_clock_stretch(stretch);
        let timing = Timing::default().with_max_wait_polls(64);
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);

        prop_assert_eq!(i2c.probe(SLAVE), Err(Error::BusStuck));
    }

    /// The receive buffer holds min(count, capacity) bytes in order
    #[test]
    fn rx_buffer_request(contents in memory(), count in any::<u8>()) {
        let sim = SimBus::new(SimSlave::new(SLAVE).with_memory(&contents));
        let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());
        let mut rx: RxBuffer = RxBuffer::new();

        let stored = usize::from(count).min(RX_BUFFER_LENGTH);
        prop_assert_eq!(usize::from(rx.request(&mut i2c, SLAVE, count, true)), stored);
        prop_assert_eq!(usize::from(rx.available()), stored);

        for &byte in &contents[..stored] {
            prop_assert_eq!(rx.read_next(), Some(byte));
        }
        prop_assert_eq!(rx.available(), 0);
        prop_assert_eq!(rx.read_next(), None);
    }

    /// Every bit costs the same number of delays regardless of its value
    #[test]
    fn timing_is_data_independent(a in any::<u8>(), b in any::<u8>(), bit_delay_ns in 1u32..10_000) {
        let timing = Timing { bit_delay_ns, ..Timing::default() };

        let elapsed = |byte: u8| {
            let sim = SimBus::new(SimSlave::new(SLAVE));
            let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), timing);
            let _ = i2c.write(SLAVE, &[0x00, byte]);
            sim.elapsed_ns()
        };

        prop_assert_eq!(elapsed(a), elapsed(b));
    }
}

#[test]
fn read_from_absent_slave() {
    let sim = SimBus::new(SimSlave::new(SLAVE));
    let mut i2c = SoftI2c::new(sim.scl(), sim.sda(), sim.delay(), Timing::default());

    let mut buf = [0u8; 4];
    assert_eq!(i2c.read(0x2A, &mut buf), Err(Error::NoAckAddress));
    assert_eq!(
        sim.events().as_slice(),
        &[WireEvent::Start, WireEvent::nak(0x55), WireEvent::Stop]
    );
}
