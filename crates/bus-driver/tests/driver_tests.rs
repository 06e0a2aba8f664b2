use std::sync::{Arc, Mutex};

use bus_driver::{
    BusConfig, BusDriver, BusError, BusFactory, BusMode, InitError,
    RegisterValue, RegisterWidth,
};
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::i2c::I2c;

// ---------------------------------------------------------------------------
// Mock bus and factory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Write(u8, Vec<u8>),
    Read(u8, usize),
}

/// Shared view of everything that happened on the wire.
#[derive(Clone, Default)]
struct Wire {
    ops: Arc<Mutex<Vec<Op>>>,
    /// Bytes handed back by reads, in order.
    response: Arc<Mutex<Vec<u8>>>,
    /// Device address that NAKs every transfer.
    dead_address: Arc<Mutex<Option<u8>>>,
    recovered: Arc<Mutex<usize>>,
}

impl Wire {
    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }
}

struct MockBus {
    wire: Wire,
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if *self.wire.dead_address.lock().unwrap() == Some(address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.wire.ops.lock().unwrap().push(Op::Write(address, bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    let mut response = self.wire.response.lock().unwrap();
                    for b in buf.iter_mut() {
                        *b = if response.is_empty() { 0 } else { response.remove(0) };
                    }
                    self.wire.ops.lock().unwrap().push(Op::Read(address, buf.len()));
                }
            }
        }
        Ok(())
    }
}

struct MockResources {
    wire: Wire,
    install_fails: bool,
}

struct MockDestructor {
    wire: Wire,
    install_fails: bool,
}

#[derive(Debug, PartialEq)]
struct MockError;

struct MockFactory;

impl BusFactory for MockFactory {
    type Bus = MockBus;
    type Resources = MockResources;
    type Destructor = MockDestructor;
    type Error = MockError;

    fn create(
        resources: Self::Resources,
        config: &BusConfig,
    ) -> Result<(Self::Bus, Self::Destructor), (InitError<Self::Error>, Self::Resources)>
    {
        if config.mode == BusMode::Target || config.frequency_hz == 0 {
            return Err((InitError::Config(MockError), resources));
        }
        if config.frequency_hz == 1 {
            panic!("peripheral bring-up panicked");
        }
        if resources.install_fails {
            return Err((InitError::Install(MockError), resources));
        }
        let bus = MockBus { wire: resources.wire.clone() };
        let destructor = MockDestructor {
            wire: resources.wire,
            install_fails: resources.install_fails,
        };
        Ok((bus, destructor))
    }

    fn recover(destructor: Self::Destructor) -> Self::Resources {
        *destructor.wire.recovered.lock().unwrap() += 1;
        MockResources {
            wire: destructor.wire,
            install_fails: destructor.install_fails,
        }
    }
}

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn make_driver(install_fails: bool) -> (BusDriver<NoopRawMutex, MockFactory>, Wire) {
    let wire = Wire::default();
    let resources = MockResources { wire: wire.clone(), install_fails };
    (BusDriver::new(resources), wire)
}

fn fast_config() -> BusConfig {
    BusConfig::new(100_000).with_settle_delay(Duration::from_millis(5))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn operations_before_init_are_rejected() {
    let (driver, wire) = make_driver(false);

    let write = driver.write_register(0x70, 0x21, RegisterValue::U8(0)).await;
    assert_eq!(write, Err(BusError::NotInitialized));
    let read = driver.read_register(0x70, 0x00, RegisterWidth::U8).await;
    assert_eq!(read, Err(BusError::NotInitialized));
    assert!(wire.ops().is_empty());
    assert_eq!(driver.is_initialized(), Some(false));
}

#[futures_test::test]
async fn write_u8_sends_register_then_payload() {
    let (driver, wire) = make_driver(false);
    driver.init(fast_config()).await.unwrap();

    driver.write_register(0x70, 0xE7, RegisterValue::U8(0xFF)).await.unwrap();

    assert_eq!(wire.ops(), vec![Op::Write(0x70, vec![0xE7, 0xFF])]);
}

#[futures_test::test]
async fn wide_writes_are_msb_first() {
    let (driver, wire) = make_driver(false);
    driver.init(fast_config()).await.unwrap();

    driver.write_register(0x40, 0x10, RegisterValue::U16(0xABCD)).await.unwrap();
    driver.write_register(0x40, 0x11, RegisterValue::U24(0x12_3456)).await.unwrap();

    assert_eq!(
        wire.ops(),
        vec![
            Op::Write(0x40, vec![0x10, 0xAB, 0xCD]),
            Op::Write(0x40, vec![0x11, 0x12, 0x34, 0x56]),
        ]
    );
}

#[futures_test::test]
async fn read_selects_register_waits_then_reads() {
    let (driver, wire) = make_driver(false);
    driver
        .init(BusConfig::new(100_000).with_settle_delay(Duration::from_millis(30)))
        .await
        .unwrap();
    wire.response.lock().unwrap().extend([0x34, 0x12, 0x7F]);

    let start = Instant::now();
    let wide = driver.read_register(0x48, 0x02, RegisterWidth::U16).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(30));
    let narrow = driver.read_register(0x48, 0x03, RegisterWidth::U8).await.unwrap();

    // First byte on the wire is the low byte.
    assert_eq!(wide, 0x1234);
    assert_eq!(narrow, 0x7F);
    assert_eq!(
        wire.ops(),
        vec![
            Op::Write(0x48, vec![0x02]),
            Op::Read(0x48, 2),
            Op::Write(0x48, vec![0x03]),
            Op::Read(0x48, 1),
        ]
    );
}

#[futures_test::test]
async fn failed_transaction_is_reported_not_retried() {
    let (driver, wire) = make_driver(false);
    driver.init(fast_config()).await.unwrap();
    *wire.dead_address.lock().unwrap() = Some(0x71);

    let result = driver.write_register(0x71, 0x00, RegisterValue::U8(1)).await;
    assert_eq!(
        result,
        Err(BusError::Fail(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)))
    );
    assert!(wire.ops().is_empty());

    // The bus stays usable for other devices.
    driver.write_register(0x70, 0x00, RegisterValue::U8(1)).await.unwrap();
    assert_eq!(wire.ops(), vec![Op::Write(0x70, vec![0x00, 0x01])]);
}

#[futures_test::test]
async fn init_config_error_preserves_resources() {
    let (driver, wire) = make_driver(false);

    let mut config = fast_config();
    config.mode = BusMode::Target;
    assert_eq!(driver.init(config).await, Err(BusError::Config(MockError)));
    assert_eq!(driver.is_initialized(), Some(false));

    // Retry with a valid configuration succeeds.
    driver.init(fast_config()).await.unwrap();
    driver.write_register(0x70, 0x21, RegisterValue::U8(0)).await.unwrap();
    assert_eq!(wire.ops().len(), 1);
}

#[futures_test::test]
async fn init_install_error_is_reported() {
    let (driver, _) = make_driver(true);

    assert_eq!(driver.init(fast_config()).await, Err(BusError::Install(MockError)));
    assert_eq!(driver.is_initialized(), Some(false));
}

#[futures_test::test]
async fn init_is_idempotent() {
    let (driver, wire) = make_driver(false);

    driver.init(fast_config()).await.unwrap();
    driver.init(fast_config()).await.unwrap();
    assert_eq!(driver.is_initialized(), Some(true));
    assert_eq!(*wire.recovered.lock().unwrap(), 0);
}

#[futures_test::test]
async fn deinit_recovers_resources_and_blocks_transactions() {
    let (driver, wire) = make_driver(false);

    // Idle deinit is a no-op.
    driver.deinit().await.unwrap();
    assert_eq!(*wire.recovered.lock().unwrap(), 0);

    driver.init(fast_config()).await.unwrap();
    driver.deinit().await.unwrap();
    assert_eq!(*wire.recovered.lock().unwrap(), 1);
    assert_eq!(
        driver.write_register(0x70, 0x00, RegisterValue::U8(0)).await,
        Err(BusError::NotInitialized)
    );

    // A second cycle works.
    driver.init(fast_config()).await.unwrap();
    driver.write_register(0x70, 0x00, RegisterValue::U8(0)).await.unwrap();
    assert_eq!(wire.ops().len(), 1);
}

#[futures_test::test]
async fn contention_blocks_until_session_released() {
    let (driver, wire) = make_driver(false);
    driver.init(fast_config()).await.unwrap();

    let holder = async {
        let mut session = driver.session().await.unwrap();
        session.write_register(0x70, 0x00, RegisterValue::U8(1)).await.unwrap();
        Timer::after_millis(20).await;
        session.write_register(0x70, 0x02, RegisterValue::U8(2)).await.unwrap();
    };
    let waiter = async {
        // Let the holder take the bus first.
        Timer::after_millis(5).await;
        driver.write_register(0x71, 0x00, RegisterValue::U8(3)).await.unwrap();
    };
    join(holder, waiter).await;

    assert_eq!(
        wire.ops(),
        vec![
            Op::Write(0x70, vec![0x00, 0x01]),
            Op::Write(0x70, vec![0x02, 0x02]),
            Op::Write(0x71, vec![0x00, 0x03]),
        ]
    );
}

#[futures_test::test]
async fn bounded_wait_times_out_under_contention() {
    let (driver, wire) = make_driver(false);
    driver
        .init(fast_config().with_lock_timeout(Duration::from_millis(10)))
        .await
        .unwrap();
    assert_eq!(driver.lock_timeout(), Some(Duration::from_millis(10)));

    let _held = driver.session().await.unwrap();
    let start = Instant::now();
    let result = driver.write_register(0x70, 0x00, RegisterValue::U8(1)).await;

    assert_eq!(result, Err(BusError::Timeout));
    assert!(start.elapsed() >= Duration::from_millis(10));
    assert!(wire.ops().is_empty());
    assert_eq!(driver.is_initialized(), None);
}

#[test]
fn panic_during_init_poisons_without_further_panics() {
    let (driver, wire) = make_driver(false);

    let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        embassy_futures::block_on(driver.init(BusConfig::new(1)))
    }));
    assert!(crashed.is_err());

    assert_eq!(driver.is_initialized(), None);
    embassy_futures::block_on(async {
        assert!(matches!(driver.session().await, Err(BusError::Poisoned)));
        assert_eq!(
            driver.write_register(0x70, 0x00, RegisterValue::U8(1)).await,
            Err(BusError::Poisoned)
        );
        assert_eq!(
            driver.read_register(0x70, 0x00, RegisterWidth::U8).await,
            Err(BusError::Poisoned)
        );
        assert_eq!(driver.init(fast_config()).await, Err(BusError::Poisoned));
        assert_eq!(driver.deinit().await, Err(BusError::Poisoned));
    });
    assert!(wire.ops().is_empty());
}
