//! Collaborator traits the [`crate::engine::Engine`] is generic over (spec
//! §5, §6.2): register storage, a monotonic clock, an optional Modbus
//! master, and optional persistence. Injected explicitly rather than
//! reached through process-wide globals, which is this port's one
//! deliberate structural departure from `st_builtin_modbus.cpp`'s
//! `g_mb_last_error`/`g_mb_success`/`g_mb_request_count` statics.

use thiserror::Error;

/// External register storage a bound program slot reads its inputs from
/// and writes its outputs to. Addresses are per-kind; a 32-bit value
/// spans two consecutive 16-bit words.
pub trait RegisterFile {
    fn read_holding(&self, address: u16) -> Option<u16>;
    fn write_holding(&mut self, address: u16, value: u16);
    fn read_input(&self, address: u16) -> Option<u16>;
    fn read_coil(&self, address: u16) -> Option<bool>;
    fn write_coil(&mut self, address: u16, value: bool);
    fn read_discrete_input(&self, address: u16) -> Option<bool>;
}

/// A free-running millisecond clock. Must wrap rather than saturate: the
/// original hardware's `millis()` wraps every ~49.7 days, and stateful
/// blocks rely on `wrapping_sub` to compute elapsed time correctly across
/// that wrap.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModbusError {
    #[error("modbus master is not enabled")]
    NotEnabled,
    #[error("per-cycle request limit exceeded")]
    RequestLimitExceeded,
    #[error("modbus transaction failed (code {0})")]
    TransactionFailed(i32),
}

/// A Modbus RTU/TCP master used by the `MB_READ_*`/`MB_WRITE_*` builtins.
/// Optional: [`NoopModbus`] is available when no bus is attached.
pub trait ModbusMaster {
    fn read_coil(&mut self, slave_id: u8, address: u16) -> Result<bool, ModbusError>;
    fn read_holding(&mut self, slave_id: u8, address: u16) -> Result<u16, ModbusError>;
    fn write_coil(&mut self, slave_id: u8, address: u16, value: bool) -> Result<(), ModbusError>;
    fn write_holding(&mut self, slave_id: u8, address: u16, value: u16) -> Result<(), ModbusError>;
}

/// A `ModbusMaster` for engines with no bus attached; every call reports
/// [`ModbusError::NotEnabled`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopModbus;

impl ModbusMaster for NoopModbus {
    fn read_coil(&mut self, _slave_id: u8, _address: u16) -> Result<bool, ModbusError> {
        Err(ModbusError::NotEnabled)
    }
    fn read_holding(&mut self, _slave_id: u8, _address: u16) -> Result<u16, ModbusError> {
        Err(ModbusError::NotEnabled)
    }
    fn write_coil(&mut self, _slave_id: u8, _address: u16, _value: bool) -> Result<(), ModbusError> {
        Err(ModbusError::NotEnabled)
    }
    fn write_holding(&mut self, _slave_id: u8, _address: u16, _value: u16) -> Result<(), ModbusError> {
        Err(ModbusError::NotEnabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("persistence is not enabled")]
    NotEnabled,
    #[error("underlying storage write failed")]
    StorageFailure,
}

/// Non-volatile storage for retained variables, backing the `SAVE`/`LOAD`
/// builtins. `group_id` is accepted but, matching `st_builtin_persist.cpp`,
/// the reference implementation ignores it and always operates on every
/// group; [`NoopPersistence`] preserves that behaviour for parity, while a
/// real collaborator is free to honour `group_id` precisely.
pub trait Persistence {
    fn save_group(&mut self, group_id: i32) -> Result<(), PersistError>;
    fn load_group(&mut self, group_id: i32) -> Result<(), PersistError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPersistence;

impl Persistence for NoopPersistence {
    fn save_group(&mut self, _group_id: i32) -> Result<(), PersistError> {
        Err(PersistError::NotEnabled)
    }
    fn load_group(&mut self, _group_id: i32) -> Result<(), PersistError> {
        Err(PersistError::NotEnabled)
    }
}

/// Per-cycle state threaded through builtin dispatch in place of the
/// original's process-wide globals: the last Modbus
/// transaction's result, a per-cycle request counter enforcing
/// `max_requests_per_cycle`, and the save/load rate limiter's clock
/// reading. Constructed fresh by the engine for each `tick`.
pub struct CallContext<'a> {
    pub modbus: &'a mut dyn ModbusMaster,
    pub persistence: &'a mut dyn Persistence,
    pub now_ms: u32,
    pub max_requests_per_cycle: u8,
    pub request_count: u8,
    pub last_mb_error: i32,
    pub last_save_ms: &'a mut Option<u32>,
}

impl<'a> CallContext<'a> {
    /// Returns `false` (and leaves `last_mb_error` unset) once this cycle's
    /// Modbus request budget (`st_builtin_modbus.cpp`'s
    /// `check_request_limit`) is exhausted.
    pub fn allow_request(&mut self) -> bool {
        if self.request_count >= self.max_requests_per_cycle {
            false
        } else {
            self.request_count += 1;
            true
        }
    }
}
