//! `SAVE`/`LOAD` builtins (`st_builtin_persist.cpp`).
//!
//! `SAVE` is rate-limited to once per [`crate::consts::SAVE_RATE_LIMIT_MS`]
//! against the injected [`crate::collaborators::Clock`] reading carried in
//! the call context, rather than the original's `static uint32_t
//! last_save_ms` — a process-wide global would leak rate-limit state
//! between independent engine instances in the same process, which this
//! port does not want.

use crate::collaborators::CallContext;
use crate::consts::SAVE_RATE_LIMIT_MS;
use crate::value::Value;

const OK: i32 = 0;
const ERR_FAILED: i32 = -1;
const ERR_RATE_LIMITED: i32 = -2;

/// `group_id` is accepted for interface parity with the original but, like
/// `st_builtin_persist_save`, is not used to select a subset of groups:
/// every collaborator call saves everything it has.
pub fn save(ctx: &mut CallContext<'_>, group_id: i32) -> Value {
    if let Some(last) = *ctx.last_save_ms {
        if ctx.now_ms.wrapping_sub(last) < SAVE_RATE_LIMIT_MS {
            return Value::Dint(ERR_RATE_LIMITED);
        }
    }
    *ctx.last_save_ms = Some(ctx.now_ms);
    match ctx.persistence.save_group(group_id) {
        Ok(()) => Value::Dint(OK),
        Err(_) => Value::Dint(ERR_FAILED),
    }
}

pub fn load(ctx: &mut CallContext<'_>, group_id: i32) -> Value {
    match ctx.persistence.load_group(group_id) {
        Ok(()) => Value::Dint(OK),
        Err(_) => Value::Dint(ERR_FAILED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{NoopModbus, PersistError, Persistence};

    struct FakeStore {
        saved: bool,
    }

    impl Persistence for FakeStore {
        fn save_group(&mut self, _group_id: i32) -> Result<(), PersistError> {
            self.saved = true;
            Ok(())
        }
        fn load_group(&mut self, _group_id: i32) -> Result<(), PersistError> {
            Ok(())
        }
    }

    #[test]
    fn save_is_rate_limited() {
        let mut modbus = NoopModbus;
        let mut store = FakeStore { saved: false };
        let mut last_save_ms = None;
        let mut ctx = CallContext {
            modbus: &mut modbus,
            persistence: &mut store,
            now_ms: 0,
            max_requests_per_cycle: 5,
            request_count: 0,
            last_mb_error: 0,
            last_save_ms: &mut last_save_ms,
        };
        assert_eq!(save(&mut ctx, -1), Value::Dint(OK));
        ctx.now_ms = 100;
        assert_eq!(save(&mut ctx, -1), Value::Dint(ERR_RATE_LIMITED));
        ctx.now_ms = 6_000;
        assert_eq!(save(&mut ctx, -1), Value::Dint(OK));
    }
}
