//! `MB_READ_*`/`MB_WRITE_*` builtins (`st_builtin_modbus.cpp`).
//!
//! Every call first checks the per-cycle request budget
//! (`check_request_limit` in the original); once exhausted, reads return
//! `0`/`FALSE` and writes are skipped, with the failure recorded in
//! [`CallContext::last_mb_error`] rather than a global.

use crate::collaborators::CallContext;
use crate::value::Value;

const ERR_NONE: i32 = 0;
const ERR_LIMIT: i32 = -1;
const ERR_TRANSACTION: i32 = -2;

pub fn read_coil(ctx: &mut CallContext<'_>, slave_id: u8, address: u16) -> Value {
    if !ctx.allow_request() {
        ctx.last_mb_error = ERR_LIMIT;
        return Value::Bool(false);
    }
    match ctx.modbus.read_coil(slave_id, address) {
        Ok(v) => {
            ctx.last_mb_error = ERR_NONE;
            Value::Bool(v)
        }
        Err(_) => {
            ctx.last_mb_error = ERR_TRANSACTION;
            Value::Bool(false)
        }
    }
}

pub fn read_holding(ctx: &mut CallContext<'_>, slave_id: u8, address: u16) -> Value {
    if !ctx.allow_request() {
        ctx.last_mb_error = ERR_LIMIT;
        return Value::Int(0);
    }
    match ctx.modbus.read_holding(slave_id, address) {
        Ok(v) => {
            ctx.last_mb_error = ERR_NONE;
            Value::Int(v as i16)
        }
        Err(_) => {
            ctx.last_mb_error = ERR_TRANSACTION;
            Value::Int(0)
        }
    }
}

pub fn write_coil(ctx: &mut CallContext<'_>, slave_id: u8, address: u16, value: bool) -> Value {
    if !ctx.allow_request() {
        ctx.last_mb_error = ERR_LIMIT;
        return Value::Int(ERR_LIMIT as i16);
    }
    match ctx.modbus.write_coil(slave_id, address, value) {
        Ok(()) => {
            ctx.last_mb_error = ERR_NONE;
            Value::Int(ERR_NONE as i16)
        }
        Err(_) => {
            ctx.last_mb_error = ERR_TRANSACTION;
            Value::Int(ERR_TRANSACTION as i16)
        }
    }
}

pub fn write_holding(ctx: &mut CallContext<'_>, slave_id: u8, address: u16, value: u16) -> Value {
    if !ctx.allow_request() {
        ctx.last_mb_error = ERR_LIMIT;
        return Value::Int(ERR_LIMIT as i16);
    }
    match ctx.modbus.write_holding(slave_id, address, value) {
        Ok(()) => {
            ctx.last_mb_error = ERR_NONE;
            Value::Int(ERR_NONE as i16)
        }
        Err(_) => {
            ctx.last_mb_error = ERR_TRANSACTION;
            Value::Int(ERR_TRANSACTION as i16)
        }
    }
}
