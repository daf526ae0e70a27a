//! `TON`/`TOF`/`TP` timers and `BLINK`, grounded on `st_builtin_timers.cpp`
//! and `st_builtin_signal.cpp`'s `BLINK` state machine.
//!
//! Elapsed time is always `now.wrapping_sub(start)`: the clock is a free-
//! running millisecond counter that wraps every ~49.7 days,
//! so ordinary subtraction would go negative across a wrap.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Ton,
    Tof,
    Tp,
}

/// One `TON`/`TOF`/`TP` instance. `et_ms` is exposed for snapshot display
/// even though the builtin's return value is just `Q`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerState {
    kind_initialized: bool,
    kind: Option<TimerKind>,
    last_in: bool,
    start_time_ms: u32,
    running: bool,
    pub et_ms: u32,
    pub q: bool,
}

impl TimerState {
    fn ensure_kind(&mut self, kind: TimerKind) {
        if !self.kind_initialized {
            self.kind = Some(kind);
            self.kind_initialized = true;
        }
    }

    fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.start_time_ms)
    }

    /// On-delay: `Q` follows `in_` after it has been continuously true for
    /// `pt_ms`. Resets instantly the moment `in_` goes false.
    pub fn step_ton(&mut self, in_: bool, pt_ms: i32, now_ms: u32) -> bool {
        self.ensure_kind(TimerKind::Ton);
        let pt_ms = pt_ms.max(0) as u32;

        if in_ && !self.last_in {
            self.start_time_ms = now_ms;
            self.running = true;
        }
        if !in_ {
            self.running = false;
            self.et_ms = 0;
            self.q = false;
        } else if self.running {
            self.et_ms = self.elapsed(now_ms).min(pt_ms);
            self.q = self.et_ms >= pt_ms;
        }
        self.last_in = in_;
        self.q
    }

    /// Off-delay: `Q` follows `in_` true instantly, but only drops back to
    /// false `pt_ms` after `in_` goes false.
    pub fn step_tof(&mut self, in_: bool, pt_ms: i32, now_ms: u32) -> bool {
        self.ensure_kind(TimerKind::Tof);
        let pt_ms = pt_ms.max(0) as u32;

        if !in_ && self.last_in {
            self.start_time_ms = now_ms;
            self.running = true;
        }
        if in_ {
            self.running = false;
            self.et_ms = 0;
            self.q = true;
        } else if self.running {
            self.et_ms = self.elapsed(now_ms).min(pt_ms);
            self.q = self.et_ms < pt_ms;
            if self.et_ms >= pt_ms {
                self.running = false;
            }
        }
        self.last_in = in_;
        self.q
    }

    /// Re-trigger-proof pulse: a rising edge on `in_` starts a `pt_ms`
    /// pulse that runs to completion even if `in_` drops early.
    pub fn step_tp(&mut self, in_: bool, pt_ms: i32, now_ms: u32) -> bool {
        self.ensure_kind(TimerKind::Tp);
        let pt_ms = pt_ms.max(0) as u32;

        if in_ && !self.last_in && !self.running {
            self.start_time_ms = now_ms;
            self.running = true;
        }
        if self.running {
            self.et_ms = self.elapsed(now_ms).min(pt_ms);
            self.q = true;
            if self.et_ms >= pt_ms {
                self.running = false;
                self.q = false;
                self.et_ms = pt_ms;
            }
        } else {
            self.q = false;
        }
        self.last_in = in_;
        self.q
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum BlinkPhase {
    Idle,
    On,
    Off,
}

impl Default for BlinkPhase {
    fn default() -> Self {
        BlinkPhase::Idle
    }
}

/// `BLINK(enable, on_ms, off_ms)`: a free-running square wave while
/// `enable` is true, reset to idle the instant it goes false
/// (`st_builtin_signal.cpp`'s three-state `BLINK` machine).
#[derive(Debug, Clone, Copy, Default)]
pub struct BlinkState {
    phase: BlinkPhase,
    phase_start_ms: u32,
    pub q: bool,
}

impl BlinkState {
    pub fn step(&mut self, enable: bool, on_ms: i32, off_ms: i32, now_ms: u32) -> bool {
        let on_ms = on_ms.max(0) as u32;
        let off_ms = off_ms.max(0) as u32;

        if !enable {
            self.phase = BlinkPhase::Idle;
            self.q = false;
            return false;
        }

        match self.phase {
            BlinkPhase::Idle => {
                self.phase = BlinkPhase::On;
                self.phase_start_ms = now_ms;
                self.q = true;
            }
            BlinkPhase::On => {
                self.q = true;
                if now_ms.wrapping_sub(self.phase_start_ms) >= on_ms {
                    self.phase = BlinkPhase::Off;
                    self.phase_start_ms = now_ms;
                }
            }
            BlinkPhase::Off => {
                self.q = false;
                if now_ms.wrapping_sub(self.phase_start_ms) >= off_ms {
                    self.phase = BlinkPhase::On;
                    self.phase_start_ms = now_ms;
                }
            }
        }
        self.q
    }
}
