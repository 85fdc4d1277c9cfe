// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! NTP timestamps and typed-time durations for SDP timing fields.
//!
//! RFC 4566 carries absolute times as whole seconds since the NTP epoch
//! (1900-01-01) and durations in "typed time" syntax: a decimal number with
//! an optional `d`, `h`, `m` or `s` unit suffix, seconds by default.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch (1970-01-01).
pub const NTP_UNIX_DELTA: u64 = 2_208_988_800;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// Absolute time carried on the wire as whole seconds since the NTP epoch.
///
/// The zero value means "unset": `t=0 0` describes a permanent session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NtpTime(u64);

impl NtpTime {
    /// The unset time.
    pub const ZERO: NtpTime = NtpTime(0);

    pub const fn from_secs(secs: u64) -> Self {
        NtpTime(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Converts to a [`SystemTime`].
    ///
    /// The zero value has no calendar meaning and maps to `None`, as does a
    /// timestamp the platform clock cannot represent.
    pub fn to_system_time(self) -> Option<SystemTime> {
        if self.is_zero() {
            return None;
        }
        let unix = self.0 as i64 - NTP_UNIX_DELTA as i64;
        if unix >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(unix as u64))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(unix.unsigned_abs()))
        }
    }

    /// Converts from a [`SystemTime`], saturating at the NTP epoch.
    pub fn from_system_time(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => NtpTime(NTP_UNIX_DELTA + d.as_secs()),
            Err(e) => NtpTime(NTP_UNIX_DELTA.saturating_sub(e.duration().as_secs())),
        }
    }
}

impl fmt::Display for NtpTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed duration in whole seconds with the SDP typed-time syntax.
///
/// Time-zone offsets (`z=`) may be negative, so the value is signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(i64);

impl Interval {
    pub const ZERO: Interval = Interval(0);

    pub const fn from_secs(secs: i64) -> Self {
        Interval(secs)
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Interval(minutes * SECS_PER_MINUTE)
    }

    pub const fn from_hours(hours: i64) -> Self {
        Interval(hours * SECS_PER_HOUR)
    }

    pub const fn from_days(days: i64) -> Self {
        Interval(days * SECS_PER_DAY)
    }

    pub const fn as_secs(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses the typed-time syntax: `0`, `5`, `-1h`, `7d`, `90m`.
    ///
    /// A unit letter with no number (`s`) and any malformed number (`zs`)
    /// yield `None`.
    pub fn parse(v: &[u8]) -> Option<Interval> {
        if v == b"0" {
            return Some(Interval::ZERO);
        }
        let (digits, unit) = match v.last()? {
            b'd' => (&v[..v.len() - 1], SECS_PER_DAY),
            b'h' => (&v[..v.len() - 1], SECS_PER_HOUR),
            b'm' => (&v[..v.len() - 1], SECS_PER_MINUTE),
            b's' => (&v[..v.len() - 1], 1),
            _ => (v, 1),
        };
        if digits.is_empty() {
            return None;
        }
        let value: i64 = std::str::from_utf8(digits).ok()?.parse().ok()?;
        value.checked_mul(unit).map(Interval)
    }

    /// Display adapter for the compact form: the largest unit that divides
    /// the value evenly (`604800` → `7d`, `90000` → `25h`, `90` → `90`).
    pub const fn compact(self) -> CompactInterval {
        CompactInterval(self)
    }
}

/// Canonical form: whole seconds, no unit suffix.
impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// See [`Interval::compact`].
#[derive(Debug, Clone, Copy)]
pub struct CompactInterval(Interval);

impl fmt::Display for CompactInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        if secs == 0 {
            return f.write_str("0");
        }
        for (unit, suffix) in [(SECS_PER_DAY, 'd'), (SECS_PER_HOUR, 'h'), (SECS_PER_MINUTE, 'm')] {
            if secs % unit == 0 {
                return write!(f, "{}{}", secs / unit, suffix);
            }
        }
        write!(f, "{}", secs)
    }
}
