//! Emission decay schedule.
//!
//! Emission runs at `base_rate` reward units per second from `start_time`
//! and is multiplied by `decay_factor / rate_precision` at the end of every
//! `decay_period` seconds. Time is the ledger timestamp in seconds.
//!
//! Total emission between two instants is the difference of a single
//! closed-form cumulative function, so splitting an interval never changes
//! the sum of its parts.

use common::fixed_point::{mul_div_floor, wad_mul, WAD};
use soroban_sdk::contracttype;

use crate::ContractError;

/// Largest accepted `rate_precision`. Keeps `1 - factor` at or above 1e-9 so
/// the geometric-series denominator stays well conditioned.
pub const MAX_RATE_PRECISION: i128 = 1_000_000_000;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecayParameters {
    /// Ledger timestamp at which emission begins.
    pub start_time: u64,
    /// Reward units emitted per second during the first period.
    pub base_rate: i128,
    /// Retained fraction per period, scaled by `rate_precision`.
    pub decay_factor: i128,
    pub rate_precision: i128,
    /// Length of one decay step in seconds.
    pub decay_period: u64,
}

/// A validated decay schedule.
#[derive(Clone, Debug)]
pub struct DecaySchedule {
    start_time: u64,
    base_rate: i128,
    period: u64,
    /// `decay_factor / rate_precision` in WAD.
    factor: i128,
}

impl DecaySchedule {
    pub fn new(params: &DecayParameters) -> Result<Self, ContractError> {
        if params.rate_precision <= 0 || params.rate_precision > MAX_RATE_PRECISION {
            return Err(ContractError::ConfigurationError);
        }
        if params.decay_factor <= 0 || params.decay_factor > params.rate_precision {
            return Err(ContractError::ConfigurationError);
        }
        if params.decay_period == 0 || params.base_rate < 0 {
            return Err(ContractError::ConfigurationError);
        }
        let factor = mul_div_floor(params.decay_factor, WAD, params.rate_precision)
            .ok_or(ContractError::ConfigurationError)?;
        Ok(Self {
            start_time: params.start_time,
            base_rate: params.base_rate,
            period: params.decay_period,
            factor,
        })
    }

    fn is_constant(&self) -> bool {
        self.factor == WAD
    }

    /// `factor^periods` in WAD, truncating at every step. Reaches 0 and
    /// stays there for long enough gaps.
    fn retained(&self, periods: u64) -> i128 {
        if self.is_constant() {
            return WAD;
        }
        let mut result = WAD;
        let mut square = self.factor;
        let mut n = periods;
        // Operands never exceed WAD, so WAD * WAD fits in i128.
        while n > 0 {
            if n & 1 == 1 {
                result = result * square / WAD;
                if result == 0 {
                    return 0;
                }
            }
            n >>= 1;
            if n > 0 {
                square = square * square / WAD;
                if square == 0 {
                    return 0;
                }
            }
        }
        result
    }

    fn elapsed(&self, t: u64) -> u64 {
        t.saturating_sub(self.start_time)
    }

    /// Instantaneous emission rate at `t`. Equals `base_rate` for
    /// `t <= start_time`.
    pub fn rate_at(&self, t: u64) -> i128 {
        let periods = self.elapsed(t) / self.period;
        // base_rate * retained / WAD <= base_rate, cannot fail.
        wad_mul(self.base_rate, self.retained(periods)).unwrap_or(0)
    }

    /// Total emission from `start_time` up to `t`.
    pub fn cumulative(&self, t: u64) -> Result<i128, ContractError> {
        let elapsed = self.elapsed(t);
        if elapsed == 0 {
            return Ok(0);
        }
        if self.is_constant() {
            return self
                .base_rate
                .checked_mul(elapsed as i128)
                .ok_or(ContractError::ArithmeticFault);
        }

        let periods = elapsed / self.period;
        let into_period = elapsed % self.period;
        let retained = self.retained(periods);
        let whole = self.whole_periods(retained)?;
        if into_period == 0 {
            return Ok(whole);
        }

        // The partial period never reaches past the next boundary, so
        // `cumulative` is non-decreasing in `t`.
        let next = self.whole_periods(self.retained(periods.saturating_add(1)))?;
        let partial = self
            .base_rate
            .checked_mul(into_period as i128)
            .and_then(|undecayed| wad_mul(undecayed, retained))
            .ok_or(ContractError::ArithmeticFault)?
            .min(next.saturating_sub(whole).max(0));

        whole
            .checked_add(partial)
            .ok_or(ContractError::ArithmeticFault)
    }

    /// Emission over the first `k` whole periods, given `retained(k)`:
    /// `base * period * (1 - f^k) / (1 - f)`.
    fn whole_periods(&self, retained: i128) -> Result<i128, ContractError> {
        let per_period = self
            .base_rate
            .checked_mul(self.period as i128)
            .ok_or(ContractError::ArithmeticFault)?;
        mul_div_floor(per_period, WAD - retained, WAD - self.factor)
            .ok_or(ContractError::ArithmeticFault)
    }

    /// Emission over `[from, to)`. Zero when `to <= from`.
    pub fn integral(&self, from: u64, to: u64) -> Result<i128, ContractError> {
        if to <= from {
            return Ok(0);
        }
        let hi = self.cumulative(to)?;
        let lo = self.cumulative(from)?;
        hi.checked_sub(lo).ok_or(ContractError::ArithmeticFault)
    }
}
