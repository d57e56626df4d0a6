//! The CSI/DCS parameter accumulator: semicolon-separated top-level
//! parameters, each optionally carrying colon-separated sub-parameters
//! (used by e.g. `CSI 38:2:255:128:0 m`).
//!
//! Bounded with fixed-capacity `SmallVec`s so a parameter-flood attack
//! (thousands of `;` bytes) cannot grow an unbounded allocation on the hot
//! per-byte path; once a limit is hit, further separators are silently
//! absorbed rather than rejected; this matches real terminals, which clamp
//! and keep parsing instead of erroring out on oversized input.

use smallvec::SmallVec;

pub const MAX_PARAMS: usize = 16;
pub const MAX_SUBPARAMS: usize = 16;
pub const MAX_VALUE: u16 = 65535;

/// One top-level parameter slot: an optional value (absent means "default,"
/// e.g. a bare `;`) plus any colon-separated sub-parameters that followed
/// it.
#[derive(Debug, Clone, Default)]
pub struct Param {
    pub value: Option<u16>,
    pub subparams: SmallVec<[Option<u16>; 4]>,
}

/// Accumulates parameter bytes (`0-9`, `:`, `;`) for one control sequence.
#[derive(Debug, Clone, Default)]
pub struct ParamAccumulator {
    params: SmallVec<[Param; MAX_PARAMS]>,
    /// Whether the current top-level slot has seen any digit yet; used to
    /// distinguish "no digits typed" (stays `None`) from "0 typed."
    current_has_digits: bool,
}

impl ParamAccumulator {
    pub fn clear(&mut self) {
        self.params.clear();
        self.current_has_digits = false;
    }

    fn ensure_current(&mut self) {
        if self.params.is_empty() {
            self.params.push(Param::default());
        }
    }

    /// Feed one ASCII digit byte (`0`-`9`) into the current parameter or
    /// sub-parameter slot.
    pub fn digit(&mut self, byte: u8) {
        self.ensure_current();
        if self.params.len() > MAX_PARAMS {
            return;
        }
        let param = self.params.last_mut().unwrap();
        let slot = param.subparams.last_mut();
        let digit = (byte - b'0') as u32;
        match slot {
            Some(Some(v)) => {
                let next = *v as u32 * 10 + digit;
                *v = next.min(MAX_VALUE as u32) as u16;
            }
            Some(None) => {
                *param.subparams.last_mut().unwrap() = Some(digit as u16);
            }
            None => {
                let next = param.value.unwrap_or(0) as u32 * 10 + digit;
                param.value = Some(next.min(MAX_VALUE as u32) as u16);
                self.current_has_digits = true;
            }
        }
    }

    /// `;`: close the current top-level parameter and open a new one.
    pub fn semicolon(&mut self) {
        self.ensure_current();
        if self.params.len() < MAX_PARAMS {
            self.params.push(Param::default());
        }
        self.current_has_digits = false;
    }

    /// `:`: open a new sub-parameter slot under the current top-level
    /// parameter.
    pub fn colon(&mut self) {
        self.ensure_current();
        let param = self.params.last_mut().unwrap();
        if param.subparams.len() < MAX_SUBPARAMS {
            param.subparams.push(None);
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
