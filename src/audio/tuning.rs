//! Converting a chromatic frequency table into a chip's hardware period
//! register table.
//!
//! Grounded on the tuning-table construction in `audio/synth/nes_2a03_driver.cpp`
//! in the original implementation.

/// Quantize a continuous register value to the nearest integer, clamped to
/// `[0, max_register]`. Chips reject out-of-range periods, so clamping (not
/// wrapping) is the only sane choice at the boundary.
pub fn register_quantize(value: f64, max_register: u16) -> u16 {
    if value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if rounded >= max_register as f64 {
        max_register
    } else {
        rounded as u16
    }
}

/// Build a register-period lookup table from a chromatic frequency table.
///
/// `clock_rate` is the chip's input clock in Hz; `divider` is how many clock
/// cycles the period counter divides by per register increment (16 for the
/// NES pulse channels). `period = clock_rate / (divider * freq) - 1`.
pub fn make_tuning_table(
    frequency_table: &[f64],
    clock_rate: f64,
    divider: f64,
    max_register: u16,
) -> Vec<u16> {
    frequency_table
        .iter()
        .map(|&freq| {
            if freq <= 0.0 {
                return 0;
            }
            let period = clock_rate / (divider * freq) - 1.0;
            register_quantize(period, max_register)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_quantize_clamps_to_range() {
        assert_eq!(register_quantize(-5.0, 2047), 0);
        assert_eq!(register_quantize(3000.0, 2047), 2047);
        assert_eq!(register_quantize(100.4, 2047), 100);
        assert_eq!(register_quantize(100.6, 2047), 101);
    }

    #[test]
    fn make_tuning_table_is_monotonically_decreasing_for_rising_pitch() {
        let freqs = vec![110.0, 220.0, 440.0, 880.0];
        let table = make_tuning_table(&freqs, 1_789_773.0, 16.0, 2047);
        assert!(table[0] > table[1]);
        assert!(table[1] > table[2]);
        assert!(table[2] > table[3]);
    }

    #[test]
    fn make_tuning_table_handles_silent_entries() {
        let freqs = vec![0.0, 440.0];
        let table = make_tuning_table(&freqs, 1_789_773.0, 16.0, 2047);
        assert_eq!(table[0], 0);
    }
}
