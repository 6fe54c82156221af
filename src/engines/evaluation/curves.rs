//! Response curves that turn raw melody statistics into [0, 1] scores.

/// Triangle with feet at `a` and `c` and its peak at `b`.
pub fn triangular(x: f64, a: f64, b: f64, c: f64) -> f64 {
    if x <= a || x >= c {
        return 0.0;
    }
    if x == b {
        return 1.0;
    }
    if x < b {
        (x - a) / (b - a)
    } else {
        (c - x) / (c - b)
    }
}

/// Off-beat share of attacks. Some syncopation is good, too much is noise.
pub fn syncopation_curve(off_beat_ratio: f64) -> f64 {
    if off_beat_ratio < 0.10 {
        0.2
    } else if off_beat_ratio <= 0.45 {
        1.0
    } else if off_beat_ratio <= 0.70 {
        0.6
    } else {
        0.2
    }
}

/// Number of identical measure pairs.
pub fn motif_curve(identical_pairs: usize) -> f64 {
    match identical_pairs {
        0 => 0.2,
        1..=5 => 1.0,
        6..=10 => 0.7,
        _ => 0.2,
    }
}

/// Measure index holding the highest note; late climaxes score best.
pub fn climax_curve(measure: usize) -> f64 {
    match measure {
        0..=2 => 0.2,
        3..=4 => 0.6,
        _ => 1.0,
    }
}
