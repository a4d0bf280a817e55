/// Turns the optional `progress` field of a status payload into a
/// percentage. Missing or non-finite values read as 0; the rest is clamped.
pub fn normalize_progress(raw: Option<f64>) -> f32 {
    match raw {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0) as f32,
        _ => 0.0,
    }
}

/// Percentage to the 0.0..=1.0 range egui progress bars expect
pub fn progress_fraction(percent: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0)
}

pub fn progress_label(percent: f32) -> String {
    format!("{}%", percent.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(normalize_progress(Some(-5.0)), 0.0);
        assert_eq!(normalize_progress(Some(140.0)), 100.0);
        assert_eq!(normalize_progress(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_progress(None), 0.0);
        assert_eq!(normalize_progress(Some(42.5)), 42.5);
    }

    #[test]
    fn fraction_and_label() {
        assert_eq!(progress_fraction(40.0), 0.4);
        assert_eq!(progress_label(39.6), "40%");
        assert_eq!(progress_label(0.0), "0%");
    }
}
