/// Last-write-wins percentage of the running script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressValue {
    percent: u8,
}

impl ProgressValue {
    pub fn percent(self) -> u8 {
        self.percent
    }

    /// Overwrites the current value; out-of-range input is clamped to 0..=100.
    /// Returns whether the displayed value changed.
    pub fn set(&mut self, raw: i64) -> bool {
        let next = raw.clamp(0, 100) as u8;
        let changed = next != self.percent;
        self.percent = next;
        changed
    }

    pub fn label(self) -> String {
        format!("{}%", self.percent)
    }

    /// Width of the filled portion of a bar `total` cells wide.
    pub fn filled_width(self, total: u16) -> u16 {
        ((u32::from(total) * u32::from(self.percent)) / 100) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressValue;

    #[test]
    fn each_update_overwrites_without_smoothing() {
        let mut progress = ProgressValue::default();
        assert!(progress.set(40));
        assert!(progress.set(10));
        assert_eq!(progress.percent(), 10);
        assert!(!progress.set(10));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let mut progress = ProgressValue::default();
        progress.set(140);
        assert_eq!(progress.percent(), 100);
        progress.set(-5);
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn renders_label_and_proportional_width() {
        let mut progress = ProgressValue::default();
        progress.set(25);
        assert_eq!(progress.label(), "25%");
        assert_eq!(progress.filled_width(40), 10);
        assert_eq!(progress.filled_width(0), 0);
    }
}
