//! Frame rate counter
//!
//! Counts frames and reports an averaged FPS value once per second. The
//! caller feeds it the current instant every frame and shows whatever value
//! comes back.

use std::time::Instant;

pub struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            last_update: now,
            frame_count: 0,
        }
    }

    /// Records one frame; returns the averaged FPS when a second has passed
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.frame_count += 1;

        let elapsed = now.duration_since(self.last_update);
        if elapsed.as_millis() < 1000 {
            return None;
        }

        let fps = (self.frame_count as f64 * 1000.0 / elapsed.as_millis() as f64).round() as u32;
        log::debug!(
            "FPS: {} (frames: {}, time: {}ms)",
            fps,
            self.frame_count,
            elapsed.as_millis()
        );

        self.last_update = now;
        self.frame_count = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_no_report_before_a_second() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..10 {
            assert_eq!(counter.tick(start + Duration::from_millis(i * 100)), None);
        }
    }

    #[test]
    fn test_reports_average_over_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..60 {
            assert_eq!(counter.tick(start + Duration::from_millis(i * 16)), None);
        }
        // Frame 60 lands at 1000ms exactly: 60 frames in one second.
        assert_eq!(counter.tick(start + Duration::from_millis(1000)), Some(60));
    }

    #[test]
    fn test_window_resets_after_report() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        counter.tick(start + Duration::from_millis(1000));
        assert_eq!(counter.tick(start + Duration::from_millis(1500)), None);
        // Two frames over the next full second.
        assert_eq!(counter.tick(start + Duration::from_millis(2000)), Some(2));
    }

    #[test]
    fn test_slow_frames_round_to_nearest() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        // 3 frames over 1.9 seconds: 3 * 1000 / 1900 = 1.58, rounds to 2.
        assert_eq!(counter.tick(start + Duration::from_millis(800)), None);
        assert_eq!(counter.tick(start + Duration::from_millis(950)), None);
        assert_eq!(counter.tick(start + Duration::from_millis(1900)), Some(2));
    }
}
