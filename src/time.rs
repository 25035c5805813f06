//! Animation clock.
//!
//! The galaxy's rotation is a pure function of [`Time::elapsed`], so pausing
//! the clock freezes the rotation exactly where it was.
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // once per frame
//! time.update();
//! scene.tick(time.elapsed());
//! ```

use std::time::{Duration, Instant};

/// How often the FPS estimate is refreshed.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Frame clock with pause support.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    /// Set while paused.
    paused_at: Option<Instant>,
    /// Total time spent paused, excluded from `elapsed`.
    paused_total: Duration,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Advance the clock. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds.
    pub fn update(&mut self) -> (f32, f32) {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> (f32, f32) {
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= FPS_WINDOW {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        if self.paused_at.is_some() {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let running = now
            .saturating_duration_since(self.start)
            .saturating_sub(self.paused_total);
        self.elapsed_secs = running.as_secs_f32();

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds since start, not counting paused intervals.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds since the previous update. Zero while paused.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames rendered since start, paused or not.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            let now = Instant::now();
            self.paused_total += now.saturating_duration_since(paused_at);
            self.last_frame = now;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Restart from zero, unpaused.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed >= 0.01);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let mut time = Time::new();
        let mut last = 0.0;
        for _ in 0..20 {
            let (elapsed, _) = time.update();
            assert!(elapsed >= last);
            last = elapsed;
        }
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut time = Time::new();
        time.update();

        time.pause();
        assert!(time.is_paused());

        let elapsed_before = time.elapsed();
        thread::sleep(Duration::from_millis(10));
        time.update();

        assert_eq!(time.elapsed(), elapsed_before);
        assert_eq!(time.delta(), 0.0);
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn test_resume_excludes_paused_interval() {
        let mut time = Time::new();
        time.pause();
        thread::sleep(Duration::from_millis(50));
        time.resume();
        time.update();

        assert!(!time.is_paused());
        assert!(time.elapsed() < 0.04, "elapsed {} includes pause", time.elapsed());
    }

    #[test]
    fn test_toggle_pause() {
        let mut time = Time::new();
        time.toggle_pause();
        assert!(time.is_paused());
        time.toggle_pause();
        assert!(!time.is_paused());
    }

    #[test]
    fn test_fps_estimate() {
        let mut time = Time::new();
        let start = time.start;
        for i in 1..=30 {
            time.update_at(start + Duration::from_millis(i * 20));
        }
        // 25 frames in the first 500 ms window
        assert!((time.fps() - 50.0).abs() < 1.0, "fps = {}", time.fps());
    }

    #[test]
    fn test_reset() {
        let mut time = Time::new();
        time.update();
        time.pause();
        time.reset();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert!(!time.is_paused());
    }
}
