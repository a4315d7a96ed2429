/// Frame timer with a wall clock and a pausable clock.
///
/// `global_*` values always advance. `time` and `delta` stop while the timer
/// is paused: `delta` is 0 and `time` resumes from where it froze.

use std::time::{Duration, Instant};

/// Snapshot of the timer taken once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the timer started
    pub global_time: f64,
    /// Seconds since the previous frame
    pub global_delta: f64,
    /// Seconds since start, excluding paused time
    pub time: f64,
    /// Seconds since the previous frame, 0 while paused
    pub delta: f64,
    /// Frames per second, refreshed once per second
    pub fps: f64,
    pub is_paused: bool,
}

impl FrameTime {
    /// Frame time for a given pausable time and delta (tests, replays)
    pub fn at(time: f64, delta: f64) -> Self {
        Self {
            global_time: time,
            global_delta: delta,
            time,
            delta,
            fps: 30.0,
            is_paused: false,
        }
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

/// Frame timer
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
    last: Instant,
    last_fps: Instant,
    paused_for: Duration,
    frames: u32,
    frame: FrameTime,
}

impl Timer {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Timer whose clocks start at `start`
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            last_fps: start,
            paused_for: Duration::ZERO,
            frames: 0,
            frame: FrameTime::default(),
        }
    }

    /// Advance to the current instant
    pub fn response(&mut self) -> FrameTime {
        self.advance_to(Instant::now())
    }

    /// Advance to `now` and return the new frame time
    ///
    /// An instant earlier than the previous one counts as no time passing.
    pub fn advance_to(&mut self, now: Instant) -> FrameTime {
        let now = now.max(self.last);
        let step = now - self.last;

        self.frame.global_time = (now - self.start).as_secs_f64();
        self.frame.global_delta = step.as_secs_f64();

        if self.frame.is_paused {
            self.frame.delta = 0.0;
            self.paused_for += step;
        } else {
            self.frame.delta = self.frame.global_delta;
            self.frame.time = (now - self.start - self.paused_for).as_secs_f64();
        }

        self.frames += 1;
        let since_fps = now - self.last_fps;
        if since_fps > Duration::from_secs(1) {
            self.frame.fps = self.frames as f64 / since_fps.as_secs_f64();
            self.last_fps = now;
            self.frames = 0;
        }

        self.last = now;
        self.frame
    }

    /// Latest frame time
    pub fn frame(&self) -> FrameTime {
        self.frame
    }

    pub fn is_paused(&self) -> bool {
        self.frame.is_paused
    }

    pub fn set_pause(&mut self, paused: bool) {
        self.frame.is_paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.frame.is_paused = !self.frame.is_paused;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
