//! 帧计时器
//!
//! 每帧调用一次 `tick()`，之后 `elapsed()` 返回与上一帧的间隔（秒）。
//! FPS 每秒刷新一次。

use std::time::{Duration, Instant};

/// 帧间隔时间来源
///
/// 帧循环和相机只依赖这个接口，测试里可以用固定步长替代真实时钟。
pub trait FrameTimer {
    /// 距离上一帧的时间（秒）
    fn elapsed(&self) -> f32;
}

/// 基于 `Instant` 的帧计时器
pub struct Timer {
    last_tick: Instant,
    elapsed: f32,
    total: f32,
    frame_count: u32,
    last_fps_update: Instant,
    fps: f32,
}

impl Timer {
    /// 创建计时器，以当前时刻为起点
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_tick: now,
            elapsed: 0.0,
            total: 0.0,
            frame_count: 0,
            last_fps_update: now,
            fps: 0.0,
        }
    }

    /// 推进一帧
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.elapsed = now.duration_since(self.last_tick).as_secs_f32();
        self.total += self.elapsed;
        self.last_tick = now;

        self.frame_count += 1;
        let since_update = now.duration_since(self.last_fps_update);
        if since_update >= Duration::from_secs(1) {
            self.fps = self.frame_count as f32 / since_update.as_secs_f32();
            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }

    /// 启动以来的累计时间（秒）
    pub fn total(&self) -> f32 {
        self.total
    }

    /// 最近一次统计的 FPS
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl FrameTimer for Timer {
    fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_has_zero_elapsed() {
        let timer = Timer::new();
        assert_eq!(timer.elapsed(), 0.0);
        assert_eq!(timer.total(), 0.0);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn test_tick_accumulates() {
        let mut timer = Timer::new();
        std::thread::sleep(Duration::from_millis(5));
        timer.tick();
        let first = timer.elapsed();
        assert!(first > 0.0);

        timer.tick();
        assert!(timer.total() >= first);
        assert!((timer.total() - (first + timer.elapsed())).abs() < 1e-6);
    }
}
