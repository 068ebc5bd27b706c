use std::time::Instant;
use winit::window::Window;

pub struct FrameTiming {
    last_fps_time: Instant,
    frame_count: u32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            last_fps_time: Instant::now(),
            frame_count: 0,
            base_title,
        }
    }

    /// Record a frame and refresh the window title twice a second.
    pub fn update(
        &mut self,
        window: Option<&Window>,
        now: Instant,
        model: Option<&str>,
        draws: usize,
    ) {
        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() >= 0.5 {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            if let Some(window) = window {
                window.set_title(&format_title(&self.base_title, model, fps, draws));
            }
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }
}

fn format_title(base: &str, model: Option<&str>, fps: f32, draws: usize) -> String {
    match model {
        Some(model) => format!("{base} - {model} - {fps:.1} fps, {draws} meshes"),
        None => format!("{base} - no model - {fps:.1} fps"),
    }
}
