/// The single recurring render tick. Each tick schedules the next one while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only on the transition out of `Idle`, so the caller schedules
    /// exactly one first frame. A stopped loop stays stopped.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        true
    }

    /// Embedding hook; terminal. The viewer itself never stops the loop.
    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Advance one frame. `false` means nothing should be drawn or rescheduled.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.frames = self.frames.saturating_add(1);
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
