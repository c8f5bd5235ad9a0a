use crate::{
    eval::timeline::Cursor,
    foundation::math::window_progress,
    model::project::{Frame, Project},
};

/// Transition notifications produced by [`Playback`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// The active frame index changed.
    FrameChanged {
        /// Previous index.
        from: usize,
        /// New index.
        to: usize,
    },
    /// A frame became active; `progress` is how far into it the playhead already is.
    FrameEntered {
        /// Entered frame index.
        index: usize,
        /// Intra-frame progress in `[0, 1]` at entry.
        progress: f64,
    },
    /// Playback wrapped from the last frame to the first.
    LoopCompleted {
        /// Total laps completed so far.
        loops: u64,
    },
    /// Non-looping playback reached the end of the last frame.
    PlaybackComplete,
}

/// Transport state of a [`Playback`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum PlaybackState {
    /// Not advancing.
    #[default]
    Paused,
    /// Advancing on every [`Playback::advance`].
    Playing,
    /// Stopped at the end of a non-looping sequence.
    Complete,
}

/// Host-side playhead driver.
///
/// The engine itself is stateless; `Playback` is the optional piece that turns wall-clock
/// deltas into [`Cursor`] values and reports frame transitions as [`PlaybackEvent`]s.
#[derive(Clone, Debug, Default)]
pub struct Playback {
    cursor: Cursor,
    state: PlaybackState,
    loops: u64,
}

impl Playback {
    /// Paused playback at the start of the first frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current playhead.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Current transport state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Laps completed while looping.
    pub fn loops_completed(&self) -> u64 {
        self.loops
    }

    /// Start or resume. A completed sequence restarts from the first frame.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Complete {
            self.cursor = Cursor::default();
            self.loops = 0;
        }
        self.state = PlaybackState::Playing;
    }

    /// Stop advancing without moving the playhead.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Jump to `index` / `elapsed_ms`, clamped to the project.
    ///
    /// Emits frame events when the index changes; never emits loop or completion events.
    pub fn seek(
        &mut self,
        project: &Project,
        index: usize,
        elapsed_ms: f64,
    ) -> Vec<PlaybackEvent> {
        let Some(last) = project.frames.len().checked_sub(1) else {
            self.cursor = Cursor::default();
            return Vec::new();
        };
        let to = index.min(last);
        let frame = &project.frames[to];
        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, frame.duration_ms)
        } else {
            0.0
        };

        let from = self.cursor.frame_index;
        self.cursor = Cursor::new(to, elapsed);
        if self.state == PlaybackState::Complete {
            self.state = PlaybackState::Paused;
        }
        if from == to {
            return Vec::new();
        }
        vec![
            PlaybackEvent::FrameChanged { from, to },
            PlaybackEvent::FrameEntered {
                index: to,
                progress: window_progress(elapsed, frame.duration_ms),
            },
        ]
    }

    /// Consume `dt_ms` of playback time, crossing as many frame boundaries as it covers.
    ///
    /// Events are returned in the order the transitions happened.
    #[tracing::instrument(skip(self, project))]
    pub fn advance(&mut self, project: &Project, dt_ms: f64) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        if self.state != PlaybackState::Playing || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return events;
        }
        let frames = &project.frames;
        let Some(last) = frames.len().checked_sub(1) else {
            return events;
        };
        self.cursor.frame_index = self.cursor.frame_index.min(last);

        let mut remaining = dt_ms;
        let mut idle_steps = 0usize;
        loop {
            let index = self.cursor.frame_index;
            let duration = frames[index].duration_ms;
            let room = (duration - self.cursor.elapsed_ms).max(0.0);
            if remaining < room {
                self.cursor.elapsed_ms += remaining;
                break;
            }
            remaining -= room;
            idle_steps = if room > 0.0 { 0 } else { idle_steps + 1 };

            let to = if index < last {
                index + 1
            } else if project.settings.loop_playback {
                self.loops += 1;
                events.push(PlaybackEvent::LoopCompleted { loops: self.loops });
                0
            } else {
                self.cursor.elapsed_ms = duration;
                self.state = PlaybackState::Complete;
                events.push(PlaybackEvent::PlaybackComplete);
                break;
            };
            self.enter(frames, index, to, remaining, &mut events);

            if idle_steps >= frames.len() {
                tracing::debug!("sequence has no duration; dropping remaining playback time");
                break;
            }
        }
        events
    }

    fn enter(
        &mut self,
        frames: &[Frame],
        from: usize,
        to: usize,
        carried_ms: f64,
        events: &mut Vec<PlaybackEvent>,
    ) {
        self.cursor = Cursor::new(to, 0.0);
        if from != to {
            events.push(PlaybackEvent::FrameChanged { from, to });
        }
        events.push(PlaybackEvent::FrameEntered {
            index: to,
            progress: window_progress(carried_ms, frames[to].duration_ms),
        });
    }
}

/// Playhead at absolute sequence time `time_ms`, measured from the start of the first frame.
///
/// Times past the end stay on the last frame at its full duration. With no frames the time
/// is carried as elapsed so auto-connections keep running.
pub fn cursor_at(frames: &[Frame], time_ms: f64) -> Cursor {
    let t = if time_ms.is_finite() {
        time_ms.max(0.0)
    } else {
        0.0
    };
    let Some(last) = frames.len().checked_sub(1) else {
        return Cursor::new(0, t);
    };
    let mut start = 0.0;
    for (i, f) in frames.iter().enumerate() {
        let end = start + f.duration_ms;
        if t < end {
            return Cursor::new(i, t - start);
        }
        start = end;
    }
    Cursor::new(last, frames[last].duration_ms)
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
