//! Rolling-window angle smoothing
//!
//! Raw per-frame joint angles jitter with landmark noise. Each angle channel
//! keeps a short FIFO of recent raw angles and reports the rounded window
//! mean, so one bad detection cannot flip a rep stage. Channels that fail
//! their visibility gate simply receive no sample and retain the previous
//! smoothed value.

use std::collections::VecDeque;

use crate::analysis::{AngleChannel, ChannelAngles};
use crate::config::SmoothingConfig;

/// Rolling buffer for a single angle channel
#[derive(Debug, Clone)]
struct ChannelBuffer {
    /// Maximum samples retained; oldest are evicted first
    window: usize,
    samples: VecDeque<u32>,
    /// Rounded window mean after the most recent sample, if any
    latest: Option<u32>,
}

impl ChannelBuffer {
    fn new(window: usize) -> Self {
        Self {
            // A zero window would never hold a sample
            window: window.max(1),
            samples: VecDeque::new(),
            latest: None,
        }
    }

    fn push(&mut self, raw: u32) -> u32 {
        self.samples.push_back(raw);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }
        let sum: u32 = self.samples.iter().sum();
        let mean = (sum as f32 / self.samples.len() as f32).round() as u32;
        self.latest = Some(mean);
        mean
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.latest = None;
    }
}

/// Per-channel rolling mean over the most recent raw angles
///
/// Window sizes come from [`SmoothingConfig`]; elbows and knees may use
/// different widths. One smoother instance belongs to one engine pipeline
/// and is never shared across threads.
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    channels: [ChannelBuffer; AngleChannel::COUNT],
}

impl SignalSmoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        let window_for = |channel: AngleChannel| {
            if channel.is_knee() {
                config.knee_window
            } else {
                config.elbow_window
            }
        };
        Self {
            channels: AngleChannel::ALL.map(|channel| ChannelBuffer::new(window_for(channel))),
        }
    }

    /// Feed one raw angle into a channel and return the new smoothed value.
    pub fn update(&mut self, channel: AngleChannel, raw: u32) -> u32 {
        self.channels[channel.index()].push(raw)
    }

    /// Latest smoothed value for a channel. `None` until the channel has
    /// received at least one sample since construction or the last clear.
    pub fn latest(&self, channel: AngleChannel) -> Option<u32> {
        self.channels[channel.index()].latest
    }

    /// Smoothed values for all channels at once.
    pub fn snapshot(&self) -> ChannelAngles {
        ChannelAngles {
            left_elbow: self.latest(AngleChannel::LeftElbow),
            right_elbow: self.latest(AngleChannel::RightElbow),
            left_knee: self.latest(AngleChannel::LeftKnee),
            right_knee: self.latest(AngleChannel::RightKnee),
        }
    }

    /// Drop all buffered samples; every channel reads as absent again.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.clear();
        }
    }
}
