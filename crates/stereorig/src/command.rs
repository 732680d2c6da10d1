use std::collections::VecDeque;

use crate::calibration::{Eye, EyeTransform};
use crate::error::StereoError;
use crate::loader::LoadTicket;
use crate::placement::PlacementMode;
use crate::texture::StereoTexturePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
}

/// A discrete input, applied at the top of the next frame.
#[derive(Debug)]
pub enum Command<I> {
    SetPanelWidth(f32),
    SetViewDistance(f32),
    /// Offsets the panel width from its value when the command is applied.
    AdjustPanelWidth(f32),
    AdjustViewDistance(f32),
    SetEyeTransform {
        eye: Eye,
        transform: EyeTransform,
    },
    NudgeEye {
        eye: Eye,
        dx: f32,
        dy: f32,
        drotation: f32,
    },
    RequestSwap,
    RequestRecenter,
    NudgeHorizontal(NudgeDirection),
    SetPlacementMode(PlacementMode),
    TogglePlacementMode,
    PairLoaded {
        ticket: LoadTicket,
        result: Result<StereoTexturePair<I>, StereoError>,
    },
    SessionStarted,
    SessionEnded,
    SessionFailed(String),
}

/// FIFO of commands waiting for the next frame.
#[derive(Debug)]
pub struct CommandQueue<I> {
    pending: VecDeque<Command<I>>,
}

impl<I> CommandQueue<I> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, command: Command<I>) {
        self.pending.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command<I>> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<I> Default for CommandQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_submission_order() {
        let mut queue: CommandQueue<()> = CommandQueue::new();
        queue.push(Command::SetPanelWidth(1.0));
        queue.push(Command::RequestSwap);
        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Some(Command::SetPanelWidth(w)) if w == 1.0));
        assert!(matches!(queue.pop(), Some(Command::RequestSwap)));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }
}
