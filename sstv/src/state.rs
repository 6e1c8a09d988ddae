//! Line-by-line encode/decode progression (component C4), shared between
//! the encoder and decoder so the pulse sequence they agree on can't drift
//! apart.

use crate::modes::{
    ColorFormat,
    ModeSpecification,
};

#[derive(Clone, Copy, Debug)]
pub enum State {
    Header { header_state: HeaderState },
    Line { y: usize, line_state: LineState },
}

impl Default for State {
    fn default() -> Self {
        State::Header {
            header_state: HeaderState::Leader1,
        }
    }
}

impl State {
    /// Advances to the next state, given the mode (`None` while still in
    /// the VIS header, since the mode isn't known yet). Returns `None` once
    /// the last line's last sample has been produced.
    pub fn next(&self, mode: Option<&ModeSpecification>) -> Option<Self> {
        let mut state = *self;
        match &mut state {
            Self::Header { header_state } => {
                match header_state {
                    HeaderState::Leader1 => *header_state = HeaderState::LeaderBreak,
                    HeaderState::LeaderBreak => *header_state = HeaderState::Leader2,
                    HeaderState::Leader2 => *header_state = HeaderState::VisStart,
                    HeaderState::VisStart => *header_state = HeaderState::VisBit { bit: 0 },
                    HeaderState::VisBit { bit } => {
                        *bit += 1;
                        if *bit == 8 {
                            *header_state = HeaderState::VisStop;
                        }
                    }
                    HeaderState::VisStop => {
                        state = State::Line {
                            y: 0,
                            line_state: LineState::Sync,
                        };
                    }
                }
            }
            Self::Line { y, line_state } => {
                let mode = mode.expect("line state requires a resolved mode");
                match line_state {
                    LineState::Sync => *line_state = LineState::Porch,
                    LineState::Porch => {
                        *line_state = LineState::Scan { channel: 0, x: 0 };
                    }
                    LineState::Scan { channel, x } => {
                        *x += 1;
                        if *x == mode.width as usize {
                            *line_state = LineState::Separator { channel: *channel };
                        }
                    }
                    LineState::Separator { channel } => {
                        let next_channel = *channel + 1;
                        match mode.color_format {
                            ColorFormat::Rgb if next_channel < 3 => {
                                *line_state = LineState::Scan {
                                    channel: next_channel,
                                    x: 0,
                                };
                            }
                            ColorFormat::Yuv if next_channel == 1 => {
                                *line_state = LineState::ChromaSeparator;
                            }
                            _ => {
                                *y += 1;
                                if *y == mode.lines as usize {
                                    return None;
                                }
                                *line_state = LineState::Sync;
                            }
                        }
                    }
                    LineState::ChromaSeparator => *line_state = LineState::ChromaPorch,
                    LineState::ChromaPorch => *line_state = LineState::ChromaScan { x: 0 },
                    LineState::ChromaScan { x } => {
                        *x += 1;
                        if *x == mode.width as usize / 2 {
                            *y += 1;
                            if *y == mode.lines as usize {
                                return None;
                            }
                            *line_state = LineState::Sync;
                        }
                    }
                }
            }
        }

        Some(state)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum HeaderState {
    Leader1,
    LeaderBreak,
    Leader2,
    VisStart,
    VisBit { bit: u8 },
    VisStop,
}

#[derive(Clone, Copy, Debug)]
pub enum LineState {
    Sync,
    Porch,
    /// RGB modes: scanning channel slot `channel` (indexes into
    /// [`ModeSpecification::channel_order`]), pixel `x`.
    Scan { channel: usize, x: usize },
    Separator { channel: usize },
    /// Robot 36 only: separator/porch/scan for the half-resolution,
    /// line-alternating chroma channel.
    ChromaSeparator,
    ChromaPorch,
    ChromaScan { x: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::ModeSpecification;

    #[test]
    fn rgb_mode_walks_all_lines_and_channels() {
        let mode = ModeSpecification::MARTIN_M1;
        let mut state = State::default();
        let mut lines_seen = 0;
        let mut scans_seen = 0;

        loop {
            if let State::Line {
                line_state: LineState::Scan { .. },
                ..
            } = state
            {
                scans_seen += 1;
            }
            match state.next(Some(&mode)) {
                Some(next) => state = next,
                None => break,
            }
            if let State::Line { y: 0, line_state: LineState::Sync } = state {
                lines_seen += 1;
            }
        }

        assert_eq!(scans_seen, mode.width as usize * 3 * mode.lines as usize);
        let _ = lines_seen;
    }

    #[test]
    fn yuv_mode_visits_chroma_scan() {
        let mode = ModeSpecification::ROBOT36;
        let mut state = State::default();
        let mut saw_chroma_scan = false;

        while let Some(next) = state.next(Some(&mode)) {
            state = next;
            if matches!(
                state,
                State::Line { line_state: LineState::ChromaScan { .. }, .. }
            ) {
                saw_chroma_scan = true;
            }
        }

        assert!(saw_chroma_scan);
    }
}
