//! Ordered frame delivery over an injected control channel.

use tracing::{debug, trace};

use crate::error::{LightError, Result};
use crate::frame::ControlFrame;

/// A writable control channel to the keyboard.
///
/// Implementations perform exactly one blocking write per call and report how
/// many bytes the device accepted.
pub trait ControlChannel {
    fn write(&mut self, frame: &[u8]) -> anyhow::Result<usize>;
}

/// Send frames in order, one write each.
///
/// Stops at the first failed or short write; later frames are never sent and
/// nothing is retried. Returns the total number of bytes written.
pub fn send_frames(channel: &mut dyn ControlChannel, frames: &[ControlFrame]) -> Result<usize> {
    let mut total = 0;

    for (i, frame) in frames.iter().enumerate() {
        trace!(frame = i, bytes = %frame, "write");
        let written = channel
            .write(frame.as_bytes())
            .map_err(|err| LightError::TransportError {
                frame: i,
                reason: format!("{err:#}"),
            })?;

        if written != frame.len() {
            return Err(LightError::TransportError {
                frame: i,
                reason: format!("short write: {written} of {} bytes", frame.len()),
            });
        }
        total += written;
    }

    debug!(frames = frames.len(), bytes = total, "frames sent");
    Ok(total)
}

/// Channel that keeps every frame instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    pub frames: Vec<Vec<u8>>,
}

impl ControlChannel for RecordingChannel {
    fn write(&mut self, frame: &[u8]) -> anyhow::Result<usize> {
        self.frames.push(frame.to_vec());
        Ok(frame.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{EntryLayout, FrameLayout};
    use crate::resolver::resolve_all;
    use anyhow::anyhow;

    /// Accepts `ok` frames, then misbehaves.
    struct FlakyChannel {
        ok: usize,
        short: bool,
        writes: usize,
    }

    impl ControlChannel for FlakyChannel {
        fn write(&mut self, frame: &[u8]) -> anyhow::Result<usize> {
            self.writes += 1;
            if self.writes <= self.ok {
                Ok(frame.len())
            } else if self.short {
                Ok(frame.len() / 2)
            } else {
                Err(anyhow!("pipe error"))
            }
        }
    }

    fn frames(args: &[&str]) -> Vec<ControlFrame> {
        EntryLayout.build(&resolve_all(args).unwrap())
    }

    #[test]
    fn sends_every_frame_in_order() {
        let frames = frames(&["all", "FFFA710F"]);
        let mut channel = RecordingChannel::default();
        let total = send_frames(&mut channel, &frames).unwrap();

        assert_eq!(total, frames.iter().map(ControlFrame::len).sum::<usize>());
        let sent: Vec<&[u8]> = channel.frames.iter().map(Vec::as_slice).collect();
        let built: Vec<&[u8]> = frames.iter().map(ControlFrame::as_bytes).collect();
        assert_eq!(sent, built);
    }

    #[test]
    fn no_frames_no_writes() {
        let mut channel = RecordingChannel::default();
        assert_eq!(send_frames(&mut channel, &[]).unwrap(), 0);
        assert!(channel.frames.is_empty());
    }

    #[test]
    fn write_error_stops_remaining_frames() {
        let frames = frames(&["all", "FFFA710F"]);
        assert!(frames.len() > 2);

        let mut channel = FlakyChannel {
            ok: 1,
            short: false,
            writes: 0,
        };
        let err = send_frames(&mut channel, &frames).unwrap_err();
        assert_eq!(
            err,
            LightError::TransportError {
                frame: 1,
                reason: "pipe error".into()
            }
        );
        assert_eq!(channel.writes, 2);
    }

    #[test]
    fn short_write_is_an_error() {
        let frames = frames(&["home", "FFBF0FFA"]);
        let mut channel = FlakyChannel {
            ok: 0,
            short: true,
            writes: 0,
        };
        match send_frames(&mut channel, &frames) {
            Err(LightError::TransportError { frame, reason }) => {
                assert_eq!(frame, 0);
                assert!(reason.contains("short write"), "{reason}");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(channel.writes, 1);
    }

    #[test]
    fn resolution_failure_never_reaches_the_channel() {
        let mut channel = RecordingChannel::default();
        let result = resolve_all(&["home"]).map(|m| EntryLayout.build(&m));
        assert!(matches!(result, Err(LightError::MalformedArguments(_))));
        if let Ok(frames) = result {
            send_frames(&mut channel, &frames).unwrap();
        }
        assert!(channel.frames.is_empty());
    }
}
