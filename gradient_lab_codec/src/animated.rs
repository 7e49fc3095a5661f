// Copyright 2026 the Gradient Lab Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Looping GIF encoding.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use gradient_lab_core::encode::{
    AnimatedEncoder, AnimationOptions, EncodeJob, EncodePoll, validate_frames,
};
use gradient_lab_core::error::EncodeError;
use gradient_lab_core::frame::PixelFrame;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

/// Where the encoding work runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncodeMode {
    /// One frame per [`EncodeJob::poll`] on the caller's thread. For hosts
    /// without threads, such as the browser main thread.
    Inline,
    /// All frames on a background thread; `poll` only collects progress.
    #[default]
    Threaded,
}

/// Animated GIF encoder.
///
/// The sample interval maps onto the quantizer speed: 1 is the slowest and
/// best, 30 the fastest. Output loops forever.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifAnimator {
    mode: EncodeMode,
}

impl GifAnimator {
    /// Creates an encoder running in `mode`.
    #[must_use]
    pub const fn new(mode: EncodeMode) -> Self {
        Self { mode }
    }

    /// The configured mode.
    #[must_use]
    pub const fn mode(&self) -> EncodeMode {
        self.mode
    }
}

impl AnimatedEncoder for GifAnimator {
    fn begin(
        &self,
        frames: Vec<PixelFrame>,
        options: &AnimationOptions,
    ) -> Result<Box<dyn EncodeJob>, EncodeError> {
        validate_frames(&frames)?;
        match self.mode {
            EncodeMode::Inline => Ok(Box::new(InlineJob::new(frames, options)?)),
            EncodeMode::Threaded => Ok(Box::new(ThreadedJob::spawn(frames, *options)?)),
        }
    }
}

/// Frame-by-frame GIF writer shared by both modes.
struct GifStream<W: Write> {
    encoder: GifEncoder<W>,
    delay: Delay,
}

impl<W: Write> GifStream<W> {
    fn new(writer: W, options: &AnimationOptions) -> Result<Self, EncodeError> {
        let speed = i32::from(options.sample_interval.clamp(1, 30));
        let mut encoder = GifEncoder::new_with_speed(writer, speed);
        encoder.set_repeat(Repeat::Infinite).map_err(codec)?;
        let micros = u32::try_from(options.frame_delay.micros()).unwrap_or(u32::MAX);
        Ok(Self {
            encoder,
            delay: Delay::from_numer_denom_ms(micros, 1_000),
        })
    }

    fn push(&mut self, frame: PixelFrame) -> Result<(), EncodeError> {
        let (width, height) = (frame.width(), frame.height());
        let buffer = RgbaImage::from_raw(width, height, frame.into_bytes())
            .ok_or_else(|| EncodeError::Codec("frame buffer size mismatch".into()))?;
        self.encoder
            .encode_frame(Frame::from_parts(buffer, 0, 0, self.delay))
            .map_err(codec)
    }
}

fn codec(err: image::ImageError) -> EncodeError {
    EncodeError::Codec(err.to_string())
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "progress is a coarse UI fraction"
)]
fn fraction(done: usize, total: usize) -> f32 {
    if total == 0 {
        return 1.0;
    }
    (done as f64 / total as f64) as f32
}

// ---------------------------------------------------------------------------
// Inline
// ---------------------------------------------------------------------------

/// In-memory writer that outlives the encoder borrowing it.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct InlineJob {
    stream: Option<GifStream<SharedBuffer>>,
    frames: std::vec::IntoIter<PixelFrame>,
    output: SharedBuffer,
    total: usize,
    done: usize,
}

impl InlineJob {
    fn new(frames: Vec<PixelFrame>, options: &AnimationOptions) -> Result<Self, EncodeError> {
        let output = SharedBuffer::default();
        Ok(Self {
            stream: Some(GifStream::new(output.clone(), options)?),
            total: frames.len(),
            frames: frames.into_iter(),
            output,
            done: 0,
        })
    }
}

impl EncodeJob for InlineJob {
    fn poll(&mut self) -> EncodePoll {
        let Some(stream) = self.stream.as_mut() else {
            return EncodePoll::Finished(Err(EncodeError::Cancelled));
        };
        if let Some(frame) = self.frames.next() {
            if let Err(err) = stream.push(frame) {
                self.stream = None;
                return EncodePoll::Finished(Err(err));
            }
            self.done += 1;
            if self.done < self.total {
                return EncodePoll::Progress(fraction(self.done, self.total));
            }
        }
        // Dropping the encoder writes the GIF trailer.
        self.stream = None;
        EncodePoll::Finished(Ok(self.output.0.take()))
    }

    fn cancel(&mut self) {
        self.stream = None;
        self.frames = Vec::new().into_iter();
    }
}

// ---------------------------------------------------------------------------
// Threaded
// ---------------------------------------------------------------------------

/// Messages sent from the encoder thread to the polling thread.
enum WorkerMsg {
    Progress(f32),
    Done(Result<Vec<u8>, EncodeError>),
}

struct ThreadedJob {
    rx: Receiver<WorkerMsg>,
    cancel: Arc<AtomicBool>,
    progress: f32,
}

impl ThreadedJob {
    fn spawn(frames: Vec<PixelFrame>, options: AnimationOptions) -> Result<Self, EncodeError> {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        thread::Builder::new()
            .name("gif-encoder".into())
            .spawn(move || {
                let result = encode_all(frames, &options, &flag, |p| {
                    let _ = tx.send(WorkerMsg::Progress(p));
                });
                let _ = tx.send(WorkerMsg::Done(result));
            })
            .map_err(|e| EncodeError::Codec(format!("failed to spawn encoder thread: {e}")))?;

        Ok(Self {
            rx,
            cancel,
            progress: 0.0,
        })
    }
}

fn encode_all(
    frames: Vec<PixelFrame>,
    options: &AnimationOptions,
    cancel: &AtomicBool,
    mut progress: impl FnMut(f32),
) -> Result<Vec<u8>, EncodeError> {
    let total = frames.len();
    let mut bytes = Vec::new();
    {
        let mut stream = GifStream::new(&mut bytes, options)?;
        for (i, frame) in frames.into_iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                return Err(EncodeError::Cancelled);
            }
            stream.push(frame)?;
            progress(fraction(i + 1, total));
        }
    }
    Ok(bytes)
}

impl EncodeJob for ThreadedJob {
    fn poll(&mut self) -> EncodePoll {
        loop {
            match self.rx.try_recv() {
                Ok(WorkerMsg::Progress(p)) => self.progress = p,
                Ok(WorkerMsg::Done(result)) => return EncodePoll::Finished(result),
                Err(TryRecvError::Empty) => return EncodePoll::Progress(self.progress),
                Err(TryRecvError::Disconnected) => {
                    return EncodePoll::Finished(Err(EncodeError::WorkerLost));
                }
            }
        }
    }

    fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Drop for ThreadedJob {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient_lab_core::time::Duration;
    use image::AnimationDecoder;
    use image::codecs::gif::GifDecoder;
    use std::io::Cursor;

    fn frames(count: usize) -> Vec<PixelFrame> {
        (0..count)
            .map(|i| {
                let shade = (i * 40) as u8;
                PixelFrame::filled(8, 6, [shade, 255 - shade, 128, 255])
            })
            .collect()
    }

    fn options() -> AnimationOptions {
        AnimationOptions {
            frame_delay: Duration::from_millis(100),
            sample_interval: 10,
        }
    }

    fn decode(bytes: &[u8]) -> Vec<Frame> {
        GifDecoder::new(Cursor::new(bytes))
            .expect("gif header")
            .into_frames()
            .collect_frames()
            .expect("gif frames")
    }

    fn drive(job: &mut dyn EncodeJob) -> (Vec<f32>, Result<Vec<u8>, EncodeError>) {
        let mut reports = Vec::new();
        loop {
            match job.poll() {
                EncodePoll::Progress(p) => {
                    reports.push(p);
                    thread::yield_now();
                }
                EncodePoll::Finished(result) => return (reports, result),
            }
        }
    }

    #[test]
    fn inline_encodes_one_frame_per_poll() {
        let mut job = GifAnimator::new(EncodeMode::Inline)
            .begin(frames(4), &options())
            .expect("valid frames");
        let (reports, result) = drive(job.as_mut());
        assert_eq!(reports, [0.25, 0.5, 0.75], "progress after each frame but the last");

        let decoded = decode(&result.expect("encodes"));
        assert_eq!(decoded.len(), 4, "every frame kept");
        assert_eq!(decoded[0].buffer().dimensions(), (8, 6));
        let (numer, denom) = decoded[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 100, "100 ms per frame");
    }

    #[test]
    fn threaded_reports_progress_and_finishes() {
        let mut job = GifAnimator::new(EncodeMode::Threaded)
            .begin(frames(5), &options())
            .expect("valid frames");
        let (reports, result) = drive(job.as_mut());
        assert!(
            reports.windows(2).all(|w| w[0] <= w[1]),
            "progress is monotonic: {reports:?}"
        );
        assert_eq!(decode(&result.expect("encodes")).len(), 5);
    }

    #[test]
    fn mismatched_frames_are_rejected_up_front() {
        let mut input = frames(2);
        input.push(PixelFrame::filled(4, 4, [0; 4]));
        let err = GifAnimator::default().begin(input, &options()).err();
        assert_eq!(err, Some(EncodeError::MismatchedFrame { index: 2 }));

        let err = GifAnimator::default().begin(Vec::new(), &options()).err();
        assert_eq!(err, Some(EncodeError::EmptyInput));
    }

    #[test]
    fn cancelled_inline_job_produces_nothing() {
        let mut job = GifAnimator::new(EncodeMode::Inline)
            .begin(frames(3), &options())
            .expect("valid frames");
        assert!(matches!(job.poll(), EncodePoll::Progress(_)), "first frame");
        job.cancel();
        assert_eq!(
            job.poll(),
            EncodePoll::Finished(Err(EncodeError::Cancelled)),
            "no output after cancel"
        );
    }

    #[test]
    fn cancelled_threaded_job_never_succeeds() {
        let mut job = GifAnimator::new(EncodeMode::Threaded)
            .begin(frames(6), &options())
            .expect("valid frames");
        job.cancel();
        let (_, result) = drive(job.as_mut());
        // The worker may finish before it sees the flag; it must not report
        // anything but success or cancellation.
        assert!(
            matches!(result, Ok(_) | Err(EncodeError::Cancelled)),
            "{result:?}"
        );
    }
}
