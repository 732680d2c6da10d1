//! Background decoding of stereo pairs.
//!
//! Decoding a multi-megapixel JPEG takes far longer than a frame, so the
//! window hands `(ticket, left, right)` jobs to a worker thread and polls for
//! finished pairs at the top of every frame. Ticket bookkeeping lives in the
//! core; the worker only echoes the ticket back.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use image::RgbaImage;
use stereorig::{Eye, EyeImage, LoadTicket, StereoError, StereoTexturePair};

pub type DecodedPair = Result<StereoTexturePair<RgbaImage>, StereoError>;

struct DecodeJob {
    ticket: LoadTicket,
    left: PathBuf,
    right: PathBuf,
}

pub(crate) struct DecodeWorker {
    jobs: Option<Sender<DecodeJob>>,
    results: Receiver<(LoadTicket, DecodedPair)>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    pub(crate) fn spawn() -> Result<Self> {
        let (job_tx, job_rx) = unbounded::<DecodeJob>();
        let (result_tx, result_rx) = unbounded();
        let handle = thread::Builder::new()
            .name("stereo-decode".into())
            .spawn(move || {
                for job in job_rx.iter() {
                    tracing::debug!(
                        ticket = job.ticket.id(),
                        left = %job.left.display(),
                        right = %job.right.display(),
                        "decoding stereo pair"
                    );
                    let result = decode_pair(&job.left, &job.right);
                    if result_tx.send((job.ticket, result)).is_err() {
                        break;
                    }
                }
            })
            .map_err(|err| anyhow!("failed to spawn decode thread: {err}"))?;
        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    pub(crate) fn submit(&self, ticket: LoadTicket, left: PathBuf, right: PathBuf) -> Result<()> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| anyhow!("decode worker already shut down"))?;
        jobs.send(DecodeJob {
            ticket,
            left,
            right,
        })
        .map_err(|_| anyhow!("decode worker disconnected"))
    }

    /// Returns a finished pair without blocking.
    pub(crate) fn try_recv(&self) -> Option<(LoadTicket, DecodedPair)> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("decode worker exited unexpectedly");
                None
            }
        }
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Decodes both images; the pair fails as a whole if either side fails.
pub fn decode_pair(left: &Path, right: &Path) -> DecodedPair {
    let left = decode_eye(Eye::Left, left)?;
    let right = decode_eye(Eye::Right, right)?;
    Ok(StereoTexturePair::new(left, right))
}

fn decode_eye(eye: Eye, path: &Path) -> Result<EyeImage<RgbaImage>, StereoError> {
    // `image::open` owns the file handle for the duration of the call only.
    let image = image::open(path)
        .map_err(|err| StereoError::image_load(eye, format!("{}: {err}", path.display())))?;
    let rgba = image.to_rgba8();
    Ok(EyeImage::new(rgba.width(), rgba.height(), rgba))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use image::Rgba;

    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]))
            .save(&path)
            .expect("write png");
        path
    }

    #[test]
    fn decodes_both_eyes() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_png(dir.path(), "l.png", 8, 4);
        let right = write_png(dir.path(), "r.png", 8, 4);
        let pair = decode_pair(&left, &right).expect("pair");
        assert_eq!((pair.left().width, pair.left().height), (8, 4));
        assert_eq!(pair.right().pixels.get_pixel(0, 0), &Rgba([200, 10, 10, 255]));
    }

    #[test]
    fn failure_names_the_broken_eye() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_png(dir.path(), "l.png", 2, 2);
        let right = dir.path().join("missing.png");
        let err = decode_pair(&left, &right).unwrap_err();
        assert!(matches!(err, StereoError::ImageLoadFailure { eye: Eye::Right, .. }));
    }

    #[test]
    fn garbage_bytes_are_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"not a png").unwrap();
        let right = write_png(dir.path(), "r.png", 2, 2);
        let err = decode_pair(&bogus, &right).unwrap_err();
        assert!(matches!(err, StereoError::ImageLoadFailure { eye: Eye::Left, .. }));
    }

    #[test]
    fn worker_echoes_ticket() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_png(dir.path(), "l.png", 3, 3);
        let right = write_png(dir.path(), "r.png", 3, 3);
        let mut loader = stereorig::PairLoader::new();
        let ticket = loader.request();

        let worker = DecodeWorker::spawn().unwrap();
        worker.submit(ticket, left, right).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        let (echoed, result) = loop {
            if let Some(done) = worker.try_recv() {
                break done;
            }
            assert!(Instant::now() < deadline, "decode worker timed out");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(echoed, ticket);
        assert!(result.is_ok());
    }
}
