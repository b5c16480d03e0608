//! Background image loading.

use super::sticker_draft::LoadTicket;
use crate::error::{CoreError, CoreResult};
use crate::imaging;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// A finished load, to be applied with
/// [`StickerDraft::apply`](super::StickerDraft::apply).
#[derive(Debug)]
pub struct LoadResult {
    /// Ticket the load was started with.
    pub ticket: LoadTicket,
    /// Canonical PNG bytes, or why the image could not be used.
    pub image: CoreResult<Vec<u8>>,
}

struct Job {
    ticket: LoadTicket,
    bytes: Vec<u8>,
}

/// Decodes and resizes images on a worker thread.
///
/// One loader may serve several drafts. A job whose ticket has been
/// overtaken by a newer submission from the same draft before the worker
/// reaches it is skipped without decoding. Dropping the loader stops the
/// worker after its current job.
pub struct ImageLoader {
    jobs: Option<Sender<Job>>,
    results: Receiver<LoadResult>,
    /// Newest submitted ticket per draft.
    latest: Arc<Mutex<HashMap<u64, u64>>>,
    worker: Option<JoinHandle<()>>,
}

impl ImageLoader {
    /// Starts a loader that fits images into `canonical_size` pixels.
    pub fn new(canonical_size: u32) -> CoreResult<Self> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<LoadResult>();
        let latest: Arc<Mutex<HashMap<u64, u64>>> = Arc::default();

        let newest = Arc::clone(&latest);
        let worker = thread::Builder::new()
            .name("sticker-image-loader".into())
            .spawn(move || {
                for job in job_rx.iter() {
                    let superseded = newest
                        .lock()
                        .get(&job.ticket.draft())
                        .is_some_and(|&seq| job.ticket.as_u64() < seq);
                    if superseded {
                        debug!(
                            draft = job.ticket.draft(),
                            ticket = job.ticket.as_u64(),
                            "skipping superseded load"
                        );
                        continue;
                    }
                    let image = imaging::resize_to_canonical(&job.bytes, canonical_size);
                    let result = LoadResult {
                        ticket: job.ticket,
                        image,
                    };
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            latest,
            worker: Some(worker),
        })
    }

    /// Queues `bytes` for loading under `ticket`.
    pub fn load(&self, ticket: LoadTicket, bytes: Vec<u8>) -> CoreResult<()> {
        {
            let mut latest = self.latest.lock();
            let seq = latest.entry(ticket.draft()).or_insert(0);
            *seq = (*seq).max(ticket.as_u64());
        }
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| CoreError::invalid_operation("image loader stopped"))?;
        jobs.send(Job { ticket, bytes })
            .map_err(|_| CoreError::invalid_operation("image loader stopped"))
    }

    /// Returns every result that has finished so far.
    pub fn poll(&self) -> Vec<LoadResult> {
        self.results.try_iter().collect()
    }

    /// Waits up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadResult> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::StickerDraft;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([0, 0, 255, 255]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn loads_and_resizes_off_thread() {
        let loader = ImageLoader::new(64).unwrap();
        let mut draft = StickerDraft::new();

        let ticket = draft.begin_load();
        loader.load(ticket, png(128, 32)).unwrap();

        let result = loader.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(draft.apply(result).unwrap());

        let info = imaging::inspect(draft.image().unwrap()).unwrap();
        assert_eq!((info.width, info.height), (64, 16));
    }

    #[test]
    fn only_latest_load_lands_in_draft() {
        let loader = ImageLoader::new(32).unwrap();
        let mut draft = StickerDraft::new();

        let first = draft.begin_load();
        loader.load(first, png(10, 10)).unwrap();
        let second = draft.begin_load();
        loader.load(second, png(20, 10)).unwrap();

        loop {
            let result = loader.recv_timeout(Duration::from_secs(10)).unwrap();
            let ticket = result.ticket;
            let applied = draft.apply(result).unwrap();
            assert_eq!(applied, ticket == second);
            if ticket == second {
                break;
            }
        }

        let info = imaging::inspect(draft.image().unwrap()).unwrap();
        assert_eq!((info.width, info.height), (32, 16));
    }

    #[test]
    fn drafts_sharing_a_loader_do_not_supersede_each_other() {
        let loader = ImageLoader::new(16).unwrap();

        let mut first = StickerDraft::new();
        first.begin_load();
        let newest = first.begin_load();
        loader.load(newest, png(8, 8)).unwrap();
        let result = loader.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(first.apply(result).unwrap());

        let mut second = StickerDraft::new();
        let ticket = second.begin_load();
        assert_eq!(ticket.as_u64(), 1);
        loader.load(ticket, png(4, 8)).unwrap();

        let result = loader
            .recv_timeout(Duration::from_secs(10))
            .expect("second draft's load was dropped");
        assert_eq!(result.ticket, ticket);
        assert!(second.apply(result).unwrap());
        let info = imaging::inspect(second.image().unwrap()).unwrap();
        assert_eq!((info.width, info.height), (8, 16));
    }

    #[test]
    fn undecodable_bytes_report_an_error() {
        let loader = ImageLoader::new(32).unwrap();
        let mut draft = StickerDraft::new();
        let ticket = draft.begin_load();
        loader.load(ticket, b"definitely not an image".to_vec()).unwrap();

        let result = loader.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(draft.apply(result), Err(CoreError::Image(_))));
    }

    #[test]
    fn poll_is_empty_without_jobs() {
        let loader = ImageLoader::new(32).unwrap();
        assert!(loader.poll().is_empty());
    }
}
