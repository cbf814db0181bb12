use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::landmark::LandmarkSet;

/// ランドマークの供給元（カメラ + 推定器、記録ファイルなど）
///
/// フレームドライバは描画フレームごとに `latest` を呼び、同じ結果でも毎回適用する。
/// start 以降まだ何も届いていなければ None で、その場合リグは更新しない。
pub trait LandmarkSource {
    fn start(&mut self) -> Result<()>;
    /// 止めると保持していた結果も捨てる
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// 最新の結果。新しい結果が届くまで同じものを返す
    fn latest(&mut self) -> Option<LandmarkSet>;
}

#[derive(Default)]
struct Slot {
    set: Option<LandmarkSet>,
    published: u64,
}

/// 推定スレッドとフレームドライバの間の 1 枠バッファ
///
/// 結果は新しい結果で上書きされる（キューしない）。読んでも消えない。
#[derive(Clone, Default)]
pub struct SnapshotSlot {
    inner: Arc<Mutex<Slot>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, set: LandmarkSet) {
        let mut slot = self.inner.lock();
        slot.set = Some(set);
        slot.published += 1;
    }

    /// 最新の結果の複製。戻り値の u64 はその結果の通し番号
    pub fn latest(&self) -> Option<(u64, LandmarkSet)> {
        let slot = self.inner.lock();
        slot.set.clone().map(|set| (slot.published, set))
    }

    pub fn clear(&self) {
        self.inner.lock().set = None;
    }
}

type FrameIter = Box<dyn Iterator<Item = LandmarkSet> + Send>;
type Opener = Box<dyn FnMut() -> Result<FrameIter> + Send>;

/// 別スレッドで結果を生成し、最新の結果だけを提供する
pub struct ThreadedSource {
    open: Opener,
    interval: Duration,
    slot: SnapshotSlot,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    last_seen: u64,
}

impl ThreadedSource {
    /// `open` は start のたびに呼ばれ、新しいフレーム列を返す。
    /// `fps` はスレッドが結果を publish する間隔。
    pub fn new<F>(fps: u32, open: F) -> Self
    where
        F: FnMut() -> Result<FrameIter> + Send + 'static,
    {
        let fps = fps.max(1);
        Self {
            open: Box::new(open),
            interval: Duration::from_secs_f64(1.0 / fps as f64),
            slot: SnapshotSlot::new(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            last_seen: 0,
        }
    }

    /// 同じ記録を配信する
    pub fn from_replay(fps: u32, frames: ReplayFrames, looping: bool) -> Self {
        Self::new(fps, move || Ok(frames.clone().into_frames(looping)))
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Landmark thread panicked");
            }
        }
    }
}

impl LandmarkSource for ThreadedSource {
    fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::Acquire) {
            return Ok(());
        }
        // 自然終了したスレッドを回収
        self.join();

        let mut frames = (self.open)().context("Failed to open landmark source")?;
        let slot = self.slot.clone();
        let running = self.running.clone();
        let interval = self.interval;
        running.store(true, Ordering::Release);

        let handle = thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                match frames.next() {
                    Some(set) => slot.publish(set),
                    None => break,
                }
                thread::sleep(interval);
            }
            running.store(false, Ordering::Release);
        });
        self.handle = Some(handle);
        debug!("Landmark source started");
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.join();
        self.slot.clear();
        debug!("Landmark source stopped");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn latest(&mut self) -> Option<LandmarkSet> {
        let (id, set) = self.slot.latest()?;
        let skipped = id.saturating_sub(self.last_seen + 1);
        if skipped > 0 {
            trace!("{} landmark result(s) overwritten before use", skipped);
        }
        self.last_seen = self.last_seen.max(id);
        Some(set)
    }
}

impl Drop for ThreadedSource {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.join();
    }
}

/// JSON Lines 形式の記録（1行 = 1フレームの LandmarkSet）
#[derive(Debug, Clone, Default)]
pub struct ReplayFrames {
    frames: Vec<LandmarkSet>,
}

impl ReplayFrames {
    pub fn new(frames: Vec<LandmarkSet>) -> Self {
        Self { frames }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording {}", path.display()))?;
        Self::parse(BufReader::new(file))
    }

    /// 壊れた行は警告を出して読み飛ばす
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LandmarkSet>(line) {
                Ok(set) => frames.push(set),
                Err(e) => warn!("Skipping malformed recording line {}: {}", i + 1, e),
            }
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[LandmarkSet] {
        &self.frames
    }

    fn into_frames(self, looping: bool) -> FrameIter {
        if looping && !self.frames.is_empty() {
            Box::new(self.frames.into_iter().cycle())
        } else {
            Box::new(self.frames.into_iter())
        }
    }
}

/// 同一スレッドで記録を 1 回の `latest` につき 1 フレームずつ進めるソース
///
/// 最後まで進んだ後は最後のフレームを返し続ける。
pub struct ReplaySource {
    frames: Vec<LandmarkSet>,
    cursor: usize,
    current: Option<usize>,
    running: bool,
}

impl ReplaySource {
    pub fn new(frames: ReplayFrames) -> Self {
        Self {
            frames: frames.frames,
            cursor: 0,
            current: None,
            running: false,
        }
    }

    /// まだ返していないフレーム数
    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }
}

impl LandmarkSource for ReplaySource {
    fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.current = None;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn latest(&mut self) -> Option<LandmarkSet> {
        if !self.running {
            return None;
        }
        if self.cursor < self.frames.len() {
            self.current = Some(self.cursor);
            self.cursor += 1;
        }
        self.current.and_then(|i| self.frames.get(i)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;
    use std::io::Cursor;
    use std::time::Instant;

    fn hand_frame(x: f32) -> LandmarkSet {
        LandmarkSet {
            left_hand: Some(vec![Landmark::new(x, 0.0, 0.0); 21]),
            ..Default::default()
        }
    }

    #[test]
    fn test_slot_keeps_newest() {
        let slot = SnapshotSlot::new();
        assert!(slot.latest().is_none());
        slot.publish(hand_frame(0.1));
        slot.publish(hand_frame(0.2));
        let (id, set) = slot.latest().unwrap();
        assert_eq!(id, 2);
        assert_eq!(set, hand_frame(0.2));
        // 読んでも残る
        assert_eq!(slot.latest(), Some((2, hand_frame(0.2))));
    }

    #[test]
    fn test_slot_clear() {
        let slot = SnapshotSlot::new();
        slot.publish(hand_frame(0.1));
        slot.clear();
        assert!(slot.latest().is_none());
        slot.publish(hand_frame(0.3));
        assert_eq!(slot.latest(), Some((2, hand_frame(0.3))));
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let data = "{\"face\": null}\nnot json\n\n{\"left_hand\": [[0.1, 0.2, 0.3]]}\n";
        let frames = ReplayFrames::parse(Cursor::new(data)).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.frames()[1].left_hand.as_ref().map(|h| h.len()), Some(1));
    }

    #[test]
    fn test_replay_source_requires_start() {
        let mut source = ReplaySource::new(ReplayFrames::new(vec![hand_frame(0.1), hand_frame(0.2)]));
        assert!(source.latest().is_none());

        source.start().unwrap();
        assert_eq!(source.latest(), Some(hand_frame(0.1)));
        source.stop();
        assert!(source.latest().is_none());

        source.start().unwrap();
        assert_eq!(source.latest(), Some(hand_frame(0.2)));
        // 記録の終わりでは最後のフレームを保持する
        assert_eq!(source.latest(), Some(hand_frame(0.2)));
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_empty_replay_has_no_frame() {
        let mut source = ReplaySource::new(ReplayFrames::default());
        source.start().unwrap();
        assert!(source.latest().is_none());
        assert!(source.latest().is_none());
    }

    #[test]
    fn test_threaded_source_delivers_and_stops() {
        let frames = ReplayFrames::new(vec![hand_frame(0.5); 3]);
        let mut source = ThreadedSource::from_replay(1000, frames, true);
        source.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut received = None;
        while received.is_none() && Instant::now() < deadline {
            received = source.latest();
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(received, Some(hand_frame(0.5)));
        assert_eq!(source.latest(), Some(hand_frame(0.5)));

        source.stop();
        assert!(!source.is_running());
        assert!(source.latest().is_none());
    }

    #[test]
    fn test_threaded_source_open_error() {
        let mut source = ThreadedSource::new(30, || anyhow::bail!("camera unavailable"));
        assert!(source.start().is_err());
        assert!(!source.is_running());
        assert!(source.latest().is_none());
    }

    #[test]
    fn test_threaded_source_holds_last_result_after_thread_ends() {
        let frames = ReplayFrames::new(vec![hand_frame(0.7)]);
        let mut source = ThreadedSource::from_replay(1000, frames, false);
        source.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while source.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!source.is_running());
        for _ in 0..3 {
            assert_eq!(source.latest(), Some(hand_frame(0.7)));
        }
    }
}
