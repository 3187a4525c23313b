//! Sample sources feeding the orientation pipeline.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crossbeam_channel::{Receiver, Sender};

use crate::error::{HorizonError, Result};
use crate::orientation::RawSample;

/// Pull-based sample source
///
/// `Ok(None)` means the source is exhausted or was stopped.
pub trait SensorSource: Send {
    fn next_sample(&mut self) -> anyhow::Result<Option<RawSample>>;
}

/// Live source fed by platform sensor callbacks through a channel
pub struct ChannelSource {
    rx: Receiver<RawSample>,
}

impl ChannelSource {
    /// Bounded channel; the returned sender goes to the sensor callback.
    /// Dropping every sender stops the source.
    pub fn new(capacity: usize) -> (Sender<RawSample>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (tx, Self { rx })
    }

    pub fn from_receiver(rx: Receiver<RawSample>) -> Self {
        Self { rx }
    }

    /// Receiver for consumers that wait with a deadline, such as calibration.
    pub fn receiver(&self) -> &Receiver<RawSample> {
        &self.rx
    }
}

impl SensorSource for ChannelSource {
    fn next_sample(&mut self) -> anyhow::Result<Option<RawSample>> {
        match self.rx.recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(_) => Ok(None),
        }
    }
}

/// Replays a recording: one JSON-encoded [`RawSample`] per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct ReplaySource {
    samples: Vec<RawSample>,
    position: usize,
}

impl ReplaySource {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let samples = read_recording(BufReader::new(file))?;
        log::info!(
            "Loaded {} samples from {}",
            samples.len(),
            path.as_ref().display()
        );
        Ok(Self::from_samples(samples))
    }

    pub fn from_samples(samples: Vec<RawSample>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SensorSource for ReplaySource {
    fn next_sample(&mut self) -> anyhow::Result<Option<RawSample>> {
        let sample = self.samples.get(self.position).copied();
        if sample.is_some() {
            self.position += 1;
        }
        Ok(sample)
    }
}

/// Parse a JSON-lines recording.
pub fn read_recording<R: BufRead>(reader: R) -> Result<Vec<RawSample>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| HorizonError::Recording {
            line: line_no,
            reason: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let sample = serde_json::from_str(trimmed).map_err(|e| HorizonError::Recording {
            line: line_no,
            reason: e.to_string(),
        })?;
        samples.push(sample);
    }
    Ok(samples)
}

/// Write samples in the format [`read_recording`] reads.
pub fn write_recording<W: Write>(mut writer: W, samples: &[RawSample]) -> anyhow::Result<()> {
    for sample in samples {
        serde_json::to_writer(&mut writer, sample)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
