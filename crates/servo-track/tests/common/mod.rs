//! Scripted stand-ins for the board, shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use servo_track::core::{Frame, GrayImage, GrayImageView};
use servo_track::telemetry::{SerialSettings, TelemetryFrame, TelemetryPort, TransportError};
use servo_track::{
    AcquisitionError, DetectionError, DetectionParams, DisplayPlacement, FrameSink, FrameSource,
    RectangleDetector, ReleaseError, RenderError, Resource, ResourceProvider, TrackerConfig,
};

pub type Shared<T> = Rc<RefCell<T>>;

/// What the frame source does on each snapshot.
#[derive(Clone, Copy, Debug)]
pub enum SourceStep {
    Frame,
    Transient,
    Disconnect,
}

/// A fake board. Every open and release is appended to `journal`.
#[derive(Default)]
pub struct Board {
    pub journal: Shared<Vec<String>>,
    pub wire: Shared<Vec<u8>>,
    pub shown: Shared<Vec<Frame>>,
    pub script: Vec<SourceStep>,
    pub serial_missing: bool,
    pub fail_writes: bool,
    pub fail_open: Option<Resource>,
    pub fail_release: Vec<Resource>,
    /// Frame indices the display rejects.
    pub failing_renders: Vec<u64>,
}

impl Board {
    pub fn with_frames(n: usize) -> Self {
        Self {
            script: vec![SourceStep::Frame; n],
            ..Self::default()
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    fn log(&self, entry: &str) {
        note(&self.journal, entry);
    }

    fn unavailable(resource: Resource) -> AcquisitionError {
        AcquisitionError::Unavailable {
            resource,
            reason: "not plugged in".to_string(),
        }
    }
}

impl ResourceProvider for Board {
    fn open_telemetry(
        &mut self,
        _settings: &SerialSettings,
    ) -> Result<Box<dyn TelemetryPort>, AcquisitionError> {
        self.log("open serial link");
        if self.serial_missing {
            return Err(Self::unavailable(Resource::SerialLink));
        }
        Ok(Box::new(ScriptedPort {
            wire: Rc::clone(&self.wire),
            journal: Rc::clone(&self.journal),
            fail_writes: self.fail_writes,
            fail_close: self.fail_release.contains(&Resource::SerialLink),
        }))
    }

    fn open_frame_source(
        &mut self,
        cfg: &TrackerConfig,
    ) -> Result<Box<dyn FrameSource>, AcquisitionError> {
        self.log("open frame source");
        if self.fail_open == Some(Resource::FrameSource) {
            return Err(Self::unavailable(Resource::FrameSource));
        }
        Ok(Box::new(ScriptedSource {
            steps: self.script.iter().copied().collect(),
            next: 0,
            width: cfg.detect_width as usize,
            height: cfg.detect_height as usize,
            journal: Rc::clone(&self.journal),
            fail_release: self.fail_release.contains(&Resource::FrameSource),
        }))
    }

    fn open_sink(
        &mut self,
        _placement: &DisplayPlacement,
    ) -> Result<Box<dyn FrameSink>, AcquisitionError> {
        self.log("open display sink");
        if self.fail_open == Some(Resource::DisplaySink) {
            return Err(Self::unavailable(Resource::DisplaySink));
        }
        Ok(Box::new(ScriptedSink {
            shown: Rc::clone(&self.shown),
            journal: Rc::clone(&self.journal),
            failing: self.failing_renders.clone(),
            fail_release: self.fail_release.contains(&Resource::DisplaySink),
        }))
    }
}

fn note(journal: &Shared<Vec<String>>, entry: &str) {
    journal.borrow_mut().push(entry.to_string());
}

struct ScriptedPort {
    wire: Shared<Vec<u8>>,
    journal: Shared<Vec<String>>,
    fail_writes: bool,
    fail_close: bool,
}

impl TelemetryPort for ScriptedPort {
    fn write_frame(&mut self, frame: &TelemetryFrame) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(TransportError::Rejected("tx buffer full".to_string()));
        }
        self.wire.borrow_mut().extend_from_slice(frame.as_bytes());
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        note(&self.journal, "release serial link");
        if self.fail_close {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

struct ScriptedSource {
    steps: VecDeque<SourceStep>,
    next: u64,
    width: usize,
    height: usize,
    journal: Shared<Vec<String>>,
    fail_release: bool,
}

impl FrameSource for ScriptedSource {
    fn snapshot(&mut self) -> Result<Frame, AcquisitionError> {
        match self.steps.pop_front() {
            None => Err(AcquisitionError::Exhausted),
            Some(SourceStep::Transient) => Err(AcquisitionError::Transient("dma timeout".into())),
            Some(SourceStep::Disconnect) => {
                Err(AcquisitionError::Disconnected("sensor unplugged".into()))
            }
            Some(SourceStep::Frame) => {
                let frame = Frame::new(self.next, GrayImage::filled(self.width, self.height, 0)?);
                self.next += 1;
                Ok(frame)
            }
        }
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        note(&self.journal, "release frame source");
        if self.fail_release {
            return Err(ReleaseError::new(Resource::FrameSource, "sensor stuck"));
        }
        Ok(())
    }
}

struct ScriptedSink {
    shown: Shared<Vec<Frame>>,
    journal: Shared<Vec<String>>,
    failing: Vec<u64>,
    fail_release: bool,
}

impl FrameSink for ScriptedSink {
    fn show(&mut self, frame: &Frame, _placement: &DisplayPlacement) -> Result<(), RenderError> {
        if self.failing.contains(&frame.index) {
            return Err(RenderError::Failed("vsync lost".to_string()));
        }
        self.shown.borrow_mut().push(frame.clone());
        Ok(())
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        note(&self.journal, "release display sink");
        if self.fail_release {
            return Err(ReleaseError::new(Resource::DisplaySink, "panel busy"));
        }
        Ok(())
    }
}

/// Detector returning one scripted result per call, then nothing.
#[derive(Default)]
pub struct ScriptedDetector {
    results: VecDeque<Result<Vec<i32>, String>>,
}

impl ScriptedDetector {
    pub fn new(results: impl IntoIterator<Item = Result<Vec<i32>, String>>) -> Self {
        Self {
            results: results.into_iter().collect(),
        }
    }

    /// The same detections on every frame.
    pub fn repeating(flat: Vec<i32>, frames: usize) -> Self {
        Self::new(std::iter::repeat_n(Ok(flat), frames))
    }
}

impl RectangleDetector for ScriptedDetector {
    fn find_rectangles(
        &mut self,
        _image: &GrayImageView<'_>,
        _params: &DetectionParams,
    ) -> Result<Vec<i32>, DetectionError> {
        match self.results.pop_front() {
            Some(Ok(flat)) => Ok(flat),
            Some(Err(reason)) => Err(DetectionError::Failed(reason)),
            None => Ok(Vec::new()),
        }
    }
}
