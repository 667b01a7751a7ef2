//! Ownership of the board resources for one tracking run.
//!
//! [`Session::acquire`] opens the serial link, the frame source and the
//! display sink, in that order. A missing serial link only disables
//! telemetry; a missing frame source or display aborts startup and releases
//! whatever was already open. Every acquired resource is released exactly
//! once, in reverse order, either by [`Session::release`] or on drop.

use log::{info, warn};
use servo_track_telemetry::TelemetryPort;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::TrackerConfig;
use crate::display::DisplayPlacement;
use crate::error::{AcquisitionError, ReleaseError, Resource, SessionError};
use crate::hal::{FrameSink, FrameSource, ResourceProvider};

/// Outcome of a release pass.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    /// Resources torn down, in the order they were released.
    pub released: Vec<Resource>,
    /// Teardown failures; the affected resource is still considered gone.
    pub failures: Vec<ReleaseError>,
}

impl ReleaseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Board resources owned for the duration of a tracking run.
pub struct Session {
    telemetry: Option<Box<dyn TelemetryPort>>,
    frame_source: Option<Box<dyn FrameSource>>,
    sink: Option<Box<dyn FrameSink>>,
    placement: DisplayPlacement,
    acquired: Vec<Resource>,
}

impl Session {
    /// Open every resource the configuration asks for.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(provider, cfg), fields(mode = %cfg.display_mode))
    )]
    pub fn acquire<P: ResourceProvider + ?Sized>(
        provider: &mut P,
        cfg: &TrackerConfig,
    ) -> Result<Self, SessionError> {
        let mut session = Session {
            telemetry: None,
            frame_source: None,
            sink: None,
            placement: DisplayPlacement::for_config(cfg),
            acquired: Vec::with_capacity(3),
        };

        info!("opening serial link");
        let link = cfg
            .serial
            .validate()
            .map_err(AcquisitionError::from)
            .and_then(|()| provider.open_telemetry(&cfg.serial));
        match link {
            Ok(port) => {
                info!(
                    "serial link ready ({} baud, tx pin {}, rx pin {})",
                    cfg.serial.baud_rate, cfg.serial.tx_pin, cfg.serial.rx_pin
                );
                session.telemetry = Some(port);
                session.acquired.push(Resource::SerialLink);
            }
            Err(err) => warn!("serial link unavailable, running without telemetry: {err}"),
        }

        info!("opening frame source");
        let source = provider
            .open_frame_source(cfg)
            .map_err(|source| SessionError::Startup {
                resource: Resource::FrameSource,
                source,
            })?;
        session.frame_source = Some(source);
        session.acquired.push(Resource::FrameSource);

        let placement = session.placement;
        info!(
            "opening {} display ({}x{} canvas)",
            placement.mode, placement.canvas_width, placement.canvas_height
        );
        let sink = provider
            .open_sink(&placement)
            .map_err(|source| SessionError::Startup {
                resource: Resource::DisplaySink,
                source,
            })?;
        session.sink = Some(sink);
        session.acquired.push(Resource::DisplaySink);

        Ok(session)
    }

    /// Frame source and display are both open.
    pub fn is_ready(&self) -> bool {
        self.frame_source.is_some() && self.sink.is_some()
    }

    pub fn has_telemetry(&self) -> bool {
        self.telemetry.is_some()
    }

    /// Resources currently held, in acquisition order.
    pub fn acquired(&self) -> &[Resource] {
        &self.acquired
    }

    pub fn placement(&self) -> DisplayPlacement {
        self.placement
    }

    pub fn frame_source_mut(&mut self) -> Option<&mut (dyn FrameSource + 'static)> {
        self.frame_source.as_deref_mut()
    }

    pub fn sink_mut(&mut self) -> Option<&mut (dyn FrameSink + 'static)> {
        self.sink.as_deref_mut()
    }

    pub fn telemetry_mut(&mut self) -> Option<&mut (dyn TelemetryPort + 'static)> {
        self.telemetry.as_deref_mut()
    }

    /// Release everything still held, newest first.
    ///
    /// A failing teardown is recorded and the remaining resources are still
    /// released. Calling this again is a no-op.
    pub fn release(&mut self) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        while let Some(resource) = self.acquired.pop() {
            let result = match resource {
                Resource::DisplaySink => self.sink.take().map(|mut sink| sink.release()),
                Resource::FrameSource => self.frame_source.take().map(|mut src| src.release()),
                Resource::SerialLink => self
                    .telemetry
                    .take()
                    .map(|mut port| port.close().map_err(|e| ReleaseError::from((resource, e)))),
            };
            match result {
                Some(Err(err)) => {
                    warn!("{err}");
                    report.failures.push(err);
                }
                Some(Ok(())) => info!("released {resource}"),
                None => {}
            }
            report.released.push(resource);
        }
        report
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.acquired.is_empty() {
            let _ = self.release();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("acquired", &self.acquired)
            .field("placement", &self.placement)
            .finish()
    }
}
