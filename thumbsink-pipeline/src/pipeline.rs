//! Pipeline assembly and the external input port.
//!
//! The pipeline owns the five stages in fixed order, links them front to
//! back, and proxies one external input port to the first stage. Frames are
//! driven through synchronously in arrival order, so control events sent
//! after N frames are observed by every stage only after those N frames
//! have fully traversed it.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::event::Event;
use crate::probe::FrameCountProbe;
use crate::registry::{StageCapability, StageRegistry};
use crate::stage::{Stage, StagePayload};
use thumbsink_core::VideoFrame;
use tracing::{info, trace, warn};

/// Index of the stage whose output feeds the observation probe: the rate
/// enforcer, directly upstream of the encoder.
const PROBE_POINT: usize = 2;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineState {
    /// Constructed and linked, no frame seen yet.
    Ready,
    /// At least one frame or event has been accepted.
    Running,
    /// End of stream was processed.
    Finished,
    /// A stage failed; the pipeline no longer accepts input.
    Error,
}

/// The composed thumbnail element.
///
/// Owns all five stages and their linkage, one external input port
/// ([`Self::push_frame`]) and no external output port: output leaves as
/// numbered files written by the sink stage. Stage order is fixed at
/// construction and never changes.
pub struct ThumbnailPipeline {
    config: PipelineConfig,
    state: PipelineState,
    stages: Vec<Box<dyn Stage>>,
    probe: FrameCountProbe,
    files_written: u64,
}

impl std::fmt::Debug for ThumbnailPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailPipeline")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("stages", &self.stages.len())
            .field("probe", &self.probe)
            .field("files_written", &self.files_written)
            .finish()
    }
}

impl ThumbnailPipeline {
    /// Construct the pipeline with the built-in stage set.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_registry(config, &StageRegistry::with_defaults())
    }

    /// Construct the pipeline, sourcing stages from `registry`.
    ///
    /// All five capabilities are created and linked before anything is
    /// returned; any failure aborts construction and leaves no partial
    /// pipeline reachable. No network or disk is touched here.
    pub fn with_registry(config: PipelineConfig, registry: &StageRegistry) -> Result<Self> {
        let stages = construct_stages(registry, &config)?;
        verify_links(&stages)?;

        info!(
            template = %config.naming_template,
            max_rate = config.rate.max_rate,
            "thumbnail pipeline constructed"
        );

        Ok(Self {
            config,
            state: PipelineState::Ready,
            stages,
            probe: FrameCountProbe::new(),
            files_written: 0,
        })
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether the per-frame diagnostic line is suppressed.
    pub fn is_silent(&self) -> bool {
        self.config.silent
    }

    /// Suppress or restore the per-frame diagnostic line. Takes effect on
    /// the next frame; topology and counting are unaffected.
    pub fn set_silent(&mut self, silent: bool) {
        self.config.silent = silent;
    }

    /// Frames that have reached the observation point.
    pub fn frames_observed(&self) -> u64 {
        self.probe.count()
    }

    /// Files written by the sink stage.
    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    /// The external input port: accepts a raw frame in any supported layout
    /// and forwards it to the first stage, exactly as that stage's own
    /// input would.
    pub fn push_frame(&mut self, frame: VideoFrame) -> Result<()> {
        self.ensure_accepting()?;
        self.state = PipelineState::Running;

        match self.drive(StagePayload::Raw(frame)) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, "pipeline halted on frame");
                self.state = PipelineState::Error;
                Err(err)
            }
        }
    }

    /// Deliver a control event to the external port.
    ///
    /// Every event kind is forwarded to each stage in chain order
    /// unchanged; this is the default dispatch and the place a future
    /// version may intercept specific kinds. End of stream additionally
    /// finishes each stage and moves the pipeline to
    /// [`PipelineState::Finished`].
    pub fn send_event(&mut self, event: Event) -> Result<()> {
        self.ensure_accepting()?;

        match self.dispatch_event(&event) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(error = %err, event = event.name(), "pipeline halted on event");
                self.state = PipelineState::Error;
                Err(err)
            }
        }
    }

    fn dispatch_event(&mut self, event: &Event) -> Result<()> {
        trace!(event = event.name(), "event forwarded");
        let eos = matches!(event, Event::Eos);

        for stage in &mut self.stages {
            stage.handle_event(event)?;
            if eos {
                stage.finish()?;
            }
        }

        if eos {
            self.state = PipelineState::Finished;
            info!(
                frames = self.probe.count(),
                files = self.files_written,
                "pipeline finished"
            );
        }
        Ok(())
    }

    fn ensure_accepting(&self) -> Result<()> {
        match self.state {
            PipelineState::Finished | PipelineState::Error => Err(PipelineError::Halted),
            PipelineState::Ready | PipelineState::Running => Ok(()),
        }
    }

    fn drive(&mut self, mut payload: StagePayload) -> Result<()> {
        let sink = self.stages.len() - 1;

        for (i, stage) in self.stages.iter_mut().enumerate() {
            match stage.process(payload)? {
                Some(next) => {
                    if i == PROBE_POINT {
                        self.probe.observe(&next, self.config.silent);
                    }
                    payload = next;
                }
                None => {
                    if i == sink {
                        self.files_written += 1;
                    } else {
                        trace!(stage = stage.name(), "payload dropped");
                    }
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

/// Create all five stages in chain order. All-or-nothing: the first missing
/// capability aborts the whole construction.
fn construct_stages(
    registry: &StageRegistry,
    config: &PipelineConfig,
) -> Result<Vec<Box<dyn Stage>>> {
    StageCapability::ALL
        .iter()
        .map(|capability| registry.create(*capability, config))
        .collect()
}

/// Check each adjacent stage pair agrees on a format. Negotiation is local
/// to the pair, never global.
fn verify_links(stages: &[Box<dyn Stage>]) -> Result<()> {
    for pair in stages.windows(2) {
        let (upstream, downstream) = (&pair[0], &pair[1]);
        if !downstream.input_caps().accepts(&upstream.output_caps()) {
            return Err(PipelineError::Linkage {
                upstream: upstream.name().to_string(),
                downstream: downstream.name().to_string(),
            });
        }
    }
    Ok(())
}
