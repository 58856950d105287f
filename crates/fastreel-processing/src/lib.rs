//! Fastreel Processing Library
//!
//! The video ingest path: content-type validation, scoped upload sessions, the ffprobe
//! aspect classifier, the ffmpeg fast-start remuxer, the admission gate bounding
//! concurrent external processes, and the pipeline that ties them to object storage.

pub mod command;
pub mod error;
pub mod gate;
pub mod pipeline;
pub mod probe;
pub mod remux;
pub mod session;
pub mod validator;

pub use error::{ProcessingError, ProcessingResult};
pub use gate::ProcessGate;
pub use pipeline::{IngestOutcome, VideoIngestPipeline};
pub use probe::{classify_report, FfprobeProbe, MediaProbe, ProbeReport, ProbeStream};
pub use remux::{FfmpegRemuxer, Remuxer};
pub use session::{ReceivedFile, UploadSession};
pub use validator::{ContentTypePolicy, ValidatedMediaType};
