//! niakrun - A launcher for NIAK/PSOM neuroimaging pipelines on Octave

pub mod cli;
pub mod core;
pub mod grabber;
pub mod octave;
pub mod pipelines;
pub mod sync;
pub mod validator;
pub mod worker;

// Re-export commonly used types
pub use core::{BoutiqueDescriptor, CastingTable, OctaveScript, OctaveValue, TuningConfig};
pub use octave::{LaunchError, OctaveRunner, ScriptRunner};
pub use pipelines::{Basc, FmriPreprocess, FmriPreprocessBids, Launch, PipelineKind, Settings};
