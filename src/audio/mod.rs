//! Push-to-talk capture: microphone access, buffering, WAV assembly and
//! upload of finished recordings.

pub mod capture;
pub mod pipeline;
pub mod recorder;
pub mod wav;

pub use capture::{
    AudioConfig, CaptureBackendKind, MicrophoneSource, MicrophoneStream, OpenFuture,
    SubprocessMicrophone,
};
pub use pipeline::AudioPipeline;
pub use recorder::{AudioRecorder, RecorderEvent, RecorderState, StartOutcome, StopOutcome};
pub use wav::{AudioPayload, encode_wav};
