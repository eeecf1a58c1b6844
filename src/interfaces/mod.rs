// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod trace_handler;

pub use trace_handler::{
    LoggingTraceHandler, NoOpTraceHandler, RecordingTraceHandler, TraceEvent, TraceHandler,
};
