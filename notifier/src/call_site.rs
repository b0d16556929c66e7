//! Recovering the source location a notice is reported from.
use std::panic::Location;

use crate::error::ReportError;
use crate::notice::BacktraceFrame;

/// Frames between `walk_stack` and the caller of a public reporting method:
/// `CallSiteResolver::resolve`, `Connection::prepare` and the public method itself.
const INTERNAL_FRAMES: usize = 3;

/// Strategy used to find the file and line of the reporting call.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum CallSiteResolver {
    /// Use the location captured by `#[track_caller]` on the public reporting methods.
    #[default]
    Tracked,
    /// Walk the stack at runtime, skipping `offset` extra frames above the reporting call.
    /// Each helper the application wraps around `report_error` needs one more frame of offset.
    StackOffset(usize),
}

impl CallSiteResolver {
    /// Resolve a frame. `location` is the caller captured at the public entry point;
    /// it is only consulted by the `Tracked` strategy.
    #[inline(never)]
    pub(crate) fn resolve(
        &self,
        location: &'static Location<'static>,
    ) -> Result<BacktraceFrame, ReportError> {
        match *self {
            CallSiteResolver::Tracked => {
                Ok(BacktraceFrame::new(location.file(), location.line()))
            }
            CallSiteResolver::StackOffset(offset) => {
                walk_stack(INTERNAL_FRAMES.saturating_add(offset))
                    .ok_or(ReportError::TraceUnavailable { offset })
            }
        }
    }
}

/// Return the frame `skip + 1` levels above this function.
/// Inlined functions count as frames of their own when debug info records them.
#[inline(never)]
fn walk_stack(skip: usize) -> Option<BacktraceFrame> {
    let mut marker_found = false;
    let mut remaining = skip;
    let mut resolved: Option<Option<BacktraceFrame>> = None;

    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if resolved.is_some() {
                return;
            }

            if !marker_found {
                marker_found = symbol
                    .name()
                    .map(|name| format!("{name:#}").ends_with("call_site::walk_stack"))
                    .unwrap_or(false);
                return;
            }

            if remaining > 0 {
                remaining -= 1;
                return;
            }

            resolved = Some(match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => {
                    Some(BacktraceFrame::new(file.to_string_lossy(), line))
                }
                _ => None,
            });
        });

        resolved.is_none()
    });

    resolved.flatten()
}
