use thiserror::Error;

/// Fatal renderer initialization failure.
///
/// Reported once to the host. Initialization is never retried after any of
/// these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InitError {
    /// No adapter/device compatible with the surface could be obtained.
    #[error("no compatible GPU device: {0}")]
    NoDevice(String),

    /// The host offers no presentable surface, or the surface supports no formats.
    #[error("no presentable surface: {0}")]
    NoSurface(String),

    /// Shader source failed to parse, validate, or match the pipeline interface.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// `initialize` was called on a renderer that already attempted initialization.
    #[error("renderer initialization was already attempted")]
    AlreadyInitialized,
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Maps a `wgpu::SurfaceError` to the action the frame loop should take.
///
/// `reconfigure` is invoked for lost/outdated swapchains.
pub(crate) fn map_surface_error(
    err: wgpu::SurfaceError,
    reconfigure: impl FnOnce(),
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            reconfigure();
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_reconfigure() {
        for err in [wgpu::SurfaceError::Lost, wgpu::SurfaceError::Outdated] {
            let mut called = false;
            let action = map_surface_error(err, || called = true);
            assert_eq!(action, SurfaceErrorAction::Reconfigured);
            assert!(called);
        }
    }

    #[test]
    fn timeout_skips_without_reconfigure() {
        let mut called = false;
        let action = map_surface_error(wgpu::SurfaceError::Timeout, || called = true);
        assert_eq!(action, SurfaceErrorAction::SkipFrame);
        assert!(!called);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(
            map_surface_error(wgpu::SurfaceError::OutOfMemory, || {}),
            SurfaceErrorAction::Fatal
        );
    }

    #[test]
    fn init_error_messages_name_the_cause() {
        let e = InitError::ShaderCompile("expected `;`".into());
        assert_eq!(e.to_string(), "shader compilation failed: expected `;`");
    }
}
