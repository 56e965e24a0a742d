//! Hardware floating-point exception trapping for numerical-debugging runs.
//!
//! Enabling traps turns invalid operations, divisions by zero, and overflows
//! into hardware signals instead of quiet NaNs and infinities. The capability
//! is runtime-queryable: on builds without `feenableexcept` (anything but a
//! glibc target) [`enable_fpe`] deterministically fails with
//! [`FpeError::Unsupported`] and changes no state, rather than silently doing
//! nothing. No reset is provided; the effect persists until process exit.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FpeError {
    #[error("Floating point exception trapping cannot be enabled for this build")]
    Unsupported,

    #[error("Failed to enable floating point exception traps")]
    EnableFailed,
}

/// Whether [`enable_fpe`] can succeed on this build.
pub fn trapping_supported() -> bool {
    cfg!(all(target_os = "linux", target_env = "gnu"))
}

/// Enables hardware traps for invalid-operation, divide-by-zero, and overflow.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub fn enable_fpe() -> Result<(), FpeError> {
    // fenv.h items are not bound by the libc crate; declare the glibc
    // extension and constants ourselves.
    const FE_INVALID: libc::c_int = 1;
    const FE_DIVBYZERO: libc::c_int = 4;
    const FE_OVERFLOW: libc::c_int = 8;
    unsafe extern "C" {
        fn feenableexcept(excepts: libc::c_int) -> libc::c_int;
    }
    let excepts = FE_INVALID | FE_DIVBYZERO | FE_OVERFLOW;
    // SAFETY: feenableexcept only mutates this thread's floating-point
    // environment and is safe to call with any mask.
    let rc = unsafe { feenableexcept(excepts) };
    if rc == -1 {
        return Err(FpeError::EnableFailed);
    }
    Ok(())
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub fn enable_fpe() -> Result<(), FpeError> {
    Err(FpeError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    // enable_fpe is never invoked here on supported builds: the trap mask is
    // process-visible state and would turn unrelated NaN-producing tests into
    // hardware signals.

    #[test]
    fn capability_flag_matches_the_build_target() {
        let expected = cfg!(all(target_os = "linux", target_env = "gnu"));
        assert_eq!(trapping_supported(), expected);
    }

    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    #[test]
    fn enable_fails_identically_on_every_call_when_unsupported() {
        assert_eq!(enable_fpe(), Err(FpeError::Unsupported));
        assert_eq!(enable_fpe(), Err(FpeError::Unsupported));
    }
}
