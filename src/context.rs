//! The per-thread rendering-context boundary.
//!
//! This crate never creates a window or a native context on its own. The
//! caller makes an OpenGL context current on some thread and installs the
//! matching backend here; every GPU operation issued from that thread routes
//! through the installed backend. OpenGL contexts are thread-confined, so
//! the installed backend is thread-local as well and nothing in this module
//! synchronizes across threads.

use std::cell::RefCell;
use std::os::raw::c_void;

use crate::backends::{self, headless::HeadlessVisitor, Visitor};
use crate::errors::*;

thread_local! {
    static CTX: RefCell<Option<Box<dyn Visitor>>> = RefCell::new(None);
}

/// Setup the rendering context with the OpenGL backend, resolving function
/// pointers through `loader`.
///
/// # Safety
///
/// The caller must have made an OpenGL context current on this thread, and
/// `loader` must resolve symbols against that context.
pub unsafe fn setup<F>(loader: F) -> Result<()>
where
    F: FnMut(&'static str) -> *const c_void,
{
    debug_assert!(!valid(), "duplicated setup of rendering context.");

    let visitor = backends::new(loader)?;
    CTX.with(|ctx| *ctx.borrow_mut() = Some(visitor));
    Ok(())
}

/// Setup the rendering context with a recording headless backend. The
/// returned probe shares state with the installed backend, so recorded calls
/// stay observable through it.
pub fn setup_headless() -> HeadlessVisitor {
    debug_assert!(!valid(), "duplicated setup of rendering context.");

    let visitor = HeadlessVisitor::new();
    let probe = visitor.clone();
    CTX.with(|ctx| *ctx.borrow_mut() = Some(Box::new(visitor)));

    info!("Headless rendering context installed.");
    probe
}

/// Discard the rendering context of this thread. GPU objects that outlive
/// the context can no longer be released and will be leaked with a warning.
pub fn discard() {
    CTX.with(|ctx| *ctx.borrow_mut() = None);
}

/// Checks if a rendering context is installed on this thread.
#[inline]
pub fn valid() -> bool {
    CTX.with(|ctx| ctx.borrow().is_some())
}

/// Blocks until every submitted command has been executed by the backend.
pub fn flush() -> Result<()> {
    with(|visitor| unsafe { visitor.flush() })
}

/// Runs `f` against the installed backend, failing with
/// `Error::ContextNotFound` when none is installed on this thread.
pub(crate) fn with<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut dyn Visitor) -> Result<T>,
{
    CTX.with(|ctx| match ctx.borrow_mut().as_mut() {
        Some(visitor) => f(visitor.as_mut()),
        None => Err(Error::ContextNotFound),
    })
}
