//! Scoped database-handle access.
//!
//! `Dal` holds a default handle (a connection, a pool, a transaction — the
//! crate does not care) and resolves each call against an explicit optional
//! override. Callers inside a transaction pass the transaction handle;
//! everyone else passes `None` and gets the default.

/// A handle holder with per-call override.
#[derive(Debug, Clone)]
pub struct Dal<H> {
    handle: H,
}

impl<H> Dal<H> {
    pub fn new(handle: H) -> Self {
        Self { handle }
    }

    /// The scoped handle when one is supplied, otherwise the default.
    pub fn handle<'a>(&'a self, scoped: Option<&'a H>) -> &'a H {
        scoped.unwrap_or(&self.handle)
    }

    /// Resolve the handle and run `op` with it, propagating its error.
    pub fn exec<T, E, F>(&self, scoped: Option<&H>, op: F) -> Result<T, E>
    where
        F: FnOnce(&H) -> Result<T, E>,
    {
        op(self.handle(scoped))
    }
}
