// zeno-core - Host capability surface
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The capability surface a host must provide.
//!
//! The VM performs no I/O itself; all real effects flow through a
//! [`Host`] implementation, and only from slot handler code, never
//! from VM dispatch. Programming against this trait keeps the kernel a
//! pure logic core that runs in any environment able to implement
//! these methods.

use crate::context::ExecCtx;
use crate::error::Result;
use crate::value::Native;

/// Host capabilities available to slot handlers.
pub trait Host {
    /// Emit a log line. Presentation is entirely the host's concern.
    fn log(&self, level: &str, message: &str);

    /// Run a row-returning query (SELECT) against the named database.
    fn db_query(
        &self,
        ctx: &ExecCtx<'_>,
        db: &str,
        query: &str,
        args: &[Native],
    ) -> Result<Box<dyn Rows>>;

    /// Run a modifying statement (INSERT, UPDATE, DELETE) against the
    /// named database.
    fn db_execute(
        &self,
        ctx: &ExecCtx<'_>,
        db: &str,
        query: &str,
        args: &[Native],
    ) -> Result<Box<dyn ExecResult>>;

    /// Send a response on the current HTTP exchange.
    fn http_send_response(
        &self,
        ctx: &ExecCtx<'_>,
        status: u16,
        content_type: &str,
        body: &[u8],
    ) -> Result<()>;

    /// A header of the current HTTP request.
    fn http_get_header(&self, ctx: &ExecCtx<'_>, key: &str) -> Option<String>;

    /// A query parameter of the current HTTP request.
    fn http_get_query(&self, ctx: &ExecCtx<'_>, key: &str) -> Option<String>;

    /// The body of the current HTTP request.
    fn http_get_body(&self, ctx: &ExecCtx<'_>) -> Result<Vec<u8>>;
}

/// A forward-iterable result set, released via [`Rows::close`].
pub trait Rows {
    /// Column names of the result set.
    fn columns(&self) -> Result<Vec<String>>;

    /// Advance to the next row. Returns false when exhausted.
    fn next_row(&mut self) -> bool;

    /// Read the current row as host-level values, one per column.
    fn scan(&mut self) -> Result<Vec<Native>>;

    /// Release the result set.
    fn close(&mut self) -> Result<()>;
}

/// The outcome of a modifying statement.
pub trait ExecResult {
    /// Identifier generated for the last inserted row.
    fn last_insert_id(&self) -> Result<i64>;

    /// Number of rows the statement affected.
    fn rows_affected(&self) -> Result<i64>;
}
