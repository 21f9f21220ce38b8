// zeno-embed - Built-in host slots
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! The built-in slots: thin adapters from named node children to the
//! [`Host`] capability surface.
//!
//! Each slot reads its arguments from the invocation node's children
//! (already evaluated by the VM, so `$var` references arrive as plain
//! values), validates them, and performs exactly one host call. I/O
//! slots honor cancellation before touching the host.

use std::rc::Rc;

use zeno_core::{Engine, Error, ExecCtx, Host, Native, Node, Result, SlotMeta};

/// Register the built-in slots on `engine`, each capturing a handle to
/// `host`.
pub fn register_builtin_slots(engine: &mut Engine, host: Rc<dyn Host>) {
    let h = Rc::clone(&host);
    engine.register(
        "log",
        move |_ctx, node, _scope| {
            let level = opt_str(node, "level")?.unwrap_or_else(|| "info".to_string());
            let message = require(node, "message")?;
            h.log(&level, &message.to_string());
            Ok(())
        },
        SlotMeta::describe("Emit a log line through the host"),
    );

    let h = Rc::clone(&host);
    engine.register(
        "http.response",
        move |ctx, node, _scope| {
            check_cancelled(ctx)?;
            let status = num_arg(node, "status")?;
            if !(100.0..=599.0).contains(&status) || status.fract() != 0.0 {
                return Err(Error::type_error_in(
                    "http.response status",
                    "HTTP status code",
                    status.to_string(),
                ));
            }
            let content_type =
                opt_str(node, "content-type")?.unwrap_or_else(|| "text/html".to_string());
            let body = require(node, "body")?.to_string();
            h.http_send_response(ctx, status as u16, &content_type, body.as_bytes())
        },
        SlotMeta::describe("Send a response on the current HTTP exchange"),
    );

    let h = Rc::clone(&host);
    engine.register(
        "db.query",
        move |ctx, node, scope| {
            check_cancelled(ctx)?;
            let db = opt_str(node, "db")?.unwrap_or_else(|| "default".to_string());
            let query = str_arg(node, "query")?;
            let args = positional_args(node);

            let mut rows = h.db_query(ctx, &db, &query, &args)?;
            let mut count = 0i64;
            while rows.next_row() {
                rows.scan()?;
                count += 1;
            }
            rows.close()?;

            if let Some(into) = opt_str(node, "into")? {
                scope.set(into, count as f64);
            }
            Ok(())
        },
        SlotMeta::describe("Run a row-returning query; bind the row count via 'into'"),
    );

    let h = Rc::clone(&host);
    engine.register(
        "db.execute",
        move |ctx, node, scope| {
            check_cancelled(ctx)?;
            let db = opt_str(node, "db")?.unwrap_or_else(|| "default".to_string());
            let query = str_arg(node, "query")?;
            let args = positional_args(node);

            let result = h.db_execute(ctx, &db, &query, &args)?;
            if let Some(into) = opt_str(node, "into")? {
                scope.set(into, result.rows_affected()? as f64);
            }
            Ok(())
        },
        SlotMeta::describe("Run a modifying statement; bind rows-affected via 'into'"),
    );
}

fn check_cancelled(ctx: &ExecCtx<'_>) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// The required argument child `name`, by value.
fn require(node: &Rc<Node>, name: &str) -> Result<Native> {
    node.child(name)
        .and_then(|c| c.value().cloned())
        .ok_or_else(|| Error::missing_argument(node.name(), name))
}

/// The optional string argument `name`.
fn opt_str(node: &Rc<Node>, name: &str) -> Result<Option<String>> {
    match node.child(name).and_then(|c| c.value().cloned()) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| {
                Error::type_error_in(
                    format!("{} {}", node.name(), name),
                    "string",
                    value.type_name(),
                )
            }),
    }
}

/// The required string argument `name`.
fn str_arg(node: &Rc<Node>, name: &str) -> Result<String> {
    let value = require(node, name)?;
    value.as_str().map(str::to_owned).ok_or_else(|| {
        Error::type_error_in(
            format!("{} {}", node.name(), name),
            "string",
            value.type_name(),
        )
    })
}

/// The required numeric argument `name`.
fn num_arg(node: &Rc<Node>, name: &str) -> Result<f64> {
    let value = require(node, name)?;
    value.as_num().ok_or_else(|| {
        Error::type_error_in(
            format!("{} {}", node.name(), name),
            "number",
            value.type_name(),
        )
    })
}

/// Children named `arg`, in declaration order, as statement parameters.
fn positional_args(node: &Rc<Node>) -> Vec<Native> {
    node.children()
        .iter()
        .filter(|c| c.name() == "arg")
        .map(|c| c.value().cloned().unwrap_or(Native::Nil))
        .collect()
}
