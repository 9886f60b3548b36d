use crate::{context::ExecutionContext, row::Row, DBResult};

/// Pull-based cursor over the rows a plan node produces.
///
/// Nothing is computed until `next` is called. `close` releases whatever the
/// iterator holds and is safe to call more than once; only the first call
/// has an effect.
pub trait RowIter: Send {
    /// The next row, or `None` once the data is exhausted.
    fn next(&mut self) -> DBResult<Option<Row>>;
    fn close(&mut self) -> DBResult<()>;
}

pub type BoxedRowIter = Box<dyn RowIter>;

/// Iterator that never yields a row.
#[derive(Debug, Default)]
pub struct EmptyIter;

impl RowIter for EmptyIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        Ok(None)
    }

    fn close(&mut self) -> DBResult<()> {
        Ok(())
    }
}

/// Iterator over rows that are already in memory.
#[derive(Debug)]
pub struct RowsIter {
    rows: std::vec::IntoIter<Row>,
}

impl RowsIter {
    pub fn new(rows: Vec<Row>) -> Self {
        RowsIter {
            rows: rows.into_iter(),
        }
    }
}

impl RowIter for RowsIter {
    fn next(&mut self) -> DBResult<Option<Row>> {
        Ok(self.rows.next())
    }

    fn close(&mut self) -> DBResult<()> {
        // drop whatever was not consumed
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}

/// Zero-row iterator for statements executed for their side effect.
///
/// The action runs on the first `next` call, before that call reports the end
/// of data, and never again afterwards, even if it failed.
pub struct SideEffectIter<F> {
    ctx: ExecutionContext,
    action: Option<F>,
}

impl<F> SideEffectIter<F>
where
    F: FnOnce(&ExecutionContext) -> DBResult<()> + Send,
{
    pub fn new(ctx: &ExecutionContext, action: F) -> Self {
        SideEffectIter {
            ctx: ctx.clone(),
            action: Some(action),
        }
    }
}

impl<F> RowIter for SideEffectIter<F>
where
    F: FnOnce(&ExecutionContext) -> DBResult<()> + Send,
{
    fn next(&mut self) -> DBResult<Option<Row>> {
        if let Some(action) = self.action.take() {
            self.ctx.check()?;
            action(&self.ctx)?;
        }
        Ok(None)
    }

    fn close(&mut self) -> DBResult<()> {
        // abandoned before the first pull: the action never runs
        self.action = None;
        Ok(())
    }
}

/// Drains `iter` and closes it, also when pulling a row failed.
pub fn collect_rows(mut iter: BoxedRowIter) -> DBResult<Vec<Row>> {
    let mut rows = Vec::new();
    loop {
        match iter.next() {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break,
            Err(e) => {
                if let Err(close_err) = iter.close() {
                    log::warn!("closing row iterator after error failed: {close_err}");
                }
                return Err(e);
            }
        }
    }
    iter.close()?;
    Ok(rows)
}
