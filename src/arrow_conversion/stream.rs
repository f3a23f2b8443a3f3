//! Owned result streams and the caller-side output slot.

use arrow::array::{RecordBatch, RecordBatchReader};
use arrow_schema::{ArrowError, SchemaRef};
use std::sync::Arc;

/// An owned, fully materialized stream of record batches.
///
/// Dropping the reader releases everything it holds.
#[derive(Debug)]
pub struct BatchReader {
    schema: SchemaRef,
    batches: std::vec::IntoIter<RecordBatch>,
}

impl BatchReader {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            schema,
            batches: batches.into_iter(),
        }
    }

    /// A stream with exactly one batch, using the batch's own schema.
    pub fn single(batch: RecordBatch) -> Self {
        Self::new(batch.schema(), vec![batch])
    }

    pub fn empty(schema: SchemaRef) -> Self {
        Self::new(schema, vec![])
    }

    /// Drain the remaining batches.
    pub fn collect_batches(self) -> Vec<RecordBatch> {
        self.batches.collect()
    }
}

impl Iterator for BatchReader {
    type Item = Result<RecordBatch, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.batches.next().map(Ok)
    }
}

impl RecordBatchReader for BatchReader {
    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }
}

/// Caller-owned output slot that receives a stream on success.
///
/// A slot is left untouched when the producing operation fails.
#[derive(Debug, Default)]
pub struct StreamSlot {
    reader: Option<BatchReader>,
}

impl StreamSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_filled(&self) -> bool {
        self.reader.is_some()
    }

    /// Store a stream, replacing (and releasing) any previous one.
    pub fn fill(&mut self, reader: BatchReader) {
        self.reader = Some(reader);
    }

    /// Transfer ownership of the stored stream to the caller.
    pub fn take(&mut self) -> Option<BatchReader> {
        self.reader.take()
    }
}
