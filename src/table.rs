//! Table payloads
//!
//! Converts between in-memory Arrow record batches and the columnar stream
//! format (Arrow IPC streaming) used for table values on the wire.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::Result;

/// Schema-level metadata attached to a table
pub type TableMetadata = HashMap<String, String>;

/// Encode a record batch as a self-describing columnar stream
pub fn encode_table(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut writer = StreamWriter::try_new(Vec::new(), batch.schema().as_ref())?;
    writer.write(batch)?;
    writer.finish()?;
    Ok(writer.into_inner()?)
}

/// Decode a columnar stream into one table
///
/// Every batch in the stream is concatenated in stream order. When
/// `metadata` is given it replaces the schema-level metadata.
pub fn decode_table(bytes: &[u8], metadata: Option<TableMetadata>) -> Result<RecordBatch> {
    let reader = StreamReader::try_new(Cursor::new(bytes), None)?;
    let schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let table = concat_batches(&schema, &batches)?;
    match metadata {
        Some(metadata) => with_metadata(table, metadata),
        None => Ok(table),
    }
}

/// Replace a table's schema-level metadata
pub fn with_metadata(table: RecordBatch, metadata: TableMetadata) -> Result<RecordBatch> {
    let schema = Schema::new(table.schema().fields().clone()).with_metadata(metadata);
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(schema),
        table.columns().to_vec(),
        &options,
    )?)
}
