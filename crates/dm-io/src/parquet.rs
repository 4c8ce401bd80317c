//! Parquet read/write for per-event muon tables.
//!
//! Files carry one row per event with the list columns of [`crate::schema`].
//! The reader accepts `List`/`LargeList` of Float32 or Float64 for the
//! kinematic columns and any integer type for `Muon_charge` and `nMuon`;
//! the writer always emits `UInt32` counts, `List<Float32>` kinematics and
//! `List<Int32>` charges.

use std::fmt;
use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, ArrowPrimitiveType, AsArray, Float32Array, Int32Array, ListArray,
    PrimitiveArray, UInt32Array,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, Schema,
    SchemaRef, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use dm_core::EventTable;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::{ArrowWriter, ProjectionMask};
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::ChunkReader;

use crate::error::{LoadError, Result};
use crate::jagged::check_lengths;
use crate::loader::{ColumnSummary, DatasetSummary};
use crate::locator::DatasetFormat;
use crate::schema::{MUON_CHARGE, MUON_COLUMNS, MUON_ETA, MUON_MASS, MUON_PHI, MUON_PT, N_MUON};

/// Events per row group / record batch when writing.
const WRITE_BATCH_EVENTS: usize = 64 * 1024;

/// Read the first `max_events` events (all if `None`) of a Parquet file.
pub fn read_event_parquet(path: &Path, max_events: Option<usize>) -> Result<EventTable> {
    let file = File::open(path)?;
    read_events(file, max_events)
}

/// Read events from in-memory Parquet bytes.
pub fn read_event_parquet_bytes(data: &[u8], max_events: Option<usize>) -> Result<EventTable> {
    // `bytes::Bytes` implements `ChunkReader`.
    read_events(bytes::Bytes::copy_from_slice(data), max_events)
}

fn read_events<R: ChunkReader + 'static>(
    reader: R,
    max_events: Option<usize>,
) -> Result<EventTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let schema = builder.schema().clone();

    let mut roots = Vec::with_capacity(MUON_COLUMNS.len() + 1);
    for name in MUON_COLUMNS {
        let idx = schema.index_of(name).map_err(|_| LoadError::MissingColumn(name.into()))?;
        roots.push(idx);
    }
    let has_n_muon = match schema.index_of(N_MUON) {
        Ok(idx) => {
            roots.push(idx);
            true
        }
        Err(_) => {
            tracing::debug!("no {N_MUON} column, deriving multiplicities from {MUON_PT}");
            false
        }
    };
    roots.sort_unstable();

    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    let mut builder = builder.with_projection(mask);
    if let Some(max) = max_events {
        builder = builder.with_limit(max);
    }

    let mut counts: Vec<u32> = Vec::new();
    let mut cols = FlatColumns::default();
    for batch in builder.build()? {
        let batch = batch?;
        append_batch(&batch, has_n_muon, &mut counts, &mut cols)?;
        if max_events.is_some_and(|max| counts.len() >= max) {
            break;
        }
    }

    let mut table =
        EventTable::from_columns(&counts, cols.pt, cols.eta, cols.phi, cols.mass, cols.charge)?;
    if let Some(max) = max_events {
        table.truncate(max);
    }
    tracing::debug!(events = table.len(), muons = table.n_muons(), "parquet events decoded");
    Ok(table)
}

#[derive(Default)]
struct FlatColumns {
    pt: Vec<f32>,
    eta: Vec<f32>,
    phi: Vec<f32>,
    mass: Vec<f32>,
    charge: Vec<i32>,
}

fn append_batch(
    batch: &RecordBatch,
    has_n_muon: bool,
    counts: &mut Vec<u32>,
    cols: &mut FlatColumns,
) -> Result<()> {
    let (lengths, pt) = list_column(batch, MUON_PT)?;
    cols.pt.extend(float_values(MUON_PT, &pt)?);

    for (name, out) in
        [(MUON_ETA, &mut cols.eta), (MUON_PHI, &mut cols.phi), (MUON_MASS, &mut cols.mass)]
    {
        let (l, values) = list_column(batch, name)?;
        check_lengths(name, &l, MUON_PT, &lengths)?;
        out.extend(float_values(name, &values)?);
    }

    let (l, charge) = list_column(batch, MUON_CHARGE)?;
    check_lengths(MUON_CHARGE, &l, MUON_PT, &lengths)?;
    cols.charge.extend(charge_values(&charge)?);

    if has_n_muon {
        let n_muon = count_values(column(batch, N_MUON)?)?;
        if let Some(row) = n_muon.iter().zip(&lengths).position(|(n, l)| n != l) {
            return Err(LoadError::Inconsistent {
                col: N_MUON.into(),
                detail: format!(
                    "row {}: {N_MUON}={} but {MUON_PT} has {} entries",
                    counts.len() + row,
                    n_muon[row],
                    lengths[row]
                ),
            });
        }
    }
    counts.extend(lengths);
    Ok(())
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(name).ok_or_else(|| LoadError::MissingColumn(name.into()))
}

fn wrong_type(col: &str, expected: &str, actual: &DataType) -> LoadError {
    LoadError::WrongType { col: col.into(), expected: expected.into(), actual: format!("{actual:?}") }
}

/// Per-row list lengths and the flat child values covered by this batch.
fn list_column(batch: &RecordBatch, name: &str) -> Result<(Vec<u32>, ArrayRef)> {
    let col = column(batch, name)?;
    if col.null_count() > 0 {
        return Err(LoadError::Inconsistent {
            col: name.into(),
            detail: format!("{} null event entries", col.null_count()),
        });
    }
    let (offsets, values): (Vec<usize>, &ArrayRef) = match col.data_type() {
        DataType::List(_) => {
            let list = col.as_list::<i32>();
            (list.value_offsets().iter().map(|&o| o as usize).collect(), list.values())
        }
        DataType::LargeList(_) => {
            let list = col.as_list::<i64>();
            (list.value_offsets().iter().map(|&o| o as usize).collect(), list.values())
        }
        other => return Err(wrong_type(name, "List<_> or LargeList<_>", other)),
    };

    // A batch may be a slice of a larger list array.
    let first = offsets.first().copied().unwrap_or(0);
    let last = offsets.last().copied().unwrap_or(0);
    let lengths = offsets.windows(2).map(|w| (w[1] - w[0]) as u32).collect();
    Ok((lengths, values.slice(first, last - first)))
}

fn reject_nulls(name: &str, values: &ArrayRef) -> Result<()> {
    if values.null_count() > 0 {
        return Err(LoadError::Inconsistent {
            col: name.into(),
            detail: format!("{} null muon values", values.null_count()),
        });
    }
    Ok(())
}

fn float_values(name: &str, values: &ArrayRef) -> Result<Vec<f32>> {
    reject_nulls(name, values)?;
    match values.data_type() {
        DataType::Float32 => Ok(values.as_primitive::<Float32Type>().values().to_vec()),
        DataType::Float64 => {
            Ok(values.as_primitive::<Float64Type>().values().iter().map(|&v| v as f32).collect())
        }
        other => Err(wrong_type(name, "List<Float32> or List<Float64>", other)),
    }
}

fn charge_values(values: &ArrayRef) -> Result<Vec<i32>> {
    reject_nulls(MUON_CHARGE, values)?;
    match values.data_type() {
        DataType::Int8 => convert_ints(MUON_CHARGE, values.as_primitive::<Int8Type>()),
        DataType::Int16 => convert_ints(MUON_CHARGE, values.as_primitive::<Int16Type>()),
        DataType::Int32 => Ok(values.as_primitive::<Int32Type>().values().to_vec()),
        DataType::Int64 => convert_ints(MUON_CHARGE, values.as_primitive::<Int64Type>()),
        other => Err(wrong_type(MUON_CHARGE, "List<Int8|Int16|Int32|Int64>", other)),
    }
}

fn count_values(col: &ArrayRef) -> Result<Vec<u32>> {
    reject_nulls(N_MUON, col)?;
    match col.data_type() {
        DataType::UInt8 => convert_ints(N_MUON, col.as_primitive::<UInt8Type>()),
        DataType::UInt16 => convert_ints(N_MUON, col.as_primitive::<UInt16Type>()),
        DataType::UInt32 => Ok(col.as_primitive::<UInt32Type>().values().to_vec()),
        DataType::UInt64 => convert_ints(N_MUON, col.as_primitive::<UInt64Type>()),
        DataType::Int8 => convert_ints(N_MUON, col.as_primitive::<Int8Type>()),
        DataType::Int16 => convert_ints(N_MUON, col.as_primitive::<Int16Type>()),
        DataType::Int32 => convert_ints(N_MUON, col.as_primitive::<Int32Type>()),
        DataType::Int64 => convert_ints(N_MUON, col.as_primitive::<Int64Type>()),
        other => Err(wrong_type(N_MUON, "integer", other)),
    }
}

fn convert_ints<T, U>(name: &str, arr: &PrimitiveArray<T>) -> Result<Vec<U>>
where
    T: ArrowPrimitiveType,
    T::Native: TryInto<U> + fmt::Display,
{
    arr.values()
        .iter()
        .map(|&v| {
            v.try_into().map_err(|_| LoadError::Inconsistent {
                col: name.into(),
                detail: format!("value {v} out of range"),
            })
        })
        .collect()
}

/// Arrow schema written by [`write_event_parquet`].
pub fn event_schema() -> SchemaRef {
    let float_list = DataType::List(Arc::new(Field::new("item", DataType::Float32, false)));
    let int_list = DataType::List(Arc::new(Field::new("item", DataType::Int32, false)));
    Arc::new(Schema::new(vec![
        Field::new(N_MUON, DataType::UInt32, false),
        Field::new(MUON_PT, float_list.clone(), false),
        Field::new(MUON_ETA, float_list.clone(), false),
        Field::new(MUON_PHI, float_list.clone(), false),
        Field::new(MUON_MASS, float_list, false),
        Field::new(MUON_CHARGE, int_list, false),
    ]))
}

/// Convert events `rows` of `table` into one record batch.
pub fn to_record_batch(table: &EventTable, rows: Range<usize>) -> Result<RecordBatch> {
    let schema = event_schema();
    let offsets = table.offsets();
    let counts: Vec<u32> =
        offsets[rows.start..=rows.end].windows(2).map(|w| (w[1] - w[0]) as u32).collect();
    let span = offsets[rows.start]..offsets[rows.end];
    let list_offsets = OffsetBuffer::<i32>::from_lengths(counts.iter().map(|&c| c as usize));

    let float_list = |values: &[f32]| -> Result<ArrayRef> {
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let values = Arc::new(Float32Array::from(values[span.clone()].to_vec()));
        Ok(Arc::new(ListArray::try_new(field, list_offsets.clone(), values, None)?))
    };
    let charge: ArrayRef = {
        let field = Arc::new(Field::new("item", DataType::Int32, false));
        let values = Arc::new(Int32Array::from(table.charge()[span.clone()].to_vec()));
        Arc::new(ListArray::try_new(field, list_offsets.clone(), values, None)?)
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(counts)),
        float_list(table.pt())?,
        float_list(table.eta())?,
        float_list(table.phi())?,
        float_list(table.mass())?,
        charge,
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

fn writer_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

fn write_batches<W: std::io::Write + Send>(sink: W, table: &EventTable) -> Result<()> {
    let mut writer = ArrowWriter::try_new(sink, event_schema(), Some(writer_props()))?;
    let mut start = 0;
    while start < table.len() {
        let end = (start + WRITE_BATCH_EVENTS).min(table.len());
        writer.write(&to_record_batch(table, start..end)?)?;
        start = end;
    }
    writer.close()?;
    Ok(())
}

/// Write `table` to a Parquet file (Snappy-compressed).
pub fn write_event_parquet(path: &Path, table: &EventTable) -> Result<()> {
    let file = File::create(path)?;
    write_batches(file, table)?;
    tracing::debug!(path = %path.display(), events = table.len(), "parquet events written");
    Ok(())
}

/// Write `table` to Parquet bytes in memory.
pub fn write_event_parquet_bytes(table: &EventTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_batches(&mut buf, table)?;
    Ok(buf)
}

/// Schema and row count of a Parquet file, without decoding events.
pub fn inspect_parquet(path: &Path) -> Result<DatasetSummary> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let n_events = builder.metadata().file_metadata().num_rows().max(0) as u64;
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| ColumnSummary { name: f.name().clone(), data_type: format!("{}", f.data_type()) })
        .collect();
    Ok(DatasetSummary {
        locator: path.display().to_string(),
        format: DatasetFormat::Parquet,
        n_events,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, LargeListArray};
    use dm_core::Muon;

    fn mu(pt: f32, charge: i32) -> Muon {
        Muon { pt, eta: 0.5, phi: -1.0, mass: 0.105, charge }
    }

    fn sample() -> EventTable {
        let mut t = EventTable::new();
        t.push_event(&[mu(20.0, 1), mu(15.0, -1), mu(5.0, 1)]);
        t.push_event(&[]);
        t.push_event(&[mu(30.0, 1), mu(25.0, -1)]);
        t
    }

    #[test]
    fn bytes_round_trip() {
        let t = sample();
        let bytes = write_event_parquet_bytes(&t).unwrap();
        let back = read_event_parquet_bytes(&bytes, None).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn limit_keeps_prefix() {
        let bytes = write_event_parquet_bytes(&sample()).unwrap();
        let back = read_event_parquet_bytes(&bytes, Some(2)).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.counts(), vec![3, 0]);
    }

    #[test]
    fn sub_range_batch() {
        let t = sample();
        let batch = to_record_batch(&t, 1..3).unwrap();
        assert_eq!(batch.num_rows(), 2);
        let pt = batch.column_by_name(MUON_PT).unwrap().as_list::<i32>();
        assert_eq!(pt.value_offsets(), &[0, 0, 2]);
    }

    /// Float64 / Int64 / LargeList inputs without an `nMuon` column.
    #[test]
    fn widened_types_accepted() {
        let item64 = Arc::new(Field::new("item", DataType::Float64, true));
        let itemi = Arc::new(Field::new("item", DataType::Int64, true));
        let offsets = OffsetBuffer::<i64>::from_lengths([2, 1]);
        let f = |v: Vec<f64>| -> ArrayRef {
            Arc::new(
                LargeListArray::try_new(
                    item64.clone(),
                    offsets.clone(),
                    Arc::new(Float64Array::from(v)),
                    None,
                )
                .unwrap(),
            )
        };
        let charge: ArrayRef = Arc::new(
            LargeListArray::try_new(
                itemi.clone(),
                offsets.clone(),
                Arc::new(Int64Array::from(vec![1, -1, 1])),
                None,
            )
            .unwrap(),
        );
        let batch = RecordBatch::try_from_iter(vec![
            (MUON_PT, f(vec![10.0, 20.0, 30.0])),
            (MUON_ETA, f(vec![0.0; 3])),
            (MUON_PHI, f(vec![0.0; 3])),
            (MUON_MASS, f(vec![0.105; 3])),
            (MUON_CHARGE, charge),
        ])
        .unwrap();

        let mut buf = Vec::new();
        let mut w = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
        w.write(&batch).unwrap();
        w.close().unwrap();

        let t = read_event_parquet_bytes(&buf, None).unwrap();
        assert_eq!(t.counts(), vec![2, 1]);
        assert_eq!(t.pt(), &[10.0, 20.0, 30.0]);
        assert_eq!(t.charge(), &[1, -1, 1]);
    }

    #[test]
    fn n_muon_mismatch_is_inconsistent() {
        let t = sample();
        let mut batch = to_record_batch(&t, 0..t.len()).unwrap();
        let mut cols = batch.columns().to_vec();
        cols[0] = Arc::new(UInt32Array::from(vec![3, 1, 2]));
        batch = RecordBatch::try_new(batch.schema(), cols).unwrap();

        let mut buf = Vec::new();
        let mut w = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
        w.write(&batch).unwrap();
        w.close().unwrap();

        let err = read_event_parquet_bytes(&buf, None).unwrap_err();
        assert!(matches!(err, LoadError::Inconsistent { ref col, .. } if col == N_MUON), "{err}");
    }
}
