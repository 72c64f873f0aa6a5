use crate::models::{
    ImportResult, ParsedTransaction, RawRow, RowError, RowViolation, UploadError, UploadRequest,
    REQUIRED_COLUMNS
};
use crate::storage::TransactionStore;
use crate::types::BusinessId;
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, warn};

const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const MAX_DATA_ROWS: usize = 10_000;

/// A data row paired with its 1-based index. The header row is not counted.
struct IndexedRow {
    index: u32,
    row: RawRow
}

/// Streaming CSV transaction-ingestion engine.
///
/// One call to [`IngestEngine::ingest`] is one unit of work: rows are read on
/// a blocking task, funneled through a bounded channel, and imported by a
/// single sequential consumer so errors stay in row order and in-batch
/// duplicate detection sees every earlier row. Independent uploads may run
/// concurrently against the same store; the store's atomic insert arbitrates
/// between them.
pub struct IngestEngine<S> {
    store: Arc<S>,
    backpressure: usize,
    max_file_bytes: usize,
    max_rows: usize
}

impl<S: TransactionStore> IngestEngine<S> {
    /// Creates a new engine instance with the provided store and default
    /// limits (10 MB, 10,000 data rows).
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            backpressure: 256,
            max_file_bytes: MAX_FILE_BYTES,
            max_rows: MAX_DATA_ROWS
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Runs the full pipeline for one upload.
    ///
    /// Upload-level violations (file type, size, row limit, missing required
    /// columns, unreadable CSV) reject the whole request before any row
    /// reaches the store. Row-level failures are collected into the returned
    /// [`ImportResult`] and never abort the batch.
    pub async fn ingest(&self, request: UploadRequest) -> Result<ImportResult, UploadError> {
        self.admit(&request)?;

        let (sender, receiver) = mpsc::channel::<IndexedRow>(self.backpressure);
        let reader_handle = self.spawn_row_reader(request.data, sender);
        let result = self.import_rows(request.business_id, receiver).await;

        reader_handle.await??;

        Ok(result)
    }

    fn admit(&self, request: &UploadRequest) -> Result<(), UploadError> {
        if !request.has_csv_extension() || !request.has_accepted_content_type() {
            return Err(UploadError::UnsupportedFileType {
                file_name: request.file_name.clone()
            });
        }

        if request.data.len() > self.max_file_bytes {
            return Err(UploadError::FileTooLarge {
                size: request.data.len(),
                max: self.max_file_bytes
            });
        }

        Ok(())
    }

    /// Reads the upload on a blocking task in two passes: a pre-pass that
    /// settles every remaining upload-level check before a single row is
    /// sent, then a streaming pass that feeds the consumer.
    fn spawn_row_reader(&self, data: Vec<u8>, sender: mpsc::Sender<IndexedRow>) -> JoinHandle<Result<(), UploadError>> {
        let max_rows = self.max_rows;

        spawn_blocking(move || {
            let headers = Self::prevalidate(&data, max_rows)?;
            Self::check_required_columns(&headers)?;

            let mut reader = Self::csv_reader(&data);
            let mut record = StringRecord::new();
            let mut index = 0u32;

            loop {
                match reader.read_record(&mut record) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(csv_error) => {
                        // the pre-pass read the same bytes, so this should not happen
                        error!("CSV read error after row [{index}]: {csv_error}");
                        break;
                    }
                }

                index += 1;

                // fields beyond the header carry no column name; drop them
                if record.len() > headers.len() {
                    record.truncate(headers.len());
                }

                match record.deserialize::<RawRow>(Some(&headers)) {
                    Ok(row) => {
                        if sender.blocking_send(IndexedRow { index, row }).is_err() {
                            break;
                        }
                    }
                    Err(csv_error) => {
                        error!("CSV deserialization error on row [{index}]: {csv_error}");
                    }
                }
            }

            Ok(())
        })
    }

    /// Counts data rows and surfaces stream-level problems (invalid UTF-8,
    /// unbalanced quotes) before anything is imported. Returns the header
    /// row for column validation.
    fn prevalidate(data: &[u8], max_rows: usize) -> Result<StringRecord, UploadError> {
        let mut reader = Self::csv_reader(data);
        let headers = reader.headers()?.clone();

        let mut rows = 0usize;
        let mut record = StringRecord::new();

        while reader.read_record(&mut record)? {
            rows += 1;
        }

        if rows > max_rows {
            return Err(UploadError::TooManyRows { rows, max: max_rows });
        }

        Ok(headers)
    }

    fn check_required_columns(headers: &StringRecord) -> Result<(), UploadError> {
        let columns: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|header| header == **required))
            .map(|required| required.to_string())
            .collect();

        if columns.is_empty() {
            Ok(())
        } else {
            Err(UploadError::MissingColumns { columns })
        }
    }

    fn csv_reader(data: &[u8]) -> Reader<Cursor<&[u8]>> {
        ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(Cursor::new(data))
    }

    /// Sequential import loop. Rows arrive in file order on the channel;
    /// processing them one at a time keeps the error list ordered and lets
    /// the in-batch duplicate set see every earlier row.
    async fn import_rows(&self, business_id: BusinessId, mut receiver: mpsc::Receiver<IndexedRow>) -> ImportResult {
        let mut result = ImportResult::default();
        let mut seen = HashSet::<String>::new();

        while let Some(IndexedRow { index, row }) = receiver.recv().await {
            match self.import_row(business_id, &row, &mut seen) {
                Ok(transaction_id) => {
                    result.imported_count += 1;
                    debug!("Row [{index}] imported as transaction [{transaction_id}] for business [{business_id}]");
                }
                Err(violation) => {
                    result.skipped_count += 1;
                    warn!("Row [{index}] skipped for business [{business_id}]: {violation}");

                    if !violation.is_silent() {
                        result.errors.push(RowError::new(index, &violation));
                    }
                }
            }
        }

        result
    }

    fn import_row(&self, business_id: BusinessId, row: &RawRow, seen: &mut HashSet<String>) -> Result<String, RowViolation> {
        let transaction = ParsedTransaction::from_row(row)?;
        let transaction_id = transaction.transaction_id.clone();

        if seen.contains(&transaction_id) {
            return Err(RowViolation::duplicate_transaction_id(&transaction_id));
        }

        // The store insert is the atomic authority for ids landed by other
        // uploads; the local set only covers earlier rows of this batch.
        if self.store.insert(business_id, transaction).is_err() {
            return Err(RowViolation::duplicate_transaction_id(&transaction_id));
        }

        seen.insert(transaction_id.clone());

        Ok(transaction_id)
    }
}
