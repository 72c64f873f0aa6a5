use super::IngestEngine;

use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::models::{UploadError, UploadRequest};
use crate::storage::{MemoryStore, TransactionStore};

fn create_request(csv: &str) -> UploadRequest {
    UploadRequest::new(1, "upload.csv", None, csv.as_bytes().to_vec())
}

fn create_engine(store: &Arc<MemoryStore>) -> IngestEngine<MemoryStore> {
    IngestEngine::new(store.clone())
}

#[tokio::test]
async fn test_engine_imports_all_valid_rows() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description,customer_id,payment_method\n\
               TXN_1,2026-01-10T09:30:00,45.00,Haircut,CUST_1,card\n\
               TXN_2,2026-01-10,120.00,Color treatment,,cash\n\
               TXN_3,01/12/2026 02:15 PM,30.50,Beard trim,CUST_2,";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 3);
    assert_eq!(result.skipped_count, 0);
    assert!(result.errors.is_empty());
    assert_eq!(store.count(1), 3);

    let stored = store.get(1, "TXN_3").ok_or_else(|| anyhow!("TXN_3 missing from store"))?;

    assert_eq!(stored.description, "Beard trim");
    assert_eq!(stored.customer_id, Some("CUST_2".to_string()));
    assert_eq!(stored.payment_method, None);

    Ok(())
}

#[tokio::test]
async fn test_engine_skips_invalid_rows_and_continues() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\n\
               TXN_1,not-a-date,45.00,Haircut\n\
               TXN_2,2026-01-10,fifty,Cut\n\
               TXN_3,2026-01-10,45.00,\n\
               TXN_4,2026-01-10,45.00,Haircut";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.skipped_count, 3);
    assert_eq!(result.errors.len(), 3);

    assert_eq!(result.errors[0].row, 1);
    assert_eq!(result.errors[0].field, "timestamp");
    assert_eq!(result.errors[0].message, "Could not parse date: 'not-a-date'");

    assert_eq!(result.errors[1].row, 2);
    assert_eq!(result.errors[1].field, "amount");
    assert_eq!(result.errors[1].message, "Invalid number format: 'fifty'");

    assert_eq!(result.errors[2].row, 3);
    assert_eq!(result.errors[2].field, "description");

    assert!(store.exists(1, "TXN_4"));
    assert_eq!(store.count(1), 1);

    Ok(())
}

#[tokio::test]
async fn test_engine_matches_documented_upload_example() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\n\
               TXN_1,2026-01-10,50.00,Haircut\n\
               TXN_2,2026-01-10,fifty,Cut";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.skipped_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 2);
    assert_eq!(result.errors[0].field, "amount");
    assert_eq!(result.errors[0].message, "Invalid number format: 'fifty'");

    Ok(())
}

#[tokio::test]
async fn test_engine_rejects_non_csv_uploads() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store);
    let request = UploadRequest::new(1, "report.pdf", None, b"timestamp,amount,description\n".to_vec());

    let result = engine.ingest(request).await;

    assert!(matches!(result, Err(UploadError::UnsupportedFileType { .. })));
    assert_eq!(store.count(1), 0);

    Ok(())
}

#[tokio::test]
async fn test_engine_rejects_mismatched_content_type() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store);
    let request = UploadRequest::new(
        1,
        "upload.csv",
        Some("application/pdf".to_string()),
        b"timestamp,amount,description\n".to_vec()
    );

    let result = engine.ingest(request).await;

    assert!(matches!(result, Err(UploadError::UnsupportedFileType { .. })));

    Ok(())
}

#[tokio::test]
async fn test_engine_rejects_missing_required_columns_without_store_writes() -> Result<()> {
    let csv = "transaction_id,timestamp,description\n\
               TXN_1,2026-01-10,Haircut";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await;

    let Err(UploadError::MissingColumns { columns }) = result else {
        panic!("Expected a missing-columns rejection");
    };

    assert_eq!(columns, vec!["amount".to_string()]);
    assert_eq!(store.count(1), 0);

    Ok(())
}

#[tokio::test]
async fn test_engine_enforces_file_size_limit() -> Result<()> {
    let csv = "timestamp,amount,description\n2026-01-10,50.00,Haircut";
    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store).with_max_file_bytes(10);

    let result = engine.ingest(create_request(csv)).await;

    assert!(matches!(result, Err(UploadError::FileTooLarge { .. })));
    assert_eq!(store.count(1), 0);

    Ok(())
}

#[tokio::test]
async fn test_engine_enforces_row_limit_before_any_import() -> Result<()> {
    let csv = "timestamp,amount,description\n\
               2026-01-10,50.00,Haircut\n\
               2026-01-11,20.00,Trim\n\
               2026-01-12,35.00,Shave";

    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store).with_max_rows(2);

    let result = engine.ingest(create_request(csv)).await;

    assert!(matches!(result, Err(UploadError::TooManyRows { rows: 3, max: 2 })));
    assert_eq!(store.count(1), 0);

    Ok(())
}

#[tokio::test]
async fn test_engine_counts_in_batch_duplicates_silently() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\n\
               TXN_1,2026-01-10,50.00,Haircut\n\
               TXN_1,2026-01-10,50.00,Haircut again";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 1);
    assert_eq!(result.skipped_count, 1);
    assert!(result.errors.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_engine_preserves_stored_rows_on_reupload() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store);

    let first = "transaction_id,timestamp,amount,description\nTXN_1,2026-01-10,50.00,Haircut";
    let second = "transaction_id,timestamp,amount,description\nTXN_1,2026-01-10,99.00,Overwrite attempt";

    engine.ingest(create_request(first)).await?;
    let result = engine.ingest(create_request(second)).await?;

    assert_eq!(result.imported_count, 0);
    assert_eq!(result.skipped_count, 1);
    assert!(result.errors.is_empty());

    let stored = store.get(1, "TXN_1").ok_or_else(|| anyhow!("TXN_1 missing from store"))?;

    assert_eq!(stored.description, "Haircut");
    assert_eq!(stored.amount.to_string(), "50.00");

    Ok(())
}

#[tokio::test]
async fn test_engine_generates_ids_when_column_is_absent() -> Result<()> {
    let csv = "timestamp,amount,description\n\
               2026-01-10,50.00,Haircut\n\
               2026-01-11,20.00,Trim";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 2);
    assert_eq!(result.skipped_count, 0);
    assert_eq!(store.count(1), 2);

    Ok(())
}

#[tokio::test]
async fn test_engine_keeps_businesses_independent() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\nTXN_1,2026-01-10,50.00,Haircut";

    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store);

    let first = engine.ingest(UploadRequest::new(1, "a.csv", None, csv.as_bytes().to_vec())).await?;
    let second = engine.ingest(UploadRequest::new(2, "b.csv", None, csv.as_bytes().to_vec())).await?;

    assert_eq!(first.imported_count, 1);
    assert_eq!(second.imported_count, 1);
    assert_eq!(store.count(1), 1);
    assert_eq!(store.count(2), 1);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_uploads_cannot_both_import_the_same_id() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\nTXN_SHARED,2026-01-10,50.00,Haircut";

    let store = Arc::new(MemoryStore::new());
    let engine_a = create_engine(&store);
    let engine_b = create_engine(&store);

    let (first, second) = tokio::join!(
        engine_a.ingest(create_request(csv)),
        engine_b.ingest(create_request(csv))
    );
    let (first, second) = (first?, second?);

    assert_eq!(first.imported_count + second.imported_count, 1);
    assert_eq!(first.skipped_count + second.skipped_count, 1);
    assert_eq!(store.count(1), 1);

    Ok(())
}

#[tokio::test]
async fn test_engine_ignores_fields_beyond_the_header() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\n\
               TXN_1,2026-01-10,50.00,Haircut\n\
               TXN_2,2026-01-11,20.00,Trim,extra,fields";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 2);
    assert_eq!(result.skipped_count, 0);
    assert!(result.errors.is_empty());

    let stored = store.get(1, "TXN_2").ok_or_else(|| anyhow!("TXN_2 missing from store"))?;

    assert_eq!(stored.description, "Trim");

    Ok(())
}

#[tokio::test]
async fn test_engine_rejects_invalid_utf8_before_any_import() -> Result<()> {
    let mut data = b"transaction_id,timestamp,amount,description\n".to_vec();
    data.extend_from_slice(b"TXN_1,2026-01-10,50.00,Haircut\n");
    data.extend_from_slice(&[0xff, 0xfe, 0x00, 0x01]);

    let store = Arc::new(MemoryStore::new());
    let engine = create_engine(&store);
    let request = UploadRequest::new(1, "upload.csv", None, data);

    let result = engine.ingest(request).await;

    assert!(matches!(result, Err(UploadError::UnreadableCsv(_))));
    assert_eq!(store.count(1), 0);

    Ok(())
}

#[tokio::test]
async fn test_engine_reports_non_positive_amounts_as_number_format_errors() -> Result<()> {
    let csv = "transaction_id,timestamp,amount,description\n\
               TXN_1,2026-01-10,-5.00,Refund\n\
               TXN_2,2026-01-10,0.00,Giveaway";

    let store = Arc::new(MemoryStore::new());
    let result = create_engine(&store).ingest(create_request(csv)).await?;

    assert_eq!(result.imported_count, 0);
    assert_eq!(result.skipped_count, 2);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].field, "amount");
    assert_eq!(result.errors[0].message, "Invalid number format: '-5.00'");
    assert_eq!(result.errors[1].message, "Invalid number format: '0.00'");

    Ok(())
}
