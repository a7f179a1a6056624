use crate::model::{CollectionName, DuplicationViewRecord, MetadataRecord};
use crate::store::traits::DocumentStore;
use anyhow::{Context, Result};

/// Counts of documents accepted by the store in one seeding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub metadata_inserted: u64,
    pub duplication_inserted: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.metadata_inserted + self.duplication_inserted
    }
}

/// Workload identity documents for the `metadata` collection
pub fn metadata_records() -> Vec<MetadataRecord> {
    vec![MetadataRecord::new(
        "checkout-6c8f9",
        "checkout-service",
        "ecommerce",
        "critical",
    )]
}

/// View definitions for the `duplication` collection
pub fn duplication_views() -> Vec<DuplicationViewRecord> {
    vec![
        DuplicationViewRecord::new("operational", &["service", "endpoint", "error_type"]),
        DuplicationViewRecord::new("business", &["service", "tier"]),
    ]
}

/// Insert the fixture into `store`.
///
/// Inserts are unconditional, so running this twice leaves two copies of
/// every record. A failure is returned as soon as it happens; documents
/// already accepted are not rolled back.
pub async fn load_seed_data<S: DocumentStore + ?Sized>(store: &S) -> Result<SeedReport> {
    let metadata = CollectionName::metadata();
    let mut metadata_inserted = 0;
    for record in metadata_records() {
        let document = serde_json::to_value(&record)?;
        store
            .insert_one(&metadata, document)
            .await
            .with_context(|| format!("Failed to seed metadata for pod '{}'", record.pod))?;
        metadata_inserted += 1;
    }
    log::info!("Seeded {} document(s) into '{}'", metadata_inserted, metadata);

    let duplication = CollectionName::duplication();
    let documents = duplication_views()
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;
    let duplication_inserted = store
        .insert_many(&duplication, documents)
        .await
        .context("Failed to seed duplication views")?;
    log::info!(
        "Seeded {} document(s) into '{}'",
        duplication_inserted,
        duplication
    );

    Ok(SeedReport {
        metadata_inserted,
        duplication_inserted,
    })
}
