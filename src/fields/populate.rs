use crate::crawler::{Coordinator, CrawlFlavor, CrawlReport, ExecutionMode, Fetcher};
use crate::fields::{CapabilityCheck, FieldMapping, FieldStore, FieldValue, CRAWL_CAPABILITY};
use crate::storage::BatchBackend;
use crate::{CrawlError, Result};

/// Result of a population request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Populated {
    /// The destination field was written with this many values
    Written(usize),
    /// The crawl was handed to the batch queue; finish with [`finish_batched`]
    Deferred { run_id: i64 },
}

/// Reads the seed URL from the first non-blank value of a field
pub fn seed_from_field<S: FieldStore>(entity: &S, field: &str) -> Result<String> {
    entity
        .field_values(field)
        .iter()
        .map(|value| value.as_str().trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CrawlError::MissingSeed {
            field: field.to_string(),
        })
}

/// Converts a crawl report into destination field values
///
/// Content crawls yield one text value per content unit; link crawls yield
/// one link value per URL. Traversal order is preserved.
pub fn values_from_report(report: &CrawlReport, flavor: CrawlFlavor) -> Vec<FieldValue> {
    match flavor {
        CrawlFlavor::Content => report
            .contents
            .iter()
            .map(|unit| FieldValue::Text(unit.text.clone()))
            .collect(),
        CrawlFlavor::Links => report
            .links
            .iter()
            .map(|uri| FieldValue::Link { uri: uri.clone() })
            .collect(),
    }
}

/// Crawls from an entity's source field into its destination field
///
/// The capability is checked once, before anything is fetched. In batched
/// mode nothing is written until [`finish_batched`] collects the run.
///
/// # Returns
///
/// * `Ok(Populated)` - Field written, or run deferred
/// * `Err(CrawlError::PermissionDenied)` - Capability not granted
/// * `Err(CrawlError::MissingSeed)` - Source field has no usable value
pub async fn populate<F, B, S, C>(
    coordinator: &mut Coordinator<F, B>,
    entity: &mut S,
    access: &C,
    mapping: &FieldMapping,
    mode: ExecutionMode,
) -> Result<Populated>
where
    F: Fetcher,
    B: BatchBackend,
    S: FieldStore,
    C: CapabilityCheck,
{
    if !access.has_capability(CRAWL_CAPABILITY) {
        return Err(CrawlError::PermissionDenied {
            capability: CRAWL_CAPABILITY.to_string(),
        });
    }

    let seed = seed_from_field(entity, &mapping.source_field)?;
    let outcome = coordinator.run(&seed, mapping.flavor, mode).await?;

    if outcome.deferred {
        if let Some(run_id) = outcome.run_id {
            return Ok(Populated::Deferred { run_id });
        }
    }

    let values = values_from_report(&outcome.report, mapping.flavor);
    let written = values.len();
    entity.set_field_values(&mapping.destination_field, values);
    tracing::info!(
        "Wrote {} values to field '{}'",
        written,
        mapping.destination_field
    );
    Ok(Populated::Written(written))
}

/// Writes the results of a drained batch run into the destination field
///
/// # Returns
///
/// * `Ok(Some(n))` - Run collected, `n` values written
/// * `Ok(None)` - Run still has queued steps; nothing written
pub fn finish_batched<F, B, S>(
    coordinator: &mut Coordinator<F, B>,
    run_id: i64,
    entity: &mut S,
    mapping: &FieldMapping,
) -> Result<Option<usize>>
where
    F: Fetcher,
    B: BatchBackend,
    S: FieldStore,
{
    let Some(report) = coordinator.collect(run_id)? else {
        return Ok(None);
    };

    let values = values_from_report(&report, mapping.flavor);
    let written = values.len();
    entity.set_field_values(&mapping.destination_field, values);
    Ok(Some(written))
}
