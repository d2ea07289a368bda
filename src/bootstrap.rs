//! The bootstrap routine: make sure every declared collection and index
//! exists in the target database.
//!
//! Steps run strictly in order. Connection and permission failures abort
//! the run; every other failure is collected per step and reported at the end.

use futures::TryStreamExt;
use mongodb::{
    Database,
    bson::{Document, doc},
    options::{ValidationAction, ValidationLevel},
    results::CollectionSpecification,
};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    db,
    error::{BootstrapError, StepFailure, codes, server_code},
    report::{BootstrapReport, StepOutcome, StepTarget, step_label},
    schema::{self, CollectionSpec, IndexSpec},
    state::BootstrapContext,
};

/// A fatal failure, with whatever was done before it.
#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct Aborted {
    pub step: String,
    #[source]
    pub source: BootstrapError,
    pub report: Box<BootstrapReport>,
}

/// What the run does after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Continue,
    /// The collection is not there, so its indexes cannot be built.
    SkipIndexes,
}

pub fn on_failure(target: StepTarget, err: &BootstrapError) -> OnFailure {
    if err.is_fatal() {
        return OnFailure::Abort;
    }
    match (target, err) {
        // A conflicting collection still exists and can carry indexes.
        (StepTarget::Collection, BootstrapError::ConfigurationConflict(_)) => OnFailure::Continue,
        (StepTarget::Collection, _) => OnFailure::SkipIndexes,
        (StepTarget::Index, _) => OnFailure::Continue,
    }
}

pub async fn run(ctx: &BootstrapContext) -> Result<BootstrapReport, Aborted> {
    let report = BootstrapReport::new(Uuid::new_v4(), &ctx.database_name);
    let span = tracing::info_span!(
        "bootstrap",
        run_id = %report.run_id,
        database = %ctx.database_name
    );
    run_steps(ctx, report).instrument(span).await
}

async fn run_steps(
    ctx: &BootstrapContext,
    mut report: BootstrapReport,
) -> Result<BootstrapReport, Aborted> {
    if let Err(err) = db::ping(ctx).await {
        return Err(abort(format!("connect {}", ctx.database_name), err, report));
    }

    for spec in schema::collections() {
        let step = step_label(spec.name, None);
        let collection_exists = match ensure_collection(ctx, spec).await {
            Ok(outcome) => {
                tracing::info!(collection = spec.name, ?outcome, "collection ensured");
                report.record(StepTarget::Collection, spec.name, None, outcome);
                true
            }
            Err(err) => {
                let next = on_failure(StepTarget::Collection, &err);
                if next == OnFailure::Abort {
                    return Err(abort(step, err, report));
                }
                tracing::error!(collection = spec.name, error = %err, "collection step failed");
                report.fail(
                    StepTarget::Collection,
                    spec.name,
                    None,
                    StepFailure::new(step, &err),
                );
                next == OnFailure::Continue
            }
        };

        for index in spec.indexes {
            let name = index.name();
            let index_name = Some(name.as_str());
            if !collection_exists {
                tracing::warn!(collection = spec.name, index = %name, "skipped, collection missing");
                report.record(StepTarget::Index, spec.name, index_name, StepOutcome::Skipped);
                continue;
            }

            match ensure_index(ctx, spec.name, index).await {
                Ok(outcome) => {
                    tracing::info!(collection = spec.name, index = %name, ?outcome, "index ensured");
                    report.record(StepTarget::Index, spec.name, index_name, outcome);
                }
                Err(err) if on_failure(StepTarget::Index, &err) == OnFailure::Abort => {
                    return Err(abort(step_label(spec.name, index_name), err, report));
                }
                Err(err) => {
                    tracing::error!(
                        collection = spec.name,
                        index = %name,
                        error = %err,
                        "index step failed"
                    );
                    let failure = StepFailure::new(step_label(spec.name, index_name), &err);
                    report.fail(StepTarget::Index, spec.name, index_name, failure);
                }
            }
        }
    }

    report.finish();
    tracing::info!(
        steps = report.steps.len(),
        failures = report.failures.len(),
        "bootstrap finished"
    );
    Ok(report)
}

fn abort(step: String, source: BootstrapError, mut report: BootstrapReport) -> Aborted {
    tracing::error!(%step, error = %source, "bootstrap aborted");
    report.finish();
    Aborted {
        step,
        source,
        report: Box::new(report),
    }
}

/// Create the collection with its validator unless it already exists.
///
/// An existing collection is never modified. If its validator differs from
/// the declared one it is reported, and in strict mode counted as a conflict.
pub async fn ensure_collection(
    ctx: &BootstrapContext,
    spec: &CollectionSpec,
) -> Result<StepOutcome, BootstrapError> {
    let db = ctx.database();
    let expected = spec.validator_document();

    if let Some(existing) = find_collection(&db, spec.name).await? {
        let actual = existing.options.validator.as_ref();
        return check_validator(spec.name, actual, &expected, ctx.strict_validators);
    }

    let created = db
        .create_collection(spec.name)
        .validator(expected)
        .validation_level(ValidationLevel::Strict)
        .validation_action(ValidationAction::Error)
        .await;

    match created {
        Ok(()) => Ok(StepOutcome::Created),
        // Another replica created it between our lookup and the create call.
        Err(err) if server_code(&err) == Some(codes::NAMESPACE_EXISTS) => {
            tracing::debug!(collection = spec.name, "collection created concurrently");
            Ok(StepOutcome::AlreadyPresent)
        }
        Err(err) => Err(err.into()),
    }
}

fn check_validator(
    name: &str,
    actual: Option<&Document>,
    expected: &Document,
    strict: bool,
) -> Result<StepOutcome, BootstrapError> {
    if actual == Some(expected) {
        return Ok(StepOutcome::AlreadyPresent);
    }

    let detail = if actual.is_some() { "a different" } else { "no" };
    if strict {
        return Err(BootstrapError::ConfigurationConflict(format!(
            "collection {name} exists with {detail} validator"
        )));
    }

    tracing::warn!(
        collection = name,
        "collection exists with {detail} validator; leaving it untouched"
    );
    Ok(StepOutcome::ValidatorMismatch)
}

async fn find_collection(
    db: &Database,
    name: &str,
) -> Result<Option<CollectionSpecification>, BootstrapError> {
    let mut cursor = db.list_collections().filter(doc! { "name": name }).await?;
    Ok(cursor.try_next().await?)
}

/// Create the index; the server treats an identical existing index as a no-op.
pub async fn ensure_index(
    ctx: &BootstrapContext,
    collection: &str,
    index: &IndexSpec,
) -> Result<StepOutcome, BootstrapError> {
    let collection = ctx.database().collection::<Document>(collection);
    let name = index.name();
    let present = collection.list_index_names().await?.contains(&name);

    collection.create_index(index.to_model()).await?;

    Ok(if present {
        StepOutcome::AlreadyPresent
    } else {
        StepOutcome::Created
    })
}
