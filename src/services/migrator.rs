//! Migrator — moves legacy hex-named fingerprints to percent-encoded keys.
//!
//! For each object under the folder: classify its name, decode the hex,
//! server-side copy it to `folder + percentEncode(identifier) + ".somalier"`
//! with the source's last-modified time as `fingerprint-created` metadata,
//! then delete the source. Objects whose names already contain `%` are left
//! alone, which makes the whole run safe to repeat.
//!
//! A failure on one object (bad hex, failed copy, failed delete) is reported
//! and the scan moves on. There is no rollback: if the copy lands but the
//! delete fails, both keys remain.

use super::object_store::{ObjectStore, list_objects};
use crate::{
    config::AppConfig,
    errors::{MigrateError, ObjectError},
    models::{
        fingerprint_key::{
            CREATED_METADATA_KEY, CandidateKey, decode_hex_identifier, destination_key,
            format_created, identifier_from_key,
        },
        listing::ObjectListing,
    },
};
use futures::{StreamExt, pin_mut};
use std::{collections::HashMap, io::Write};
use tracing::{debug, info, warn};

/// Outcome counts for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
struct MovedObject {
    source: String,
    destination: String,
    created: String,
}

#[derive(Debug)]
enum Outcome {
    Moved(MovedObject),
    Skipped,
}

pub struct Migrator<S> {
    store: S,
    config: AppConfig,
}

impl<S: ObjectStore> Migrator<S> {
    pub fn new(store: S, config: AppConfig) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scan the folder once and migrate every hex-named object, writing one
    /// line per move or failure to `out`.
    ///
    /// Only a failed listing request (or a failed write to `out`) ends the
    /// run early.
    pub async fn migrate<W: Write>(&self, out: &mut W) -> Result<MigrationReport, MigrateError> {
        let AppConfig { folder, bucket } = &self.config;
        let listing = list_objects(&self.store, bucket, folder);
        pin_mut!(listing);

        let mut report = MigrationReport::default();
        while let Some(entry) = listing.next().await {
            let entry = entry.map_err(MigrateError::Listing)?;

            match self.migrate_object(&entry).await {
                Ok(Outcome::Moved(moved)) => {
                    writeln!(
                        out,
                        "Moved {} to {} with created date of {}",
                        moved.source, moved.destination, moved.created
                    )?;
                    report.moved += 1;
                }
                Ok(Outcome::Skipped) => {
                    match identifier_from_key(folder, &entry.key) {
                        Ok(identifier) => {
                            debug!("`{}` already encoded for {}", entry.key, identifier)
                        }
                        Err(err) => {
                            debug!("`{}` already encoded but unreadable: {}", entry.key, err)
                        }
                    }
                    report.skipped += 1;
                }
                Err(err) => {
                    let name = entry
                        .key
                        .strip_prefix(folder.as_str())
                        .unwrap_or(entry.key.as_str());
                    writeln!(out, "Could not convert {}", name)?;
                    warn!("could not convert `{}`: {}", entry.key, err);
                    report.failed += 1;
                }
            }
        }

        info!(
            moved = report.moved,
            skipped = report.skipped,
            failed = report.failed,
            "finished scanning s3://{}/{}",
            bucket,
            folder
        );
        Ok(report)
    }

    async fn migrate_object(&self, entry: &ObjectListing) -> Result<Outcome, ObjectError> {
        let AppConfig { folder, bucket } = &self.config;

        let name = match CandidateKey::classify(folder, &entry.key)? {
            CandidateKey::PercentEncoded(_) => return Ok(Outcome::Skipped),
            CandidateKey::Hex(name) => name,
        };
        let identifier = decode_hex_identifier(name)?;
        let destination = destination_key(folder, &identifier);
        let created = format_created(&entry.last_modified);

        let metadata = HashMap::from([(CREATED_METADATA_KEY.to_string(), created.clone())]);
        self.store
            .copy_with_metadata(bucket, &entry.key, &destination, metadata)
            .await
            .map_err(|source| ObjectError::Copy {
                destination: destination.clone(),
                source,
            })?;

        self.store
            .delete_object(bucket, &entry.key)
            .await
            .map_err(|source| ObjectError::Delete {
                destination: destination.clone(),
                source,
            })?;

        Ok(Outcome::Moved(MovedObject {
            source: entry.key.clone(),
            destination,
            created,
        }))
    }
}
