//! Machine translation of category and service names.

use std::fmt;
use std::sync::Arc;

use arangomig_domain::{
    fallback_translation, field_str, translation_key, HierarchyCollection, LanguageCode, Record,
};
use chrono::SecondsFormat;
use serde_json::{json, Value};

use super::SeedError;
use crate::infrastructure::ports::{ClockPort, DocumentStore, Translator};
use crate::use_cases::hierarchy::ensure_collection;

const SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationTally {
    pub created: usize,
    pub skipped: usize,
    /// Created with the `"<text> (<LANG>)"` placeholder after a failed call.
    pub fallbacks: usize,
}

impl fmt::Display for TranslationTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} fallbacks",
            self.created, self.skipped, self.fallbacks
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub categories: TranslationTally,
    pub services: TranslationTally,
}

/// Which parent collection a pass works on and where its translations go.
struct ParentKind {
    parent: HierarchyCollection,
    translations: HierarchyCollection,
    edges: HierarchyCollection,
    parent_field: &'static str,
    unique_index: &'static str,
}

const CATEGORY_PASS: ParentKind = ParentKind {
    parent: HierarchyCollection::Categories,
    translations: HierarchyCollection::CategoryTranslations,
    edges: HierarchyCollection::CategoryTranslationEdges,
    parent_field: "serviceCategoryId",
    unique_index: "idx_category_language",
};

const SERVICE_PASS: ParentKind = ParentKind {
    parent: HierarchyCollection::Services,
    translations: HierarchyCollection::ServiceTranslations,
    edges: HierarchyCollection::ServiceTranslationEdges,
    parent_field: "serviceId",
    unique_index: "idx_service_language",
};

pub struct CreateTranslations {
    store: Arc<dyn DocumentStore>,
    translator: Arc<dyn Translator>,
    clock: Arc<dyn ClockPort>,
}

impl CreateTranslations {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        translator: Arc<dyn Translator>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store,
            translator,
            clock,
        }
    }

    pub async fn execute(&self, language: &LanguageCode) -> Result<TranslationReport, SeedError> {
        for pass in [&CATEGORY_PASS, &SERVICE_PASS] {
            if !self.store.collection_exists(pass.parent.name()).await? {
                return Err(SeedError::MissingCollection(pass.parent.name().to_string()));
            }
        }
        for pass in [&CATEGORY_PASS, &SERVICE_PASS] {
            self.prepare(pass).await?;
        }

        let report = TranslationReport {
            categories: self.translate_all(&CATEGORY_PASS, language).await?,
            services: self.translate_all(&SERVICE_PASS, language).await?,
        };
        tracing::info!(language = %language, categories = %report.categories, services = %report.services, "Translations finished");
        Ok(report)
    }

    async fn prepare(&self, pass: &ParentKind) -> Result<(), SeedError> {
        for collection in [pass.translations, pass.edges] {
            ensure_collection(self.store.as_ref(), collection, true, &[]).await?;
        }

        let index = json!({
            "type": "persistent",
            "fields": [pass.parent_field, "languageCode"],
            "unique": true,
            "name": pass.unique_index,
        });
        if let Err(e) = self
            .store
            .ensure_index(pass.translations.name(), &index)
            .await
        {
            tracing::warn!(collection = %pass.translations, index = pass.unique_index, error = %e, "Could not create index");
        }
        Ok(())
    }

    async fn translate_all(
        &self,
        pass: &ParentKind,
        language: &LanguageCode,
    ) -> Result<TranslationTally, SeedError> {
        let mut tally = TranslationTally::default();
        let parents = self.store.all_documents(pass.parent.name()).await?;

        for parent in &parents {
            let (Some(parent_key), Some(name)) = (field_str(parent, "_key"), field_str(parent, "nameEN"))
            else {
                continue;
            };

            let filter = record(json!({
                pass.parent_field: parent_key,
                "languageCode": language.as_str(),
            }));
            if self
                .store
                .find_first(pass.translations.name(), &filter)
                .await?
                .is_some()
            {
                tally.skipped += 1;
                continue;
            }

            let text = match self
                .translator
                .translate(&name, SOURCE_LANGUAGE, &language.api_code())
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(collection = %pass.parent, key = %parent_key, error = %e, "Translation failed, using fallback");
                    tally.fallbacks += 1;
                    fallback_translation(&name, language)
                }
            };

            let now = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let key = translation_key(&parent_key, language);
            let translation = record(json!({
                "_key": key,
                pass.parent_field: parent_key,
                "languageCode": language.as_str(),
                "translation": text,
                "isActive": true,
                "createdAt": now,
            }));
            self.store
                .insert(pass.translations.name(), &translation)
                .await?;

            let edge = record(json!({
                "_from": format!("{}/{parent_key}", pass.parent),
                "_to": format!("{}/{key}", pass.translations),
                "createdAt": now,
            }));
            self.store.insert(pass.edges.name(), &edge).await?;

            tracing::info!(collection = %pass.translations, key = %key, translation = %text, "Created translation");
            tally.created += 1;
        }

        Ok(tally)
    }
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
