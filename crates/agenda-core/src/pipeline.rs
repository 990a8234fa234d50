//! End-to-end comparison run
//!
//! Both documents go through region location and segmentation on their own
//! scoped thread. Comparison starts once both item lists exist.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::compare::{compare_items, compare_positional, ComparisonResult, DocumentRole, Status};
use crate::error::CompareError;
use crate::grammar::LabelGrammar;
use crate::options::{Alignment, CompareOptions};
use crate::region::{Region, RegionLocator};
use crate::segment::{segment_region, ItemList};
use crate::source::DocumentSource;

/// Region and items extracted from one document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentExtraction {
    pub role: DocumentRole,
    pub region: Region,
    pub items: ItemList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    Compared,
    /// Segmentation produced no items for these documents
    NoLabelsFound { documents: Vec<DocumentRole> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub matched: usize,
    pub mismatched: usize,
    pub missing_in_a: usize,
    pub missing_in_b: usize,
}

impl StatusCounts {
    pub fn from_results(results: &[ComparisonResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.status {
                Status::Match => counts.matched += 1,
                Status::Mismatch => counts.mismatched += 1,
                Status::MissingInA => counts.missing_in_a += 1,
                Status::MissingInB => counts.missing_in_b += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.missing_in_a + self.missing_in_b
    }
}

/// Complete outcome of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRun {
    pub options: CompareOptions,
    pub region_a: Region,
    pub region_b: Region,
    pub items_a: ItemList,
    pub items_b: ItemList,
    pub outcome: RunOutcome,
    pub results: Vec<ComparisonResult>,
}

impl ComparisonRun {
    pub fn item_count(&self, role: DocumentRole) -> usize {
        match role {
            DocumentRole::A => self.items_a.len(),
            DocumentRole::B => self.items_b.len(),
        }
    }

    pub fn region(&self, role: DocumentRole) -> &Region {
        match role {
            DocumentRole::A => &self.region_a,
            DocumentRole::B => &self.region_b,
        }
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_results(&self.results)
    }

    /// Every label matched and both documents produced items
    pub fn is_clean(&self) -> bool {
        self.outcome == RunOutcome::Compared && self.results.iter().all(|r| r.is_match())
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| !r.is_match())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonPipeline {
    grammar: LabelGrammar,
    options: CompareOptions,
}

impl ComparisonPipeline {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            grammar: LabelGrammar::default(),
            options,
        }
    }

    pub fn with_grammar(mut self, grammar: LabelGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    pub fn grammar(&self) -> &LabelGrammar {
        &self.grammar
    }

    /// Locate the region of one document and segment it into items
    pub fn extract<S: DocumentSource + ?Sized>(
        &self,
        role: DocumentRole,
        doc: &S,
    ) -> Result<DocumentExtraction, CompareError> {
        let name = self.options.labels.name(role);

        let located = RegionLocator::new(&self.grammar, &self.options)
            .locate(doc)
            .map_err(|source| CompareError::Source {
                role,
                name: name.to_string(),
                operation: "region extraction",
                source,
            })?;

        info!(
            document = %role,
            document_name = name,
            page = located.region.page + 1,
            source = ?located.region.source,
            "Region located"
        );

        let items = segment_region(&located.text, &self.grammar, self.options.include_note);
        if items.is_empty() {
            warn!(document = %role, document_name = name, "No labeled items found");
        }

        Ok(DocumentExtraction {
            role,
            region: located.region,
            items,
        })
    }

    /// Extract both documents concurrently, then compare their items
    pub fn run<A, B>(&self, a: &A, b: &B) -> Result<ComparisonRun, CompareError>
    where
        A: DocumentSource + Sync + ?Sized,
        B: DocumentSource + Sync + ?Sized,
    {
        let (extracted_a, extracted_b) = thread::scope(|scope| {
            let worker = scope.spawn(|| self.extract(DocumentRole::B, b));
            let extracted_a = self.extract(DocumentRole::A, a);
            let extracted_b = match worker.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            (extracted_a, extracted_b)
        });
        let extracted_a = extracted_a?;
        let extracted_b = extracted_b?;

        Ok(self.compare(extracted_a, extracted_b))
    }

    /// Compare two already extracted documents
    pub fn compare(&self, a: DocumentExtraction, b: DocumentExtraction) -> ComparisonRun {
        let empty: Vec<DocumentRole> = [&a, &b]
            .iter()
            .filter(|extraction| extraction.items.is_empty())
            .map(|extraction| extraction.role)
            .collect();

        let outcome = if empty.is_empty() {
            RunOutcome::Compared
        } else {
            warn!(documents = ?empty, "No labels found, comparison is incomplete");
            RunOutcome::NoLabelsFound { documents: empty }
        };

        let labels = &self.options.labels;
        let results: Vec<ComparisonResult> = match self.options.alignment {
            Alignment::ByLabel => compare_items(&a.items, &b.items),
            Alignment::Positional => compare_positional(&a.items, &b.items),
        }
        .into_iter()
        .map(|result| result.with_document_names(&labels.a, &labels.b))
        .collect();

        let counts = StatusCounts::from_results(&results);
        info!(
            matched = counts.matched,
            mismatched = counts.mismatched,
            missing_in_a = counts.missing_in_a,
            missing_in_b = counts.missing_in_b,
            "Comparison complete"
        );

        ComparisonRun {
            options: self.options.clone(),
            region_a: a.region,
            region_b: b.region,
            items_a: a.items,
            items_b: b.items,
            outcome,
            results,
        }
    }
}

/// Compare two documents with the default label grammar
pub fn compare_documents<A, B>(
    a: &A,
    b: &B,
    options: &CompareOptions,
) -> Result<ComparisonRun, CompareError>
where
    A: DocumentSource + Sync + ?Sized,
    B: DocumentSource + Sync + ?Sized,
{
    ComparisonPipeline::new(options.clone()).run(a, b)
}
