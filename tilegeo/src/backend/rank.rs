//! Ephemeral full-text indexes for ranked search.
//!
//! Each index is a RAM-only tantivy index over one address field of the
//! candidate partitions, scored with tantivy's BM25. Address text is split
//! with [`tokenize`] before indexing so ranked and fallback search agree on
//! token boundaries.

use super::types::{IndexId, SearchError};
use crate::text::tokenize;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::BooleanQuery;
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, WhitespaceTokenizer};
use tantivy::{Index, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};

const ID_FIELD: &str = "id";
const TEXT_FIELD: &str = "text";
const ADDRESS_TOKENIZER: &str = "address";

/// Single-threaded writer heap. tantivy's minimum.
const WRITER_HEAP_BYTES: usize = 15_000_000;

fn index_error(e: tantivy::TantivyError) -> SearchError {
    SearchError::CapabilityUnavailable(format!("text index: {}", e))
}

fn build_schema() -> (Schema, Field, Field) {
    let mut builder = Schema::builder();
    let id = builder.add_text_field(ID_FIELD, STRING | STORED);

    let indexing = TextFieldIndexing::default()
        .set_tokenizer(ADDRESS_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqs);
    let text = builder.add_text_field(
        TEXT_FIELD,
        TextOptions::default().set_indexing_options(indexing),
    );

    (builder.build(), id, text)
}

/// Read-only BM25 index keyed by record id.
pub struct Bm25Index {
    searcher: Searcher,
    id_field: Field,
    text_field: Field,
    documents: usize,
}

impl Bm25Index {
    /// Indexes `(id, text)` pairs. A repeated id keeps its first text.
    pub fn build<'a, I>(docs: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (schema, id_field, text_field) = build_schema();
        let index = Index::create_in_ram(schema);
        index.tokenizers().register(
            ADDRESS_TOKENIZER,
            TextAnalyzer::builder(WhitespaceTokenizer::default())
                .filter(LowerCaser)
                .build(),
        );

        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_HEAP_BYTES)
            .map_err(index_error)?;
        let mut seen = HashSet::new();
        for (id, text) in docs {
            if !seen.insert(id) {
                continue;
            }
            let mut doc = TantivyDocument::default();
            doc.add_text(id_field, id);
            doc.add_text(text_field, tokenize(text).join(" "));
            writer.add_document(doc).map_err(index_error)?;
        }
        writer.commit().map_err(index_error)?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(index_error)?;

        Ok(Self {
            searcher: reader.searcher(),
            id_field,
            text_field,
            documents: seen.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }

    /// Scores every document sharing at least one term with `query`.
    ///
    /// Documents with no matching term are absent from the map.
    pub fn scores(&self, query: &str) -> Result<HashMap<String, f64>, SearchError> {
        let terms: Vec<Term> = tokenize(query)
            .iter()
            .map(|t| Term::from_field_text(self.text_field, t))
            .collect();
        if terms.is_empty() || self.is_empty() {
            return Ok(HashMap::new());
        }

        let query = BooleanQuery::new_multiterms_query(terms);
        let hits = self
            .searcher
            .search(&query, &TopDocs::with_limit(self.documents))
            .map_err(index_error)?;

        let mut scores = HashMap::with_capacity(hits.len());
        for (score, address) in hits {
            let doc: TantivyDocument = self.searcher.doc(address).map_err(index_error)?;
            if let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_str()) {
                scores.insert(id.to_string(), f64::from(score));
            }
        }
        Ok(scores)
    }
}

impl fmt::Debug for Bm25Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bm25Index")
            .field("documents", &self.documents)
            .finish()
    }
}

/// Live ephemeral indexes, keyed by handle.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    next: AtomicU64,
    indexes: DashMap<IndexId, Arc<Bm25Index>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, index: Bm25Index) -> IndexId {
        let id = IndexId(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        self.indexes.insert(id, Arc::new(index));
        id
    }

    pub fn get(&self, id: IndexId) -> Option<Arc<Bm25Index>> {
        self.indexes.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: IndexId) -> bool {
        self.indexes.remove(&id).is_some()
    }

    /// Number of live indexes.
    pub fn live(&self) -> usize {
        self.indexes.len()
    }

    pub fn clear(&self) {
        self.indexes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> Bm25Index {
        Bm25Index::build([
            ("1", "King Fahd Road, Olaya, Riyadh"),
            ("2", "Olaya Street, Riyadh"),
            ("3", "Tahlia Street, Jeddah"),
            ("4", "Olaya Olaya Olaya"),
        ])
        .unwrap()
    }

    #[test]
    fn test_unmatched_document_has_no_score() {
        let scores = index().scores("olaya").unwrap();
        assert!(!scores.contains_key("3"));
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn test_rarer_term_scores_higher() {
        let idx = index();
        let fahd = idx.scores("fahd").unwrap()["1"];
        let riyadh = idx.scores("riyadh").unwrap()["1"];
        assert!(fahd > riyadh);
    }

    #[test]
    fn test_more_matching_terms_scores_higher() {
        let idx = index();
        let one = idx.scores("olaya jeddah").unwrap()["2"];
        let both = idx.scores("olaya riyadh").unwrap()["2"];
        assert!(both > one);
    }

    #[test]
    fn test_commas_and_case_do_not_split_terms_differently() {
        let scores = index().scores("RIYADH,").unwrap();
        let mut ids: Vec<&str> = scores.keys().map(String::as_str).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_arabic_terms_match() {
        let idx = Bm25Index::build([
            ("a", "شارع التحلية، جدة"),
            ("b", "طريق الملك فهد، الرياض"),
        ])
        .unwrap();
        let scores = idx.scores("التحلية").unwrap();
        assert_eq!(scores.len(), 1);
        assert!(scores["a"] > 0.0);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let idx = Bm25Index::build([("1", "Olaya"), ("1", "Tahlia")]).unwrap();
        assert_eq!(idx.len(), 1);
        assert!(idx.scores("tahlia").unwrap().is_empty());
        assert!(idx.scores("olaya").unwrap().contains_key("1"));
    }

    #[test]
    fn test_empty_query_or_index() {
        assert!(index().scores("   ").unwrap().is_empty());
        let empty = Bm25Index::build(std::iter::empty()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.scores("olaya").unwrap().is_empty());
    }

    #[test]
    fn test_registry_lifecycle() {
        let registry = IndexRegistry::new();
        let a = registry.insert(index());
        let b = registry.insert(Bm25Index::build(std::iter::empty()).unwrap());
        assert_ne!(a, b);
        assert_eq!(registry.live(), 2);
        assert!(registry.get(a).is_some());
        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.live(), 1);
    }
}
