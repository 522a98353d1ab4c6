//! The context assembler.
//!
//! `SourceSet::collect` gathers documents from a store (skipping unreadable
//! ones with a warning); `ContextAssembler::assemble` is then a pure
//! function from the gathered set and the configured budgets to a bounded
//! context string. Collection happens at startup or on an explicit refresh,
//! never implicitly per request.

use crate::budget::{ContextBudget, truncate_chars, truncate_chars_owned};
use serde::{Deserialize, Serialize};
use studylab_core::document::{DocumentStore, SourceDocument};
use studylab_core::error::ContextError;
use tracing::{debug, warn};

/// Label prefixing the ordering manifest section.
const ORDER_LABEL: &str = "[Course Order]";

/// Label prefixing each course material section.
fn material_label(name: &str) -> String {
    format!("[Course Material: {name}]")
}

/// The gathered inputs for one assembly: documents, optional manifest,
/// and the names of sources that could not be read.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    /// Documents sorted lexicographically by name.
    pub documents: Vec<SourceDocument>,

    /// The ordering manifest text, when present.
    pub manifest: Option<String>,

    /// Names skipped because they could not be read or decoded.
    pub skipped: Vec<String>,
}

impl SourceSet {
    /// Build a set from in-hand documents (test and embedding entry point).
    ///
    /// Documents are sorted by name so assembly order never depends on
    /// insertion order.
    pub fn from_documents(mut documents: Vec<SourceDocument>, manifest: Option<String>) -> Self {
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            documents,
            manifest,
            skipped: Vec::new(),
        }
    }

    /// Gather every document the store knows about.
    ///
    /// A source that cannot be read is skipped with a warning and recorded
    /// in `skipped`; it never aborts collection of the remaining sources.
    pub async fn collect(store: &dyn DocumentStore) -> Self {
        let names = match store.list().await {
            Ok(names) => names,
            Err(e) => {
                warn!(store = store.name(), error = %e, "Document listing failed; assembling empty context");
                return Self::default();
            }
        };

        let mut documents = Vec::with_capacity(names.len());
        let mut skipped = Vec::new();

        for name in names {
            match store.read(&name).await {
                Ok(text) => documents.push(SourceDocument::new(&name, text)),
                Err(e) => {
                    warn!(source = %name, error = %e, "Skipping unreadable course document");
                    skipped.push(name);
                }
            }
        }

        let manifest = match store.manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(store = store.name(), error = %e, "Course order manifest unreadable; omitting");
                None
            }
        };

        Self::from_documents(documents, manifest).with_skipped(skipped)
    }

    fn with_skipped(mut self, skipped: Vec<String>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.manifest.is_none()
    }
}

/// The assembled course context, ready to be carried in a system turn.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// The bounded context text. Never longer than the total budget.
    pub text: String,

    /// Assembly statistics (inclusion, truncation, skips).
    pub stats: AssemblyStats,
}

impl AssembledContext {
    /// An empty context (no sources, zero budget, or startup fallback).
    pub fn empty(budget: ContextBudget) -> Self {
        Self {
            text: String::new(),
            stats: AssemblyStats {
                budget,
                total_chars: 0,
                hard_truncated: false,
                sources: Vec::new(),
                skipped: Vec::new(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Statistics about one assembly pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// The budgets this assembly ran under.
    pub budget: ContextBudget,

    /// Character count of the final text.
    pub total_chars: usize,

    /// Whether the final hard truncation to the total budget fired.
    pub hard_truncated: bool,

    /// Per-source statistics, in assembly order (manifest excluded).
    pub sources: Vec<SourceStats>,

    /// Names of sources skipped during collection.
    pub skipped: Vec<String>,
}

/// Statistics for a single source section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStats {
    /// Source name.
    pub name: String,

    /// Characters of source text available.
    pub chars_total: usize,

    /// Characters kept after the per-source prefix cut.
    pub chars_kept: usize,

    /// Whether the per-source cut fired.
    pub truncated: bool,
}

/// The context assembler. Stateless — create one and reuse it.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    budget: ContextBudget,
}

impl ContextAssembler {
    /// Create a new assembler with the given character budgets.
    pub fn new(budget: ContextBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> ContextBudget {
        self.budget
    }

    /// Assemble a bounded context string from a source set.
    ///
    /// # Algorithm
    ///
    /// 1. Manifest first (when present), prefix-cut to `P`, under its own label
    /// 2. Each document in lexicographic name order, prefix-cut to `P`,
    ///    under a label naming the source
    /// 3. Final hard truncation of the concatenation to `B` — the
    ///    authoritative bound; per-source cuts are a fairness mechanism,
    ///    not a substitute
    ///
    /// Pure: no side effects, deterministic for a fixed input set. An empty
    /// set yields an empty (zero-length) context string.
    pub fn assemble(&self, set: &SourceSet) -> Result<AssembledContext, ContextError> {
        let ContextBudget {
            total_chars,
            per_source_chars,
        } = self.budget;

        if total_chars == 0 || set.is_empty() {
            let mut empty = AssembledContext::empty(self.budget);
            empty.stats.skipped = set.skipped.clone();
            return Ok(empty);
        }

        let mut sections: Vec<String> = Vec::with_capacity(set.documents.len() + 1);
        let mut sources: Vec<SourceStats> = Vec::with_capacity(set.documents.len());

        if let Some(manifest) = &set.manifest {
            let body = truncate_chars(manifest, per_source_chars);
            sections.push(format!("{ORDER_LABEL}\n{body}"));
        }

        // Documents are pre-sorted by name in the SourceSet.
        for doc in &set.documents {
            let chars_total = doc.text.chars().count();
            let body = truncate_chars(&doc.text, per_source_chars);
            let chars_kept = chars_total.min(per_source_chars);
            sources.push(SourceStats {
                name: doc.name.clone(),
                chars_total,
                chars_kept,
                truncated: chars_kept < chars_total,
            });
            sections.push(format!("{}\n{body}", material_label(&doc.name)));
        }

        let mut text = sections.join("\n\n");
        let assembled_chars = text.chars().count();
        let hard_truncated = assembled_chars > total_chars;
        if hard_truncated {
            truncate_chars_owned(&mut text, total_chars);
        }

        let final_chars = text.chars().count();
        // The invariant the rest of the system depends on. Unreachable with
        // correct truncation; fail loudly rather than send an oversized request.
        if final_chars > total_chars {
            return Err(ContextError::BudgetExceeded {
                actual: final_chars,
                budget: total_chars,
            });
        }

        debug!(
            sources = sources.len(),
            skipped = set.skipped.len(),
            chars = final_chars,
            hard_truncated,
            "Assembled course context"
        );

        Ok(AssembledContext {
            text,
            stats: AssemblyStats {
                budget: self.budget,
                total_chars: final_chars,
                hard_truncated,
                sources,
                skipped: set.skipped.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use studylab_core::error::DocumentError;

    fn doc(name: &str, text: &str) -> SourceDocument {
        SourceDocument::new(name, text)
    }

    fn assemble(
        docs: Vec<SourceDocument>,
        manifest: Option<&str>,
        total: usize,
        per_source: usize,
    ) -> AssembledContext {
        let set = SourceSet::from_documents(docs, manifest.map(String::from));
        ContextAssembler::new(ContextBudget::new(total, per_source))
            .assemble(&set)
            .unwrap()
    }

    #[test]
    fn output_never_exceeds_total_budget() {
        let ctx = assemble(
            vec![
                doc("a.pdf", &"X".repeat(5000)),
                doc("b.pdf", &"Y".repeat(5000)),
            ],
            None,
            1500,
            1000,
        );
        assert!(ctx.text.chars().count() <= 1500);
        assert!(ctx.stats.hard_truncated);
    }

    #[test]
    fn per_source_cut_before_concatenation() {
        // First source is cut to 1000 chars, so the second still appears
        // within the remaining total budget.
        let ctx = assemble(
            vec![
                doc("a.pdf", &"X".repeat(5000)),
                doc("b.pdf", &"Y".repeat(5000)),
            ],
            None,
            1500,
            1000,
        );
        assert!(ctx.text.contains("[Course Material: a.pdf]"));
        assert!(ctx.text.contains(&"X".repeat(1000)));
        assert!(!ctx.text.contains(&"X".repeat(1001)));
        assert!(ctx.text.contains("[Course Material: b.pdf]"));
        assert_eq!(ctx.stats.sources[0].chars_kept, 1000);
        assert!(ctx.stats.sources[0].truncated);
    }

    #[test]
    fn assembly_is_deterministic() {
        let docs = || {
            vec![
                doc("b.pdf", "beta content"),
                doc("a.pdf", "alpha content"),
                doc("c.pdf", "gamma content"),
            ]
        };
        let first = assemble(docs(), Some("1. a\n2. b\n3. c"), 500, 100);
        let second = assemble(docs(), Some("1. a\n2. b\n3. c"), 500, 100);
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn sources_ordered_lexicographically_regardless_of_insertion() {
        let ctx = assemble(
            vec![doc("week2.txt", "two"), doc("week1.txt", "one")],
            None,
            1000,
            100,
        );
        let pos1 = ctx.text.find("week1.txt").unwrap();
        let pos2 = ctx.text.find("week2.txt").unwrap();
        assert!(pos1 < pos2);
    }

    #[test]
    fn manifest_comes_first() {
        let ctx = assemble(
            vec![doc("a.pdf", "material")],
            Some("1. Digital Money Lab\n2. Dropshipping Mastery"),
            1000,
            500,
        );
        assert!(ctx.text.starts_with("[Course Order]\n"));
        let order_pos = ctx.text.find("[Course Order]").unwrap();
        let material_pos = ctx.text.find("[Course Material: a.pdf]").unwrap();
        assert!(order_pos < material_pos);
    }

    #[test]
    fn zero_budget_yields_empty_string() {
        let ctx = assemble(vec![doc("a.pdf", "content")], Some("order"), 0, 100);
        assert_eq!(ctx.text, "");
        assert_eq!(ctx.stats.total_chars, 0);
    }

    #[test]
    fn empty_source_set_yields_empty_string() {
        let ctx = assemble(vec![], None, 1000, 100);
        assert_eq!(ctx.text, "");
        assert!(ctx.is_empty());
    }

    #[test]
    fn empty_document_keeps_its_label() {
        let ctx = assemble(vec![doc("empty.txt", "")], None, 1000, 100);
        assert!(ctx.text.contains("[Course Material: empty.txt]"));
        assert_eq!(ctx.stats.sources[0].chars_total, 0);
        assert!(!ctx.stats.sources[0].truncated);
    }

    #[test]
    fn small_inputs_pass_through_untruncated() {
        let ctx = assemble(
            vec![doc("a.txt", "alpha"), doc("b.txt", "beta")],
            Some("a then b"),
            10_000,
            1_000,
        );
        assert!(!ctx.stats.hard_truncated);
        assert!(ctx.stats.sources.iter().all(|s| !s.truncated));
        assert_eq!(ctx.stats.total_chars, ctx.text.chars().count());
    }

    // --- collection ---

    struct FlakyStore;

    #[async_trait]
    impl DocumentStore for FlakyStore {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn list(&self) -> Result<Vec<String>, DocumentError> {
            Ok(vec!["bad.pdf".into(), "good.pdf".into()])
        }

        async fn read(&self, name: &str) -> Result<String, DocumentError> {
            if name == "bad.pdf" {
                Err(DocumentError::Unreadable {
                    name: name.into(),
                    reason: "invalid UTF-8".into(),
                })
            } else {
                Ok("readable content".into())
            }
        }

        async fn manifest(&self) -> Result<Option<String>, DocumentError> {
            Ok(Some("good.pdf first".into()))
        }

        async fn refresh(&self) -> Result<usize, DocumentError> {
            Ok(2)
        }
    }

    #[tokio::test]
    async fn unreadable_source_skipped_not_fatal() {
        let set = SourceSet::collect(&FlakyStore).await;
        assert_eq!(set.documents.len(), 1);
        assert_eq!(set.documents[0].name, "good.pdf");
        assert_eq!(set.skipped, vec!["bad.pdf".to_string()]);

        let ctx = ContextAssembler::new(ContextBudget::new(1000, 500))
            .assemble(&set)
            .unwrap();
        assert!(ctx.text.contains("readable content"));
        assert!(!ctx.text.contains("bad.pdf"));
        assert_eq!(ctx.stats.skipped, vec!["bad.pdf".to_string()]);
    }
}
