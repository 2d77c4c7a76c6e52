//! # Factory
//!
//! Top-level orchestration of a content build. For each content type of
//! the product, in [`ContentType::BUILD_ORDER`], the factory discovers the
//! type's files, constructs each one through the [`Director`], and appends
//! the objects that built cleanly to the typed collections in
//! [`FactoryOutput`]. A link-validation pass runs over the finished
//! collections.
//!
//! ## Fail at the end
//!
//! No error escapes the per-file loop. Every failure is logged and recorded
//! in the [`FactoryReport`] and construction continues, so a single run
//! reports every broken file. [`FactoryRun::succeeded`] is false iff
//! anything was recorded.
//!
//! ## Parallel construction
//!
//! With `workers > 1` the files of one type are constructed on a rayon pool,
//! one builder per worker. Results are collected in file order and the
//! duplicate check and append happen on the calling thread, so the output
//! is identical for any worker count. Types are still processed one after
//! another because each depends on the ones before it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use sctl_core::{
    Baseline, ContentObject, ContentType, Deployment, Detection, Investigation, Lookup, Macro,
    Playbook, SeenIds, Story, UnitTest,
};

use crate::builder::{
    BaselineBuilder, BasicBuilder, Builder, DetectionBuilder, PlaybookBuilder, StoryBuilder,
};
use crate::director::{DetectionDeps, Director};
use crate::discovery::{self, Product};
use crate::enrichment::AttackEnrichment;
use crate::error::{BuildError, BuildResult};
use crate::links::{self, LinkError};

/// Inputs of one factory run.
#[derive(Debug, Clone)]
pub struct FactoryInput {
    /// Root of the content tree.
    pub content_root: PathBuf,
    /// Which package to assemble.
    pub product: Product,
    /// Technique id → ATT&CK context.
    pub attack_enrichment: AttackEnrichment,
    /// Tolerate techniques missing from the enrichment data.
    pub force_cached_or_offline: bool,
    /// Construction threads per content type. `0` and `1` mean sequential.
    pub workers: usize,
}

impl FactoryInput {
    /// Sequential ESCU build of `content_root` with no enrichment.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            product: Product::Escu,
            attack_enrichment: AttackEnrichment::empty(),
            force_cached_or_offline: true,
            workers: 1,
        }
    }
}

/// The typed collections a run produces, one per content type, in
/// discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FactoryOutput {
    /// Unit tests.
    pub tests: Vec<Arc<UnitTest>>,
    /// Lookups.
    pub lookups: Vec<Arc<Lookup>>,
    /// Macros provided by the tree. Generated filter macros live on their detection.
    pub macros: Vec<Arc<Macro>>,
    /// Deployments.
    pub deployments: Vec<Arc<Deployment>>,
    /// Baselines.
    pub baselines: Vec<Arc<Baseline>>,
    /// Investigations.
    pub investigations: Vec<Arc<Investigation>>,
    /// Playbooks.
    pub playbooks: Vec<Arc<Playbook>>,
    /// Detections that shipped.
    pub detections: Vec<Arc<Detection>>,
    /// Stories.
    pub stories: Vec<Arc<Story>>,
}

impl FactoryOutput {
    /// Number of objects built for `content_type`.
    pub fn count(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::UnitTest => self.tests.len(),
            ContentType::Lookup => self.lookups.len(),
            ContentType::Macro => self.macros.len(),
            ContentType::Deployment => self.deployments.len(),
            ContentType::Baseline => self.baselines.len(),
            ContentType::Investigation => self.investigations.len(),
            ContentType::Playbook => self.playbooks.len(),
            ContentType::Detection => self.detections.len(),
            ContentType::Story => self.stories.len(),
        }
    }
}

/// One file that did not make it into the output.
#[derive(Debug)]
pub struct BuildFailure {
    /// Type of the failed file.
    pub content_type: ContentType,
    /// Why it failed.
    pub error: BuildError,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.content_type, self.error)
    }
}

/// Per-type counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    /// Content type counted.
    pub content_type: ContentType,
    /// Files found for the product.
    pub discovered: usize,
    /// Objects in the output.
    pub built: usize,
    /// Failures recorded.
    pub failed: usize,
    /// Built but intentionally left out of the output.
    pub excluded: usize,
}

/// Everything that went wrong in a run, plus per-type counts.
#[derive(Debug, Default)]
pub struct FactoryReport {
    /// Files that did not make it into the output.
    pub failures: Vec<BuildFailure>,
    /// Problems found by the link pass.
    pub link_errors: Vec<LinkError>,
    /// Counts per content type, in build order.
    pub summaries: Vec<TypeSummary>,
}

impl FactoryReport {
    /// Failures plus link errors.
    pub fn error_count(&self) -> usize {
        self.failures.len() + self.link_errors.len()
    }

    /// Whether nothing was recorded.
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    fn record(&mut self, content_type: ContentType, error: BuildError) {
        tracing::error!(%content_type, "{error}");
        self.failures.push(BuildFailure {
            content_type,
            error,
        });
    }
}

/// Output and report of a finished run.
#[derive(Debug)]
pub struct FactoryRun {
    /// Built collections.
    pub output: FactoryOutput,
    /// Everything recorded during the run.
    pub report: FactoryReport,
}

impl FactoryRun {
    /// Whether the run recorded no failures at all.
    pub fn succeeded(&self) -> bool {
        self.report.is_clean()
    }
}

/// Builds every content type of a product from a content tree.
#[derive(Debug)]
pub struct Factory {
    input: FactoryInput,
    director: Director,
    pool: Option<rayon::ThreadPool>,
    output: FactoryOutput,
    report: FactoryReport,
}

impl Factory {
    /// Prepare a run. A pool is created only for `workers > 1`.
    pub fn new(input: FactoryInput) -> Self {
        let pool = if input.workers > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(input.workers)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!(workers = input.workers, error = %e, "falling back to sequential construction");
                    None
                }
            }
        } else {
            None
        };
        Self {
            input,
            director: Director,
            pool,
            output: FactoryOutput::default(),
            report: FactoryReport::default(),
        }
    }

    /// Run the whole build.
    pub fn execute(mut self) -> FactoryRun {
        tracing::info!(
            product = %self.input.product,
            root = %self.input.content_root.display(),
            workers = self.input.workers.max(1),
            "creating security content"
        );

        let product = self.input.product;
        for &content_type in product.content_types() {
            let files = match discovery::discover(&self.input.content_root, product, content_type) {
                Ok(files) => files,
                Err(e) => {
                    self.report.record(content_type, e);
                    self.report.summaries.push(TypeSummary {
                        content_type,
                        discovered: 0,
                        built: 0,
                        failed: 1,
                        excluded: 0,
                    });
                    continue;
                }
            };
            let files: Vec<PathBuf> = files
                .into_iter()
                .filter(|f| self.input.product.admits(f))
                .collect();
            self.create(content_type, &files);
        }

        self.report.link_errors = links::validate_links(&self.output, self.input.product);

        tracing::info!(
            failures = self.report.failures.len(),
            link_errors = self.report.link_errors.len(),
            "security content creation finished"
        );
        FactoryRun {
            output: self.output,
            report: self.report,
        }
    }

    /// Construct every file of one content type and append the results.
    fn create(&mut self, content_type: ContentType, files: &[PathBuf]) {
        let director = self.director;
        let pool = self.pool.as_ref();
        let failures_before = self.report.failures.len();
        let mut excluded = 0;

        match content_type {
            ContentType::UnitTest => {
                let built = construct_all(pool, files, BasicBuilder::<UnitTest>::new, |b, p| {
                    director.construct_test(b, p)
                });
                append(built, &mut self.output.tests, &mut self.report, content_type);
            }
            ContentType::Lookup => {
                let built = construct_all(pool, files, BasicBuilder::<Lookup>::new, |b, p| {
                    director.construct_lookup(b, p)
                });
                append(built, &mut self.output.lookups, &mut self.report, content_type);
            }
            ContentType::Macro => {
                let built = construct_all(pool, files, BasicBuilder::<Macro>::new, |b, p| {
                    director.construct_macro(b, p)
                });
                append(built, &mut self.output.macros, &mut self.report, content_type);
            }
            ContentType::Deployment => {
                let built = construct_all(pool, files, BasicBuilder::<Deployment>::new, |b, p| {
                    director.construct_deployment(b, p)
                });
                append(built, &mut self.output.deployments, &mut self.report, content_type);
            }
            ContentType::Baseline => {
                let deployments = &self.output.deployments;
                let built = construct_all(pool, files, BaselineBuilder::new, |b, p| {
                    director.construct_baseline(b, p, deployments)
                });
                append(built, &mut self.output.baselines, &mut self.report, content_type);
            }
            ContentType::Investigation => {
                let built = construct_all(pool, files, BasicBuilder::<Investigation>::new, |b, p| {
                    director.construct_investigation(b, p)
                });
                append(built, &mut self.output.investigations, &mut self.report, content_type);
            }
            ContentType::Playbook => {
                let built = construct_all(pool, files, PlaybookBuilder::new, |b, p| {
                    director.construct_playbook(b, p)
                });
                append(built, &mut self.output.playbooks, &mut self.report, content_type);
            }
            ContentType::Detection => {
                let ssa = self.input.product == Product::Ssa;
                let no_enrichment = AttackEnrichment::empty();
                let out = &self.output;
                // SSA detections only reference unit tests.
                let deps = if ssa {
                    DetectionDeps {
                        deployments: &[],
                        playbooks: &[],
                        baselines: &[],
                        tests: &out.tests,
                        macros: &[],
                        lookups: &[],
                        enrichment: &no_enrichment,
                        force_cached_or_offline: self.input.force_cached_or_offline,
                    }
                } else {
                    DetectionDeps {
                        deployments: &out.deployments,
                        playbooks: &out.playbooks,
                        baselines: &out.baselines,
                        tests: &out.tests,
                        macros: &out.macros,
                        lookups: &out.lookups,
                        enrichment: &self.input.attack_enrichment,
                        force_cached_or_offline: self.input.force_cached_or_offline,
                    }
                };
                let mut built = construct_all(pool, files, DetectionBuilder::new, |b, p| {
                    director.construct_detection(b, p, deps)
                });
                if ssa {
                    built.retain(|(path, result)| match result {
                        Ok(det) if !det.is_production() => {
                            tracing::debug!(path = %path.display(), "skipping non-production SSA detection");
                            excluded += 1;
                            false
                        }
                        _ => true,
                    });
                }
                append(built, &mut self.output.detections, &mut self.report, content_type);
            }
            ContentType::Story => {
                let out = &self.output;
                let built = construct_all(pool, files, StoryBuilder::new, |b, p| {
                    director.construct_story(b, p, &out.detections, &out.baselines, &out.investigations)
                });
                append(built, &mut self.output.stories, &mut self.report, content_type);
            }
        }

        let failed = self.report.failures.len() - failures_before;
        let built = self.output.count(content_type);
        tracing::info!(
            %content_type,
            label = content_type.label(),
            discovered = files.len(),
            built,
            failed,
            excluded,
            "content type complete"
        );
        self.report.summaries.push(TypeSummary {
            content_type,
            discovered: files.len(),
            built,
            failed,
            excluded,
        });
    }
}

/// Construct one object per file, in file order.
fn construct_all<B, I, C>(
    pool: Option<&rayon::ThreadPool>,
    files: &[PathBuf],
    init: I,
    construct: C,
) -> Vec<(PathBuf, BuildResult<B::Object>)>
where
    B: Builder,
    B::Object: Send,
    I: Fn() -> B + Sync + Send,
    C: Fn(&mut B, &Path) -> BuildResult<()> + Sync + Send,
{
    let build_one = |builder: &mut B, path: &PathBuf| {
        tracing::debug!(path = %path.display(), "constructing");
        let result = construct(builder, path.as_path()).and_then(|()| builder.get_object());
        (path.clone(), result)
    };
    match pool {
        Some(pool) => pool.install(|| {
            files
                .par_iter()
                .map_init(&init, build_one)
                .collect()
        }),
        None => {
            let mut builder = init();
            files.iter().map(|p| build_one(&mut builder, p)).collect()
        }
    }
}

/// Append built objects, rejecting any whose key was already claimed.
fn append<T: ContentObject>(
    built: Vec<(PathBuf, BuildResult<T>)>,
    target: &mut Vec<Arc<T>>,
    report: &mut FactoryReport,
    content_type: ContentType,
) {
    let mut seen = SeenIds::new();
    for (path, result) in built {
        match result {
            Ok(object) => {
                if seen.register(object.unique_key()) {
                    target.push(Arc::new(object));
                } else {
                    let key = object.unique_key().to_string();
                    report.record(
                        content_type,
                        BuildError::DuplicateKey {
                            path,
                            content_type,
                            key,
                        },
                    );
                }
            }
            Err(error) => report.record(content_type, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_root_builds_nothing_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let run = Factory::new(FactoryInput::new(dir.path())).execute();
        assert!(run.succeeded());
        assert_eq!(run.report.summaries.len(), ContentType::BUILD_ORDER.len());
        assert!(ContentType::all().iter().all(|t| run.output.count(*t) == 0));
    }

    #[test]
    fn ssa_builds_two_types() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = FactoryInput::new(dir.path());
        input.product = Product::Ssa;
        let run = Factory::new(input).execute();
        let types: Vec<_> = run.report.summaries.iter().map(|s| s.content_type).collect();
        assert_eq!(types, vec![ContentType::UnitTest, ContentType::Detection]);
    }
}
