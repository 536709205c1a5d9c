//! Randomized stress runs of rename actions against a shared store

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::services::CollisionAvoidingRenamer;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, RenamePolicy};
use crate::infrastructure::traits::{DocumentWorkflow, MemoryStore};

/// Aggregated outcome of a stress run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StressReport {
    /// Rename actions started
    pub actions: usize,
    /// Actions that completed
    pub renamed: usize,
    /// Candidates drawn across completed actions
    pub attempts: u64,
    /// Candidates rejected because the name was taken
    pub collisions: u64,
    /// Failed actions grouped by error kind
    pub failures: BTreeMap<String, usize>,
}

impl StressReport {
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    fn record_failure(&mut self, error: &ApplicationError) {
        *self.failures.entry(error.kind().to_string()).or_default() += 1;
    }

    pub fn merge(mut self, other: StressReport) -> StressReport {
        self.actions += other.actions;
        self.renamed += other.renamed;
        self.attempts += other.attempts;
        self.collisions += other.collisions;
        for (kind, count) in other.failures {
            *self.failures.entry(kind).or_default() += count;
        }
        self
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} action(s), {} renamed, {} failed, {} attempt(s), {} collision(s)",
            self.actions,
            self.renamed,
            self.failed(),
            self.attempts,
            self.collisions
        )
    }
}

/// Runs rename actions on randomly chosen resources of a `MemoryStore`.
///
/// Worker `i` owns a renamer and a picker seeded from `seed + i`, so a
/// single-threaded run is reproducible for a given seed and store. Renamers
/// share the workflow's container convention.
pub struct StressRunner {
    workflows: DocumentWorkflow,
    policy: RenamePolicy,
    seed: u64,
}

impl StressRunner {
    pub fn new(workflows: DocumentWorkflow, seed: u64) -> Self {
        Self {
            workflows,
            policy: RenamePolicy::default(),
            seed,
        }
    }

    pub fn with_policy(mut self, policy: RenamePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn store(&self) -> &MemoryStore {
        self.workflows.store()
    }

    /// Performs `iterations` rename actions spread over `threads` workers.
    ///
    /// Individual action failures are counted in the report and do not stop
    /// the run.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&self, iterations: usize, threads: usize) -> ApplicationResult<StressReport> {
        if self.store().resources().is_empty() {
            return Err(DomainError::NothingToRename.into());
        }
        let threads = threads.max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ApplicationError::OperationFailed {
                context: "build worker pool".to_string(),
                source: Box::new(e),
            })?;

        let report = pool.install(|| {
            (0..threads)
                .into_par_iter()
                .map(|worker| self.run_worker(worker, share(iterations, threads, worker)))
                .reduce(StressReport::default, StressReport::merge)
        });

        info!("stress run finished: {}", report);
        Ok(report)
    }

    fn run_worker(&self, worker: usize, iterations: usize) -> StressReport {
        let worker_seed = self.seed.wrapping_add(worker as u64);
        let mut renamer = CollisionAvoidingRenamer::new(worker_seed)
            .with_policy(self.policy)
            .with_convention(self.workflows.convention());
        let mut picker = StdRng::seed_from_u64(worker_seed.rotate_left(32));
        let mut report = StressReport::default();

        for _ in 0..iterations {
            let resources = self.store().resources();
            let Some(target) = resources.choose(&mut picker) else {
                break;
            };
            report.actions += 1;
            match renamer.rename(target, &self.workflows) {
                Ok(outcome) => {
                    report.renamed += 1;
                    report.attempts += u64::from(outcome.attempts);
                    report.collisions += u64::from(outcome.collisions);
                }
                Err(e) => {
                    debug!("worker {} action failed: {}", worker, e);
                    report.record_failure(&e);
                }
            }
        }
        report
    }
}

/// Iterations assigned to `worker`; the remainder goes to the first workers.
fn share(iterations: usize, threads: usize, worker: usize) -> usize {
    iterations / threads + usize::from(worker < iterations % threads)
}
