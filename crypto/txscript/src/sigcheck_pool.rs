//! Worker-pool witness verification for a whole block: one
//! `verify_witness` task per input, dispatched on a dedicated `rayon`
//! thread pool. Ordering of completion doesn't matter — only the caller's
//! final accept/reject decision, taken after every outstanding task for
//! the block's inputs has run. Built around a
//! `thread_pool.install(|| inputs.par_iter().try_for_each(...))` shape,
//! with explicit cooperative cancellation via `rayon::Scope` + an
//! `AtomicBool` abort flag, since unlike `try_for_each` a `Scope` doesn't
//! stop scheduling already-queued tasks on the first error by itself.

use crate::engine::SignatureCache;
use crate::flags::VerifyFlags;
use crate::witness::verify_witness;
use hnsd_addresses::Address;
use hnsd_consensus_core::tx::Transaction;
use hnsd_txscript_errors::ScriptError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// One input's witness-verification job: the transaction and input index it
/// belongs to, plus the address and value of the output it spends (the
/// caller already resolved this from its coin view).
pub struct SigCheckJob<'a> {
    pub tx: &'a Transaction,
    pub input_index: usize,
    pub spent_address: &'a Address,
    pub spent_value: u64,
}

pub struct SigCheckPool {
    pool: rayon::ThreadPool,
}

impl SigCheckPool {
    pub fn new(num_threads: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(num_threads).build().expect("failed to build sigcheck thread pool");
        Self { pool }
    }

    /// Verifies every job's witness under `flags`, short-circuiting
    /// remaining unscheduled tasks on the first failure; tasks already
    /// running finish without affecting the (already decided) result.
    /// Returns the first `ScriptError` encountered, if any.
    pub fn verify_all(&self, jobs: &[SigCheckJob], flags: VerifyFlags, sig_cache: &SignatureCache) -> Result<(), ScriptError> {
        let abort = AtomicBool::new(false);
        let first_error: Mutex<Option<ScriptError>> = Mutex::new(None);

        self.pool.install(|| {
            rayon::scope(|scope| {
                for job in jobs {
                    let abort = &abort;
                    let first_error = &first_error;
                    scope.spawn(move |_| {
                        if abort.load(Ordering::Relaxed) {
                            return;
                        }
                        let witness = &job.tx.inputs[job.input_index].witness;
                        if let Err(err) = verify_witness(witness, job.spent_address, job.tx, job.input_index, job.spent_value, flags, sig_cache) {
                            abort.store(true, Ordering::Relaxed);
                            let mut guard = first_error.lock();
                            if guard.is_none() {
                                *guard = Some(err);
                            }
                        }
                    });
                }
            });
        });

        match first_error.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
