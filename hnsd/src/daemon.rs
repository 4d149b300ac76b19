//! Service wiring: `create_core` binds the block-connection service and
//! the mempool-admission service behind the `Core`/`Service` lifecycle
//! (`core/src/core.rs`, `core/src/service.rs`). The grpc/p2p/mining/rpc/
//! utxoindex wiring a full daemon would also bind has no counterpart here
//! — those surfaces are out of scope.

use crate::args::Args;
use hnsd_consensus::{ChainSession, ConsensusGate, GateSnapshot, InMemoryUtxoSet};
use hnsd_consensus_core::config::params::NetworkParams;
use hnsd_core::core::Core;
use hnsd_core::service::Service;
use hnsd_core::{info, trace};
use hnsd_hashes::Hash;
use hnsd_mempool::MempoolAdmission;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// How often the idle services below wake to check for a shutdown request.
/// There is no P2P layer feeding `connect_block` calls in this project, so
/// both services are otherwise quiescent.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Hosts the single-writer chain view: the authenticated trie
/// plus committed UTXO set, guarded by a [`ChainSession`] so every other
/// service (mempool admission, a future RPC/DNS layer) can take read
/// snapshots without blocking block connection.
pub struct ConsensusService {
    pub session: ChainSession<ConsensusGate<InMemoryUtxoSet>>,
    running: AtomicBool,
}

impl ConsensusService {
    pub fn new(params: Arc<NetworkParams>, sigcheck_threads: usize) -> Arc<Self> {
        let gate = ConsensusGate::new(InMemoryUtxoSet::default(), params, Hash::default(), sigcheck_threads);
        Arc::new(Self { session: ChainSession::new(gate), running: AtomicBool::new(true) })
    }
}

impl Service for ConsensusService {
    fn ident(self: Arc<Self>) -> &'static str {
        "consensus-gate"
    }

    fn start(self: Arc<Self>, _core: Arc<Core>) -> Vec<JoinHandle<()>> {
        let service = self;
        let handle = std::thread::Builder::new()
            .name("consensus-gate".to_string())
            .spawn(move || {
                let tip = service.session.blocking_read().tip();
                info!("consensus gate ready, tip {tip}");
                while service.running.load(Ordering::SeqCst) {
                    std::thread::sleep(IDLE_POLL_INTERVAL);
                }
                trace!("consensus gate stopped");
            })
            .expect("failed to spawn consensus-gate thread");
        vec![handle]
    }

    fn stop(self: Arc<Self>) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Hosts the mempool pre-validation adapter over the
/// consensus gate's committed view. Admission itself (receiving
/// transactions from peers) is a P2P concern out of scope here; this
/// service exists so the adapter's lifetime is tied to the daemon's, ready
/// for a future P2P/RPC layer to submit against.
pub struct MempoolService {
    pub admission: RwLock<MempoolAdmission<GateSnapshot<InMemoryUtxoSet>>>,
    running: AtomicBool,
}

impl Service for MempoolService {
    fn ident(self: Arc<Self>) -> &'static str {
        "mempool-admission"
    }

    fn start(self: Arc<Self>, _core: Arc<Core>) -> Vec<JoinHandle<()>> {
        let service = self;
        let handle = std::thread::Builder::new()
            .name("mempool-admission".to_string())
            .spawn(move || {
                info!("mempool admission ready");
                while service.running.load(Ordering::SeqCst) {
                    std::thread::sleep(IDLE_POLL_INTERVAL);
                }
                trace!("mempool admission stopped");
            })
            .expect("failed to spawn mempool-admission thread");
        vec![handle]
    }

    fn stop(self: Arc<Self>) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Binds every long-running piece onto a fresh [`Core`]: the
/// consensus gate, and mempool admission layered over the gate's committed
/// view. Persistence (`hnsd-database`) is not wired in here — the gate
/// holds its state in memory, matching the
/// `consensus::errors::config::ConfigResult` early-validation-then-build
/// shape but with no on-disk store behind it yet.
pub fn create_core(args: &Args) -> Arc<Core> {
    let params = args.network_params();
    trace!("network params: tree_interval={}, bidding_period={}, reveal_period={}", params.tree_interval, params.bidding_period, params.reveal_period);

    let core = Arc::new(Core::new());

    let consensus_service = ConsensusService::new(params.clone(), num_cpus::get());
    let confirmed = consensus_service.session.blocking_read().snapshot();
    let mempool_service = Arc::new(MempoolService {
        admission: RwLock::new(MempoolAdmission::new(confirmed, params, 0)),
        running: AtomicBool::new(true),
    });

    core.bind(consensus_service);
    core.bind(mempool_service);

    info!("hnsd daemon assembled for network {}", args.network);
    core
}
