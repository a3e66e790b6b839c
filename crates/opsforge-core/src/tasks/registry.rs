//! Worker agent registry and capability-based selection.

use std::collections::HashMap;
use std::sync::Mutex;

/// Availability of a registered worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Idle,
    Executing,
}

#[derive(Debug)]
struct Worker {
    name: String,
    capabilities: Vec<String>,
    status: WorkerStatus,
    /// Per-task-type history as (successes, attempts).
    history: HashMap<String, (u32, u32)>,
}

impl Worker {
    /// Unattempted task types score a neutral 0.5 so a fresh worker is
    /// neither preferred nor penalized against one with history.
    fn success_rate(&self, task_type: &str) -> f64 {
        match self.history.get(task_type) {
            Some((_, 0)) | None => 0.5,
            Some((successes, attempts)) => f64::from(*successes) / f64::from(*attempts),
        }
    }
}

/// Registry of worker agents. Selection filters to idle workers whose
/// capabilities include the task type and picks the highest historical
/// success rate for that type; ties keep the first registered.
#[derive(Default)]
pub struct AgentRegistry {
    workers: Mutex<Vec<Worker>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, capabilities: Vec<String>) {
        let mut workers = self.lock();
        workers.push(Worker {
            name: name.into(),
            capabilities,
            status: WorkerStatus::Idle,
            history: HashMap::new(),
        });
    }

    /// Pick a worker for the task type and mark it executing.
    pub fn assign(&self, task_type: &str) -> Option<String> {
        let mut workers = self.lock();
        let mut best: Option<(usize, f64)> = None;
        for (i, worker) in workers.iter().enumerate() {
            if worker.status != WorkerStatus::Idle {
                continue;
            }
            if !worker.capabilities.iter().any(|c| c == task_type) {
                continue;
            }
            let rate = worker.success_rate(task_type);
            // Strictly-greater keeps the first registered on ties.
            if best.is_none_or(|(_, r)| rate > r) {
                best = Some((i, rate));
            }
        }
        best.map(|(i, _)| {
            workers[i].status = WorkerStatus::Executing;
            workers[i].name.clone()
        })
    }

    /// Record the task outcome and return the worker to the idle pool.
    pub fn release(&self, name: &str, task_type: &str, success: bool) {
        let mut workers = self.lock();
        if let Some(worker) = workers.iter_mut().find(|w| w.name == name) {
            worker.status = WorkerStatus::Idle;
            let entry = worker.history.entry(task_type.to_string()).or_insert((0, 0));
            entry.1 += 1;
            if success {
                entry.0 += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Worker>> {
        match self.workers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Registry pre-populated with the built-in workers the task templates
/// reference.
pub fn default_registry() -> AgentRegistry {
    let registry = AgentRegistry::new();
    registry.register(
        "infra-worker",
        vec![
            "gather_requirements".into(),
            "design_architecture".into(),
            "apply_infrastructure".into(),
            "verify_deployment".into(),
        ],
    );
    registry.register(
        "analysis-worker",
        vec![
            "collect_metrics".into(),
            "analyze_data".into(),
            "estimate_cost".into(),
            "identify_savings".into(),
            "write_report".into(),
        ],
    );
    registry.register(
        "ops-worker",
        vec![
            "triage_issue".into(),
            "plan_remediation".into(),
            "execute_remediation".into(),
            "verify_deployment".into(),
        ],
    );
    registry
}
