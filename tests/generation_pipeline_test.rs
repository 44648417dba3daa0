//! End-to-end pipeline tests with in-memory collaborators and a stub generator

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use triadgen::adapters::database::{CombinationStore, ProfileSource, StoreStats};
use triadgen::adapters::generator::Generator;
use triadgen::adapters::memory::{MemoryStore, StaticProfiles};
use triadgen::config::GenerationConfig;
use triadgen::core::generation::{GenerationCoordinator, RunMode};
use triadgen::domain::{
    CanonicalKey, CombinationRecord, GeneratorError, Indications, PhysiologyCode, Result, Triad, TriadError,
    SENTINEL_TITLE,
};

const AXIS: &str = r#"{
  "combination": "Metabolic-Psyche-Dental Axis",
  "analysis": "Energy metabolism, mood and oral health interact.",
  "potential_indications": {
    "Physical": ["Fatigue", "Gum inflammation"],
    "Psychological/Emotional": ["Irritability"],
    "Functional": ["Poor sleep"]
  },
  "recommendations": ["Regular meals", "Dental check-up"]
}"#;

type Responder = dyn Fn(&str, usize) -> Result<String> + Send + Sync;

/// Generator that records prompts and answers through a closure
struct StubGenerator {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    respond: Box<Responder>,
}

impl StubGenerator {
    fn new(respond: impl Fn(&str, usize) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn always(reply: &'static str) -> Arc<Self> {
        Self::new(move |_, _| Ok(reply.to_string()))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, _system: &str, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt, call)
    }
}

/// Profile source whose code listing is unavailable
struct UnavailableProfiles;

#[async_trait]
impl ProfileSource for UnavailableProfiles {
    async fn get_profile(&self, _code: PhysiologyCode) -> Result<String> {
        Ok(String::new())
    }

    async fn list_codes(&self) -> Result<Vec<PhysiologyCode>> {
        Err(TriadError::Profile("profile table unreachable".to_string()))
    }
}

/// Store whose writes fail for keys containing a marker code
struct FlakyStore {
    inner: MemoryStore,
    failing_code: &'static str,
}

#[async_trait]
impl CombinationStore for FlakyStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn exists_by_key(&self, key: &CanonicalKey) -> Result<bool> {
        self.inner.exists_by_key(key).await
    }

    async fn upsert(&self, record: &CombinationRecord) -> Result<()> {
        if record.key.as_str().contains(self.failing_code) {
            return Err(TriadError::Database("deadlock detected".to_string()));
        }
        self.inner.upsert(record).await
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.inner.stats().await
    }
}

fn generation(base_codes: &[f64]) -> GenerationConfig {
    GenerationConfig {
        workers: 3,
        requests_per_second: 1000.0,
        max_retries: 0,
        retry_base_delay_ms: 1,
        base_codes: base_codes.to_vec(),
        ..Default::default()
    }
}

fn coordinator(
    generation: GenerationConfig,
    dry_run: bool,
    profiles: Arc<dyn ProfileSource>,
    store: Arc<MemoryStore>,
    generator: Arc<StubGenerator>,
) -> GenerationCoordinator {
    // A dropped sender never requests shutdown
    let (_, shutdown_rx) = watch::channel(false);
    GenerationCoordinator::with_components(
        generation,
        dry_run,
        profiles,
        store,
        generator,
        shutdown_rx,
    )
}

fn explicit(codes: &str) -> RunMode {
    RunMode::Explicit(Triad::parse(codes).unwrap())
}

#[tokio::test]
async fn test_explicit_triad_is_persisted_under_canonical_key() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(explicit("76,30,50")).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.done, 1);
    assert_eq!(summary.persisted, 1);
    assert!(summary.is_successful());
    assert_eq!(store.len().await, 1);

    let key = Triad::parse("30,50,76").unwrap().canonical_key();
    assert_eq!(key.as_str(), "30.00,50.00,76.00");
    let record = store.get(&key).await.expect("record stored");
    assert_eq!(record.title, "Metabolic-Psyche-Dental Axis");
    assert_eq!(
        record.indications.physical,
        vec!["Fatigue".to_string(), "Gum inflammation".to_string()]
    );
    assert_eq!(record.recommendations.len(), 2);
}

#[tokio::test]
async fn test_rerun_makes_no_generator_calls() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    coordinator.execute(explicit("30,50,76")).await.unwrap();
    assert_eq!(generator.calls(), 1);

    let second = coordinator.execute(explicit("50,76,30")).await.unwrap();
    assert_eq!(generator.calls(), 1);
    assert_eq!(second.total, 1);
    assert_eq!(second.done, 1);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.persisted, 0);
    assert_eq!(store.upsert_count(), 1);
}

#[tokio::test]
async fn test_enumerate_all_respects_limit() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        GenerationConfig {
            limit: Some(2),
            ..generation(&[30.0, 50.0, 64.0, 76.0])
        },
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(RunMode::EnumerateAll).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.done, 2);
    assert!(!summary.interrupted);
    assert_eq!(store.len().await, 2);
    assert_eq!(generator.calls(), 2);

    // Lexicographic order: the first two combinations
    for key in ["30.00,50.00,64.00", "30.00,50.00,76.00"] {
        let triad = Triad::parse(key).unwrap();
        assert!(store.exists_by_key(&triad.canonical_key()).await.unwrap());
    }
}

#[tokio::test]
async fn test_enumerate_all_then_rerun_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[30.0, 50.0, 64.0, 72.0, 76.0]),
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let first = coordinator.execute(RunMode::EnumerateAll).await.unwrap();
    assert_eq!(first.persisted, 10);

    let second = coordinator.execute(RunMode::EnumerateAll).await.unwrap();
    assert_eq!(second.skipped, 10);
    assert_eq!(generator.calls(), 10);
}

#[tokio::test]
async fn test_base_codes_come_from_profile_source() {
    let profiles: StaticProfiles = [30.0, 50.0, 76.0, 64.0]
        .into_iter()
        .map(|v| (PhysiologyCode::new(v).unwrap(), format!("profile {v}")))
        .collect();
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        false,
        Arc::new(profiles),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(RunMode::EnumerateAll).await.unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(store.len().await, 4);
}

#[tokio::test]
async fn test_prompt_carries_base_profiles() {
    let profiles = StaticProfiles::new()
        .with_profile(PhysiologyCode::new(30.0).unwrap(), "Cell renewal text")
        .with_profile(PhysiologyCode::new(76.0).unwrap(), "Dental text");
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        false,
        Arc::new(profiles),
        Arc::new(MemoryStore::new()),
        generator.clone(),
    );

    coordinator.execute(explicit("30,50,76")).await.unwrap();

    let prompts = generator.prompts.lock().unwrap();
    let prompt = &prompts[0];
    assert!(prompt.contains("RAH 30.00"));
    assert!(prompt.contains("Cell renewal text"));
    assert!(prompt.contains("Dental text"));
    assert!(prompt.contains("(no base profile available)"));
    assert!(prompt.ends_with("Return JSON now."));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        true,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(explicit("30,50,76")).await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.done, 1);
    assert_eq!(summary.persisted, 0);
    assert_eq!(generator.calls(), 1);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_dry_run_still_skips_existing_keys() {
    let store = Arc::new(MemoryStore::new());
    let triad = Triad::parse("30,50,76").unwrap();
    store
        .upsert(&CombinationRecord::new(
            &triad,
            "Existing".to_string(),
            String::new(),
            Indications {
                functional: vec!["Focus".to_string()],
                ..Default::default()
            },
            Vec::new(),
        ))
        .await
        .unwrap();

    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        true,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator
        .execute(RunMode::Explicit(triad))
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_force_regenerates_existing_key() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let plain = coordinator(
        generation(&[]),
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );
    plain.execute(explicit("30,50,76")).await.unwrap();

    let forced = coordinator(
        GenerationConfig {
            force: true,
            ..generation(&[])
        },
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );
    let summary = forced.execute(explicit("30,50,76")).await.unwrap();

    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.persisted, 1);
    assert_eq!(generator.calls(), 2);
    assert_eq!(store.upsert_count(), 2);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_garbage_output_stored_with_sentinel_title() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always("Sorry, I cannot help with that.");
    let coordinator = coordinator(
        generation(&[]),
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(explicit("30,50,76")).await.unwrap();
    assert_eq!(summary.bad, 1);
    assert_eq!(summary.failed, 0);

    let key = Triad::parse("30,50,76").unwrap().canonical_key();
    let record = store.get(&key).await.unwrap();
    assert_eq!(record.title, SENTINEL_TITLE);
    assert!(record.is_degraded());
    assert_eq!(store.stats().await.unwrap().degraded, 1);
}

#[tokio::test]
async fn test_retry_bad_merges_good_fields() {
    let first = r#"{"combination": "", "analysis": "First analysis", "potential_indications": {"Physical": ["Fatigue"]}}"#;
    let second = r#"{"combination": "Metabolic Axis", "analysis": "Second analysis", "potential_indications": {}}"#;
    let generator = StubGenerator::new(move |_, call| {
        let reply = if call == 0 { first } else { second };
        Ok(reply.to_string())
    });
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(
        GenerationConfig {
            retry_bad: true,
            ..generation(&[])
        },
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(explicit("30,50,76")).await.unwrap();
    assert_eq!(generator.calls(), 2);
    assert_eq!(summary.bad, 0);

    let key = Triad::parse("30,50,76").unwrap().canonical_key();
    let record = store.get(&key).await.unwrap();
    assert_eq!(record.title, "Metabolic Axis");
    assert_eq!(record.analysis, "First analysis");
    assert_eq!(record.indications.physical, vec!["Fatigue".to_string()]);
}

#[tokio::test]
async fn test_failing_triads_do_not_stop_the_run() {
    let generator = StubGenerator::new(|prompt, _| {
        if prompt.contains("RAH 64.00") {
            Err(TriadError::Generator(GeneratorError::ServerError {
                status: 503,
                message: "model loading".to_string(),
            }))
        } else {
            Ok(AXIS.to_string())
        }
    });
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(
        GenerationConfig {
            max_retries: 1,
            ..generation(&[30.0, 50.0, 64.0, 76.0])
        },
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
    );

    let summary = coordinator.execute(RunMode::EnumerateAll).await.unwrap();

    assert_eq!(summary.done, 4);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.persisted, 1);
    assert!(!summary.is_successful());
    // 1 success + 3 failures with 2 attempts each
    assert_eq!(generator.calls(), 7);

    let survivor = Triad::parse("30,50,76").unwrap().canonical_key();
    assert!(store.get(&survivor).await.is_some());
}

#[tokio::test]
async fn test_persistence_failures_are_isolated_per_triad() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        failing_code: "64.00",
    });
    let generator = StubGenerator::always(AXIS);
    let (_, shutdown_rx) = watch::channel(false);
    let coordinator = GenerationCoordinator::with_components(
        GenerationConfig {
            workers: 2,
            ..generation(&[30.0, 50.0, 64.0, 76.0])
        },
        false,
        Arc::new(StaticProfiles::new()),
        store.clone(),
        generator.clone(),
        shutdown_rx,
    );

    let summary = coordinator.execute(RunMode::EnumerateAll).await.unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.done, 4);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.persisted, 1);
    assert!(!summary.is_successful());
    assert_eq!(generator.calls(), 4);

    assert_eq!(store.inner.len().await, 1);
    let survivor = Triad::parse("30,50,76").unwrap().canonical_key();
    assert!(store.inner.get(&survivor).await.is_some());
}

#[tokio::test]
async fn test_base_code_listing_failure_aborts_run() {
    let store = Arc::new(MemoryStore::new());
    let generator = StubGenerator::always(AXIS);
    let coordinator = coordinator(
        generation(&[]),
        false,
        Arc::new(UnavailableProfiles),
        store.clone(),
        generator.clone(),
    );

    let result = coordinator.execute(RunMode::EnumerateAll).await;
    assert!(matches!(result, Err(TriadError::Profile(_))));
    assert_eq!(generator.calls(), 0);
    assert!(store.is_empty().await);
}
