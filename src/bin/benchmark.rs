//! Performance benchmarks for ByteVault
//!
//! Drives a shared in-process store and measures latency and throughput
//! under single-caller and concurrent load.

use bytevault::Store;
use serde::Serialize;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Benchmark configuration
#[derive(Debug, Clone)]
struct BenchmarkConfig {
    operations: usize,
    ops_per_caller: usize,
    caller_counts: Vec<usize>,
    /// Upper bound on callers running at the same time in concurrent runs
    max_in_flight: usize,
    value_size: usize,
    json: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            ops_per_caller: 1_000,
            caller_counts: vec![10, 50, 100],
            max_in_flight: std::thread::available_parallelism().map_or(4, |n| n.get()),
            value_size: 64,
            json: false,
        }
    }
}

impl BenchmarkConfig {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let mut config = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--json" => config.json = true,
                "--operations" => config.operations = parse_count(arg, iter.next())?,
                "--ops-per-caller" => config.ops_per_caller = parse_count(arg, iter.next())?,
                "--max-in-flight" => config.max_in_flight = parse_count(arg, iter.next())?,
                "--value-size" => config.value_size = parse_count(arg, iter.next())?,
                other => return Err(format!("Unknown argument: {}", other)),
            }
        }

        if config.operations == 0 || config.ops_per_caller == 0 {
            return Err("Operation counts must be greater than zero".to_string());
        }
        if config.max_in_flight == 0 {
            return Err("--max-in-flight must be greater than zero".to_string());
        }
        Ok(config)
    }
}

fn parse_count(flag: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("Missing value for {}", flag))?;
    value
        .parse()
        .map_err(|e| format!("Invalid value for {}: {} ({})", flag, value, e))
}

#[derive(Debug, Serialize)]
struct BenchmarkResults {
    operation: String,
    total_operations: usize,
    peak_callers: usize,
    duration_secs: f64,
    ops_per_second: f64,
    avg_latency_us: f64,
    p95_latency_us: f64,
    p99_latency_us: f64,
}

impl BenchmarkResults {
    fn new(
        operation: String,
        total_operations: usize,
        duration: Duration,
        latencies: &mut [Duration],
    ) -> Self {
        latencies.sort();

        let ops_per_second = total_operations as f64 / duration.as_secs_f64();
        let avg_latency_us = if latencies.is_empty() {
            0.0
        } else {
            let total: f64 = latencies.iter().map(|d| d.as_secs_f64() * 1e6).sum();
            total / latencies.len() as f64
        };

        let p95_index = (latencies.len() as f64 * 0.95) as usize;
        let p99_index = (latencies.len() as f64 * 0.99) as usize;

        let percentile_us = |index: usize| {
            latencies.get(index).unwrap_or(&Duration::ZERO).as_secs_f64() * 1e6
        };
        let p95_latency_us = percentile_us(p95_index);
        let p99_latency_us = percentile_us(p99_index);

        Self {
            operation,
            total_operations,
            peak_callers: 1,
            duration_secs: duration.as_secs_f64(),
            ops_per_second,
            avg_latency_us,
            p95_latency_us,
            p99_latency_us,
        }
    }

    fn report(&self, json: bool) -> Result<(), serde_json::Error> {
        if json {
            println!("{}", serde_json::to_string(self)?);
            return Ok(());
        }
        println!("=== {} Benchmark Results ===", self.operation);
        println!("Total operations: {}", self.total_operations);
        println!("Peak concurrent callers: {}", self.peak_callers);
        println!("Duration: {:.3}s", self.duration_secs);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
        println!("Average latency: {:.2}us", self.avg_latency_us);
        println!("P95 latency: {:.2}us", self.p95_latency_us);
        println!("P99 latency: {:.2}us", self.p99_latency_us);
        println!();
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = BenchmarkConfig::from_args(&args)?;
    info!(?config, "ByteVault performance benchmarks");

    run_single_caller_benchmarks(&config)?;
    run_concurrent_benchmarks(&config).await?;

    Ok(())
}

fn run_single_caller_benchmarks(
    config: &BenchmarkConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Running single caller benchmarks...");
    let value = vec![b'v'; config.value_size];

    benchmark_set_operations(config.operations, &value)?.report(config.json)?;
    benchmark_get_operations(config.operations, &value)?.report(config.json)?;
    benchmark_mixed_workload(config.operations, &value)?.report(config.json)?;

    Ok(())
}

async fn run_concurrent_benchmarks(
    config: &BenchmarkConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(max_in_flight = config.max_in_flight, "Running concurrent caller benchmarks...");

    for &num_callers in &config.caller_counts {
        let results = benchmark_concurrent_operations(
            num_callers,
            config.max_in_flight,
            config.ops_per_caller,
            config.value_size,
        )
        .await?;
        results.report(config.json)?;
    }

    Ok(())
}

fn benchmark_set_operations(
    num_operations: usize,
    value: &[u8],
) -> bytevault::Result<BenchmarkResults> {
    let store = Store::new();
    let mut latencies = Vec::with_capacity(num_operations);

    let start = Instant::now();

    for i in 0..num_operations {
        let key = format!("bench_key_{}", i);

        let op_start = Instant::now();
        store.set(&key, value)?;
        latencies.push(op_start.elapsed());
    }

    let total_duration = start.elapsed();

    Ok(BenchmarkResults::new(
        "SET".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

fn benchmark_get_operations(
    num_operations: usize,
    value: &[u8],
) -> bytevault::Result<BenchmarkResults> {
    // First, populate the store with data
    let store = Store::new();
    for i in 0..num_operations {
        store.set(&format!("get_bench_key_{}", i), value)?;
    }
    debug!(entries = store.len(), "populated store for GET benchmark");

    let mut latencies = Vec::with_capacity(num_operations);
    let start = Instant::now();

    for i in 0..num_operations {
        let key = format!("get_bench_key_{}", i);

        let op_start = Instant::now();
        let _value = store.get(&key);
        latencies.push(op_start.elapsed());
    }

    let total_duration = start.elapsed();

    Ok(BenchmarkResults::new(
        "GET".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

fn benchmark_mixed_workload(
    num_operations: usize,
    value: &[u8],
) -> bytevault::Result<BenchmarkResults> {
    let store = Store::new();
    let mut latencies = Vec::with_capacity(num_operations);

    let start = Instant::now();

    for i in 0..num_operations {
        let key = format!("mixed_key_{}", i % 1000); // Reuse keys for realistic workload

        let op_start = Instant::now();

        match i % 10 {
            0..=6 => {
                // 70% GET operations
                let _value = store.get(&key);
            }
            7..=8 => {
                // 20% SET operations
                store.set(&key, value)?;
            }
            9 => {
                // 10% DELETE operations
                let _deleted = store.del(&key);
            }
            _ => unreachable!(),
        }

        latencies.push(op_start.elapsed());
    }

    let total_duration = start.elapsed();
    debug!(entries = store.len(), "mixed workload finished");

    Ok(BenchmarkResults::new(
        "Mixed Workload".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

async fn benchmark_concurrent_operations(
    num_callers: usize,
    max_in_flight: usize,
    ops_per_caller: usize,
    value_size: usize,
) -> Result<BenchmarkResults, Box<dyn std::error::Error>> {
    let store = Arc::new(Store::new());
    // Callers beyond the cap wait here instead of piling onto the blocking pool.
    let semaphore = Arc::new(Semaphore::new(max_in_flight));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let value: Arc<[u8]> = vec![b'v'; value_size].into();
    let mut handles = Vec::new();
    let mut all_latencies = Vec::with_capacity(num_callers * ops_per_caller);

    let start = Instant::now();

    for caller_id in 0..num_callers {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let store = Arc::clone(&store);
        let value = Arc::clone(&value);
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);

        // Store calls are synchronous, so each caller runs on the blocking pool.
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(running, Ordering::SeqCst);

            let mut latencies = Vec::with_capacity(ops_per_caller);
            let outcome = (0..ops_per_caller).try_for_each(|i| {
                let key = format!("concurrent_key_{}_{}", caller_id, i);

                let op_start = Instant::now();
                store.set(&key, &value[..])?;
                latencies.push(op_start.elapsed());
                Ok::<(), bytevault::StoreError>(())
            });

            // Leave the in-flight count before the permit is released.
            in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome.map(|()| latencies)
        });

        handles.push(handle);
    }

    // Collect results from all callers
    for handle in handles {
        all_latencies.extend(handle.await??);
    }

    let total_duration = start.elapsed();
    let total_operations = num_callers * ops_per_caller;
    debug!(entries = store.len(), "concurrent run finished");

    let mut results = BenchmarkResults::new(
        format!("Concurrent ({} callers, max {} in flight)", num_callers, max_in_flight),
        total_operations,
        total_duration,
        &mut all_latencies,
    );
    results.peak_callers = peak.load(Ordering::SeqCst);
    Ok(results)
}
