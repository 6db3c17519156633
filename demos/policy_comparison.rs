//! Policy comparison example for single-instance-registry.
//!
//! Demonstrates:
//! - Every initialization policy under the same burst of concurrent first callers
//! - Which policies build before the first `get`
//! - How `LazyUnsafe` can hand out more than one instance
//!
//! Run with: `cargo run --example policy_comparison`

use single_instance_registry::{InitPolicy, Singleton, SingletonEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const CALLERS: usize = 16;

/// Stand-in for an expensive shared resource.
#[derive(Debug)]
struct ThreadPool {
    workers: usize,
}

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();

    println!("=== single-instance-registry: Policy Comparison ===\n");
    println!(
        "{:<22} {:>8} {:>12} {:>10} {:>10}",
        "policy", "eager?", "built early", "instances", "distinct"
    );

    let mut workers = 0;
    for policy in InitPolicy::ALL {
        let singleton = Singleton::new(|| {
            // Widen the window in which first callers overlap.
            thread::sleep(Duration::from_millis(20));
            ThreadPool { workers: 4 }
        });

        let duplicates = Arc::new(AtomicUsize::new(0));
        let duplicates_clone = Arc::clone(&duplicates);
        singleton.set_trace_callback(move |event| {
            if matches!(event, SingletonEvent::Duplicate { .. }) {
                duplicates_clone.fetch_add(1, Ordering::Relaxed);
            }
        });

        if let Err(err) = singleton.configure(policy) {
            println!("{policy:<22} configure failed: {err}");
            continue;
        }
        let built_early = singleton.is_initialized();

        let barrier = Barrier::new(CALLERS);
        let handles: Vec<Arc<ThreadPool>> = thread::scope(|s| {
            let spawned: Vec<_> = (0..CALLERS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        singleton.get()
                    })
                })
                .collect();
            spawned
                .into_iter()
                .filter_map(|h| h.join().ok().and_then(Result::ok))
                .collect()
        });

        let mut distinct: Vec<&Arc<ThreadPool>> = Vec::new();
        for handle in &handles {
            if !distinct.iter().any(|seen| Arc::ptr_eq(seen, handle)) {
                distinct.push(handle);
            }
        }

        println!(
            "{:<22} {:>8} {:>12} {:>10} {:>10}",
            policy.to_string(),
            policy.is_eager(),
            built_early,
            singleton.constructed_count(),
            distinct.len()
        );
        if duplicates.load(Ordering::Relaxed) > 0 {
            println!("{:<22} ^ duplicate instances observed", "");
        }
        if let Some(pool) = handles.first() {
            workers = pool.workers;
        }
    }

    println!("\nEach pool runs {workers} workers.");
    println!("\n=== Example Complete ===");
    println!("Key takeaways:");
    println!("  - Eager policies build inside configure");
    println!("  - Every policy but lazy-unsafe builds exactly one instance");
    println!("  - lazy-unsafe shows the check-then-act race");
}
