//! Logger singleton example for single-instance-registry.
//!
//! Demonstrates:
//! - Declaring a process-wide logger with `define_singleton!`
//! - Picking the initialization policy from the `LOGGER_POLICY` environment variable
//! - Fetching the logger twice and getting the same instance back
//!
//! Run with: `LOGGER_POLICY=eager cargo run --example logger_singleton`

use single_instance_registry::{define_singleton, InitPolicy};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// A logger that numbers each line it writes.
#[derive(Debug, Default)]
pub struct Logger {
    next_line: Mutex<u64>,
}

impl Logger {
    fn log(&self, msg: &str) {
        let mut line = self.next_line.lock().unwrap();
        *line += 1;
        println!("   [log #{}] {}", *line, msg);
    }
}

define_singleton!(logger, Logger, Logger::default);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    println!("=== single-instance-registry: Logger Singleton ===\n");

    // -------------------------------------------------------------------------
    // 1. Configure
    // -------------------------------------------------------------------------
    let policy = match InitPolicy::from_env("LOGGER_POLICY") {
        Ok(policy) => policy.unwrap_or_default(),
        Err(err) => {
            eprintln!("   {err}, falling back to the default policy");
            InitPolicy::default()
        }
    };
    println!("1. Configuring logger with policy `{policy}`...");
    logger::configure(policy).unwrap();
    println!("   Initialized before first access? {}", logger::is_initialized());

    // -------------------------------------------------------------------------
    // 2. Fetch twice
    // -------------------------------------------------------------------------
    println!("\n2. Fetching the logger twice...");

    let obj1: Arc<Logger> = logger::get().unwrap();
    println!("   obj1 = {:p}", Arc::as_ptr(&obj1));
    let obj2: Arc<Logger> = logger::get().unwrap();
    println!("   obj2 = {:p}", Arc::as_ptr(&obj2));
    println!("   Same instance? {}", Arc::ptr_eq(&obj1, &obj2));

    // -------------------------------------------------------------------------
    // 3. Shared state
    // -------------------------------------------------------------------------
    println!("\n3. Writing through both handles...");
    obj1.log("written through obj1");
    obj2.log("written through obj2");

    println!("\n=== Example Complete ===");
    println!("State: {:?}", logger::state());
    println!("Instances built: {}", logger::constructed_count());
}
