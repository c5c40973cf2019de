mod api;
mod store;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use powerclash_engine::Arena;
use tiny_http::Server;

use crate::api::{now_ms, Api};
use crate::store::{default_catalog, MemoryStore};

/// How often the maintenance loop sweeps the queue and finished battles.
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    env_logger::init();

    let addr = std::env::var("POWERCLASH_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let workers: usize = std::env::var("POWERCLASH_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4);

    let catalog = Arc::new(default_catalog());
    let store = Arc::new(MemoryStore::new(Arc::clone(&catalog)));
    let arena = Arc::new(Arena::new(
        Arc::clone(&catalog),
        store.clone(),
        now_ms().wrapping_mul(0x9e37_79b9),
    ));
    let api = Arc::new(Api::new(Arc::clone(&arena), store, catalog));

    let server = match Server::http(&addr) {
        Ok(server) => Arc::new(server),
        Err(err) => {
            log::error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    log::info!("powerclash-server listening on {addr} with {workers} workers");

    // Queue expiry and finished-battle GC run server-side; clients are never
    // trusted to call cancel.
    {
        let arena = Arc::clone(&arena);
        thread::spawn(move || loop {
            thread::sleep(MAINTENANCE_INTERVAL);
            arena.maintain(now_ms());
        });
    }

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let server = Arc::clone(&server);
        let api = Arc::clone(&api);
        handles.push(thread::spawn(move || loop {
            match server.recv() {
                Ok(request) => api.handle(request),
                Err(err) => log::warn!("recv failed: {err}"),
            }
        }));
    }
    for handle in handles {
        let _ = handle.join();
    }
}
