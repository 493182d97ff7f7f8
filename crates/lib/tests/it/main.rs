/*! Integration tests for minidb.
 *
 * Organized as a single integration test binary following the pattern
 * described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * - select: scenario S1, select purity
 * - remove: scenario S2, remove ⊆ select, descending array deletion
 * - update: scenarios S3-S6 (increment, rename, append, rollback on fault)
 * - monad_laws: the Bind/Return monad laws the query algebra relies on
 * - fuel: fuel-bounded termination through a live Store
 * - concurrency: lock exclusion under concurrent readers/writers
 * - store_lifecycle: commit/rollback round-trip, missing-file bootstrap
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("minidb=debug".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod concurrency;
mod fuel;
mod helpers;
mod monad_laws;
mod remove;
mod select;
mod store_lifecycle;
mod update;
