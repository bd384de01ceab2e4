// src/checker/mod.rs
// =============================================================================
// This module contains all link accessibility logic.
//
// Submodules:
// - http: HEAD probes and the bounded-concurrency classifier
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// - Tasks: each link is probed in its own tokio task
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod http;

// Re-export public items from submodules
// This lets users write `checker::LinkChecker` instead of
// `checker::http::LinkChecker`
pub use http::{classify_links_concurrently, Classified, LinkChecker, LinkCheckerConfig};

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a semaphore and not a fixed pool of workers?
//    - Every link gets its own task, so no task waits on another link's queue
//    - The semaphore only limits how many of them are on the network at once
//    - A task that is waiting for a permit costs almost nothing
//
// 2. What is a JoinSet?
//    - A collection of spawned tasks owned by the caller
//    - join_next() hands back each task's result as it finishes
//    - When the loop over join_next() ends, every task is done
//
// 3. Why is a failed probe not an error?
//    - An unreachable link is a normal answer ("inaccessible"), not a bug
//    - So probe failures are recovered inside the checker and never
//      stop the classification of the other links
// -----------------------------------------------------------------------------
