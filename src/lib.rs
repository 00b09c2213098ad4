#![doc(test(attr(deny(warnings))))]

//! Administrative front-end core for an English-language center: typed
//! student, teacher, classroom, and schedule records, a reusable form session
//! controller that every create/edit dialog runs on, and the API client those
//! dialogs submit through.

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod form;
pub mod utils;
pub mod wizards;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("ecm_admin tracing initialized.");
    });
}
