pub mod controller;
pub mod ledger;
pub mod router;
pub mod service;

pub use ledger::VerificationLedger;
pub use router::init_verification_router;
pub use service::VerificationService;
