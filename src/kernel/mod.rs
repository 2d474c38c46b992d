pub mod cancel;
pub mod event;
pub mod executor;
pub mod intent;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod turn;
pub mod voice;
