mod relay_buffer;
mod sse_relay;

pub use relay_buffer::{transition, RelayBuffer};
pub use sse_relay::{record_payload, relay_sse, RelayRecord, RelayStream};
