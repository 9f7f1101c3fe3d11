pub mod comm;
pub mod controller;
pub mod protocol;

pub use comm::{ProcessGroup, WorkerMessage};
pub use controller::{worker_loop, DispatchController};
pub use protocol::{
    decode_fitness, decode_payload, encode_fitness, encode_payload, global_index, partition,
    payload_len, Header,
};
