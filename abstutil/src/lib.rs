mod io;
mod logger;
mod logs;
mod random;
mod time;

pub use crate::io::{
    deserialize_btreemap, read_binary, read_json, serialize_btreemap, to_json, write_binary,
    write_json,
};
pub use crate::logger::setup as setup_logger;
pub use crate::logs::Warn;
pub use crate::random::{fork_rng, seeded_rng};
pub use crate::time::{elapsed_seconds, prettyprint_time, prettyprint_usize, Timer};
