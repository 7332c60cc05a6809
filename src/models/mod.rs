pub mod machine;

pub use machine::{Machine, MachineRecord, PgMachineStore};
