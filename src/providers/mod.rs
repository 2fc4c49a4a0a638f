// Fact providers and the driver that runs them
pub mod collect_cpu;
pub mod collect_disk;
pub mod collect_host;
pub mod collect_listeners;
pub mod collect_memory;
pub mod collect_network;
pub mod collector;
pub mod command;
pub mod sysfs;

// Re-export provider entry points
pub use collect_cpu::collect_cpu_facts;
pub use collect_disk::collect_disk_facts;
pub use collect_host::collect_host_facts;
pub use collect_listeners::collect_listener_facts;
pub use collect_memory::collect_memory_facts;
pub use collect_network::collect_network_facts;
pub use collector::collect_and_print;
