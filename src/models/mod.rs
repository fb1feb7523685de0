pub mod grafana;
pub mod prometheus;
