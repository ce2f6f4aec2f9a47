pub mod contract_harness;
