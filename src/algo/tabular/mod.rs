pub mod q_learning;
pub mod q_table;
