pub mod query_evaluator;
