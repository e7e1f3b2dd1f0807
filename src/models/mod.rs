pub mod appraisal;
pub mod openai;
